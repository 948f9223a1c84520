use anyhow::Context;
use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser)]
#[command(name = "hopper")]
#[command(about = "ESP32 jump relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the relay server (HTTP + WebSocket on a single port).
    Serve {
        /// Config file path (default: HOPPER_CONFIG_PATH or ~/.hopper/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// WebSocket and HTTP port (default from config or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Act as the device: connect to the relay's ESP32 endpoint and send jump frames.
    Jump {
        /// Config file path (default: HOPPER_CONFIG_PATH or ~/.hopper/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Number of jump frames to send.
        #[arg(long, short = 'n', default_value_t = 1)]
        count: u32,
    },

    /// Act as a browser client: subscribe and print each received event frame.
    Watch {
        /// Config file path (default: HOPPER_CONFIG_PATH or ~/.hopper/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("hopper {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("relay failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Jump { config, count }) => {
            if let Err(e) = run_jump(config, count).await {
                log::error!("jump failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Watch { config }) => {
            if let Err(e) = run_watch(config).await {
                log::error!("watch failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(config_path)?;
    // Precedence: --port flag, then HOPPER_PORT env, then config file.
    config.relay.port = port.unwrap_or_else(|| lib::config::resolve_port(&config));
    log::info!("starting relay on {}:{}", config.relay.bind, config.relay.port);
    lib::relay::run_relay(config).await
}

/// Resolve the ws:// URL for a relay endpoint from config (a wildcard bind
/// is dialed on loopback).
fn relay_url(config: &lib::config::Config, path: &str) -> String {
    let host = lib::config::connect_host(&config.relay.bind);
    let port = lib::config::resolve_port(config);
    format!("ws://{}:{}{}", host, port, path)
}

async fn run_jump(config_path: Option<std::path::PathBuf>, count: u32) -> anyhow::Result<()> {
    let config = lib::config::load_config(config_path)?;
    let url = relay_url(&config, lib::relay::DEVICE_WS_PATH);

    let (mut ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .with_context(|| format!("connecting to {}", url))?;

    let frame = serde_json::json!({ "event": lib::relay::JUMP_EVENT }).to_string();
    for i in 0..count {
        ws.send(Message::Text(frame.clone()))
            .await
            .context("sending jump frame")?;
        println!("sent jump {}/{}", i + 1, count);
    }
    let _ = ws.close(None).await;
    Ok(())
}

async fn run_watch(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let config = lib::config::load_config(config_path)?;
    let url = relay_url(&config, lib::relay::SUBSCRIBER_WS_PATH);

    let (mut ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .with_context(|| format!("connecting to {}", url))?;
    println!("watching {} (Ctrl+C to stop)", url);

    while let Some(msg) = ws.next().await {
        let msg = msg.context("reading from relay")?;
        match msg {
            Message::Text(text) => println!("{}", text),
            // Answer server heartbeats so the relay keeps us registered.
            Message::Ping(data) => {
                let _ = ws.send(Message::Pong(data)).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Ok(())
}
