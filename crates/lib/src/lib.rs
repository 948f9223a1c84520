//! Hopper core library — configuration and the jump relay (device link,
//! broadcast hub, subscriber link) used by the CLI and the integration tests.

pub mod config;
pub mod relay;
