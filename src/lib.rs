#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod delivery;
pub mod discord;
pub mod error;
pub mod report;
pub mod telemetry;

pub type Result<T> = std::result::Result<T, error::Error>;
