pub mod config;
pub mod deploy;
pub mod error;
pub mod manifest;
pub mod output;
pub mod runner;
pub mod telemetry;
