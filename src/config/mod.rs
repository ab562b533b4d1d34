//! Configuration module
//!
//! Settings are read from `config.toml` in the platform config directory.

pub mod config;

pub use config::Config;
