//! Configuration module for medscan
//!
//! Handles loading and parsing of `.medscan.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{load_config, load_config_from, sample_config, user_config_path, validate, ConfigError};
pub use types::{AlertConfig, LlmConfig, MedscanConfig, ServerConfig};
