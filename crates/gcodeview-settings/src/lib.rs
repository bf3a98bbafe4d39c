//! GCodeView Settings Crate
//!
//! Handles application configuration and its persistence as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{Config, ConfigFormat};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
