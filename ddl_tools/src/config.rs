//! Configuration handling for ddl_tools

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::types::DEFAULT_SCHEMA;
use crate::utils::naming::CaseMode;

/// Load configuration from a TOML file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    from_toml(&config_str)
}

/// Parse configuration from TOML text
pub fn from_toml(config_str: &str) -> Result<Config> {
    Ok(toml::from_str(config_str)?)
}

/// Represents the complete ddl_tools configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

/// Target database naming
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database the parsed tables are placed in
    pub name: String,
    /// Schema the parsed tables are placed in
    pub schema: String,
    /// Schema name exempt from case conversion
    pub default_schema: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "MY_DATABASE".to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            default_schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

/// Generated DDL settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub case: CaseMode,
    /// Emit CREATE DATABASE / CREATE SCHEMA ahead of the tables
    pub create_database: bool,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            console: true,
        }
    }
}
