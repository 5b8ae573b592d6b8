//! CLI configuration management.
//!
//! Values come from the config file, then environment variables (after
//! loading `.env`), then command-line flags, each overriding the previous.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "CAPREQ_CONFIG";

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", s),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Application-wide configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capabilities document used when `-c` is not given.
    pub capabilities_file: Option<PathBuf>,

    /// Default output format.
    pub format: OutputFormat,

    /// Treat checks as dynamic by default.
    pub dynamic: bool,
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(file) = std::env::var("CAPREQ_CAPABILITIES") {
            config.capabilities_file = Some(PathBuf::from(file));
        }
        if let Ok(format) = std::env::var("CAPREQ_FORMAT") {
            config.format = format.parse().context("Invalid CAPREQ_FORMAT")?;
        }
        if let Ok(dynamic) = std::env::var("CAPREQ_DYNAMIC") {
            config.dynamic = parse_bool(&dynamic).context("Invalid CAPREQ_DYNAMIC")?;
        }

        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("dev", "capreq", "capreq").map(|dirs| dirs.config_dir().join("config.json"))
    }
}

/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("md".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("yes").unwrap());
        assert!(parse_bool(" 1 ").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_config_roundtrip_with_missing_fields() {
        let config: Config = serde_json::from_str(r#"{ "format": "json" }"#).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.capabilities_file.is_none());
        assert!(!config.dynamic);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"format\":\"json\""));
    }
}
