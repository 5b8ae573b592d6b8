//! Config command implementation.
//!
//! Manages CLI configuration.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::{parse_bool, Config};

const KEYS: &str = "capabilities-file, format, dynamic";

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("capreq Configuration");
    println!("{:-<40}", "");

    println!(
        "Capabilities File: {}",
        config
            .capabilities_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("Format:            {}", config.format);
    println!("Dynamic:           {}", config.dynamic);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "capabilities-file" | "capabilities" => {
            config.capabilities_file = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
            println!("Set capabilities-file to: {}", value);
        }
        "format" => {
            config.format = value.parse()?;
            println!("Set format to: {}", config.format);
        }
        "dynamic" => {
            config.dynamic = parse_bool(value)?;
            println!("Set dynamic to: {}", config.dynamic);
        }
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    }

    config.save()?;
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "capabilities-file" | "capabilities" => config
            .capabilities_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string()),
        "format" => config.format.to_string(),
        "dynamic" => config.dynamic.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    };

    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults");
    Ok(())
}
