//! Configuration management for the Tradeline CLI
//!
//! Stores the server URL and debug-route API key in ~/.config/tradeline/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR: &str = "tradeline";
const CONFIG_FILE: &str = "config.toml";

/// Caller and business numbers used by `simulate` when none are given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default = "default_caller")]
    pub from: String,
    #[serde(default = "default_business_number")]
    pub to: String,
}

fn default_caller() -> String {
    "+61411111111".to_string()
}

fn default_business_number() -> String {
    "+61400555666".to_string()
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            from: default_caller(),
            to: default_business_number(),
        }
    }
}

/// CLI Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub simulation: SimulationDefaults,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            simulation: SimulationDefaults::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or fall back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    pub fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
    }

    pub fn set_base_url(&mut self, url: String) {
        self.base_url = url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fills_defaults() {
        let config = Config::parse("api_key = \"secret\"").unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.simulation.to, "+61400555666");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.set_base_url("https://tradeline.shuttle.app/".to_string());
        config.simulation.from = "+61422222222".to_string();

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::parse(&text).unwrap();

        assert_eq!(parsed.base_url, "https://tradeline.shuttle.app");
        assert_eq!(parsed.simulation.from, "+61422222222");
        assert!(parsed.api_key.is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("base_url = [").is_err());
    }
}
