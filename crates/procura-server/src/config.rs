//! Server configuration.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Intake session TTL in seconds; `None` disables expiry.
    #[serde(default = "default_intake_ttl")]
    pub intake_session_ttl_secs: Option<u64>,
    /// Results-stack session TTL in seconds; `None` (the default) means
    /// sessions live for the life of the process.
    #[serde(default)]
    pub kiba_session_ttl_secs: Option<u64>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_intake_ttl() -> Option<u64> {
    Some(1800)
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            intake_session_ttl_secs: default_intake_ttl(),
            kiba_session_ttl_secs: None,
            cors_origins: default_cors_origins(),
        }
    }
}

impl Config {
    pub fn intake_ttl(&self) -> Option<Duration> {
        self.intake_session_ttl_secs.map(Duration::from_secs)
    }

    pub fn kiba_ttl(&self) -> Option<Duration> {
        self.kiba_session_ttl_secs.map(Duration::from_secs)
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        // Try to load from config file
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        // Fall back to defaults
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.intake_ttl(), Some(Duration::from_secs(1800)));
        assert_eq!(config.kiba_ttl(), None);
        assert_eq!(config.cors_origins.len(), 4);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port = 9001\nintake_session_ttl_secs = 60\ncors_origins = [\"http://example.test\"]"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.intake_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.cors_origins, vec!["http://example.test"]);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        assert!(Config::load_from(std::path::Path::new("/nonexistent/config.toml")).is_err());
    }
}
