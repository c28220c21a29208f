//! Client configuration.
//!
//! Values come from an optional JSON file and are overridden by command-line
//! flags. Anything not given falls back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 12345;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "netchess", version, about = "Two-player chess client for a line-protocol game server")]
pub struct Cli {
    /// Server host name or address
    #[arg(long)]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Send `ready` automatically whenever a new game is awaited
    #[arg(long)]
    pub auto_ready: bool,

    /// Log filter used when RUST_LOG is not set (e.g. `info`, `netchess=debug`)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub auto_ready: bool,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            auto_ready: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(?path, "loaded config file");
        Ok(config)
    }

    /// Build the effective config: file values first, then CLI overrides
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_overrides(cli))
    }

    fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if cli.auto_ready {
            self.auto_ready = true;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::load(&Cli::default()).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 12345);
        assert!(!config.auto_ready);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{ "port": 4000 }"#).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "localhost");
    }

    #[test]
    fn test_cli_overrides_file() {
        let path = std::env::temp_dir().join(format!("netchess-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "host": "chess.example", "port": 4000, "auto_ready": false }"#).unwrap();

        let cli = Cli::parse_from(["netchess", "--config", path.to_str().unwrap(), "--port", "5000", "--auto-ready"]);
        let config = ClientConfig::load(&cli).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.host, "chess.example");
        assert_eq!(config.port, 5000);
        assert!(config.auto_ready);
    }

    #[test]
    fn test_bad_file_is_reported() {
        let path = std::env::temp_dir().join(format!("netchess-bad-{}.json", std::process::id()));
        fs::write(&path, "not json").unwrap();
        let err = ClientConfig::from_file(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let missing = ClientConfig::from_file(Path::new("/nonexistent/netchess.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
