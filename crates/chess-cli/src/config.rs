//! Configuration file loading for the command-line tool.
//!
//! Settings live in `chess.toml` in the current directory unless another
//! path is given. A missing default file means default settings.

use chess_core::pgn::{PgnWriteOptions, Tags};
use chess_engine::MoveFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// PGN output settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct PgnConfig {
    #[serde(flatten)]
    pub options: PgnWriteOptions,
    /// Tag values applied to exported games that do not set them.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl PgnConfig {
    /// Copies the configured tags into `tags` where they are missing.
    pub fn fill_tags(&self, tags: &mut Tags) {
        for (name, value) in &self.tags {
            if tags.get(name).is_none() {
                tags.set(name.clone(), value.clone());
            }
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChessConfig {
    /// Log filter used when `RUST_LOG` is unset. Defaults to "warn".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Notation that `play` reads moves in.
    #[serde(default)]
    pub format: MoveFormat,
    #[serde(default)]
    pub pgn: PgnConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ChessConfig {
    fn default() -> Self {
        ChessConfig {
            log_level: default_log_level(),
            format: MoveFormat::default(),
            pgn: PgnConfig::default(),
        }
    }
}

impl ChessConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`Self::config_path()`]
    /// is read if present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&config_path).map_err(|source| {
            ConfigError::ReadError {
                path: config_path.clone(),
                source,
            }
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the default configuration path: `chess.toml` in the current
    /// working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_content = r#"
log_level = "debug"
format = "san"

[pgn]
wrap_width = 72
fill_required_tags = false

[pgn.tags]
Event = "Club night"
Site = "Ghent"
"#;

        let config: ChessConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, MoveFormat::San);
        assert_eq!(config.pgn.options.wrap_width, 72);
        assert!(!config.pgn.options.fill_required_tags);
        assert_eq!(config.pgn.tags.get("Site").map(String::as_str), Some("Ghent"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: ChessConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChessConfig::default());
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.format, MoveFormat::Auto);
        assert_eq!(config.pgn.options.wrap_width, 50);
        assert!(config.pgn.options.fill_required_tags);

        let config: ChessConfig = toml::from_str("[pgn]\nwrap_width = 80\n").unwrap();
        assert_eq!(config.pgn.options.wrap_width, 80);
        assert!(config.pgn.tags.is_empty());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let result: Result<ChessConfig, _> = toml::from_str("log_level = [");
        assert!(result.is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ChessConfig::load(Some(Path::new("/nonexistent/chess.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn configured_tags_fill_gaps_only() {
        let mut pgn = PgnConfig::default();
        pgn.tags.insert("Event".into(), "Club night".into());
        pgn.tags.insert("White".into(), "Nobody".into());

        let mut tags = Tags::new();
        tags.set("White", "Anna");
        pgn.fill_tags(&mut tags);
        assert_eq!(tags.get("Event"), Some("Club night"));
        assert_eq!(tags.get("White"), Some("Anna"));
    }
}
