//! Application configuration.
//!
//! Settings come from `relocation-desk.toml` when present, with `DATABASE_URL` and
//! `MEDIA_ROOT` in the environment (or `.env`) taking precedence. Every setting has a
//! default so the binary runs without any configuration file.

/// Database configuration and connection management
pub mod database;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "relocation-desk.toml";

/// Top-level settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Directory uploaded files are stored under
    pub media_root: PathBuf,
    /// Rows shown by list views when no limit is given
    pub list_limit: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: database::DEFAULT_DATABASE_URL.to_string(),
            media_root: PathBuf::from("media"),
            list_limit: 100,
        }
    }
}

/// Parses a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}

/// Loads the effective configuration.
///
/// An explicitly given path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is used
/// if present and defaults otherwise. Environment overrides are applied last.
pub fn load_app_configuration(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(DEFAULT_CONFIG_FILE)?,
        None => {
            debug!("No configuration file found, using defaults");
            AppConfig::default()
        }
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }
    if let Ok(root) = std::env::var("MEDIA_ROOT") {
        config.media_root = PathBuf::from(root);
    }
    if config.list_limit == 0 {
        return Err(Error::Config {
            message: "list_limit must be at least 1".to_string(),
        });
    }

    info!(
        "Using database {} and media root {}",
        config.database_url,
        config.media_root.display()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            database_url = "sqlite://data/moves.sqlite?mode=rwc"
            media_root = "/srv/media"
            list_limit = 25
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url, "sqlite://data/moves.sqlite?mode=rwc");
        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.list_limit, 25);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("list_limit = 10").unwrap();
        assert_eq!(config.list_limit, 10);
        assert_eq!(config.database_url, database::DEFAULT_DATABASE_URL);
        assert_eq!(config.media_root, PathBuf::from("media"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "media_root = \"uploads\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.media_root, PathBuf::from("uploads"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "list_limit = \"many\"").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
