use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime settings, layered: defaults, then `tradeplan.toml`, then
/// `TRADEPLAN_*` environment variables. CLI flags override on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Toolbox SQLite database file.
    pub db_path: PathBuf,
    /// Trade plan CSV file.
    pub csv_path: PathBuf,
    /// Directory for zip backups of the database.
    pub backup_dir: PathBuf,
    /// How many backup archives to keep.
    pub max_backups: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data.db3"),
            csv_path: PathBuf::from("tradeplan.csv"),
            backup_dir: PathBuf::from("."),
            max_backups: 7,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("tradeplan.toml"))
            .merge(Env::prefixed("TRADEPLAN_"))
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load config: {}", e)))
    }
}
