// Configuration loading and parsing (league.toml, balance.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::roster::RatingScale;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub balance: BalanceConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// Seats per team. Every team has the same capacity.
    pub team_capacity: usize,
    /// Grade-to-score table. Older rosters use the four-letter scale.
    #[serde(default)]
    pub rating_scale: RatingScale,
}

// ---------------------------------------------------------------------------
// balance.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire balance.toml file.
#[derive(Debug, Clone, Deserialize)]
struct BalanceFile {
    balance: BalanceConfig,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceConfig {
    pub max_passes: usize,
    pub epsilon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// CSV with `name,rating` rows used to seed an empty player store.
    pub roster: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/balance.toml`, relative to the given `base_dir`.
///
/// Does not copy defaults. Prefer `load_config()`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let balance_path = config_dir.join("balance.toml");
    let balance_text = read_file(&balance_path)?;
    let balance_file: BalanceFile =
        toml::from_str(&balance_text).map_err(|e| ConfigError::ParseError {
            path: balance_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        balance: balance_file.balance,
        db_path: balance_file.database.path,
        data_paths: balance_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Files under `config/` that `load_config_from` reads.
const CONFIG_FILES: [&str; 2] = ["league.toml", "balance.toml"];

/// Copy each missing file in `CONFIG_FILES` from `defaults/` into `config/`.
/// Existing files are left alone. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{} is missing and there is no {} to copy it from",
                    target.display(),
                    source.display()
                ),
            });
        }

        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {}: {e}", source.display()),
        })?;
        info!("Copied default {} into {}", name, config_dir.display());
        copied.push(target);
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// into `config/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.num_teams == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.league.team_capacity == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.team_capacity".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.balance.max_passes == 0 {
        return Err(ConfigError::ValidationError {
            field: "balance.max_passes".into(),
            message: "must be greater than 0".into(),
        });
    }

    let eps = config.balance.epsilon;
    if !eps.is_finite() || eps < 0.0 {
        return Err(ConfigError::ValidationError {
            field: "balance.epsilon".into(),
            message: format!("must be a finite value >= 0, got {eps}"),
        });
    }

    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
