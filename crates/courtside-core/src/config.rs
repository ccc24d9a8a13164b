// Configuration loading and parsing (courtside.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::clock::{MAX_PERIOD_MINUTES, MIN_PERIOD_MINUTES};
use crate::game::MatchSettings;

/// File name of the single config file under `config/`.
pub const CONFIG_FILE: &str = "courtside.toml";

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
    pub game: GameConfig,
    pub stats: StatsConfig,
    pub clock: ClockConfig,
    pub db_path: String,
    pub export_dir: String,
    /// Roster file (CSV or JSON) imported into the database at startup, if any.
    pub roster_import: Option<String>,
}

impl Config {
    /// Match rules for a new session.
    pub fn match_settings(&self) -> MatchSettings {
        MatchSettings {
            period_length_minutes: self.game.period_length_minutes,
            periods_total: self.game.periods_total,
            anti_duplicate: self.game.anti_duplicate,
            dedup_window_ms: self.game.dedup_window_ms,
            foul_limit: self.game.foul_limit,
            history_capacity: self.stats.history_capacity,
            sanctions_capacity: self.stats.sanctions_capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// courtside.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire courtside.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    game: GameConfig,
    stats: StatsConfig,
    clock: ClockConfig,
    database: DatabaseSection,
    export: ExportSection,
    #[serde(default)]
    rosters: Option<RostersSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub period_length_minutes: u32,
    pub periods_total: u32,
    pub anti_duplicate: bool,
    pub dedup_window_ms: u64,
    pub foul_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    pub history_capacity: usize,
    pub sanctions_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClockConfig {
    /// Interval between clock ticks in the app loop.
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ExportSection {
    dir: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RostersSection {
    import: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/courtside.toml` relative to `base_dir`.
///
/// Does not copy defaults. Prefer `load_config()` which does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text, &path)?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Config {
        game: file.game,
        stats: file.stats,
        clock: file.clock,
        db_path: file.database.path,
        export_dir: file.export.dir,
        roster_import: file.rosters.and_then(|r| r.import),
    })
}

/// Copy `defaults/courtside.toml` to `config/courtside.toml` unless the
/// operator already has one. Returns the new file's path when it was seeded.
pub fn seed_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} exists; run from the project root",
                source.display(),
                target.display()
            ),
        });
    }

    if let Some(config_dir) = target.parent() {
        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", config_dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    })?;
    Ok(Some(target))
}

/// Load config relative to the current working directory, seeding
/// `config/` from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    seed_config_file(&cwd)?;
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
    let minutes = config.game.period_length_minutes;
    if !(MIN_PERIOD_MINUTES..=MAX_PERIOD_MINUTES).contains(&minutes) {
        return Err(ConfigError::ValidationError {
            field: "game.period_length_minutes".into(),
            message: format!(
                "must be between {MIN_PERIOD_MINUTES} and {MAX_PERIOD_MINUTES}, got {minutes}"
            ),
        });
    }

    let positive: &[(&str, u64)] = &[
        ("game.periods_total", u64::from(config.game.periods_total)),
        ("game.dedup_window_ms", config.game.dedup_window_ms),
        ("game.foul_limit", u64::from(config.game.foul_limit)),
        ("stats.history_capacity", config.stats.history_capacity as u64),
        ("stats.sanctions_capacity", config.stats.sanctions_capacity as u64),
        ("clock.tick_ms", config.clock.tick_ms),
    ];
    for (name, val) in positive {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
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
