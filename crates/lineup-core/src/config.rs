// Configuration loading and parsing (league.toml, storage.toml).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::codec::CodecKind;
use crate::player::Price;
use crate::prediction::{Fixture, PredictionSet};
use crate::store::StoreConfig;

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

impl ConfigError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    /// Resolved prediction prompts; `None` when predictions are off.
    pub predictions: Option<PredictionSet>,
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub log_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    predictions: Option<PredictionsSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Current round label (Jornada), written into every row.
    pub round: String,
    /// Maximum team value in whole euros.
    #[serde(default = "default_budget_cap")]
    pub budget_cap: u32,
    #[serde(default = "default_label_codec")]
    pub label_codec: CodecKind,
}

impl LeagueConfig {
    pub fn budget_cap_price(&self) -> Price {
        Price::from_euros(u64::from(self.budget_cap))
    }
}

fn default_budget_cap() -> u32 {
    700
}

fn default_label_codec() -> CodecKind {
    CodecKind::Lookup
}

/// Raw `[predictions]` table. Fixtures name their rival by key; keys are
/// resolved to display names before anything is shown or compared.
#[derive(Debug, Clone, Deserialize)]
struct PredictionsSection {
    enabled: bool,
    club: String,
    #[serde(default = "default_draw_label")]
    draw_label: String,
    #[serde(default)]
    rivals: HashMap<String, String>,
    #[serde(default)]
    fixtures: Vec<FixtureSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureSection {
    rival: String,
    club_at_home: bool,
}

fn default_draw_label() -> String {
    "Empate".into()
}

/// Number of fixtures a round's predictions cover; the store has exactly
/// two winner/score column pairs.
pub const FIXTURES_PER_ROUND: usize = 2;

// ---------------------------------------------------------------------------
// storage.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct StorageFile {
    catalog: CatalogSection,
    store: StoreConfig,
    #[serde(default)]
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogSection {
    path: Option<PathBuf>,
    url: Option<String>,
    #[serde(default = "default_delimiter")]
    delimiter: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingSection {
    dir: PathBuf,
}

fn default_delimiter() -> String {
    ",".into()
}

/// Where the player catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    /// CSV export URL of the published sheet tab.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub delimiter: u8,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/storage.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- storage.toml (required) ---
    let storage_path = config_dir.join("storage.toml");
    let storage_text = read_file(&storage_path)?;
    let storage_file: StorageFile =
        toml::from_str(&storage_text).map_err(|e| ConfigError::ParseError {
            path: storage_path.clone(),
            source: e,
        })?;

    let league = league_file.league;
    validate_league(&league)?;

    let predictions = match league_file.predictions {
        Some(section) if section.enabled => Some(resolve_predictions(section)?),
        _ => None,
    };

    let catalog = resolve_catalog(storage_file.catalog)?;
    let log_dir = storage_file
        .logging
        .map(|l| l.dir)
        .unwrap_or_else(|| PathBuf::from("logs"));

    Ok(Config {
        league,
        predictions,
        catalog,
        store: storage_file.store,
        log_dir,
    })
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", path.display(), target.display()),
        })?;
        copied.push(target);
    }

    copied.sort();
    Ok(copied)
}

/// Loads config relative to the current working directory, copying
/// defaults first.
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

fn validate_league(league: &LeagueConfig) -> Result<(), ConfigError> {
    if league.round.trim().is_empty() {
        return Err(ConfigError::invalid("league.round", "must not be empty"));
    }
    if league.budget_cap == 0 {
        return Err(ConfigError::invalid("league.budget_cap", "must be greater than 0"));
    }
    Ok(())
}

fn resolve_predictions(section: PredictionsSection) -> Result<PredictionSet, ConfigError> {
    if section.club.trim().is_empty() {
        return Err(ConfigError::invalid("predictions.club", "must not be empty"));
    }
    if section.fixtures.len() != FIXTURES_PER_ROUND {
        return Err(ConfigError::invalid(
            "predictions.fixtures",
            format!(
                "expected {FIXTURES_PER_ROUND} fixtures, got {}",
                section.fixtures.len()
            ),
        ));
    }

    let mut fixtures = Vec::with_capacity(section.fixtures.len());
    for (idx, f) in section.fixtures.into_iter().enumerate() {
        let Some(rival_name) = section.rivals.get(&f.rival) else {
            return Err(ConfigError::invalid(
                format!("predictions.fixtures[{idx}].rival"),
                format!("no entry for '{}' in [predictions.rivals]", f.rival),
            ));
        };
        let (home, away) = if f.club_at_home {
            (section.club.clone(), rival_name.clone())
        } else {
            (rival_name.clone(), section.club.clone())
        };
        if home == away || home == section.draw_label || away == section.draw_label {
            return Err(ConfigError::invalid(
                format!("predictions.fixtures[{idx}]"),
                "club, rival and draw label must all differ",
            ));
        }
        fixtures.push(Fixture {
            key: f.rival,
            home,
            away,
        });
    }

    Ok(PredictionSet {
        draw_label: section.draw_label,
        fixtures,
    })
}

fn resolve_catalog(section: CatalogSection) -> Result<CatalogConfig, ConfigError> {
    let source = match (section.path, section.url) {
        (Some(path), None) => CatalogSource::File(path),
        (None, Some(url)) => CatalogSource::Url(url),
        (Some(_), Some(_)) => {
            return Err(ConfigError::invalid("catalog", "set either `path` or `url`, not both"));
        }
        (None, None) => {
            return Err(ConfigError::invalid("catalog", "one of `path` or `url` is required"));
        }
    };

    let delimiter = match section.delimiter.as_bytes() {
        [b] if b.is_ascii() => *b,
        _ => {
            return Err(ConfigError::invalid(
                "catalog.delimiter",
                format!("must be a single ASCII character, got '{}'", section.delimiter),
            ));
        }
    };

    Ok(CatalogConfig { source, delimiter })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
