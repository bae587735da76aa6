// Append-only submission stores.
//
// A store receives one row per accepted lineup and never rewrites it. Row
// shape: [submissionId, user, roundLabel, ...cleanedNames, (winner1, score1,
// winner2, score2)].

pub mod csv_file;
pub mod sqlite;

use std::path::PathBuf;

use serde::Deserialize;

pub use csv_file::CsvStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open store {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV store error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode row: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Somewhere accepted lineups are appended.
pub trait SubmissionStore {
    /// Append one row. Cells are written in the given order.
    fn append(&self, row: &[String]) -> Result<(), StoreError>;

    /// Every stored row, oldest first.
    fn rows(&self) -> Result<Vec<Vec<String>>, StoreError>;
}

/// Which backend to append to, as written in storage.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub path: PathBuf,
}

/// Open the configured store.
pub fn open(config: &StoreConfig) -> Result<Box<dyn SubmissionStore>, StoreError> {
    match config.kind {
        StoreKind::Csv => Ok(Box::new(CsvStore::new(&config.path))),
        StoreKind::Sqlite => Ok(Box::new(SqliteStore::open(&config.path)?)),
    }
}
