// Player catalog loading and normalization.
//
// Reads the "Convocados" tab exported as CSV: one row per player with the
// columns Nombre, Equipo, Posicion and ValorActual. ValorActual may use a
// decimal comma.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::player::{PlayerRecord, Position, Price};

/// Columns every catalog must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Nombre", "Equipo", "Posicion", "ValorActual"];

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog is missing required column `{column}`")]
    MissingColumn { column: &'static str },

    #[error("catalog has no usable player rows")]
    Empty,
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPlayerRow {
    Nombre: String,
    #[serde(default)]
    Equipo: String,
    Posicion: String,
    ValorActual: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The pool of eligible players for one session. Read once, never refreshed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    players: Vec<PlayerRecord>,
}

impl Catalog {
    pub fn new(players: Vec<PlayerRecord>) -> Self {
        Self { players }
    }

    /// Parse a catalog from CSV text using the given field delimiter.
    ///
    /// Header names and fields are trimmed. Rows with an unknown position,
    /// an empty name or an unparsable price are skipped with a warning; a
    /// missing required column aborts the load.
    pub fn from_reader<R: Read>(rdr: R, delimiter: u8) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(CatalogError::MissingColumn { column });
            }
        }

        let mut players = Vec::new();
        for result in reader.deserialize::<RawPlayerRow>() {
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("skipping malformed catalog row: {}", e);
                    continue;
                }
            };

            if raw.Nombre.is_empty() {
                warn!("skipping catalog row with empty Nombre");
                continue;
            }
            let Some(position) = Position::from_str_pos(&raw.Posicion) else {
                warn!("skipping '{}': unknown Posicion '{}'", raw.Nombre, raw.Posicion);
                continue;
            };
            let Some(price) = Price::parse(&raw.ValorActual) else {
                warn!("skipping '{}': unparsable ValorActual '{}'", raw.Nombre, raw.ValorActual);
                continue;
            };
            if raw.Nombre.contains(',') {
                warn!(
                    "player name '{}' contains a comma; its label will not decode back to the full name",
                    raw.Nombre
                );
            }

            players.push(PlayerRecord {
                name: raw.Nombre,
                team: raw.Equipo,
                position,
                price,
            });
        }

        if players.is_empty() {
            return Err(CatalogError::Empty);
        }

        info!("catalog loaded with {} players", players.len());
        Ok(Self { players })
    }

    /// Load a catalog from a CSV file on disk.
    pub fn load_file(path: &Path, delimiter: u8) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(file, delimiter)
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    /// Players eligible for the given position, in catalog order.
    pub fn by_position(&self, position: Position) -> impl Iterator<Item = &PlayerRecord> {
        self.players.iter().filter(move |p| p.position == position)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
