// Submission building: turn a validated lineup into one store row.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::codec::LabelCodec;
use crate::formation::Formation;
use crate::player::Price;
use crate::prediction::PredictionEntry;
use crate::roster::{RosterBuilder, RosterError, RosterSelection};
use crate::store::{StoreError, SubmissionStore};
use crate::validate::{self, Rules, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The lineup was rejected; nothing was written.
    #[error("lineup rejected: {0}")]
    Invalid(#[from] ValidationError),

    /// The lineup does not fit its formation; nothing was written.
    #[error("lineup does not fit its formation: {0}")]
    Roster(#[from] RosterError),

    /// The lineup was valid but the store refused the row. It is not
    /// queued anywhere and must be submitted again.
    #[error("failed to write lineup {id} to the store: {source}")]
    StoreWriteFailed {
        id: SubmissionId,
        source: StoreError,
    },
}

/// Short random token identifying one submission, e.g. "AID3f9c1a".
///
/// Uniqueness is best effort; the store does not deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        SubmissionId(format!("AID{}", &hex[..6]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a user hands in: who they are, their formation, picks and
/// (optionally) predictions. This is also the shape of a lineup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub user: String,
    pub formation: Formation,
    #[serde(default)]
    pub roster: RosterSelection,
    #[serde(default)]
    pub predictions: Vec<PredictionEntry>,
}

/// Round-level settings a submission is checked and labelled with.
pub struct SubmissionContext<'a> {
    pub round_label: &'a str,
    /// Every pick must be a label this catalog offers for its position.
    pub catalog: &'a Catalog,
    pub codec: &'a dyn LabelCodec,
    pub rules: Rules<'a>,
}

/// The row appended for one accepted lineup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub user: String,
    pub round_label: String,
    /// One cell per formation slot in column order; empty for an unfilled slot.
    pub names: Vec<String>,
    /// Team value; not stored.
    pub total: Price,
    /// (winner, score) per fixture, empty when predictions are off.
    pub predictions: Vec<(String, String)>,
}

impl SubmissionRecord {
    /// Cells in store column order.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(3 + self.names.len() + 2 * self.predictions.len());
        row.push(self.id.to_string());
        row.push(self.user.clone());
        row.push(self.round_label.clone());
        row.extend(self.names.iter().cloned());
        for (winner, score) in &self.predictions {
            row.push(winner.clone());
            row.push(score.clone());
        }
        row
    }
}

/// Validate a lineup and build its record without touching any store.
pub fn prepare(
    entry: &LineupEntry,
    ctx: &SubmissionContext<'_>,
) -> Result<SubmissionRecord, SubmitError> {
    let mut builder = RosterBuilder::new(entry.formation);
    builder.fill_from(&entry.roster)?;
    builder.check_offered(ctx.catalog, ctx.codec)?;
    let selection = builder.build();

    let validated = validate::validate_submission(
        &entry.user,
        &selection,
        &entry.predictions,
        ctx.codec,
        &ctx.rules,
    )?;

    let predictions = match ctx.rules.predictions {
        Some(set) => entry
            .predictions
            .iter()
            .take(set.fixtures.len())
            .map(|p| (p.winner.trim().to_string(), p.score()))
            .collect(),
        None => Vec::new(),
    };

    Ok(SubmissionRecord {
        id: SubmissionId::generate(),
        user: validated.user,
        round_label: ctx.round_label.to_string(),
        names: validated.names,
        total: validated.total,
        predictions,
    })
}

/// Validate a lineup and append it to the store.
///
/// Exactly one append happens on success and none on any rejection.
pub fn submit(
    store: &dyn SubmissionStore,
    entry: &LineupEntry,
    ctx: &SubmissionContext<'_>,
) -> Result<SubmissionRecord, SubmitError> {
    let record = match prepare(entry, ctx) {
        Ok(record) => record,
        Err(e) => {
            info!("lineup from '{}' rejected: {}", entry.user.trim(), e);
            return Err(e);
        }
    };

    if let Err(source) = store.append(&record.to_row()) {
        warn!("store write failed for {}: {}", record.id, source);
        return Err(SubmitError::StoreWriteFailed {
            id: record.id,
            source,
        });
    }

    info!(
        "lineup {} from '{}' stored for round {} (value {})",
        record.id, record.user, record.round_label, record.total
    );
    Ok(record)
}
