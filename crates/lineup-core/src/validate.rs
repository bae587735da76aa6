// Budget and integrity checks run at submission time.
//
// Checks run in a fixed order and the first failure wins:
// identity, duplicate players, predictions (when enabled), budget.
// Nothing here touches the store.

use std::collections::HashSet;

use crate::codec::{DecodedLabel, LabelCodec};
use crate::player::Price;
use crate::prediction::{PredictionEntry, PredictionSet};
use crate::roster::RosterSelection;

/// A user-recoverable reason to reject a lineup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a user name is required")]
    IdentityMissing,

    #[error("player '{name}' is picked more than once")]
    DuplicatePlayer { name: String },

    #[error("{fixture}: picked '{declared}' but the entered score means '{expected}'")]
    PredictionMismatch {
        fixture: String,
        declared: String,
        expected: String,
    },

    #[error("team costs {total} which is over the {cap} budget")]
    BudgetExceeded { total: Price, cap: Price },
}

/// Limits a lineup is checked against.
#[derive(Debug, Clone, Copy)]
pub struct Rules<'a> {
    pub budget_cap: Price,
    /// `None` when the round has no prediction prompts.
    pub predictions: Option<&'a PredictionSet>,
}

/// A lineup that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLineup {
    pub user: String,
    /// Cleaned name per slot in column order; empty for an unfilled slot.
    pub names: Vec<String>,
    pub total: Price,
}

/// Spent vs. cap, for showing the running total while picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetStatus {
    pub spent: Price,
    pub cap: Price,
}

impl BudgetStatus {
    pub fn is_over(&self) -> bool {
        self.spent > self.cap
    }
}

/// Decode every slot of a selection in column order. A blank slot decodes
/// to an empty name and zero price.
pub fn decode_slots(selection: &RosterSelection, codec: &dyn LabelCodec) -> Vec<DecodedLabel> {
    selection.labels().map(|label| codec.decode(label)).collect()
}

/// Current team value against the cap.
pub fn budget_status(selection: &RosterSelection, codec: &dyn LabelCodec, cap: Price) -> BudgetStatus {
    let spent = decode_slots(selection, codec).iter().map(|d| d.price).sum();
    BudgetStatus { spent, cap }
}

pub fn check_identity(user: &str) -> Result<(), ValidationError> {
    if user.trim().is_empty() {
        return Err(ValidationError::IdentityMissing);
    }
    Ok(())
}

/// Reject the first cleaned name that appears twice. Slots without a name
/// are not compared.
pub fn check_duplicates(decoded: &[DecodedLabel]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for d in decoded.iter().filter(|d| !d.is_empty()) {
        if !seen.insert(d.name.as_str()) {
            return Err(ValidationError::DuplicatePlayer {
                name: d.name.clone(),
            });
        }
    }
    Ok(())
}

/// Total must not exceed the cap; equal to the cap is fine. Every decoded
/// price counts, including one whose label carries no name.
pub fn check_budget(decoded: &[DecodedLabel], cap: Price) -> Result<Price, ValidationError> {
    let total: Price = decoded.iter().map(|d| d.price).sum();
    if total > cap {
        return Err(ValidationError::BudgetExceeded { total, cap });
    }
    Ok(total)
}

/// Run every check in order against a lineup.
///
/// Empty slots are treated as "no pick": they take part in neither the
/// duplicate check nor the budget sum.
pub fn validate_submission(
    user: &str,
    selection: &RosterSelection,
    predictions: &[PredictionEntry],
    codec: &dyn LabelCodec,
    rules: &Rules<'_>,
) -> Result<ValidatedLineup, ValidationError> {
    check_identity(user)?;

    let decoded = decode_slots(selection, codec);
    check_duplicates(&decoded)?;

    if let Some(set) = rules.predictions {
        set.check(predictions)?;
    }

    let total = check_budget(&decoded, rules.budget_cap)?;

    Ok(ValidatedLineup {
        user: user.trim().to_string(),
        names: decoded.into_iter().map(|d| d.name).collect(),
        total,
    })
}
