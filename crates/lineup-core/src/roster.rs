// Roster construction: one label per formation slot.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::codec::LabelCodec;
use crate::formation::{Coord, Formation};
use crate::player::Position;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("{position} has {actual} picks but formation {formation} allows {allowed}")]
    TooManyPicks {
        formation: Formation,
        position: Position,
        allowed: usize,
        actual: usize,
    },

    #[error("{slot}: '{label}' is not one of the players offered for that position")]
    NotOffered { slot: Slot, label: String },
}

/// The labels chosen for one lineup, in pitch order within each position.
///
/// An empty string means the slot was left without a pick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSelection {
    #[serde(default)]
    pub goalkeeper: String,
    #[serde(default)]
    pub defenders: Vec<String>,
    #[serde(default)]
    pub midfielders: Vec<String>,
    #[serde(default)]
    pub forwards: Vec<String>,
}

impl RosterSelection {
    /// Labels chosen for one position, in selection order.
    pub fn labels_at(&self, position: Position) -> &[String] {
        match position {
            Position::Goalkeeper => std::slice::from_ref(&self.goalkeeper),
            Position::Defender => &self.defenders,
            Position::Midfielder => &self.midfielders,
            Position::Forward => &self.forwards,
        }
    }

    /// Every label in store column order: goalkeeper, defenders,
    /// midfielders, forwards. Includes empty slots.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        Position::ALL
            .into_iter()
            .flat_map(move |p| self.labels_at(p).iter().map(String::as_str))
    }

    /// Labels of the slots that actually hold a pick.
    pub fn filled_labels(&self) -> impl Iterator<Item = &str> {
        self.labels().filter(|l| !l.trim().is_empty())
    }

    pub fn filled_count(&self) -> usize {
        self.filled_labels().count()
    }

    /// Pair each filled pick with its pitch coordinate.
    pub fn placements(&self, formation: Formation) -> Vec<Placement<'_>> {
        let mut placements = Vec::new();
        for position in Position::ALL {
            let coords = formation.layout(position);
            for (coord, label) in coords.iter().zip(self.labels_at(position)) {
                if label.trim().is_empty() {
                    continue;
                }
                placements.push(Placement {
                    position,
                    coord: *coord,
                    label,
                });
            }
        }
        placements
    }
}

/// A pick placed on the pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub position: Position,
    pub coord: Coord,
    pub label: &'a str,
}

/// One slot of a formation, e.g. the second defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub position: Position,
    /// Zero-based index within the position.
    pub index: usize,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.position, self.index + 1)
    }
}

/// Labels a user may pick for a position, in catalog order.
pub fn choices(catalog: &Catalog, codec: &dyn LabelCodec, position: Position) -> Vec<String> {
    catalog
        .by_position(position)
        .map(|p| codec.encode(p))
        .collect()
}

/// Collects one choice per formation slot.
///
/// Choices are independent: the same label may be placed in several slots.
/// Catching that is the validator's job.
#[derive(Debug, Clone)]
pub struct RosterBuilder {
    formation: Formation,
    slots: Vec<Slot>,
    picks: Vec<Option<String>>,
}

impl RosterBuilder {
    pub fn new(formation: Formation) -> Self {
        let slots: Vec<Slot> = Position::ALL
            .into_iter()
            .flat_map(|position| {
                (0..formation.slot_count(position)).map(move |index| Slot { position, index })
            })
            .collect();
        let picks = vec![None; slots.len()];
        Self {
            formation,
            slots,
            picks,
        }
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    /// Slots in fill order: goalkeeper, defenders, midfielders, forwards.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Place a label in a slot. Returns `false` if the formation has no such
    /// slot. A blank label clears the slot.
    pub fn choose(&mut self, slot: Slot, label: &str) -> bool {
        let Some(idx) = self.slots.iter().position(|s| *s == slot) else {
            return false;
        };
        self.picks[idx] = if label.trim().is_empty() {
            None
        } else {
            Some(label.to_string())
        };
        true
    }

    /// Copy picks from an existing selection, e.g. one read from a lineup
    /// file. Missing picks stay empty; extra picks are an error.
    pub fn fill_from(&mut self, selection: &RosterSelection) -> Result<(), RosterError> {
        for position in Position::ALL {
            let labels = selection.labels_at(position);
            let allowed = self.formation.slot_count(position);
            if labels.len() > allowed {
                return Err(RosterError::TooManyPicks {
                    formation: self.formation,
                    position,
                    allowed,
                    actual: labels.len(),
                });
            }
            for (index, label) in labels.iter().enumerate() {
                self.choose(Slot { position, index }, label);
            }
        }
        Ok(())
    }

    /// Reject any pick that is not one of the labels `choices` offers for
    /// its slot's position.
    pub fn check_offered(&self, catalog: &Catalog, codec: &dyn LabelCodec) -> Result<(), RosterError> {
        let mut offered: HashMap<Position, HashSet<String>> = HashMap::new();
        for (slot, pick) in self.slots.iter().zip(&self.picks) {
            let Some(label) = pick else {
                continue;
            };
            let labels = offered
                .entry(slot.position)
                .or_insert_with(|| choices(catalog, codec, slot.position).into_iter().collect());
            if !labels.contains(label.trim()) {
                return Err(RosterError::NotOffered {
                    slot: *slot,
                    label: label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Produce the selection with exactly the formation's slot counts.
    pub fn build(&self) -> RosterSelection {
        let mut selection = RosterSelection::default();
        for (slot, pick) in self.slots.iter().zip(&self.picks) {
            let label = pick.clone().unwrap_or_default();
            match slot.position {
                Position::Goalkeeper => selection.goalkeeper = label,
                Position::Defender => selection.defenders.push(label),
                Position::Midfielder => selection.midfielders.push(label),
                Position::Forward => selection.forwards.push(label),
            }
        }
        selection
    }
}
