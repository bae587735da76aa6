// Formation rules: slot counts and pitch coordinates per formation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::Position;

/// A point on the 6x8 pitch, goal line at y = 0.
pub type Coord = (f32, f32);

const GOALKEEPER: &[Coord] = &[(3.0, 1.2)];

/// The closed set of supported formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    #[serde(rename = "1-3-2-1")]
    ThreeTwoOne,
    #[serde(rename = "1-2-3-1")]
    TwoThreeOne,
    #[serde(rename = "1-2-2-2")]
    TwoTwoTwo,
}

impl Formation {
    pub const ALL: [Formation; 3] = [
        Formation::ThreeTwoOne,
        Formation::TwoThreeOne,
        Formation::TwoTwoTwo,
    ];

    /// Parse a formation id such as "1-3-2-1".
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id.trim())
    }

    pub fn id(&self) -> &'static str {
        match self {
            Formation::ThreeTwoOne => "1-3-2-1",
            Formation::TwoThreeOne => "1-2-3-1",
            Formation::TwoTwoTwo => "1-2-2-2",
        }
    }

    /// Number of players required at a position.
    pub fn slot_count(&self, position: Position) -> usize {
        self.layout(position).len()
    }

    /// Total number of slots, which is also the number of name columns in
    /// a stored row when every slot is filled.
    pub fn total_slots(&self) -> usize {
        Position::ALL.iter().map(|&p| self.slot_count(p)).sum()
    }

    /// Ordered pitch coordinates for a position. Coordinate `i` belongs to
    /// the `i`-th selection at that position.
    pub fn layout(&self, position: Position) -> &'static [Coord] {
        match (self, position) {
            (_, Position::Goalkeeper) => GOALKEEPER,
            (Formation::ThreeTwoOne, Position::Defender) => &[(1.5, 2.8), (3.0, 2.5), (4.5, 2.8)],
            (Formation::ThreeTwoOne, Position::Midfielder) => &[(2.0, 4.0), (4.0, 4.0)],
            (Formation::ThreeTwoOne, Position::Forward) => &[(3.0, 6.0)],
            (Formation::TwoThreeOne, Position::Defender) => &[(2.2, 2.5), (3.8, 2.5)],
            (Formation::TwoThreeOne, Position::Midfielder) => &[(1.5, 4.3), (3.0, 4.0), (4.5, 4.3)],
            (Formation::TwoThreeOne, Position::Forward) => &[(3.0, 6.0)],
            (Formation::TwoTwoTwo, Position::Defender) => &[(2.2, 2.5), (3.8, 2.5)],
            (Formation::TwoTwoTwo, Position::Midfielder) => &[(2.0, 4.0), (4.0, 4.0)],
            (Formation::TwoTwoTwo, Position::Forward) => &[(1.9, 6.0), (4.1, 6.0)],
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
