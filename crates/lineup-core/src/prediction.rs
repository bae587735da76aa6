// Score predictions for the round's two fixtures.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validate::ValidationError;

/// Goals entered for one side. "+" means six or more and orders above 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GoalCount {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    SixOrMore,
}

impl GoalCount {
    /// Entry choices in display order.
    pub const ALL: [GoalCount; 7] = [
        GoalCount::Zero,
        GoalCount::One,
        GoalCount::Two,
        GoalCount::Three,
        GoalCount::Four,
        GoalCount::Five,
        GoalCount::SixOrMore,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "0" => Some(GoalCount::Zero),
            "1" => Some(GoalCount::One),
            "2" => Some(GoalCount::Two),
            "3" => Some(GoalCount::Three),
            "4" => Some(GoalCount::Four),
            "5" => Some(GoalCount::Five),
            "+" => Some(GoalCount::SixOrMore),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCount::Zero => "0",
            GoalCount::One => "1",
            GoalCount::Two => "2",
            GoalCount::Three => "3",
            GoalCount::Four => "4",
            GoalCount::Five => "5",
            GoalCount::SixOrMore => "+",
        }
    }
}

impl fmt::Display for GoalCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Written as the entry strings ("0".."5", "+") so lineup files read naturally.
impl Serialize for GoalCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GoalCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        GoalCount::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid goal count '{s}', expected 0-5 or '+'"))
        })
    }
}

/// Result of a match from the home side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

impl Outcome {
    /// The outcome implied by a scoreline.
    pub fn from_score(home: GoalCount, away: GoalCount) -> Self {
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Less => Outcome::Away,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// One fixture of the round, with display names already resolved.
///
/// `key` is the configuration handle for the rival (e.g. "Nimi_rival");
/// it is never shown to the user and never matches a winner pick.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fixture {
    pub key: String,
    pub home: String,
    pub away: String,
}

impl Fixture {
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }

    /// Display name for an outcome.
    pub fn outcome_name<'a>(&'a self, outcome: Outcome, draw_label: &'a str) -> &'a str {
        match outcome {
            Outcome::Home => &self.home,
            Outcome::Away => &self.away,
            Outcome::Draw => draw_label,
        }
    }

    /// The winner choices offered to the user.
    pub fn winner_choices<'a>(&'a self, draw_label: &'a str) -> [&'a str; 3] {
        [&self.home, &self.away, draw_label]
    }

    /// Map a picked display name back to an outcome.
    pub fn resolve_winner(&self, name: &str, draw_label: &str) -> Option<Outcome> {
        let name = name.trim();
        [Outcome::Home, Outcome::Away, Outcome::Draw]
            .into_iter()
            .find(|&o| self.outcome_name(o, draw_label) == name)
    }
}

/// What the user entered for one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionEntry {
    /// Display name of the picked winner, or the draw label.
    pub winner: String,
    pub home_goals: GoalCount,
    pub away_goals: GoalCount,
}

impl PredictionEntry {
    /// Scoreline as stored: "2-1", "+-0".
    pub fn score(&self) -> String {
        format!("{}-{}", self.home_goals, self.away_goals)
    }
}

/// The prediction prompts of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionSet {
    pub draw_label: String,
    pub fixtures: Vec<Fixture>,
}

impl PredictionSet {
    /// Check every fixture's entry. The picked winner must be one of the
    /// fixture's resolved names and agree with the entered goals.
    pub fn check(&self, entries: &[PredictionEntry]) -> Result<(), ValidationError> {
        for (idx, fixture) in self.fixtures.iter().enumerate() {
            let Some(entry) = entries.get(idx) else {
                return Err(ValidationError::PredictionMismatch {
                    fixture: fixture.title(),
                    declared: String::new(),
                    expected: "a prediction".into(),
                });
            };
            let expected = Outcome::from_score(entry.home_goals, entry.away_goals);
            let declared = fixture.resolve_winner(&entry.winner, &self.draw_label);
            if declared != Some(expected) {
                return Err(ValidationError::PredictionMismatch {
                    fixture: fixture.title(),
                    declared: entry.winner.clone(),
                    expected: fixture.outcome_name(expected, &self.draw_label).to_string(),
                });
            }
        }
        Ok(())
    }
}
