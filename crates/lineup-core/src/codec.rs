// Display label encoding and decoding.
//
// A label such as "Ramón, Inter Maccabi. (110,00€)" is what the user picks
// from, and once picked it is the only carrier of the player's identity and
// price. Two strategies exist:
//
// - lookup: price shown with two decimals, recovered by looking the cleaned
//   name up in a table built from the catalog
// - inline: whole-euro price embedded in the label, recovered by pattern match

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::player::{PlayerRecord, Price};

static INLINE_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)€\)").expect("inline price pattern is valid"));

const ACCENT_TABLE: [(char, char); 10] = [
    ('á', 'a'),
    ('Á', 'A'),
    ('é', 'e'),
    ('É', 'E'),
    ('í', 'i'),
    ('Í', 'I'),
    ('ó', 'o'),
    ('Ó', 'O'),
    ('ú', 'u'),
    ('Ú', 'U'),
];

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("players '{first}' and '{second}' both clean to '{cleaned}'; price lookup would be ambiguous")]
    AmbiguousName {
        cleaned: String,
        first: String,
        second: String,
    },
}

/// Name and price recovered from a label. Both empty/zero for a blank label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedLabel {
    pub name: String,
    pub price: Price,
}

impl DecodedLabel {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Converts players to display labels and back.
pub trait LabelCodec {
    fn encode(&self, player: &PlayerRecord) -> String;

    /// Never fails: unexpected shapes degrade to an empty name or zero price.
    fn decode(&self, label: &str) -> DecodedLabel;
}

/// Which codec strategy to use, as written in league.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    Lookup,
    Inline,
}

/// Build the configured codec for a catalog.
pub fn build(kind: CodecKind, catalog: &Catalog) -> Result<Box<dyn LabelCodec>, CodecError> {
    match kind {
        CodecKind::Lookup => Ok(Box::new(LookupCodec::new(catalog)?)),
        CodecKind::Inline => Ok(Box::new(InlineCodec)),
    }
}

/// Take the text before the first comma, trim it and strip Spanish accents.
pub fn clean_name(text: &str) -> String {
    let head = text.split(',').next().unwrap_or("").trim();
    strip_accents(head)
}

/// Replace accented vowels with their unaccented forms. Other characters
/// (ñ, ü, ...) are left untouched.
pub fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| {
            ACCENT_TABLE
                .iter()
                .find(|(accented, _)| *accented == c)
                .map_or(c, |(_, plain)| *plain)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lookup strategy
// ---------------------------------------------------------------------------

/// Label carries a formatted price for display only; the authoritative
/// price comes from a cleaned-name table built once from the catalog.
#[derive(Debug, Clone)]
pub struct LookupCodec {
    prices: HashMap<String, Price>,
}

impl LookupCodec {
    /// Build the price table. Fails if two catalog names collide after
    /// accent stripping, since a label could then not say which one it means.
    pub fn new(catalog: &Catalog) -> Result<Self, CodecError> {
        let mut prices = HashMap::new();
        let mut owners: HashMap<String, &str> = HashMap::new();

        for player in catalog.players() {
            let cleaned = clean_name(&player.name);
            if let Some(first) = owners.get(&cleaned) {
                return Err(CodecError::AmbiguousName {
                    cleaned,
                    first: first.to_string(),
                    second: player.name.clone(),
                });
            }
            owners.insert(cleaned.clone(), &player.name);
            prices.insert(cleaned, player.price);
        }

        Ok(Self { prices })
    }

    pub fn price_of(&self, cleaned_name: &str) -> Option<Price> {
        self.prices.get(cleaned_name).copied()
    }
}

impl LabelCodec for LookupCodec {
    fn encode(&self, player: &PlayerRecord) -> String {
        format!(
            "{}, {}. ({}€)",
            player.name.trim(),
            player.team.trim(),
            player.price.to_eu_string()
        )
    }

    fn decode(&self, label: &str) -> DecodedLabel {
        if label.trim().is_empty() {
            return DecodedLabel::default();
        }
        let name = clean_name(label);
        let price = self.price_of(&name).unwrap_or(Price::ZERO);
        DecodedLabel { name, price }
    }
}

// ---------------------------------------------------------------------------
// Inline strategy
// ---------------------------------------------------------------------------

/// Label embeds a whole-euro price, e.g. "Pablo, Armando CF. (150€)".
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCodec;

impl InlineCodec {
    /// Extract the price marker. A label without one, or with an amount too
    /// large to represent, costs nothing.
    pub fn extract_price(label: &str) -> Price {
        INLINE_PRICE
            .captures(label)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .and_then(Price::checked_from_euros)
            .unwrap_or(Price::ZERO)
    }
}

impl LabelCodec for InlineCodec {
    fn encode(&self, player: &PlayerRecord) -> String {
        format!(
            "{}, {}. ({}€)",
            player.name.trim(),
            player.team.trim(),
            player.price.whole_euros()
        )
    }

    fn decode(&self, label: &str) -> DecodedLabel {
        if label.trim().is_empty() {
            return DecodedLabel::default();
        }
        DecodedLabel {
            name: clean_name(label),
            price: Self::extract_price(label),
        }
    }
}
