//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single value card from the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique name identifying the card across the dataset.
    pub name: String,
    /// Longer description shown on demand.
    pub description: String,
}

impl Card {
    /// Convenience constructor used widely in tests.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// One of the three fixed priority categories cards are sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinId {
    /// Highest priority.
    #[serde(rename = "veryImportant")]
    VeryImportant,
    /// Middle priority.
    #[serde(rename = "somewhatImportant")]
    SomewhatImportant,
    /// Lowest priority.
    #[serde(rename = "notImportant")]
    NotImportant,
}

impl BinId {
    /// All bins in display order.
    pub const ALL: [BinId; 3] = [
        BinId::VeryImportant,
        BinId::SomewhatImportant,
        BinId::NotImportant,
    ];

    /// Stable key used in the persisted JSON shape.
    pub fn key(self) -> &'static str {
        match self {
            BinId::VeryImportant => "veryImportant",
            BinId::SomewhatImportant => "somewhatImportant",
            BinId::NotImportant => "notImportant",
        }
    }

    /// User-facing column heading.
    pub fn label(self) -> &'static str {
        match self {
            BinId::VeryImportant => "Very Important",
            BinId::SomewhatImportant => "Somewhat Important",
            BinId::NotImportant => "Not Important",
        }
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordered contents of the three bins, serialized with the original
/// camelCase keys so old save blobs keep loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bins {
    /// Cards sorted as very important, in drop order.
    #[serde(default, rename = "veryImportant")]
    pub very_important: Vec<Card>,
    /// Cards sorted as somewhat important, in drop order.
    #[serde(default, rename = "somewhatImportant")]
    pub somewhat_important: Vec<Card>,
    /// Cards sorted as not important, in drop order.
    #[serde(default, rename = "notImportant")]
    pub not_important: Vec<Card>,
}

impl Bins {
    /// Borrow the cards in the given bin.
    pub fn get(&self, bin: BinId) -> &[Card] {
        match bin {
            BinId::VeryImportant => &self.very_important,
            BinId::SomewhatImportant => &self.somewhat_important,
            BinId::NotImportant => &self.not_important,
        }
    }

    /// Mutably borrow the cards in the given bin.
    pub fn get_mut(&mut self, bin: BinId) -> &mut Vec<Card> {
        match bin {
            BinId::VeryImportant => &mut self.very_important,
            BinId::SomewhatImportant => &mut self.somewhat_important,
            BinId::NotImportant => &mut self.not_important,
        }
    }

    /// Number of cards in the given bin.
    pub fn count(&self, bin: BinId) -> usize {
        self.get(bin).len()
    }

    /// Total number of cards across all bins.
    pub fn total(&self) -> usize {
        BinId::ALL.iter().map(|bin| self.count(*bin)).sum()
    }

    /// Whether any bin holds a card with the given name.
    pub fn contains(&self, name: &str) -> bool {
        BinId::ALL
            .iter()
            .any(|bin| self.get(*bin).iter().any(|card| card.name == name))
    }
}
