//! Decklist loader ("COUNT NAME" lines)

use crate::core::Card;
use crate::{Result, SequencerError};
use std::fs;
use std::path::Path;

/// Decklist shipped with the crate
const BUILTIN_DECK: &str = include_str!("../../data/amulet_titan.txt");

/// Deck loader for plain-text decklists
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a decklist file
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The built-in Amulet Titan list
    pub fn builtin() -> Result<DeckList> {
        Self::parse(BUILTIN_DECK)
    }

    /// Parse a deck from its text content
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut entries = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (count_str, name) = line.split_once(' ').ok_or_else(|| {
                SequencerError::InvalidDeckFormat(format!("expected 'COUNT NAME', got '{line}'"))
            })?;
            let count = count_str.parse::<u32>().map_err(|_| {
                SequencerError::InvalidDeckFormat(format!("bad count '{count_str}' in '{line}'"))
            })?;

            entries.push(DeckEntry {
                card: Card::new(name.trim()),
                count,
            });
        }

        if entries.is_empty() {
            return Err(SequencerError::InvalidDeckFormat("Empty deck".to_string()));
        }

        Ok(DeckList { entries })
    }
}

/// A decklist entry (card and count)
#[derive(Debug, Clone)]
pub struct DeckEntry {
    pub card: Card,
    pub count: u32,
}

/// A complete decklist
#[derive(Debug, Clone)]
pub struct DeckList {
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in the deck
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Every copy of every card, in list order
    pub fn cards(&self) -> Vec<Card> {
        self.entries
            .iter()
            .flat_map(|e| std::iter::repeat(e.card.clone()).take(e.count as usize))
            .collect()
    }

    /// Distinct cards in the deck
    pub fn unique_cards(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.entries.iter().map(|e| e.card.clone()).collect();
        cards.sort();
        cards.dedup();
        cards
    }
}
