//! Card catalog for looking up card attributes
//!
//! A read-only, name-keyed table loaded once at startup and passed to the
//! search explicitly. The card pool is closed: every name that reaches the
//! engine must be checked with [`CardCatalog::ensure_known`] first.

use crate::core::{Card, CardData};
use crate::{Result, SequencerError};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Catalog shipped with the crate, covering the Amulet Titan card pool
const BUILTIN_CARDS: &str = include_str!("../../data/cards.json");

/// Database of card attributes keyed by card name
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: FxHashMap<Card, CardData>,
}

impl CardCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        CardCatalog {
            cards: FxHashMap::default(),
        }
    }

    /// The built-in catalog
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CARDS)
    }

    /// Parse a JSON array of card entries
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CardData> = serde_json::from_str(json)?;
        let mut catalog = CardCatalog::new();
        for data in entries {
            catalog.add_card(data);
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add a single card entry, replacing any entry with the same name
    pub fn add_card(&mut self, data: CardData) {
        self.cards.insert(Card::new(&data.name), data);
    }

    /// Look up a card
    pub fn get(&self, card: &Card) -> Option<&CardData> {
        self.cards.get(card)
    }

    /// Look up a card that is known to be in the pool
    ///
    /// # Panics
    ///
    /// Panics on an unknown name. Names are validated with
    /// [`ensure_known`](Self::ensure_known) before any search starts.
    pub fn data(&self, card: &Card) -> &CardData {
        match self.cards.get(card) {
            Some(data) => data,
            None => panic!("no card data for: {card}"),
        }
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains_key(card)
    }

    /// Fail on the first name that isn't in the catalog
    pub fn ensure_known<'a>(&self, cards: impl IntoIterator<Item = &'a Card>) -> Result<()> {
        for card in cards {
            if !self.contains(card) {
                return Err(SequencerError::UnknownCard(card.to_string()));
            }
        }
        Ok(())
    }

    /// All cards in the catalog, in name order
    pub fn cards(&self) -> Vec<&Card> {
        let mut cards: Vec<&Card> = self.cards.keys().collect();
        cards.sort();
        cards
    }

    /// Total number of cards in the catalog
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
