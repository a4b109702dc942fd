//! Card references and the fixed per-card attributes behind them

use crate::core::Mana;
use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Card types the pool cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Sorcery,
    Instant,
}

/// A reference to a named card
///
/// Identity is the name: two references are equal and hash equal iff they
/// name the same card. Every rules question goes through the
/// [`CardCatalog`](crate::loader::CardCatalog). Cloning only bumps a
/// refcount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card(Arc<str>);

impl Card {
    pub fn new(name: impl AsRef<str>) -> Self {
        Card(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// ASCII name with spaces and punctuation stripped, e.g. "SummonersPact"
    pub fn slug(&self) -> String {
        slug(&self.0)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Card {
    fn from(s: &str) -> Self {
        Card::new(s)
    }
}

impl From<String> for Card {
    fn from(s: String) -> Self {
        Card(Arc::from(s))
    }
}

/// Compact ASCII rendering of a card name
pub fn slug(name: &str) -> String {
    deunicode(name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Fixed attributes of one card, as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub name: String,

    /// Short display form; defaults to the slug of the name
    #[serde(default)]
    pub pretty: Option<String>,

    #[serde(rename = "type")]
    pub card_type: CardType,

    #[serde(default)]
    pub casting_cost: Mana,

    /// Mana added when this permanent is tapped
    #[serde(default)]
    pub taps_for: Mana,

    #[serde(default)]
    pub enters_tapped: bool,

    /// Zero means the card has no activated ability
    #[serde(default)]
    pub activation_cost: Mana,

    /// Lands and colorless artifacts, the targets of Ancient Stirrings
    #[serde(default)]
    pub colorless: bool,

    /// Either the win condition itself or a card that can fetch it
    #[serde(default)]
    pub can_be_titan: bool,

    /// A human never passes with this in hand if it's affordable
    #[serde(default)]
    pub always_cast: bool,

    /// Extra land drops granted each turn while on the battlefield
    #[serde(default)]
    pub extra_land_drops: u32,

    /// Lands that return a land to hand when they enter
    #[serde(default)]
    pub bounce_land: bool,
}

impl CardData {
    pub fn is_land(&self) -> bool {
        self.card_type == CardType::Land
    }

    pub fn is_creature(&self) -> bool {
        self.card_type == CardType::Creature
    }

    pub fn has_ability(&self) -> bool {
        !self.activation_cost.is_zero()
    }

    pub fn pretty(&self) -> String {
        self.pretty.clone().unwrap_or_else(|| slug(&self.name))
    }
}
