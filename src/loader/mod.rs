//! Card catalog, decklist and opening-hand loaders

pub mod database;
pub mod deck;
pub mod hand;

pub use database::CardCatalog;
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use hand::{HandSetup, OpeningHand, OPENING_HAND_SIZE};
