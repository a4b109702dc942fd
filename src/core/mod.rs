//! Core value types: mana amounts and card references

pub mod card;
pub mod mana;

pub use card::{slug, Card, CardData, CardType};
pub use mana::{InsufficientMana, Mana};
