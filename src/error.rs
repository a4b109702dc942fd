//! Error types for the sequencer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("No card data for: {0}")]
    UnknownCard(String),

    #[error("No rules registered for: {0}")]
    MissingRules(String),

    #[error("Failed to parse mana cost: {0}")]
    InvalidManaCost(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Invalid opening hand: {0}")]
    InvalidOpeningHand(String),

    #[error("Called next turn on an empty frontier (turn {0})")]
    EmptyFrontier(u32),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SequencerError>;
