//! MTG Sequencer - turn-by-turn search for the fastest winning line
//!
//! Starting from an opening hand and a shuffled library, the engine expands
//! every legal play one decision at a time, deduplicates equivalent states
//! and stops at the first line that resolves Primeval Titan.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod stats;
pub mod zones;

pub use error::{Result, SequencerError};
pub use game::{GameState, SearchConfig, SearchOutcome, Sequencer};
