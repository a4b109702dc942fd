//! Opening hands: shuffling, dealing seven, and the play/draw coin flip
//!
//! Supports controlled hands for testing scenarios: the named cards are
//! pulled out of the deck first and the rest is shuffled underneath.

use crate::core::Card;
use crate::loader::DeckList;
use crate::{Result, SequencerError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const OPENING_HAND_SIZE: usize = 7;

/// The search input: a hand, a library in draw order, and who goes first
///
/// This is also the request payload accepted from outside callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHand {
    pub hand: Vec<String>,
    pub library: Vec<String>,
    pub on_the_play: bool,
}

impl OpeningHand {
    /// Shuffle the whole deck, take seven, flip for play/draw
    pub fn deal<R: Rng + ?Sized>(deck: &DeckList, rng: &mut R) -> Self {
        let mut cards = deck.cards();
        cards.shuffle(rng);
        let split = OPENING_HAND_SIZE.min(cards.len());
        let library = cards.split_off(split);
        OpeningHand {
            hand: cards.iter().map(|c| c.name().to_string()).collect(),
            library: library.iter().map(|c| c.name().to_string()).collect(),
            on_the_play: rng.gen_bool(0.5),
        }
    }

    /// Deal with specific cards forced into hand, topping up to seven at random
    pub fn deal_with<R: Rng + ?Sized>(deck: &DeckList, setup: &HandSetup, rng: &mut R) -> Result<Self> {
        let mut remaining = deck.cards();
        let mut hand = Vec::with_capacity(OPENING_HAND_SIZE);

        for card in &setup.cards {
            let pos = remaining.iter().position(|c| c == card).ok_or_else(|| {
                SequencerError::InvalidOpeningHand(format!("not enough copies of {card} in the deck"))
            })?;
            hand.push(remaining.swap_remove(pos));
        }

        remaining.shuffle(rng);
        let top_up = OPENING_HAND_SIZE.saturating_sub(hand.len()).min(remaining.len());
        hand.extend(remaining.drain(..top_up));

        Ok(OpeningHand {
            hand: hand.iter().map(|c| c.name().to_string()).collect(),
            library: remaining.iter().map(|c| c.name().to_string()).collect(),
            on_the_play: rng.gen_bool(0.5),
        })
    }

    /// Same hand and play order, library shuffled again
    ///
    /// Whoever submitted the hand has seen the library order; searching a
    /// fresh shuffle keeps the line honest.
    pub fn reshuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.library.shuffle(rng);
        self
    }

    pub fn hand_cards(&self) -> Vec<Card> {
        self.hand.iter().map(Card::new).collect()
    }

    pub fn library_cards(&self) -> Vec<Card> {
        self.library.iter().map(Card::new).collect()
    }
}

/// Specific cards to place in the opening hand
#[derive(Debug, Clone)]
pub struct HandSetup {
    pub cards: Vec<Card>,
}

impl HandSetup {
    /// Parse semicolon-separated card names, e.g. "Forest;Amulet of Vigor"
    pub fn parse(input: &str) -> Result<Self> {
        let cards: Vec<Card> = input
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Card::new)
            .collect();

        if cards.is_empty() {
            return Err(SequencerError::InvalidOpeningHand(
                "Hand setup must contain at least one card".to_string(),
            ));
        }

        if cards.len() > OPENING_HAND_SIZE {
            return Err(SequencerError::InvalidOpeningHand(format!(
                "Hand setup cannot contain more than {OPENING_HAND_SIZE} cards (got {})",
                cards.len()
            )));
        }

        Ok(HandSetup { cards })
    }
}
