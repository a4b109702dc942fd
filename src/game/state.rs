//! Search state: one possible timeline of the game
//!
//! A `GameState` is a value. Transitions take a state by value (or clone
//! it), change the copy and hand it back; nothing is ever mutated after
//! another state has been derived from it. The zones and the log are `im`
//! persistent structures, so those copies are cheap and siblings share
//! whatever they didn't change.

use crate::core::{Card, Mana};
use crate::game::log::{GameReport, MiniReport, PlayLog};
use crate::loader::{CardCatalog, OpeningHand};
use crate::zones::{CardMultiset, CardSequence};
use crate::Result;
use std::time::{Duration, Instant};

/// Separator between sections of the canonical key; never appears in slugs
const KEY_SEPARATOR: &str = ";";

#[derive(Debug, Clone)]
pub struct GameState {
    pub hand: CardMultiset,
    pub battlefield: CardMultiset,
    /// Library in draw order
    pub library: CardSequence,

    /// Emptied and refilled at the start of every turn
    pub mana_pool: Mana,
    /// Mana owed at the start of the next turn (Summoner's Pact)
    pub mana_debt: Mana,
    /// Land drops left this turn
    pub land_plays: u32,
    /// 0 before the first turn starts
    pub turn: u32,
    pub on_the_play: bool,

    /// The win condition resolved on this line
    pub success: bool,
    /// This line is abandoned; it only passes turns from here on
    pub dead_end: bool,

    pub log: PlayLog,

    /// When the root of this line was created. Clones keep it, so the
    /// timeout measures the whole line rather than a single step.
    pub started: Instant,
}

impl GameState {
    /// The root state of a search, before turn 1
    pub fn new(
        hand: impl IntoIterator<Item = Card>,
        library: impl IntoIterator<Item = Card>,
        on_the_play: bool,
        catalog: &CardCatalog,
    ) -> Self {
        let mut state = GameState {
            hand: hand.into_iter().collect(),
            battlefield: CardMultiset::new(),
            library: library.into_iter().collect(),
            mana_pool: Mana::zero(),
            mana_debt: Mana::zero(),
            land_plays: 0,
            turn: 0,
            on_the_play,
            success: false,
            dead_end: false,
            log: PlayLog::new(),
            started: Instant::now(),
        };
        state.log.text(if on_the_play { "on the play" } else { "on the draw" });
        state.log.text(", opening hand: ");
        let hand = state.hand.clone();
        state.log_cards(&hand, catalog);
        state
    }

    /// Build the root state from a request payload, validating every name
    pub fn from_opening(opening: &OpeningHand, catalog: &CardCatalog) -> Result<Self> {
        let hand = opening.hand_cards();
        let library = opening.library_cards();
        catalog.ensure_known(hand.iter().chain(library.iter()))?;
        Ok(GameState::new(hand, library, opening.on_the_play, catalog))
    }

    /// Success and dead end both stop branching
    pub fn is_terminal(&self) -> bool {
        self.success || self.dead_end
    }

    pub fn timed_out(&self, budget: Duration) -> bool {
        self.started.elapsed() > budget
    }

    /// Key used to deduplicate states within one turn
    ///
    /// Hand and battlefield are order-independent, the library is not. Turn
    /// number and mana debt are left out: the frontier already buckets by
    /// turn, and lines that differ only in debt play out the same.
    pub fn canonical_key(&self) -> String {
        [
            self.hand.pretty(),
            self.battlefield.pretty(),
            self.mana_pool.pretty(),
            self.success.to_string(),
            self.dead_end.to_string(),
            self.land_plays.to_string(),
            self.library.pretty(),
        ]
        .join(KEY_SEPARATOR)
    }

    /// Draw `n` cards (fewer if the library runs out)
    pub fn draw(mut self, n: usize, catalog: &CardCatalog) -> Self {
        let n = n.min(self.library.len());
        let (drawn, library) = self.library.split_after(n);
        self.library = library;
        self.hand = self.hand.plus(drawn.iter());
        self.log.text(", draw ");
        let drawn: CardMultiset = drawn.into_iter().collect();
        self.log_cards(&drawn, catalog);
        self
    }

    /// Flag this line as abandoned, noting it in the log once
    pub fn mark_dead_end(&mut self) {
        if !self.dead_end {
            self.log.line_break();
            self.log.text("giving up!");
            self.dead_end = true;
        }
    }

    pub fn log_card(&mut self, card: &Card, catalog: &CardCatalog) {
        self.log.card(card.name(), catalog.data(card).is_land());
    }

    /// Log a set of cards as "Forest 2*Wastes ..."
    pub fn log_cards(&mut self, cards: &CardMultiset, catalog: &CardCatalog) {
        for (i, (card, n)) in cards.iter().enumerate() {
            if i > 0 {
                self.log.text(" ");
            }
            if n > 1 {
                self.log.text(&format!("{n}*"));
            }
            self.log_card(card, catalog);
        }
    }

    pub fn log_size(&self) -> usize {
        self.log.size()
    }

    /// Full record; the turn is -1 unless the line succeeded
    pub fn report(&self) -> GameReport {
        GameReport {
            turn: self.reported_turn(),
            plays: self.log.tags().cloned().collect(),
        }
    }

    pub fn mini_report(&self) -> MiniReport {
        MiniReport {
            turn: self.reported_turn(),
            on_the_play: self.on_the_play,
        }
    }

    fn reported_turn(&self) -> i32 {
        if self.success {
            self.turn as i32
        } else {
            -1
        }
    }
}
