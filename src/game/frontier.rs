//! Turn-bucketed search frontier and the manager that drives it
//!
//! The manager expands every state of the current turn until that turn is
//! exhausted, collecting states that reached the next turn into a second
//! bucket. A successful line ends the search at once. Past the horizon the
//! manager gives up and keeps the line with the longest log.

use crate::core::Card;
use crate::game::config::SearchConfig;
use crate::game::log::{GameReport, MiniReport};
use crate::game::logger::SearchLogger;
use crate::game::rules::{RulesRegistry, PRIMEVAL_TITAN};
use crate::game::state::GameState;
use crate::game::transitions::Transitions;
use crate::loader::{CardCatalog, OpeningHand};
use crate::{Result, SequencerError};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// States of one turn, deduplicated by canonical key
///
/// Inserting a state whose key is already present replaces the old one;
/// states with equal keys are interchangeable for the search.
#[derive(Debug, Clone)]
pub struct Frontier {
    turn: u32,
    states: FxHashMap<String, GameState>,
}

impl Frontier {
    pub fn new(turn: u32) -> Self {
        Frontier {
            turn,
            states: FxHashMap::default(),
        }
    }

    pub fn singleton(state: GameState) -> Self {
        let mut frontier = Frontier::new(state.turn);
        frontier.insert(state);
        frontier
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn insert(&mut self, state: GameState) {
        self.states.insert(state.canonical_key(), state);
    }

    /// Remove and return an arbitrary state
    pub fn pop(&mut self) -> Option<GameState> {
        let key = self.states.keys().next()?.clone();
        self.states.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    pub fn states(&self) -> impl Iterator<Item = &GameState> {
        self.states.values()
    }

    pub fn drain(&mut self) -> Vec<GameState> {
        self.states.drain().map(|(_, state)| state).collect()
    }
}

/// How a finished search ended
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// A line that resolves the win condition
    Success(GameState),
    /// No line within the horizon; the line that got furthest
    GaveUp(GameState),
}

impl SearchOutcome {
    pub fn state(&self) -> &GameState {
        match self {
            SearchOutcome::Success(state) | SearchOutcome::GaveUp(state) => state,
        }
    }

    pub fn into_state(self) -> GameState {
        match self {
            SearchOutcome::Success(state) | SearchOutcome::GaveUp(state) => state,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SearchOutcome::Success(_))
    }

    pub fn report(&self) -> GameReport {
        self.state().report()
    }

    pub fn mini_report(&self) -> MiniReport {
        self.state().mini_report()
    }
}

/// Drives a search from a root state, one turn per step
pub struct SearchManager<'a> {
    transitions: Transitions<'a>,
    frontier: Frontier,
    finished: bool,
    logger: SearchLogger,
}

impl<'a> SearchManager<'a> {
    pub fn new(transitions: Transitions<'a>, root: GameState) -> Self {
        let logger = SearchLogger::new(transitions.config.verbosity);
        SearchManager {
            transitions,
            frontier: Frontier::singleton(root),
            finished: false,
            logger,
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// A line was found, or the search gave up
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Exhaust the current turn and move on to the next one
    ///
    /// After a success or a give-up the frontier holds exactly one state and
    /// further calls leave it alone.
    pub fn next_turn(&mut self) -> Result<()> {
        if self.frontier.is_empty() {
            return Err(SequencerError::EmptyFrontier(self.frontier.turn()));
        }
        if self.finished {
            return Ok(());
        }
        if self.frontier.turn() > 0 {
            self.logger.normal(format_args!(
                "starting turn {} with {} states",
                self.frontier.turn(),
                self.frontier.len()
            ));
        }

        let mut next = Frontier::new(self.frontier.turn() + 1);
        let found = if self.transitions.config.parallel {
            self.expand_parallel(&mut next)
        } else {
            self.expand_sequential(&mut next)
        };

        if let Some(winner) = found {
            self.frontier = Frontier::singleton(winner);
            self.finished = true;
            return Ok(());
        }

        if next.turn() > self.transitions.config.horizon {
            self.logger.normal(format_args!(
                "giving up on turn {} with {} states",
                next.turn(),
                next.len()
            ));
            let mut best = next
                .drain()
                .into_iter()
                .max_by_key(GameState::log_size)
                .ok_or(SequencerError::EmptyFrontier(next.turn()))?;
            best.mark_dead_end();
            self.frontier = Frontier::singleton(best);
            self.finished = true;
        } else {
            self.frontier = next;
        }
        Ok(())
    }

    fn expand_sequential(&mut self, next: &mut Frontier) -> Option<GameState> {
        while let Some(state) = self.frontier.pop() {
            for successor in self.transitions.next_states(&state) {
                if successor.success {
                    return Some(successor);
                }
                route(successor, &mut self.frontier, next);
            }
        }
        None
    }

    /// Expand the current bucket in waves on the rayon pool
    ///
    /// Each wave takes every state queued so far. Workers check the shared
    /// flag before expanding, so a success cuts the rest of the wave short.
    fn expand_parallel(&mut self, next: &mut Frontier) -> Option<GameState> {
        let found = AtomicBool::new(false);
        let transitions = &self.transitions;

        while !self.frontier.is_empty() {
            let wave = self.frontier.drain();
            let results: Vec<Vec<GameState>> = wave
                .par_iter()
                .map(|state| {
                    if found.load(Ordering::Relaxed) {
                        return Vec::new();
                    }
                    let successors = transitions.next_states(state);
                    if successors.iter().any(|s| s.success) {
                        found.store(true, Ordering::Relaxed);
                    }
                    successors
                })
                .collect();

            for successor in results.into_iter().flatten() {
                if successor.success {
                    return Some(successor);
                }
                route(successor, &mut self.frontier, next);
            }
        }
        None
    }

    /// Run to completion
    pub fn run(mut self) -> Result<SearchOutcome> {
        while !self.finished {
            self.next_turn()?;
        }
        let turn = self.frontier.turn();
        let state = self
            .frontier
            .pop()
            .ok_or(SequencerError::EmptyFrontier(turn))?;

        if state.success {
            self.logger
                .minimal(format_args!("found a line on turn {}", state.turn));
            Ok(SearchOutcome::Success(state))
        } else {
            self.logger
                .minimal(format_args!("no line by turn {}", self.transitions.config.horizon));
            Ok(SearchOutcome::GaveUp(state))
        }
    }
}

/// Same-turn results stay in the current bucket, the rest wait for the next turn
fn route(state: GameState, current: &mut Frontier, next: &mut Frontier) {
    if state.turn == current.turn() {
        current.insert(state);
    } else {
        next.insert(state);
    }
}

/// Entry point: owns the catalog, rules and configuration for a run
pub struct Sequencer {
    catalog: CardCatalog,
    rules: RulesRegistry,
    config: SearchConfig,
}

impl Sequencer {
    pub fn new(catalog: CardCatalog, rules: RulesRegistry, config: SearchConfig) -> Self {
        Sequencer {
            catalog,
            rules,
            config,
        }
    }

    /// Built-in card pool with the standard rules
    pub fn standard(config: SearchConfig) -> Result<Self> {
        Ok(Sequencer::new(CardCatalog::builtin()?, RulesRegistry::standard(), config))
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesRegistry {
        &self.rules
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Validate the opening and set up a manager for it
    ///
    /// Every card must be in the catalog and have rules, so the search
    /// itself never meets an unknown card.
    pub fn manager(&self, opening: &OpeningHand) -> Result<SearchManager<'_>> {
        self.manager_with(opening, &self.config)
    }

    /// Like [`Sequencer::manager`], with a different configuration
    pub fn manager_with<'s>(
        &'s self,
        opening: &OpeningHand,
        config: &'s SearchConfig,
    ) -> Result<SearchManager<'s>> {
        config.validate()?;
        let root = GameState::from_opening(opening, &self.catalog)?;
        let mut cards = opening.hand_cards();
        cards.extend(opening.library_cards());
        self.rules.ensure_covers(&self.catalog, &cards)?;
        self.catalog.ensure_known([&Card::new(PRIMEVAL_TITAN)])?;

        let transitions = Transitions::new(&self.catalog, &self.rules, config);
        Ok(SearchManager::new(transitions, root))
    }

    pub fn search(&self, opening: &OpeningHand) -> Result<SearchOutcome> {
        self.manager(opening)?.run()
    }

    pub fn search_with(&self, opening: &OpeningHand, config: &SearchConfig) -> Result<SearchOutcome> {
        self.manager_with(opening, config)?.run()
    }
}
