//! Bulk statistics: search many seeded deals in parallel
//!
//! Each game gets its own RNG derived from the batch seed and the game
//! index, so a batch is reproducible no matter how rayon schedules it.

use crate::game::{MiniReport, SearchLogger, Sequencer, VerbosityLevel};
use crate::loader::{DeckList, OpeningHand};
use crate::Result;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-game seed: batch seed plus a golden-ratio stride per game
pub fn game_seed(seed: u64, game: usize) -> u64 {
    seed.wrapping_add((game as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Deal and search `games` hands, one `MiniReport` per game in game order
///
/// Searches run silently; `progress` controls the batch's own output. Every
/// card in the deck is validated once up front.
pub fn run_batch(
    sequencer: &Sequencer,
    deck: &DeckList,
    games: usize,
    seed: u64,
    progress: VerbosityLevel,
) -> Result<Vec<MiniReport>> {
    let cards = deck.unique_cards();
    sequencer.catalog().ensure_known(&cards)?;
    sequencer.rules().ensure_covers(sequencer.catalog(), &cards)?;

    // Parallelism is across games here, not inside one search
    let config = sequencer
        .config()
        .clone()
        .with_verbosity(VerbosityLevel::Silent)
        .with_parallel(false);
    let logger = SearchLogger::new(progress);
    let completed = AtomicUsize::new(0);

    (0..games)
        .into_par_iter()
        .map(|game| -> Result<MiniReport> {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(game_seed(seed, game));
            let opening = OpeningHand::deal(deck, &mut rng);
            let report = sequencer.search_with(&opening, &config)?.mini_report();

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 100 == 0 {
                logger.normal(format_args!("completed {done} games"));
            }
            Ok(report)
        })
        .collect()
}

/// How often each win turn came up; -1 counts games with no line
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnDistribution {
    pub games: usize,
    pub by_turn: BTreeMap<i32, usize>,
}

impl TurnDistribution {
    fn record(&mut self, turn: i32) {
        self.games += 1;
        *self.by_turn.entry(turn).or_insert(0) += 1;
    }

    pub fn count(&self, turn: i32) -> usize {
        self.by_turn.get(&turn).copied().unwrap_or(0)
    }

    pub fn wins(&self) -> usize {
        self.games - self.count(-1)
    }

    /// Average winning turn over the games that found a line
    pub fn mean_turn(&self) -> Option<f64> {
        let wins = self.wins();
        if wins == 0 {
            return None;
        }
        let total: i64 = self
            .by_turn
            .iter()
            .filter(|&(&turn, _)| turn >= 0)
            .map(|(&turn, &n)| turn as i64 * n as i64)
            .sum();
        Some(total as f64 / wins as f64)
    }

    fn render(&self, title: &str, out: &mut String) {
        let _ = writeln!(out, "=== {title} ({} games) ===", self.games);
        if self.games == 0 {
            return;
        }
        let pct = |n: usize| 100.0 * n as f64 / self.games as f64;
        for (&turn, &n) in self.by_turn.iter().filter(|&(&turn, _)| turn >= 0) {
            let _ = writeln!(out, "  turn {turn}: {n} ({:.1}%)", pct(n));
        }
        let misses = self.count(-1);
        if misses > 0 {
            let _ = writeln!(out, "  no line: {misses} ({:.1}%)", pct(misses));
        }
        if let Some(mean) = self.mean_turn() {
            let _ = writeln!(out, "  mean turn: {mean:.2}");
        }
    }
}

/// Win-turn distributions split by play/draw
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub on_the_play: TurnDistribution,
    pub on_the_draw: TurnDistribution,
}

impl BatchSummary {
    pub fn from_reports(reports: &[MiniReport]) -> Self {
        let mut summary = BatchSummary::default();
        for report in reports {
            let bucket = if report.on_the_play {
                &mut summary.on_the_play
            } else {
                &mut summary.on_the_draw
            };
            bucket.record(report.turn);
        }
        summary
    }

    pub fn games(&self) -> usize {
        self.on_the_play.games + self.on_the_draw.games
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.on_the_play.render("On the play", &mut out);
        out.push('\n');
        self.on_the_draw.render("On the draw", &mut out);
        out
    }
}
