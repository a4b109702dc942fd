//! Performance benchmarks for the sequencer search
//!
//! Measures a full search from a dealt opening hand, in both expansion
//! modes, plus the cost of a single successor-generation step.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mtg_sequencer::{
    game::{SearchConfig, Sequencer, Transitions, VerbosityLevel},
    loader::{DeckLoader, OpeningHand},
    stats::game_seed,
    GameState,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;

fn deal(seed: u64) -> OpeningHand {
    let deck = DeckLoader::builtin().expect("Failed to load deck");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    OpeningHand::deal(&deck, &mut rng)
}

fn sequencer(parallel: bool) -> Sequencer {
    let config = SearchConfig::default()
        .with_verbosity(VerbosityLevel::Silent)
        .with_parallel(parallel);
    Sequencer::standard(config).expect("Failed to load card catalog")
}

/// Benchmark: whole search, sequential and parallel, over a few deals
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let sequential = sequencer(false);
    let parallel = sequencer(true);

    for game in 0..3 {
        let seed = game_seed(42, game);
        let opening = deal(seed);

        // Warmup run to print what the deal does
        if let Ok(outcome) = sequential.search(&opening) {
            println!(
                "\nDeal {game} (seed {seed}): {} on turn {}",
                if outcome.is_success() { "line found" } else { "gave up" },
                outcome.state().turn
            );
        }

        group.bench_with_input(BenchmarkId::new("sequential", game), &opening, |b, opening| {
            b.iter(|| {
                sequential
                    .search(black_box(opening))
                    .expect("Search should complete")
            });
        });
        group.bench_with_input(BenchmarkId::new("parallel", game), &opening, |b, opening| {
            b.iter(|| {
                parallel
                    .search(black_box(opening))
                    .expect("Search should complete")
            });
        });
    }

    group.finish();
}

/// Benchmark: one expansion step from a mid-game state
fn bench_next_states(c: &mut Criterion) {
    let sequencer = sequencer(false);
    let transitions = Transitions::new(sequencer.catalog(), sequencer.rules(), sequencer.config());

    let opening = deal(7);
    let root = GameState::from_opening(&opening, sequencer.catalog()).expect("Deal should be valid");
    let turn_one = transitions
        .pass_turn(root)
        .pop()
        .expect("Turn 1 should exist");

    c.bench_function("next_states/turn_1", |b| {
        b.iter(|| transitions.next_states(black_box(&turn_one)))
    });
}

criterion_group!(benches, bench_search, bench_next_states);
criterion_main!(benches);
