//! Profiling binary for the search
//!
//! Runs seeded deals in a tight loop on one thread for profiling with
//! cargo-flamegraph. Unlike the Criterion benchmark, this has minimal
//! overhead and produces cleaner flamegraphs.
//!
//! Usage:
//!   cargo flamegraph --bin profile

use mtg_sequencer::{
    game::{SearchConfig, Sequencer, VerbosityLevel},
    loader::{DeckLoader, OpeningHand},
    stats::game_seed,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn main() {
    let config = SearchConfig::default().with_verbosity(VerbosityLevel::Silent);
    let sequencer = Sequencer::standard(config).expect("Failed to load card catalog");
    let deck = DeckLoader::builtin().expect("Failed to load deck");

    // Allow overriding iterations via environment variable
    let iterations = std::env::var("PROFILE_ITERATIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(200);

    println!("Profiling search...");
    println!("Running {iterations} games with seed 42");
    println!();

    let start = std::time::Instant::now();
    let mut wins = 0;
    for i in 0..iterations {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(game_seed(42, i));
        let opening = OpeningHand::deal(&deck, &mut rng);
        let outcome = sequencer.search(&opening).expect("Search failed");
        if outcome.is_success() {
            wins += 1;
        }
    }
    let elapsed = start.elapsed();

    println!("Completed {iterations} games in {:.2}s", elapsed.as_secs_f64());
    println!("Lines found: {wins}/{iterations}");
}
