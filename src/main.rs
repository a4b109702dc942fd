//! MTG Sequencer - Main Binary
//!
//! Deal Amulet Titan opening hands and search for the fastest line to
//! Primeval Titan.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mtg_sequencer::{
    game::{PruningPolicy, RulesRegistry, SearchConfig, Sequencer, VerbosityLevel},
    loader::{CardCatalog, DeckList, DeckLoader, HandSetup, OpeningHand},
    stats::{run_batch, BatchSummary},
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fs;
use std::path::{Path, PathBuf};

/// Verbosity level for progress output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

/// Output format for a finished search
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable play log
    Text,
    /// Full record as JSON: {turn, plays}
    Json,
    /// Minimal record as JSON: {turn, onThePlay}
    Mini,
}

#[derive(Parser)]
#[command(name = "sequencer")]
#[command(about = "Search an Amulet Titan opening hand for the fastest Primeval Titan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Decklist file ("COUNT NAME" lines); defaults to the built-in list
    #[arg(long, value_name = "DECK_FILE")]
    deck: Option<PathBuf>,

    /// Card catalog JSON; defaults to the built-in catalog
    #[arg(long, value_name = "CARDS_FILE")]
    cards: Option<PathBuf>,

    /// Set random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Verbosity level for progress output (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, default_value = "normal", short = 'v')]
    verbosity: VerbosityArg,
}

/// Options that shape the search
#[derive(Args, Debug, Clone)]
struct SearchArgs {
    /// Last turn to explore before giving up
    #[arg(long, default_value_t = 4)]
    horizon: u32,

    /// Expand each turn's states in parallel
    #[arg(long)]
    parallel: bool,

    /// Also explore passing with an unplayed land or an uncast cantrip in hand
    #[arg(long)]
    no_prune: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deal an opening hand and print it as a search request
    Deal {
        #[command(flatten)]
        common: CommonArgs,

        /// Force specific cards into the hand (semicolon separated)
        #[arg(long, value_name = "CARDS")]
        hand: Option<String>,
    },

    /// Search one opening hand
    Play {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Request JSON ({hand, library, on_the_play}); deals a fresh hand if omitted
        #[arg(long, value_name = "REQUEST_FILE")]
        input: Option<PathBuf>,

        /// Force specific cards into a dealt hand (semicolon separated)
        #[arg(long, value_name = "CARDS", conflicts_with = "input")]
        hand: Option<String>,

        /// Search the request's library in the given order instead of reshuffling it
        #[arg(long, requires = "input")]
        keep_order: bool,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Color-code the text log with ANSI escapes
        #[arg(long)]
        color: bool,
    },

    /// Search many dealt hands and summarise the win turns
    Stats {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deal { common, hand } => run_deal(common, hand),
        Commands::Play {
            common,
            search,
            input,
            hand,
            keep_order,
            format,
            color,
        } => run_play(common, search, input, hand, keep_order, format, color),
        Commands::Stats {
            common,
            search,
            games,
            json,
        } => run_stats(common, search, games, json),
    }
}

/// Use the given seed, or pick one and say which so the run can be repeated
fn resolve_seed(seed: Option<u64>, verbosity: VerbosityLevel) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    if verbosity >= VerbosityLevel::Minimal {
        eprintln!("Using random seed: {seed}");
    }
    seed
}

fn load_deck(path: Option<&Path>) -> Result<DeckList> {
    match path {
        Some(path) => DeckLoader::load_from_file(path)
            .with_context(|| format!("failed to load deck {}", path.display())),
        None => Ok(DeckLoader::builtin()?),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<CardCatalog> {
    match path {
        Some(path) => CardCatalog::load_from_file(path)
            .with_context(|| format!("failed to load card catalog {}", path.display())),
        None => Ok(CardCatalog::builtin()?),
    }
}

fn build_sequencer(common: &CommonArgs, search: &SearchArgs) -> Result<Sequencer> {
    let pruning = if search.no_prune {
        PruningPolicy::none()
    } else {
        PruningPolicy::default()
    };
    let config = SearchConfig::default()
        .with_horizon(search.horizon)
        .with_pruning(pruning)
        .with_parallel(search.parallel)
        .with_verbosity(common.verbosity.into());
    let catalog = load_catalog(common.cards.as_deref())?;
    Ok(Sequencer::new(catalog, RulesRegistry::standard(), config))
}

fn deal(deck: &DeckList, hand: Option<&str>, rng: &mut Xoshiro256PlusPlus) -> Result<OpeningHand> {
    match hand {
        Some(setup) => {
            let setup = HandSetup::parse(setup)?;
            Ok(OpeningHand::deal_with(deck, &setup, rng)?)
        }
        None => Ok(OpeningHand::deal(deck, rng)),
    }
}

fn run_deal(common: CommonArgs, hand: Option<String>) -> Result<()> {
    let verbosity = common.verbosity.into();
    let seed = resolve_seed(common.seed, verbosity);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let deck = load_deck(common.deck.as_deref())?;
    let opening = deal(&deck, hand.as_deref(), &mut rng)?;
    println!("{}", serde_json::to_string_pretty(&opening)?);
    Ok(())
}

fn run_play(
    common: CommonArgs,
    search: SearchArgs,
    input: Option<PathBuf>,
    hand: Option<String>,
    keep_order: bool,
    format: OutputFormat,
    color: bool,
) -> Result<()> {
    let verbosity: VerbosityLevel = common.verbosity.into();
    let sequencer = build_sequencer(&common, &search)?;
    let seed = resolve_seed(common.seed, verbosity);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let opening = match input {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read request {}", path.display()))?;
            let opening: OpeningHand = serde_json::from_str(&content)
                .with_context(|| format!("malformed request {}", path.display()))?;
            if keep_order {
                opening
            } else {
                opening.reshuffled(&mut rng)
            }
        }
        None => {
            let deck = load_deck(common.deck.as_deref())?;
            deal(&deck, hand.as_deref(), &mut rng)?
        }
    };

    let outcome = sequencer.search(&opening)?;
    match format {
        OutputFormat::Text => println!("{}", outcome.report().render(color)),
        OutputFormat::Json => println!("{}", serde_json::to_string(&outcome.report())?),
        OutputFormat::Mini => println!("{}", serde_json::to_string(&outcome.mini_report())?),
    }
    Ok(())
}

fn run_stats(common: CommonArgs, search: SearchArgs, games: usize, json: bool) -> Result<()> {
    let verbosity: VerbosityLevel = common.verbosity.into();
    let sequencer = build_sequencer(&common, &search)?;
    let seed = resolve_seed(common.seed, verbosity);
    let deck = load_deck(common.deck.as_deref())?;

    if verbosity >= VerbosityLevel::Minimal {
        eprintln!("Running {games} games, horizon {}", search.horizon);
    }
    let start = std::time::Instant::now();
    let reports = run_batch(&sequencer, &deck, games, seed, verbosity)?;
    let elapsed = start.elapsed();

    let summary = BatchSummary::from_reports(&reports);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.render());
    }
    if verbosity >= VerbosityLevel::Minimal {
        eprintln!(
            "Elapsed time: {:.2}s ({:.2} games/s)",
            elapsed.as_secs_f64(),
            games as f64 / elapsed.as_secs_f64()
        );
    }
    Ok(())
}
