//! Search over game states: transitions, per-card rules and the frontier

pub mod config;
pub mod frontier;
pub mod log;
pub mod logger;
pub mod rules;
pub mod state;
pub mod transitions;

pub use config::{PruningPolicy, SearchConfig, VerbosityLevel};
pub use frontier::{Frontier, SearchManager, SearchOutcome, Sequencer};
pub use log::{GameReport, LogTag, MiniReport, PlayLog, TagKind};
pub use logger::SearchLogger;
pub use rules::{CardRules, Resolver, RulesRegistry};
pub use state::GameState;
pub use transitions::Transitions;
