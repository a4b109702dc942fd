//! Search configuration

use crate::{Result, SequencerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Verbosity level for search progress output (stderr)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Silent - no output during search
    Silent = 0,
    /// Minimal - only the outcome
    Minimal = 1,
    /// Normal - one line per turn (default)
    #[default]
    Normal = 2,
    /// Verbose - per-state events such as timeouts
    Verbose = 3,
}

/// Heuristic prunings applied while generating successors
///
/// Both trade a small chance of missing a line for a much smaller search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruningPolicy {
    /// Don't pass the turn while holding a playable non-bounce land
    pub force_land_drops: bool,
    /// Don't pass the turn while holding an affordable always-cast spell
    pub force_always_cast: bool,
}

impl PruningPolicy {
    pub fn none() -> Self {
        PruningPolicy {
            force_land_drops: false,
            force_always_cast: false,
        }
    }
}

impl Default for PruningPolicy {
    fn default() -> Self {
        PruningPolicy {
            force_land_drops: true,
            force_always_cast: true,
        }
    }
}

/// Knobs for one search run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Last turn the search explores before giving up
    pub horizon: u32,
    /// Wall-clock budget for a line, measured from its root state
    pub state_timeout: Duration,
    /// No point making more mana than this in a turn
    pub mana_ceiling: u32,
    pub pruning: PruningPolicy,
    /// Expand each frontier wave on the rayon pool
    pub parallel: bool,
    pub verbosity: VerbosityLevel,
}

impl SearchConfig {
    pub fn with_horizon(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_pruning(mut self, pruning: PruningPolicy) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_state_timeout(mut self, timeout: Duration) -> Self {
        self.state_timeout = timeout;
        self
    }

    /// Reject settings under which no search can make progress
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(SequencerError::InvalidArgument(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.mana_ceiling == 0 {
            return Err(SequencerError::InvalidArgument(
                "mana ceiling must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            horizon: 4,
            state_timeout: Duration::from_secs(4),
            mana_ceiling: 6,
            pruning: PruningPolicy::default(),
            parallel: false,
            verbosity: VerbosityLevel::default(),
        }
    }
}
