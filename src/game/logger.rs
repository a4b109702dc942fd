//! Progress logging for the search
//!
//! Writes to stderr so stdout stays clean for the finished record. The play
//! log inside each state is a separate artifact and ignores verbosity.

use crate::game::VerbosityLevel;
use std::fmt;

/// Verbosity-gated progress logger
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLogger {
    verbosity: VerbosityLevel,
}

impl SearchLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        SearchLogger { verbosity }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level != VerbosityLevel::Silent && level <= self.verbosity
    }

    /// Log at the given level
    pub fn log(&self, level: VerbosityLevel, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            eprintln!("{args}");
        }
    }

    pub fn minimal(&self, args: fmt::Arguments<'_>) {
        self.log(VerbosityLevel::Minimal, args);
    }

    pub fn normal(&self, args: fmt::Arguments<'_>) {
        self.log(VerbosityLevel::Normal, args);
    }

    pub fn verbose(&self, args: fmt::Arguments<'_>) {
        self.log(VerbosityLevel::Verbose, args);
    }
}
