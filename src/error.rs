//! Error type for automaton construction.

use std::fmt;
use thiserror::Error;

/// Construction phases, in dependency order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Registration,
    Forest,
    Projection,
    MatchSets,
    TransitionTables,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Registration => "pattern registration",
            Phase::Forest => "pattern forest",
            Phase::Projection => "relevance projection",
            Phase::MatchSets => "match-set discovery",
            Phase::TransitionTables => "transition tables",
        };
        f.write_str(name)
    }
}

/// Errors raised while building an automaton.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("symbol `{symbol}` used with {found} children, previously seen with {expected}")]
    ArityConflict {
        symbol: String,
        expected: usize,
        found: usize,
    },
    #[error("{phase} requires {requires} to be built first")]
    PhaseOrderViolation { phase: Phase, requires: Phase },
    #[error("no patterns registered")]
    NoPatterns,
    #[error("transition of `{operator}` produced unknown match set {result:?}")]
    LookupMiss { operator: String, result: Vec<u32> },
    #[error("match-set discovery did not converge within {limit} passes")]
    PassLimitExceeded { limit: usize },
}

/// Result type for automaton construction.
pub type Result<T> = std::result::Result<T, AutomatonError>;
