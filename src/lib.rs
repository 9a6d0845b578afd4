//! Treematch: bottom-up tree pattern matching automata.
//!
//! Given a set of patterns over a ranked alphabet (operators, terminals and
//! the wildcard `*`), this crate precomputes the tables of a deterministic
//! bottom-up tree automaton. With the tables built, the set of patterns
//! matching at every node of an input tree is found with one table lookup per
//! node, children before parents.
//!
//! This crate provides:
//! - Patterns and the ranked alphabet inferred from them
//! - Odometer and ragged Cartesian product enumerators
//! - The pattern forest: every distinct subpattern, hash-consed
//! - Relevance projection π per operator argument
//! - Fixpoint discovery of match sets (automaton states)
//! - Per-slot state compaction μ and transition tables θ
//!
//! Phases are driven by [`Automaton`], or all at once by [`AutomatonBuilder`].

pub mod alphabet;
pub mod automaton;
pub mod enumerate;
pub mod error;
pub mod forest;
pub mod intern;
pub mod match_set;
pub mod pattern;
pub mod projection;
pub mod transition;

#[cfg(test)]
mod test;

// Re-exports for convenience
pub use alphabet::{Alphabet, SymbolKind};
pub use automaton::{Automaton, AutomatonBuilder, AutomatonConfig, AutomatonStats};
pub use enumerate::{Odometer, RaggedProduct};
pub use error::{AutomatonError, Phase, Result};
pub use forest::{PatternForest, PfIndex, PfNode};
pub use intern::{SymbolId, SymbolTable};
pub use match_set::{MatchSetId, MatchSetTable};
pub use pattern::{Pattern, WILDCARD};
pub use projection::Projection;
pub use transition::{ClassId, OperatorTables, SlotCompaction, TransitionTables};
