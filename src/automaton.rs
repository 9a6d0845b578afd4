//! Automaton construction driver.
//!
//! [`Automaton`] owns the output of every phase and runs them in dependency
//! order:
//!
//! ```text
//! register ─► build_forest ─► project ─► discover_match_sets ─► build_transition_tables
//! ```
//!
//! Calling a phase before its prerequisite fails with
//! [`AutomatonError::PhaseOrderViolation`]. Rebuilding a phase drops the
//! output of every phase after it, and registering a pattern drops
//! everything derived.
//!
//! # Example
//!
//! ```rust
//! use treematch::{AutomatonBuilder, Pattern};
//!
//! let automaton = AutomatonBuilder::new()
//!     .pattern(Pattern::node("add", vec![Pattern::leaf("reg"), Pattern::leaf("imm")]))
//!     .pattern(Pattern::node("add", vec![Pattern::wildcard(), Pattern::wildcard()]))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(automaton.operators(), vec!["add"]);
//! assert_eq!(automaton.terminals(), vec!["imm", "reg"]);
//! ```

use crate::alphabet::Alphabet;
use crate::error::{AutomatonError, Phase, Result};
use crate::forest::PatternForest;
use crate::intern::SymbolId;
use crate::match_set::{MatchSetId, MatchSetTable};
use crate::pattern::Pattern;
use crate::projection::Projection;
use crate::transition::TransitionTables;
use std::fmt;

/// Configuration for automaton construction.
#[derive(Debug, Clone, Default)]
pub struct AutomatonConfig {
    /// Maximum number of match-set closure passes (0 = unlimited).
    pub max_passes: usize,
    /// Log the full table dump at debug level once θ is built.
    pub dump_tables: bool,
}

/// Statistics about the last construction.
///
/// Counters of a phase whose output has been dropped read zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomatonStats {
    pub patterns: usize,
    pub forest_size: usize,
    pub projection_entries: usize,
    pub passes: usize,
    pub candidates_examined: usize,
    pub match_sets: usize,
    pub mu_classes: usize,
    pub theta_entries: usize,
}

impl AutomatonStats {
    /// Zero the counters of `from` and every later phase.
    fn clear_from(&mut self, from: Phase) {
        if from <= Phase::Forest {
            self.forest_size = 0;
        }
        if from <= Phase::Projection {
            self.projection_entries = 0;
        }
        if from <= Phase::MatchSets {
            self.passes = 0;
            self.candidates_examined = 0;
            self.match_sets = 0;
        }
        self.mu_classes = 0;
        self.theta_entries = 0;
    }
}

/// Bottom-up tree-matching automaton under construction.
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    config: AutomatonConfig,
    alphabet: Alphabet,
    patterns: Vec<Pattern>,
    forest: Option<PatternForest>,
    projection: Option<Projection>,
    match_sets: Option<MatchSetTable>,
    tables: Option<TransitionTables>,
    stats: AutomatonStats,
}

impl Automaton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AutomatonConfig) -> Self {
        Automaton {
            config,
            ..Self::default()
        }
    }

    /// Add a pattern to the set the automaton recognizes.
    pub fn register(&mut self, pattern: Pattern) -> Result<()> {
        self.alphabet.register(&pattern)?;
        tracing::trace!(%pattern, "registered pattern");
        self.patterns.push(pattern);
        self.stats.patterns = self.patterns.len();
        self.invalidate(Phase::Forest);
        Ok(())
    }

    pub fn build_forest(&mut self) -> Result<&PatternForest> {
        let forest = PatternForest::build(&self.patterns, &self.alphabet)?;
        self.invalidate(Phase::Forest);
        self.stats.forest_size = forest.len();
        Ok(&*self.forest.insert(forest))
    }

    pub fn project(&mut self) -> Result<&Projection> {
        let forest = self.require_forest(Phase::Projection)?;
        let projection = Projection::compute(forest, &self.alphabet);
        self.invalidate(Phase::Projection);
        self.stats.projection_entries = projection.entries();
        Ok(&*self.projection.insert(projection))
    }

    /// Discover every reachable match set.
    ///
    /// If match sets already exist the closure is resumed on the existing
    /// table, so ids stay stable and nothing is duplicated.
    pub fn discover_match_sets(&mut self) -> Result<&MatchSetTable> {
        let forest = self
            .forest
            .as_ref()
            .ok_or(AutomatonError::PhaseOrderViolation {
                phase: Phase::MatchSets,
                requires: Phase::Forest,
            })?;
        let projection = self
            .projection
            .as_ref()
            .ok_or(AutomatonError::PhaseOrderViolation {
                phase: Phase::MatchSets,
                requires: Phase::Projection,
            })?;
        let max_passes = self.config.max_passes;

        let outcome = match self.match_sets.take() {
            Some(mut table) => {
                let before = table.len();
                let closed = table.close(forest, projection, &self.alphabet, max_passes);
                closed.map(|stats| {
                    let grew = table.len() != before;
                    (table, stats, grew)
                })
            }
            None => MatchSetTable::discover(forest, projection, &self.alphabet, max_passes)
                .map(|(table, stats)| (table, stats, true)),
        };
        let (table, stats, grew) = match outcome {
            Ok(found) => found,
            Err(err) => {
                self.tables = None;
                self.stats.clear_from(Phase::MatchSets);
                return Err(err);
            }
        };
        if grew {
            self.tables = None;
            self.stats.clear_from(Phase::TransitionTables);
        }

        self.stats.passes = stats.passes;
        self.stats.candidates_examined = stats.candidates;
        self.stats.match_sets = table.len();
        Ok(&*self.match_sets.insert(table))
    }

    pub fn build_transition_tables(&mut self) -> Result<&TransitionTables> {
        let missing = |requires| AutomatonError::PhaseOrderViolation {
            phase: Phase::TransitionTables,
            requires,
        };
        let forest = self.forest.as_ref().ok_or(missing(Phase::Forest))?;
        let projection = self.projection.as_ref().ok_or(missing(Phase::Projection))?;
        let match_sets = self.match_sets.as_ref().ok_or(missing(Phase::MatchSets))?;

        self.tables = None;
        self.stats.clear_from(Phase::TransitionTables);
        let (tables, stats) =
            TransitionTables::build(&self.alphabet, forest, projection, match_sets)?;
        self.stats.mu_classes = stats.mu_classes;
        self.stats.theta_entries = stats.theta_entries;
        self.tables = Some(tables);

        if self.config.dump_tables {
            tracing::debug!(dump = %self.dump(), "automaton tables");
        }
        self.tables.as_ref().ok_or(missing(Phase::TransitionTables))
    }

    /// Run every phase in order.
    pub fn run_all(&mut self) -> Result<&TransitionTables> {
        self.build_forest()?;
        self.project()?;
        self.discover_match_sets()?;
        self.build_transition_tables()
    }

    /// Drop the output of `from` and every later phase.
    fn invalidate(&mut self, from: Phase) {
        if from <= Phase::Forest {
            self.forest = None;
        }
        if from <= Phase::Projection {
            self.projection = None;
        }
        if from <= Phase::MatchSets {
            self.match_sets = None;
        }
        self.tables = None;
        self.stats.clear_from(from);
    }

    fn require_forest(&self, phase: Phase) -> Result<&PatternForest> {
        self.forest.as_ref().ok_or(AutomatonError::PhaseOrderViolation {
            phase,
            requires: Phase::Forest,
        })
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    pub fn stats(&self) -> &AutomatonStats {
        &self.stats
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn forest(&self) -> Option<&PatternForest> {
        self.forest.as_ref()
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn match_sets(&self) -> Option<&MatchSetTable> {
        self.match_sets.as_ref()
    }

    pub fn tables(&self) -> Option<&TransitionTables> {
        self.tables.as_ref()
    }

    pub fn symbol(&self, name: &str) -> Option<SymbolId> {
        self.alphabet.lookup(name)
    }

    pub fn arity_of(&self, name: &str) -> Option<usize> {
        self.alphabet.arity_of(name)
    }

    /// Operator names in lexicographic order.
    pub fn operators(&self) -> Vec<&str> {
        self.names(self.alphabet.operators())
    }

    /// Terminal names in lexicographic order, wildcard excluded.
    pub fn terminals(&self) -> Vec<&str> {
        self.names(self.alphabet.terminals())
    }

    fn names(&self, ids: Vec<SymbolId>) -> Vec<&str> {
        ids.into_iter().map(|id| self.alphabet.name(id)).collect()
    }

    /// State of a leaf labelled `name`; any symbol no pattern mentions as a
    /// terminal gets the wildcard-only state.
    pub fn leaf_state(&self, name: &str) -> Option<MatchSetId> {
        let forest = self.forest.as_ref()?;
        let match_sets = self.match_sets.as_ref()?;
        Some(match self.alphabet.lookup(name) {
            Some(id) => match_sets.leaf_state(forest, id),
            None => match_sets.wildcard_only(),
        })
    }

    /// State of a node labelled with operator `name` over child states.
    pub fn transition(&self, name: &str, children: &[MatchSetId]) -> Option<MatchSetId> {
        let op = self.alphabet.lookup(name)?;
        self.tables.as_ref()?.transition(op, children)
    }

    /// Human-readable dump of every built table. Not a stable format.
    pub fn dump(&self) -> Dump<'_> {
        Dump { automaton: self }
    }
}

/// Display adapter returned by [`Automaton::dump`].
pub struct Dump<'a> {
    automaton: &'a Automaton,
}

fn write_set<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "}}")
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.automaton;
        let alphabet = &a.alphabet;

        if let Some(forest) = &a.forest {
            writeln!(f, "forest:")?;
            for (idx, _) in forest.iter() {
                writeln!(f, "  {}: {}", idx, forest.pattern(idx, alphabet))?;
            }
        }

        if let Some(projection) = &a.projection {
            writeln!(f, "projection:")?;
            for op in alphabet.operators() {
                for k in 0..alphabet.arity(op) {
                    let set: Vec<_> = projection
                        .relevant(op, k)
                        .map(|s| s.iter().copied().collect())
                        .unwrap_or_default();
                    write!(f, "  {}[{}]: ", alphabet.name(op), k)?;
                    write_set(f, &set)?;
                    writeln!(f)?;
                }
            }
        }

        if let Some(match_sets) = &a.match_sets {
            writeln!(f, "match sets:")?;
            for (id, set) in match_sets.iter() {
                write!(f, "  {}: ", id)?;
                write_set(f, set)?;
                writeln!(f)?;
            }
        }

        if let Some(tables) = &a.tables {
            writeln!(f, "mu:")?;
            for op in alphabet.operators() {
                let Some(op_tables) = tables.operator(op) else {
                    continue;
                };
                for k in 0..op_tables.arity() {
                    write!(f, "  {}[{}]:", alphabet.name(op), k)?;
                    if let Some(match_sets) = &a.match_sets {
                        for (id, _) in match_sets.iter() {
                            if let Some(class) = tables.mu(op, k, id) {
                                write!(f, " {}->{}", id, class)?;
                            }
                        }
                    }
                    writeln!(f)?;
                }
            }

            writeln!(f, "theta:")?;
            for op in alphabet.operators() {
                let Some(op_tables) = tables.operator(op) else {
                    continue;
                };
                for (classes, target) in op_tables.entries() {
                    write!(f, "  {}(", alphabet.name(op))?;
                    for (i, class) in classes.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", class)?;
                    }
                    writeln!(f, ") -> {}", target)?;
                }
            }
        }
        Ok(())
    }
}

/// Builder that registers patterns and runs every phase.
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    config: AutomatonConfig,
    patterns: Vec<Pattern>,
}

impl AutomatonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: AutomatonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_passes(mut self, n: usize) -> Self {
        self.config.max_passes = n;
        self
    }

    pub fn dump_tables(mut self, enabled: bool) -> Self {
        self.config.dump_tables = enabled;
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    pub fn build(self) -> Result<Automaton> {
        let mut automaton = Automaton::with_config(self.config);
        for pattern in self.patterns {
            automaton.register(pattern)?;
        }
        automaton.run_all()?;
        Ok(automaton)
    }
}
