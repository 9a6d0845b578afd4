//! Match-set discovery.
//!
//! A match set is the sorted set of forest members that match some input node
//! simultaneously; each distinct set is one automaton state. Discovery starts
//! from the leaf states and applies every operator to every tuple of known
//! states until no new set appears.

use crate::alphabet::Alphabet;
use crate::enumerate::Odometer;
use crate::error::{AutomatonError, Result};
use crate::forest::{PatternForest, PfIndex};
use crate::intern::SymbolId;
use crate::projection::Projection;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;

/// Index of a match set in the [`MatchSetTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchSetId(u32);

impl MatchSetId {
    pub fn new(raw: u32) -> Self {
        MatchSetId(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MatchSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Counters from a discovery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Closure passes, the final pass that added nothing included.
    pub passes: usize,
    /// Child tuples looked up in the forest.
    pub candidates: usize,
}

/// Every reachable match set, addressed by discovery order.
#[derive(Debug, Clone)]
pub struct MatchSetTable {
    sets: Vec<Box<[PfIndex]>>,
    index: FxHashMap<Box<[PfIndex]>, MatchSetId>,
    wildcard: PfIndex,
}

impl MatchSetTable {
    /// The leaf states: `{*}`, then `{*, t}` for each terminal `t` by name.
    pub fn seed(forest: &PatternForest, alphabet: &Alphabet) -> Self {
        let wildcard = forest.wildcard();
        let mut table = MatchSetTable {
            sets: Vec::new(),
            index: FxHashMap::default(),
            wildcard,
        };
        table.insert(vec![wildcard]);

        for term in alphabet.terminals() {
            if let Some(leaf) = forest.leaf(term) {
                let mut set = vec![wildcard, leaf];
                set.sort_unstable();
                table.insert(set);
            }
        }
        table
    }

    /// Seed the table and close it under every operator.
    pub fn discover(
        forest: &PatternForest,
        projection: &Projection,
        alphabet: &Alphabet,
        max_passes: usize,
    ) -> Result<(Self, DiscoveryStats)> {
        let mut table = Self::seed(forest, alphabet);
        let stats = table.close(forest, projection, alphabet, max_passes)?;
        Ok((table, stats))
    }

    /// Run closure passes until one adds nothing. `max_passes == 0` means no
    /// limit.
    ///
    /// Every pass enumerates tuples over the table as it was when the pass
    /// started; sets found during the pass are appended but only combined in
    /// the next one.
    pub fn close(
        &mut self,
        forest: &PatternForest,
        projection: &Projection,
        alphabet: &Alphabet,
        max_passes: usize,
    ) -> Result<DiscoveryStats> {
        let operators = alphabet.operators();
        let mut stats = DiscoveryStats::default();

        loop {
            if max_passes > 0 && stats.passes >= max_passes {
                tracing::warn!(
                    limit = max_passes,
                    match_sets = self.len(),
                    "match-set discovery hit its pass limit"
                );
                return Err(AutomatonError::PassLimitExceeded { limit: max_passes });
            }
            stats.passes += 1;

            let snapshot = self.len();
            let mut added = 0;
            for &op in &operators {
                for tuple in Odometer::new(snapshot, alphabet.arity(op)) {
                    let children: Vec<MatchSetId> =
                        tuple.into_iter().map(|i| MatchSetId(i as u32)).collect();
                    let (candidate, tried) = self.apply(forest, projection, op, &children);
                    stats.candidates += tried;
                    if self.id_of(&candidate).is_none() {
                        self.insert(candidate);
                        added += 1;
                    }
                }
            }

            tracing::trace!(
                pass = stats.passes,
                added,
                match_sets = self.len(),
                "closure pass"
            );
            if added == 0 {
                break;
            }
        }

        tracing::debug!(
            match_sets = self.len(),
            passes = stats.passes,
            candidates = stats.candidates,
            "discovered match sets"
        );
        Ok(stats)
    }

    /// The set matched at a node labelled `op` whose children are in the
    /// given states.
    pub fn successor(
        &self,
        forest: &PatternForest,
        projection: &Projection,
        op: SymbolId,
        children: &[MatchSetId],
    ) -> Vec<PfIndex> {
        self.apply(forest, projection, op, children).0
    }

    fn apply(
        &self,
        forest: &PatternForest,
        projection: &Projection,
        op: SymbolId,
        children: &[MatchSetId],
    ) -> (Vec<PfIndex>, usize) {
        // Only members in π(op, k) can be the k-th child of an `op` member.
        let traces: Vec<Vec<PfIndex>> = children
            .iter()
            .enumerate()
            .map(|(k, &id)| projection.trace(op, k, self.get(id)))
            .collect();
        let slots: Vec<&[PfIndex]> = traces.iter().map(Vec::as_slice).collect();

        let mut result = BTreeSet::from([self.wildcard]);
        let tried = forest.collect_parents(op, &slots, &mut result);
        (result.into_iter().collect(), tried)
    }

    fn insert(&mut self, set: Vec<PfIndex>) -> MatchSetId {
        let id = MatchSetId(self.sets.len() as u32);
        let set: Box<[PfIndex]> = set.into_boxed_slice();
        self.index.insert(set.clone(), id);
        self.sets.push(set);
        id
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, id: MatchSetId) -> &[PfIndex] {
        &self.sets[id.index()]
    }

    /// Id of a sorted, duplicate-free set.
    pub fn id_of(&self, set: &[PfIndex]) -> Option<MatchSetId> {
        self.index.get(set).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MatchSetId, &[PfIndex])> {
        self.sets
            .iter()
            .enumerate()
            .map(|(i, set)| (MatchSetId(i as u32), &**set))
    }

    /// The state of a node no pattern matches beyond the wildcard.
    pub fn wildcard_only(&self) -> MatchSetId {
        MatchSetId(0)
    }

    /// State of a leaf labelled `terminal`.
    pub fn leaf_state(&self, forest: &PatternForest, terminal: SymbolId) -> MatchSetId {
        let Some(leaf) = forest.leaf(terminal) else {
            return self.wildcard_only();
        };
        let mut set = [self.wildcard, leaf];
        set.sort_unstable();
        self.id_of(&set).unwrap_or_else(|| self.wildcard_only())
    }
}
