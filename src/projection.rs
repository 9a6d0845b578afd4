//! Relevance projection.
//!
//! For an operator `op` and argument position `k`, π(op, k) holds the forest
//! indices that occur as the `k`-th child of some member rooted at `op`. Only
//! these indices can influence which members match at the parent, so they are
//! the only part of a child's match set the transition tables need to see.

use crate::alphabet::Alphabet;
use crate::forest::{PatternForest, PfIndex};
use crate::intern::SymbolId;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// π for every operator and argument position.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    slots: FxHashMap<SymbolId, Vec<BTreeSet<PfIndex>>>,
}

impl Projection {
    pub fn compute(forest: &PatternForest, alphabet: &Alphabet) -> Self {
        let mut slots = FxHashMap::default();

        for op in alphabet.operators() {
            let mut per_slot = vec![BTreeSet::new(); alphabet.arity(op)];
            for &member in forest.rooted_at(op) {
                for (k, &child) in forest.node(member).children.iter().enumerate() {
                    per_slot[k].insert(child);
                }
            }
            slots.insert(op, per_slot);
        }

        let projection = Projection { slots };
        tracing::debug!(
            operators = projection.slots.len(),
            entries = projection.entries(),
            "computed relevance projection"
        );
        projection
    }

    /// π(op, k); `None` outside the operator's arity.
    pub fn relevant(&self, op: SymbolId, k: usize) -> Option<&BTreeSet<PfIndex>> {
        self.slots.get(&op).and_then(|per_slot| per_slot.get(k))
    }

    pub fn contains(&self, op: SymbolId, k: usize, idx: PfIndex) -> bool {
        self.relevant(op, k).is_some_and(|set| set.contains(&idx))
    }

    /// Restrict a sorted match set to π(op, k), keeping the order.
    pub fn trace(&self, op: SymbolId, k: usize, match_set: &[PfIndex]) -> Vec<PfIndex> {
        match self.relevant(op, k) {
            Some(set) => match_set.iter().copied().filter(|i| set.contains(i)).collect(),
            None => Vec::new(),
        }
    }

    /// Total number of (op, k, index) memberships.
    pub fn entries(&self) -> usize {
        self.slots
            .values()
            .flat_map(|per_slot| per_slot.iter())
            .map(BTreeSet::len)
            .sum()
    }

    /// Number of argument positions recorded for `op`.
    pub fn slot_count(&self, op: SymbolId) -> usize {
        self.slots.get(&op).map_or(0, Vec::len)
    }
}
