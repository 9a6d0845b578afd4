//! The pattern forest: every distinct subpattern of the registered patterns.
//!
//! Subpatterns are hash-consed into an arena. A member is a symbol plus the
//! forest indices of its children, so structural equality of two subpatterns
//! is equality of their [`PfIndex`], and looking up a candidate parent is a
//! single hash probe on `(symbol, child indices)`.
//!
//! Indices are dense and assigned in pre-order of first appearance, walking
//! the patterns in registration order.

use crate::alphabet::Alphabet;
use crate::enumerate::RaggedProduct;
use crate::error::{AutomatonError, Phase, Result};
use crate::intern::SymbolId;
use crate::pattern::Pattern;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;

/// Index of a pattern-forest member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PfIndex(u32);

impl PfIndex {
    pub fn new(raw: u32) -> Self {
        PfIndex(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A forest member: symbol and child indices.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PfNode {
    pub symbol: SymbolId,
    pub children: Vec<PfIndex>,
}

/// Deduplicated, index-addressed set of subpatterns.
#[derive(Debug, Clone)]
pub struct PatternForest {
    nodes: Vec<PfNode>,
    index: FxHashMap<PfNode, PfIndex>,
    by_root: FxHashMap<SymbolId, Vec<PfIndex>>,
    wildcard: PfIndex,
}

/// Bottom-up hash-consing with pre-order bookkeeping.
#[derive(Default)]
struct Consing {
    nodes: Vec<PfNode>,
    index: FxHashMap<PfNode, u32>,
    /// Pre-order position of each node's first occurrence, by provisional id.
    first_seen: Vec<usize>,
    visited: usize,
}

impl Consing {
    fn cons(&mut self, pattern: &Pattern, alphabet: &Alphabet) -> Result<u32> {
        let symbol = alphabet
            .lookup(pattern.symbol())
            .ok_or(AutomatonError::PhaseOrderViolation {
                phase: Phase::Forest,
                requires: Phase::Registration,
            })?;

        let position = self.visited;
        self.visited += 1;

        let children = pattern
            .children()
            .iter()
            .map(|child| self.cons(child, alphabet).map(PfIndex))
            .collect::<Result<Vec<_>>>()?;

        let node = PfNode { symbol, children };
        // Equal subtrees never nest, so the first one built is also the
        // first one in pre-order.
        let id = match self.index.get(&node) {
            Some(&id) => id,
            None => {
                let id = self.nodes.len() as u32;
                self.index.insert(node.clone(), id);
                self.nodes.push(node);
                self.first_seen.push(position);
                id
            }
        };
        Ok(id)
    }
}

impl PatternForest {
    /// Build the forest of `patterns`, whose symbols must all be in `alphabet`.
    ///
    /// The wildcard is always a member; if no pattern mentions it, it takes
    /// the last index.
    pub fn build(patterns: &[Pattern], alphabet: &Alphabet) -> Result<Self> {
        if patterns.is_empty() {
            return Err(AutomatonError::NoPatterns);
        }

        let mut consing = Consing::default();
        for pattern in patterns {
            consing.cons(pattern, alphabet)?;
        }

        // Renumber provisional ids by first pre-order appearance.
        let mut order: Vec<usize> = (0..consing.nodes.len()).collect();
        order.sort_unstable_by_key(|&id| consing.first_seen[id]);
        let mut dense = vec![PfIndex(0); consing.nodes.len()];
        for (rank, &id) in order.iter().enumerate() {
            dense[id] = PfIndex(rank as u32);
        }

        let mut forest = PatternForest {
            nodes: Vec::with_capacity(order.len() + 1),
            index: FxHashMap::default(),
            by_root: FxHashMap::default(),
            wildcard: PfIndex(0),
        };

        for id in order {
            let provisional = &consing.nodes[id];
            let children = provisional
                .children
                .iter()
                .map(|c| dense[c.index()])
                .collect();
            forest.insert(PfNode {
                symbol: provisional.symbol,
                children,
            });
        }

        let wildcard = PfNode {
            symbol: alphabet.wildcard(),
            children: Vec::new(),
        };
        forest.wildcard = match forest.index.get(&wildcard) {
            Some(&idx) => idx,
            None => forest.insert(wildcard),
        };

        tracing::debug!(
            members = forest.len(),
            patterns = patterns.len(),
            wildcard = %forest.wildcard,
            "built pattern forest"
        );
        Ok(forest)
    }

    fn insert(&mut self, node: PfNode) -> PfIndex {
        let idx = PfIndex(self.nodes.len() as u32);
        self.by_root.entry(node.symbol).or_default().push(idx);
        self.index.insert(node.clone(), idx);
        self.nodes.push(node);
        idx
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the wildcard leaf.
    pub fn wildcard(&self) -> PfIndex {
        self.wildcard
    }

    pub fn node(&self, idx: PfIndex) -> &PfNode {
        &self.nodes[idx.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PfIndex, &PfNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (PfIndex(i as u32), node))
    }

    /// Find the member `(symbol, children..)`.
    pub fn lookup(&self, symbol: SymbolId, children: &[PfIndex]) -> Option<PfIndex> {
        let key = PfNode {
            symbol,
            children: children.to_vec(),
        };
        self.index.get(&key).copied()
    }

    /// Index of a leaf symbol, if it is a member.
    pub fn leaf(&self, symbol: SymbolId) -> Option<PfIndex> {
        self.lookup(symbol, &[])
    }

    /// Members whose root symbol is `symbol`, in index order.
    pub fn rooted_at(&self, symbol: SymbolId) -> &[PfIndex] {
        self.by_root.get(&symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index of a whole pattern tree, if every node of it is a member.
    pub fn index_of(&self, pattern: &Pattern, alphabet: &Alphabet) -> Option<PfIndex> {
        let symbol = alphabet.lookup(pattern.symbol())?;
        let children = pattern
            .children()
            .iter()
            .map(|child| self.index_of(child, alphabet))
            .collect::<Option<Vec<_>>>()?;
        self.index.get(&PfNode { symbol, children }).copied()
    }

    /// Rebuild the pattern tree of a member.
    pub fn pattern(&self, idx: PfIndex, alphabet: &Alphabet) -> Pattern {
        let node = self.node(idx);
        let children = node
            .children
            .iter()
            .map(|&child| self.pattern(child, alphabet))
            .collect();
        Pattern::node(alphabet.name(node.symbol), children)
    }

    /// Insert into `into` every member `(op, c0, .., cn)` with each `ci`
    /// drawn from `slots[i]`. Returns the number of child tuples tried.
    pub fn collect_parents(
        &self,
        op: SymbolId,
        slots: &[&[PfIndex]],
        into: &mut BTreeSet<PfIndex>,
    ) -> usize {
        let mut tried = 0;
        for children in RaggedProduct::new(slots.to_vec()) {
            tried += 1;
            let key = PfNode {
                symbol: op,
                children,
            };
            if let Some(&idx) = self.index.get(&key) {
                into.insert(idx);
            }
        }
        tried
    }
}
