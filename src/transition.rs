//! Slot compaction (μ) and transition tables (θ).
//!
//! For an operator slot, two match sets that agree on π(op, k) are
//! interchangeable as that child, so μ maps each match set to a class keyed by
//! its trace on π(op, k). θ then only has to be tabulated over tuples of
//! classes, which is usually far smaller than tuples of match sets.

use crate::alphabet::Alphabet;
use crate::enumerate::Odometer;
use crate::error::{AutomatonError, Result};
use crate::forest::{PatternForest, PfIndex};
use crate::intern::SymbolId;
use crate::match_set::{MatchSetId, MatchSetTable};
use crate::projection::Projection;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;

/// Index of a μ-class within one operator slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn new(raw: u32) -> Self {
        ClassId(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// μ for one (operator, slot).
#[derive(Debug, Clone, Default)]
pub struct SlotCompaction {
    /// Indexed by `MatchSetId`; `None` when the trace is empty.
    class_of: Vec<Option<ClassId>>,
    traces: Vec<Box<[PfIndex]>>,
    by_trace: FxHashMap<Box<[PfIndex]>, ClassId>,
}

impl SlotCompaction {
    fn compute(
        op: SymbolId,
        k: usize,
        projection: &Projection,
        match_sets: &MatchSetTable,
    ) -> Self {
        let mut slot = SlotCompaction::default();
        for (_, set) in match_sets.iter() {
            let trace = projection.trace(op, k, set);
            if trace.is_empty() {
                slot.class_of.push(None);
                continue;
            }
            let trace = trace.into_boxed_slice();
            let class = match slot.by_trace.get(&trace) {
                Some(&class) => class,
                None => {
                    let class = ClassId(slot.traces.len() as u32);
                    slot.by_trace.insert(trace.clone(), class);
                    slot.traces.push(trace);
                    class
                }
            };
            slot.class_of.push(Some(class));
        }
        slot
    }

    /// μ: class of a match set, `None` if it has nothing relevant here.
    pub fn class_of(&self, match_set: MatchSetId) -> Option<ClassId> {
        self.class_of.get(match_set.index()).copied().flatten()
    }

    /// Inverse of μ: the trace a class stands for.
    pub fn trace(&self, class: ClassId) -> Option<&[PfIndex]> {
        self.traces.get(class.index()).map(|t| &**t)
    }

    pub fn class_count(&self) -> usize {
        self.traces.len()
    }
}

/// μ and θ for one operator.
#[derive(Debug, Clone)]
pub struct OperatorTables {
    op: SymbolId,
    slots: Vec<SlotCompaction>,
    /// Dense θ in mixed radix over the per-slot class counts.
    theta: Vec<Option<MatchSetId>>,
}

impl OperatorTables {
    fn build(
        op: SymbolId,
        alphabet: &Alphabet,
        forest: &PatternForest,
        projection: &Projection,
        match_sets: &MatchSetTable,
    ) -> Result<Self> {
        let arity = alphabet.arity(op);
        let slots: Vec<SlotCompaction> = (0..arity)
            .map(|k| SlotCompaction::compute(op, k, projection, match_sets))
            .collect();

        let size = slots.iter().map(SlotCompaction::class_count).product();
        let mut tables = OperatorTables {
            op,
            slots,
            theta: vec![None; size],
        };

        let wildcard = forest.wildcard();
        let max_classes = tables
            .slots
            .iter()
            .map(SlotCompaction::class_count)
            .max()
            .unwrap_or(0);

        for tuple in Odometer::new(max_classes, arity) {
            let classes: Vec<ClassId> = tuple.into_iter().map(|c| ClassId(c as u32)).collect();
            let Some(traces) = tables.traces_for(&classes) else {
                continue;
            };

            let mut result = BTreeSet::from([wildcard]);
            forest.collect_parents(op, &traces, &mut result);

            let result: Vec<PfIndex> = result.into_iter().collect();
            let Some(target) = match_sets.id_of(&result) else {
                return Err(AutomatonError::LookupMiss {
                    operator: alphabet.name(op).to_string(),
                    result: result.iter().map(|i| i.as_u32()).collect(),
                });
            };
            if let Some(slot) = tables.offset(&classes) {
                tables.theta[slot] = Some(target);
            }
        }

        Ok(tables)
    }

    /// Traces of every class in the tuple, or `None` if some slot has no
    /// such class.
    fn traces_for(&self, classes: &[ClassId]) -> Option<Vec<&[PfIndex]>> {
        self.slots
            .iter()
            .zip(classes)
            .map(|(slot, &class)| slot.trace(class))
            .collect()
    }

    fn offset(&self, classes: &[ClassId]) -> Option<usize> {
        if classes.len() != self.slots.len() {
            return None;
        }
        let mut offset = 0;
        for (slot, class) in self.slots.iter().zip(classes) {
            if class.index() >= slot.class_count() {
                return None;
            }
            offset = offset * slot.class_count() + class.index();
        }
        Some(offset)
    }

    pub fn op(&self) -> SymbolId {
        self.op
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, k: usize) -> Option<&SlotCompaction> {
        self.slots.get(k)
    }

    /// θ for a tuple of classes.
    pub fn theta(&self, classes: &[ClassId]) -> Option<MatchSetId> {
        self.offset(classes).and_then(|i| self.theta[i])
    }

    /// Defined θ entries, in class-tuple order.
    pub fn entries(&self) -> impl Iterator<Item = (Vec<ClassId>, MatchSetId)> + '_ {
        let radix: Vec<usize> = self.slots.iter().map(SlotCompaction::class_count).collect();
        self.theta.iter().enumerate().filter_map(move |(i, target)| {
            let target = (*target)?;
            let mut rest = i;
            let mut classes = vec![ClassId(0); radix.len()];
            for (k, &base) in radix.iter().enumerate().rev() {
                classes[k] = ClassId((rest % base) as u32);
                rest /= base;
            }
            Some((classes, target))
        })
    }
}

/// Counters from table construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub mu_classes: usize,
    pub theta_entries: usize,
}

/// μ and θ for every operator.
#[derive(Debug, Clone)]
pub struct TransitionTables {
    per_op: FxHashMap<SymbolId, OperatorTables>,
    wildcard_only: MatchSetId,
}

impl TransitionTables {
    pub fn build(
        alphabet: &Alphabet,
        forest: &PatternForest,
        projection: &Projection,
        match_sets: &MatchSetTable,
    ) -> Result<(Self, TableStats)> {
        let mut per_op = FxHashMap::default();
        let mut stats = TableStats::default();

        for op in alphabet.operators() {
            let tables = OperatorTables::build(op, alphabet, forest, projection, match_sets)?;
            let classes: usize = tables.slots.iter().map(SlotCompaction::class_count).sum();
            let entries = tables.entries().count();
            tracing::trace!(
                op = alphabet.name(op),
                classes,
                entries,
                "built operator tables"
            );
            stats.mu_classes += classes;
            stats.theta_entries += entries;
            per_op.insert(op, tables);
        }

        tracing::debug!(
            operators = per_op.len(),
            mu_classes = stats.mu_classes,
            theta_entries = stats.theta_entries,
            "built transition tables"
        );
        let tables = TransitionTables {
            per_op,
            wildcard_only: match_sets.wildcard_only(),
        };
        Ok((tables, stats))
    }

    pub fn operator(&self, op: SymbolId) -> Option<&OperatorTables> {
        self.per_op.get(&op)
    }

    /// μ(op, k) of a match set.
    pub fn mu(&self, op: SymbolId, k: usize, match_set: MatchSetId) -> Option<ClassId> {
        self.operator(op)?.slot(k)?.class_of(match_set)
    }

    /// The trace behind a class of (op, k).
    pub fn trace(&self, op: SymbolId, k: usize, class: ClassId) -> Option<&[PfIndex]> {
        self.operator(op)?.slot(k)?.trace(class)
    }

    pub fn class_count(&self, op: SymbolId, k: usize) -> usize {
        self.operator(op)
            .and_then(|t| t.slot(k))
            .map_or(0, SlotCompaction::class_count)
    }

    pub fn theta(&self, op: SymbolId, classes: &[ClassId]) -> Option<MatchSetId> {
        self.operator(op)?.theta(classes)
    }

    /// State of a node labelled `op` whose children are in `children`.
    ///
    /// A child with no class for its slot cannot contribute to any member
    /// rooted at `op`, so the node only matches the wildcard. `None` for an
    /// unknown operator, a tuple of the wrong length or a child id outside
    /// the match-set table.
    pub fn transition(&self, op: SymbolId, children: &[MatchSetId]) -> Option<MatchSetId> {
        let tables = self.operator(op)?;
        if children.len() != tables.arity() {
            return None;
        }
        let mut classes = Vec::with_capacity(children.len());
        let mut relevant = true;
        for (slot, &child) in tables.slots.iter().zip(children) {
            match slot.class_of.get(child.index())? {
                Some(class) => classes.push(*class),
                None => relevant = false,
            }
        }
        if !relevant {
            return Some(self.wildcard_only);
        }
        tables.theta(&classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::test::reference_patterns;
    use pretty_assertions::assert_eq;

    struct Fixture {
        alphabet: Alphabet,
        match_sets: MatchSetTable,
        tables: TransitionTables,
        stats: TableStats,
    }

    fn fixture(patterns: &[Pattern]) -> Fixture {
        let mut alphabet = Alphabet::new();
        for p in patterns {
            alphabet.register(p).unwrap();
        }
        let forest = PatternForest::build(patterns, &alphabet).unwrap();
        let projection = Projection::compute(&forest, &alphabet);
        let (match_sets, _) =
            MatchSetTable::discover(&forest, &projection, &alphabet, 0).unwrap();
        let (tables, stats) =
            TransitionTables::build(&alphabet, &forest, &projection, &match_sets).unwrap();
        Fixture {
            alphabet,
            match_sets,
            tables,
            stats,
        }
    }

    fn c(raw: u32) -> ClassId {
        ClassId::new(raw)
    }

    fn m(raw: u32) -> MatchSetId {
        MatchSetId::new(raw)
    }

    #[test]
    fn test_reference_mu() {
        let fx = fixture(&reference_patterns());
        let a = fx.alphabet.lookup("a").unwrap();

        let slot0: Vec<Option<u32>> = (0..8)
            .map(|i| fx.tables.mu(a, 0, m(i)).map(ClassId::as_u32))
            .collect();
        assert_eq!(
            slot0,
            vec![Some(0), Some(1), Some(0), Some(2), Some(3), Some(4), Some(2), Some(0)]
        );

        let slot1: Vec<Option<u32>> = (0..8)
            .map(|i| fx.tables.mu(a, 1, m(i)).map(ClassId::as_u32))
            .collect();
        assert_eq!(
            slot1,
            vec![Some(0), Some(1), Some(2), Some(0), Some(0), Some(0), Some(0), Some(0)]
        );

        assert_eq!(fx.tables.class_count(a, 0), 5);
        assert_eq!(fx.tables.class_count(a, 1), 3);
        assert_eq!(
            fx.tables.trace(a, 0, c(4)),
            Some(&[PfIndex::new(1), PfIndex::new(3), PfIndex::new(5)][..])
        );
    }

    #[test]
    fn test_reference_theta() {
        let fx = fixture(&reference_patterns());
        let a = fx.alphabet.lookup("a").unwrap();

        let expected = [
            [0, 0, 3],
            [4, 4, 5],
            [0, 0, 6],
            [0, 7, 3],
            [0, 7, 6],
        ];
        for (c0, row) in expected.iter().enumerate() {
            for (c1, &target) in row.iter().enumerate() {
                assert_eq!(
                    fx.tables.theta(a, &[c(c0 as u32), c(c1 as u32)]),
                    Some(m(target)),
                    "theta(a, c{}, c{})",
                    c0,
                    c1
                );
            }
        }
        assert_eq!(fx.stats.theta_entries, 15);
        assert_eq!(fx.stats.mu_classes, 8);
    }

    #[test]
    fn test_theta_out_of_range() {
        let fx = fixture(&reference_patterns());
        let a = fx.alphabet.lookup("a").unwrap();
        assert_eq!(fx.tables.theta(a, &[c(0), c(3)]), None);
        assert_eq!(fx.tables.theta(a, &[c(0)]), None);
        let b = fx.alphabet.lookup("b").unwrap();
        assert_eq!(fx.tables.theta(b, &[]), None);
    }

    #[test]
    fn test_entries_round_trip_through_theta() {
        let fx = fixture(&reference_patterns());
        let a = fx.alphabet.lookup("a").unwrap();
        let ops = fx.tables.operator(a).unwrap();
        for (classes, target) in ops.entries() {
            assert_eq!(ops.theta(&classes), Some(target));
        }
    }

    #[test]
    fn test_transition() {
        let fx = fixture(&reference_patterns());
        let a = fx.alphabet.lookup("a").unwrap();

        // a(a(b, x), b) for any x reaches the state holding the first pattern.
        let inner = fx.tables.transition(a, &[m(1), m(0)]).unwrap();
        assert_eq!(inner, m(4));
        let outer = fx.tables.transition(a, &[inner, m(1)]).unwrap();
        assert!(fx.match_sets.get(outer).contains(&PfIndex::new(0)));

        assert_eq!(fx.tables.transition(a, &[m(0)]), None);
    }

    #[test]
    fn test_transition_with_irrelevant_child() {
        let patterns = vec![Pattern::node("f", vec![Pattern::leaf("x"), Pattern::leaf("y")])];
        let fx = fixture(&patterns);
        let f = fx.alphabet.lookup("f").unwrap();

        // Match sets: {*}, {x,*}, {y,*}, {f(x,y),*}. Nothing in {*} is
        // relevant to either slot of f.
        assert_eq!(fx.tables.mu(f, 0, m(0)), None);
        assert_eq!(fx.tables.transition(f, &[m(0), m(2)]), Some(m(0)));
        assert_eq!(fx.tables.transition(f, &[m(1), m(2)]), Some(m(3)));
        assert_eq!(fx.stats.theta_entries, 1);
    }

    #[test]
    fn test_transition_rejects_unknown_match_set() {
        let fx = fixture(&reference_patterns());
        let a = fx.alphabet.lookup("a").unwrap();
        assert_eq!(fx.match_sets.len(), 8);

        assert_eq!(fx.tables.transition(a, &[m(8), m(1)]), None);
        assert_eq!(fx.tables.transition(a, &[m(1), m(99)]), None);
        // An unknown id is rejected even next to a child with no class.
        let patterns = vec![Pattern::node("f", vec![Pattern::leaf("x"), Pattern::leaf("y")])];
        let fx = fixture(&patterns);
        let f = fx.alphabet.lookup("f").unwrap();
        assert_eq!(fx.tables.transition(f, &[m(0), m(4)]), None);
    }

    #[test]
    fn test_unclosed_match_sets_are_a_lookup_miss() {
        let patterns = reference_patterns();
        let mut alphabet = Alphabet::new();
        for p in &patterns {
            alphabet.register(p).unwrap();
        }
        let forest = PatternForest::build(&patterns, &alphabet).unwrap();
        let projection = Projection::compute(&forest, &alphabet);
        let seeded = MatchSetTable::seed(&forest, &alphabet);

        let err = TransitionTables::build(&alphabet, &forest, &projection, &seeded).unwrap_err();
        assert_eq!(
            err,
            AutomatonError::LookupMiss {
                operator: "a".to_string(),
                result: vec![3, 5],
            }
        );
    }
}
