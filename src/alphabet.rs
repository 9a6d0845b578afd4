//! Ranked alphabet inferred from registered patterns.
//!
//! Every symbol gets its arity from its first observation. The alphabet then
//! splits into the wildcard, terminals (arity 0) and operators (arity >= 1).

use crate::error::{AutomatonError, Result};
use crate::intern::{SymbolId, SymbolTable};
use crate::pattern::{Pattern, WILDCARD};
use rustc_hash::FxHashMap;

/// Classification of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Wildcard,
    Terminal,
    Operator,
}

/// Symbol table plus arity for every symbol.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: SymbolTable,
    /// Indexed by `SymbolId`.
    arities: Vec<usize>,
    wildcard: SymbolId,
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::len_without_is_empty)]
impl Alphabet {
    /// Create an alphabet holding only the wildcard.
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let wildcard = symbols.intern(WILDCARD);
        Alphabet {
            symbols,
            arities: vec![0],
            wildcard,
        }
    }

    /// Record the symbols of `pattern`.
    ///
    /// Either every node is consistent with the known arities (and with the
    /// other nodes of the same pattern) and the whole pattern is recorded, or
    /// nothing is.
    pub fn register(&mut self, pattern: &Pattern) -> Result<()> {
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();

        for node in pattern.pre_order() {
            let found = node.arity();
            let expected = self
                .symbols
                .get(node.symbol())
                .map(|id| self.arities[id.index()])
                .or_else(|| seen.get(node.symbol()).copied());

            match expected {
                Some(expected) if expected != found => {
                    return Err(AutomatonError::ArityConflict {
                        symbol: node.symbol().to_string(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(node.symbol(), found);
                }
            }
        }

        for node in pattern.pre_order() {
            if self.symbols.get(node.symbol()).is_none() {
                self.symbols.intern(node.symbol());
                self.arities.push(node.arity());
            }
        }
        Ok(())
    }

    pub fn wildcard(&self) -> SymbolId {
        self.wildcard
    }

    /// ID of an already registered symbol.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name)
    }

    pub fn name(&self, id: SymbolId) -> &str {
        self.symbols.resolve(id)
    }

    pub fn arity(&self, id: SymbolId) -> usize {
        self.arities[id.index()]
    }

    /// Arity of a symbol by name, if it has been observed.
    pub fn arity_of(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(|id| self.arity(id))
    }

    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        if id == self.wildcard {
            SymbolKind::Wildcard
        } else if self.arity(id) == 0 {
            SymbolKind::Terminal
        } else {
            SymbolKind::Operator
        }
    }

    pub fn is_wildcard(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Wildcard
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Terminal
    }

    pub fn is_operator(&self, id: SymbolId) -> bool {
        self.kind(id) == SymbolKind::Operator
    }

    /// Operators ordered by name.
    pub fn operators(&self) -> Vec<SymbolId> {
        self.sorted_by_name(SymbolKind::Operator)
    }

    /// Terminals ordered by name, wildcard excluded.
    pub fn terminals(&self) -> Vec<SymbolId> {
        self.sorted_by_name(SymbolKind::Terminal)
    }

    /// Number of symbols. Never zero: the wildcard is reserved by `new`.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    fn sorted_by_name(&self, kind: SymbolKind) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = self
            .symbols
            .iter()
            .map(|(id, _)| id)
            .filter(|&id| self.kind(id) == kind)
            .collect();
        ids.sort_by(|&a, &b| self.name(a).cmp(self.name(b)));
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(alphabet: &Alphabet, ids: Vec<SymbolId>) -> Vec<&str> {
        ids.into_iter().map(|id| alphabet.name(id)).collect()
    }

    #[test]
    fn test_new_reserves_wildcard() {
        let alphabet = Alphabet::new();
        assert_eq!(alphabet.len(), 1);
        assert_eq!(alphabet.lookup("*"), Some(alphabet.wildcard()));
        assert!(alphabet.operators().is_empty());
        assert!(alphabet.terminals().is_empty());
    }

    #[test]
    fn test_classification() {
        let mut alphabet = Alphabet::new();
        let p = Pattern::node(
            "f",
            vec![
                Pattern::node("g", vec![Pattern::leaf("x")]),
                Pattern::wildcard(),
            ],
        );
        alphabet.register(&p).unwrap();

        assert_eq!(alphabet.arity_of("f"), Some(2));
        assert_eq!(alphabet.arity_of("g"), Some(1));
        assert_eq!(alphabet.arity_of("x"), Some(0));
        assert_eq!(alphabet.arity_of("h"), None);

        let x = alphabet.lookup("x").unwrap();
        assert!(alphabet.is_terminal(x));
        assert!(alphabet.is_wildcard(alphabet.wildcard()));
        assert!(!alphabet.is_terminal(alphabet.wildcard()));
        assert!(alphabet.is_operator(alphabet.lookup("g").unwrap()));
    }

    #[test]
    fn test_sorted_accessors() {
        let mut alphabet = Alphabet::new();
        let p = Pattern::node(
            "zeta",
            vec![Pattern::node("alpha", vec![Pattern::leaf("y"), Pattern::leaf("b")])],
        );
        alphabet.register(&p).unwrap();

        assert_eq!(names(&alphabet, alphabet.operators()), vec!["alpha", "zeta"]);
        assert_eq!(names(&alphabet, alphabet.terminals()), vec!["b", "y"]);
    }

    #[test]
    fn test_arity_conflict_across_patterns() {
        let mut alphabet = Alphabet::new();
        alphabet
            .register(&Pattern::node("a", vec![Pattern::leaf("b"), Pattern::leaf("b")]))
            .unwrap();

        let err = alphabet
            .register(&Pattern::node("a", vec![Pattern::leaf("b")]))
            .unwrap_err();
        assert_eq!(
            err,
            AutomatonError::ArityConflict {
                symbol: "a".into(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_terminal_reused_as_operator() {
        let mut alphabet = Alphabet::new();
        alphabet.register(&Pattern::node("f", vec![Pattern::leaf("b")])).unwrap();

        let err = alphabet
            .register(&Pattern::node("f", vec![Pattern::node("b", vec![Pattern::leaf("c")])]))
            .unwrap_err();
        assert!(matches!(err, AutomatonError::ArityConflict { ref symbol, .. } if symbol == "b"));
    }

    #[test]
    fn test_conflict_within_one_pattern_is_atomic() {
        let mut alphabet = Alphabet::new();
        let p = Pattern::node(
            "f",
            vec![Pattern::node("g", vec![Pattern::leaf("x")]), Pattern::leaf("g")],
        );
        assert!(alphabet.register(&p).is_err());
        // Nothing from the rejected pattern was recorded.
        assert_eq!(alphabet.len(), 1);
        assert_eq!(alphabet.arity_of("f"), None);
    }

    #[test]
    fn test_wildcard_with_children() {
        let mut alphabet = Alphabet::new();
        let err = alphabet
            .register(&Pattern::node("*", vec![Pattern::leaf("x")]))
            .unwrap_err();
        assert!(matches!(
            err,
            AutomatonError::ArityConflict { expected: 0, found: 1, .. }
        ));
    }
}
