//! Symbol interning.
//!
//! Pattern symbols are strings at the API boundary but every table in the
//! automaton is keyed by a dense [`SymbolId`], so comparing and hashing a
//! symbol is a `u32` operation.

use rustc_hash::FxHashMap;
use std::fmt;

/// Interned symbol ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owned string interner.
///
/// Each [`crate::Alphabet`] owns one table; there is no global state, so two
/// automata built side by side never share IDs.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    str_to_id: FxHashMap<Box<str>, SymbolId>,
    id_to_str: Vec<Box<str>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its unique ID
    pub fn intern(&mut self, s: &str) -> SymbolId {
        if let Some(&id) = self.str_to_id.get(s) {
            return id;
        }

        let id = SymbolId(self.id_to_str.len() as u32);
        let boxed: Box<str> = s.into();
        self.str_to_id.insert(boxed.clone(), id);
        self.id_to_str.push(boxed);
        id
    }

    /// Look up an already interned string without inserting it.
    pub fn get(&self, s: &str) -> Option<SymbolId> {
        self.str_to_id.get(s).copied()
    }

    /// Look up the string for an ID
    pub fn resolve(&self, id: SymbolId) -> &str {
        &self.id_to_str[id.index()]
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.id_to_str
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s.as_ref()))
    }
}
