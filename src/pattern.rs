//! Ranked tree patterns.
//!
//! A [`Pattern`] is the caller-facing representation of a pattern tree: a
//! symbol and an ordered list of children. The number of children is the
//! symbol's arity; leaves are terminals or the wildcard.

use std::fmt;
use std::rc::Rc;

/// The reserved wildcard symbol.
pub const WILDCARD: &str = "*";

/// A pattern over a ranked alphabet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    symbol: Rc<str>,
    children: Vec<Pattern>,
}

impl Pattern {
    /// Create an interior node.
    pub fn node(symbol: impl Into<Rc<str>>, children: Vec<Pattern>) -> Self {
        Pattern {
            symbol: symbol.into(),
            children,
        }
    }

    /// Create a leaf (a terminal, or the wildcard if `symbol` is `*`).
    pub fn leaf(symbol: impl Into<Rc<str>>) -> Self {
        Pattern::node(symbol, Vec::new())
    }

    /// The wildcard leaf.
    pub fn wildcard() -> Self {
        Pattern::leaf(WILDCARD)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn children(&self) -> &[Pattern] {
        &self.children
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }

    pub fn is_wildcard(&self) -> bool {
        self.children.is_empty() && &*self.symbol == WILDCARD
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.pre_order().count()
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Pattern::depth).max().unwrap_or(0)
    }

    /// Pre-order traversal: every node exactly once, node before children.
    ///
    /// The iterator is lazy; call again to restart.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.symbol)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}

/// Lazy pre-order walk over a [`Pattern`].
#[derive(Clone, Debug)]
pub struct PreOrder<'a> {
    stack: Vec<&'a Pattern>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Pattern;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pattern {
        Pattern::node(
            "a",
            vec![
                Pattern::node("a", vec![Pattern::leaf("b"), Pattern::wildcard()]),
                Pattern::leaf("b"),
            ],
        )
    }

    #[test]
    fn test_pattern_creation() {
        let p = sample();
        assert_eq!(p.symbol(), "a");
        assert_eq!(p.arity(), 2);
        assert!(!p.is_leaf());
        assert!(p.children()[0].children()[1].is_wildcard());
        assert!(!Pattern::leaf("b").is_wildcard());
        assert_eq!(p.size(), 5);
        assert_eq!(p.depth(), 3);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(sample(), sample());
        let other = Pattern::node("a", vec![Pattern::leaf("b"), Pattern::leaf("b")]);
        assert_ne!(sample(), other);
    }

    #[test]
    fn test_pre_order() {
        let p = sample();
        let symbols: Vec<&str> = p.pre_order().map(Pattern::symbol).collect();
        assert_eq!(symbols, vec!["a", "a", "b", "*", "b"]);
    }

    #[test]
    fn test_pre_order_restarts() {
        let p = sample();
        let mut walk = p.pre_order();
        walk.next();
        walk.next();
        assert_eq!(p.pre_order().count(), 5);
        assert_eq!(walk.count(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), "(a (a (b) (*)) (b))");
    }
}
