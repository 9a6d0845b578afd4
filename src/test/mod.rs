//! Shared fixtures and property tests.

use crate::pattern::Pattern;


/// `(a (a (b) (*)) (b))` and `(a (a (*) (c)) (c))`.
pub(crate) fn reference_patterns() -> Vec<Pattern> {
    vec![
        Pattern::node(
            "a",
            vec![
                Pattern::node("a", vec![Pattern::leaf("b"), Pattern::wildcard()]),
                Pattern::leaf("b"),
            ],
        ),
        Pattern::node(
            "a",
            vec![
                Pattern::node("a", vec![Pattern::wildcard(), Pattern::leaf("c")]),
                Pattern::leaf("c"),
            ],
        ),
    ]
}
