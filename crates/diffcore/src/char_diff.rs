//! Character-level diff used to build the `children` of a minor
//! (case/punctuation-only) inline part.
//!
//! Grounded in the teacher's token-level diff
//! (`rt-compare/src/diff.rs`), which drives the same `similar::capture_diff_slices`
//! Myers implementation over a `&[&str]` slice and decomposes `Replace` into
//! `Delete`+`Insert`; here the slice elements are single characters instead
//! of tokens.

use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::result::InlinePart;

/// One character-level change, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CharOp {
    Equal(String),
    Removed(String),
    Added(String),
}

/// Diff `a` against `b` character by character, collapsing consecutive
/// same-kind characters into one run each.
fn char_level_diff(a: &str, b: &str) -> Vec<CharOp> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let ops = capture_diff_slices(Algorithm::Myers, &a_chars, &b_chars);

    let mut out: Vec<CharOp> = Vec::new();
    let mut push = |op: CharOp| match (out.last_mut(), &op) {
        (Some(CharOp::Equal(s)), CharOp::Equal(t)) => s.push_str(t),
        (Some(CharOp::Removed(s)), CharOp::Removed(t)) => s.push_str(t),
        (Some(CharOp::Added(s)), CharOp::Added(t)) => s.push_str(t),
        _ => out.push(op),
    };

    for op in &ops {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                let s: String = a_chars[*old_index..*old_index + *len].iter().collect();
                push(CharOp::Equal(s));
            }
            DiffOp::Delete { old_index, old_len, .. } => {
                let s: String = a_chars[*old_index..*old_index + *old_len].iter().collect();
                push(CharOp::Removed(s));
            }
            DiffOp::Insert { new_index, new_len, .. } => {
                let s: String = b_chars[*new_index..*new_index + *new_len].iter().collect();
                push(CharOp::Added(s));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let removed: String = a_chars[*old_index..*old_index + *old_len].iter().collect();
                let added: String = b_chars[*new_index..*new_index + *new_len].iter().collect();
                push(CharOp::Removed(removed));
                push(CharOp::Added(added));
            }
        }
    }

    out
}

/// Build a minor `(removed, added)` part pair whose `children` are a
/// character-level diff of `removed_text`/`added_text`.
///
/// Both parts carry the full original text as their own `value` (the
/// character diff only populates `children`); the concatenation of `Equal`
/// children is identical on both sides by construction, satisfying the
/// minor-pair equal-symmetry invariant.
pub fn minor_pair(removed_text: &str, added_text: &str) -> (InlinePart, InlinePart) {
    let ops = char_level_diff(removed_text, added_text);

    let mut removed_children = Vec::new();
    let mut added_children = Vec::new();

    for op in ops {
        match op {
            CharOp::Equal(s) => {
                removed_children.push(InlinePart::equal(s.clone()));
                added_children.push(InlinePart::equal(s));
            }
            CharOp::Removed(s) => removed_children.push(InlinePart::removed(s)),
            CharOp::Added(s) => added_children.push(InlinePart::added(s)),
        }
    }

    let removed = InlinePart::removed(removed_text)
        .with_minor(true)
        .with_children(removed_children);
    let added = InlinePart::added(added_text)
        .with_minor(true)
        .with_children(added_children);

    (removed, added)
}
