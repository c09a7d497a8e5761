//! Declarative rule engine for the inline diff pipeline's absorb-marking
//! stage: a small pattern-rewriter that scans an [`InlinePart`] sequence and,
//! for each rule whose pattern matches and whose condition holds, either
//! tags matched parts with an [`AbsorbLevel`] (mark-only mode) or rewrites
//! the sequence outright (transform mode).
//!
//! The pipeline (`inline.rs`) only ever runs mark-only mode; transform mode
//! is kept alongside it because the two share the same rule table, per the
//! spec's "future rules can be added without touching the core" design note.

use crate::result::{AbsorbLevel, InlinePart, PartKind};
use crate::tokenize::is_pure_punctuation;

const MAX_ITERATIONS: usize = 10;

/// How a matched pattern is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Tag matched parts with `absorb_level`; text is untouched.
    MarkOnly,
    /// Replace matched parts with a merged/absorbed sequence.
    Transform,
}

/// One pattern rule: a fixed-length window over the part array plus a
/// condition gating whether it fires.
pub struct Rule {
    pub name: &'static str,
    pub pattern_len: usize,
    pub absorb_level: AbsorbLevel,
    pub condition: fn(&[InlinePart], usize) -> bool,
    /// Indices (relative to the match start) that get marked/absorbed.
    pub marked_offsets: &'static [usize],
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn is_change(part: &InlinePart) -> bool {
    matches!(part.kind, PartKind::Removed | PartKind::Added)
}

fn is_only_stop_words(s: &str) -> bool {
    crate::tokenize::is_only_stop_words(s)
}

// ---------------------------------------------------------------------------
// Rule conditions
// ---------------------------------------------------------------------------

fn cond_minor_stop_word_pair(parts: &[InlinePart], i: usize) -> bool {
    let (removed, added) = (&parts[i], &parts[i + 1]);
    if removed.kind != PartKind::Removed || added.kind != PartKind::Added {
        return false;
    }
    if !removed.minor || !added.minor {
        return false;
    }
    if !is_only_stop_words(&removed.value) || !is_only_stop_words(&added.value) {
        return false;
    }

    let target_before = i.checked_sub(1).and_then(|idx| parts.get(idx));
    let target_after = parts.get(i + 2);
    let (Some(before), Some(after)) = (target_before, target_after) else {
        return false;
    };
    if before.kind != PartKind::Removed || after.kind != PartKind::Added {
        return false;
    }

    if is_pure_punctuation(&before.value) && is_pure_punctuation(&removed.value) {
        return false;
    }
    if is_pure_punctuation(&after.value) && is_pure_punctuation(&added.value) {
        return false;
    }

    true
}

fn cond_minor_stop_word_pair_reverse(parts: &[InlinePart], i: usize) -> bool {
    let (added, removed) = (&parts[i], &parts[i + 1]);
    if added.kind != PartKind::Added || removed.kind != PartKind::Removed {
        return false;
    }
    if !added.minor || !removed.minor {
        return false;
    }
    if !is_only_stop_words(&added.value) || !is_only_stop_words(&removed.value) {
        return false;
    }

    let target_before = i.checked_sub(1).and_then(|idx| parts.get(idx));
    let target_after = parts.get(i + 2);
    let (Some(before), Some(after)) = (target_before, target_after) else {
        return false;
    };
    if before.kind != PartKind::Added || after.kind != PartKind::Removed {
        return false;
    }

    if is_pure_punctuation(&before.value) && is_pure_punctuation(&added.value) {
        return false;
    }
    if is_pure_punctuation(&after.value) && is_pure_punctuation(&removed.value) {
        return false;
    }

    true
}

fn cond_equal_stop_words(parts: &[InlinePart], i: usize) -> bool {
    let equal = &parts[i];
    if equal.kind != PartKind::Equal || !is_only_stop_words(&equal.value) {
        return false;
    }
    let Some(prev) = i.checked_sub(1).and_then(|idx| parts.get(idx)) else {
        return false;
    };
    let Some(next) = parts.get(i + 1) else {
        return false;
    };
    if !is_change(prev) || !is_change(next) {
        return false;
    }

    // Preserve context stop words that sit next to a single isolated change:
    // if exactly one change separates this equal from the next meaningful
    // equal, don't absorb this one away.
    if let Some(next_equal) = parts.get(i + 2) {
        if next_equal.kind == PartKind::Equal && !is_only_stop_words(&next_equal.value) {
            return false;
        }
    }

    true
}

fn cond_single_word_large_changes(parts: &[InlinePart], i: usize) -> bool {
    let equal = &parts[i];
    if equal.kind != PartKind::Equal || word_count(&equal.value) != 1 {
        return false;
    }
    let Some(prev) = i.checked_sub(1).and_then(|idx| parts.get(idx)) else {
        return false;
    };
    let Some(next) = parts.get(i + 1) else {
        return false;
    };
    is_change(prev) && is_change(next) && word_count(&prev.value) >= 3 && word_count(&next.value) >= 3
}

/// The four priority-ordered stop-word absorption rules used by the inline
/// diff pipeline's absorb-marking stage.
pub fn stop_word_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "absorb-minor-stop-word-pair",
            pattern_len: 2,
            absorb_level: AbsorbLevel::Stopword,
            condition: cond_minor_stop_word_pair,
            marked_offsets: &[0, 1],
        },
        Rule {
            name: "absorb-minor-stop-word-pair-reverse",
            pattern_len: 2,
            absorb_level: AbsorbLevel::Stopword,
            condition: cond_minor_stop_word_pair_reverse,
            marked_offsets: &[0, 1],
        },
        Rule {
            name: "absorb-equal-stop-words",
            pattern_len: 1,
            absorb_level: AbsorbLevel::Stopword,
            condition: cond_equal_stop_words,
            marked_offsets: &[0],
        },
        Rule {
            name: "absorb-single-word-large-changes",
            pattern_len: 1,
            absorb_level: AbsorbLevel::Single,
            condition: cond_single_word_large_changes,
            marked_offsets: &[0],
        },
    ]
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scan `parts` against `rules` in priority order, applying `mode` until the
/// sequence stabilizes or `MAX_ITERATIONS` passes have run.
pub fn apply_rules(parts: Vec<InlinePart>, rules: &[Rule], mode: Mode) -> Vec<InlinePart> {
    let mut current = parts;
    for _ in 0..MAX_ITERATIONS {
        let (next, changed) = apply_rules_once(current, rules, mode);
        current = next;
        if !changed {
            break;
        }
    }
    current
}

fn apply_rules_once(parts: Vec<InlinePart>, rules: &[Rule], mode: Mode) -> (Vec<InlinePart>, bool) {
    match mode {
        Mode::MarkOnly => mark_once(parts, rules),
        Mode::Transform => transform_once(parts, rules),
    }
}

fn mark_once(mut parts: Vec<InlinePart>, rules: &[Rule]) -> (Vec<InlinePart>, bool) {
    let mut changed = false;
    let mut i = 0;
    while i < parts.len() {
        let mut applied = None;
        for rule in rules {
            if i + rule.pattern_len > parts.len() {
                continue;
            }
            if (rule.condition)(&parts, i) {
                applied = Some(rule);
                break;
            }
        }
        if let Some(rule) = applied {
            for &offset in rule.marked_offsets {
                let part = &mut parts[i + offset];
                if part.absorb_level != Some(rule.absorb_level) {
                    part.absorb_level = Some(rule.absorb_level);
                    changed = true;
                }
            }
        }
        i += 1;
    }
    (parts, changed)
}

/// Transform mode: matched patterns are removed and their text absorbed
/// into the adjacent same-kind change (or simply dropped for a stop-word
/// equal with no same-kind neighbor to merge into).
fn transform_once(parts: Vec<InlinePart>, rules: &[Rule]) -> (Vec<InlinePart>, bool) {
    let mut out: Vec<InlinePart> = Vec::with_capacity(parts.len());
    let mut changed = false;
    let mut i = 0;
    while i < parts.len() {
        let mut applied = None;
        for rule in rules {
            if i + rule.pattern_len > parts.len() {
                continue;
            }
            if (rule.condition)(&parts, i) {
                applied = Some(rule);
                break;
            }
        }

        match applied {
            Some(rule) if rule.pattern_len == 2 => {
                // Absorb both matched parts' text into the preceding
                // same-kind part already pushed to `out`, if there is one;
                // otherwise fold them into a single merged part.
                let a = &parts[i];
                let b = &parts[i + 1];
                if let Some(last) = out.last_mut() {
                    if last.kind == a.kind {
                        last.value.push_str(&a.value);
                        last.value.push_str(&b.value);
                        changed = true;
                        i += rule.pattern_len;
                        continue;
                    }
                }
                out.push(InlinePart {
                    value: format!("{}{}", a.value, b.value),
                    kind: a.kind,
                    children: None,
                    minor: a.minor && b.minor,
                    absorb_level: Some(rule.absorb_level),
                });
                changed = true;
                i += rule.pattern_len;
            }
            Some(rule) => {
                // Single equal absorbed into its preceding change neighbor.
                if let Some(last) = out.last_mut() {
                    last.value.push_str(&parts[i].value);
                    changed = true;
                } else {
                    out.push(parts[i].clone());
                }
                i += rule.pattern_len;
            }
            None => {
                out.push(parts[i].clone());
                i += 1;
            }
        }
    }
    (out, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minor_removed(v: &str) -> InlinePart {
        InlinePart::removed(v).with_minor(true)
    }
    fn minor_added(v: &str) -> InlinePart {
        InlinePart::added(v).with_minor(true)
    }

    #[test]
    fn marks_equal_stop_word_between_changes() {
        let parts = vec![
            InlinePart::removed("copy"),
            InlinePart::equal(" of "),
            InlinePart::added("collection"),
        ];
        let marked = apply_rules(parts, &stop_word_rules(), Mode::MarkOnly);
        assert_eq!(marked[1].absorb_level, Some(AbsorbLevel::Stopword));
        // text untouched
        assert_eq!(marked[1].value, " of ");
    }

    #[test]
    fn marks_single_word_equal_between_large_changes() {
        let parts = vec![
            InlinePart::removed("the quick brown"),
            InlinePart::equal(" fox "),
            InlinePart::added("jumps over now"),
        ];
        let marked = apply_rules(parts, &stop_word_rules(), Mode::MarkOnly);
        assert_eq!(marked[1].absorb_level, Some(AbsorbLevel::Single));
    }

    #[test]
    fn em_dash_guard_does_not_absorb_pure_punctuation_pair() {
        let parts = vec![
            InlinePart::removed("-").with_minor(true),
            minor_removed("the teams"),
            minor_added("teams"),
            InlinePart::added("—").with_minor(true),
        ];
        let marked = apply_rules(parts, &stop_word_rules(), Mode::MarkOnly);
        // neither minor stop-word pair should be marked: adjacent targets
        // are pure punctuation, which the guard excludes.
        assert_eq!(marked[1].absorb_level, None);
        assert_eq!(marked[2].absorb_level, None);
    }

    #[test]
    fn context_stop_word_preserved_next_to_single_word_edit() {
        // equal "of" sits between a change and a change, but the change
        // immediately after it is a single isolated edit followed by a
        // meaningful equal — this should NOT be absorbed.
        let parts = vec![
            InlinePart::removed("a"),
            InlinePart::equal(" of "),
            InlinePart::added("b"),
            InlinePart::equal(" important context here"),
        ];
        let marked = apply_rules(parts, &stop_word_rules(), Mode::MarkOnly);
        assert_eq!(marked[1].absorb_level, None);
    }

    #[test]
    fn no_rule_fires_on_unrelated_sequence() {
        let parts = vec![InlinePart::equal("hello world, nothing to absorb here")];
        let marked = apply_rules(parts.clone(), &stop_word_rules(), Mode::MarkOnly);
        assert_eq!(marked, parts);
    }
}
