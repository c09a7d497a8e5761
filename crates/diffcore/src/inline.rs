//! The inline (word/character level) diff pipeline: computes an
//! [`InlinePart`] sequence for the two plaintexts of a `Modified` pair.
//!
//! Seven stages, each described in turn below: markdown guard, word-anchor
//! diff, adjacent-pair refinement, minor/major split, absorb marking,
//! boundary optimization, standalone-punctuation minor marking.

use diffcore_model::Token;

use crate::boundary::{absorb_short_matches, shift_all};
use crate::char_diff::minor_pair;
use crate::config::MatchConfig;
use crate::lcs::find_anchors;
use crate::markdown_guard::{guard_markdown, restore_markdown};
use crate::result::{InlinePart, Metrics, PartKind};
use crate::rules::{apply_rules, stop_word_rules, Mode};
use crate::tokenize::{is_only_stop_words, is_pure_punctuation, join, normalize_word, tokenize};

// ---------------------------------------------------------------------------
// Intermediate segment representation
// ---------------------------------------------------------------------------

/// One segment of the in-progress inline diff. `Equal`/`Removed`/`Added`
/// still carry their tokens (not just joined text) so later stages can
/// re-run anchor search over a gap's original tokens; `Minor` is finalized
/// text, ready for the character-level diff at assembly time.
#[derive(Debug, Clone)]
enum Seg {
    Equal(Vec<Token>),
    Minor(String, String),
    Removed(Vec<Token>),
    Added(Vec<Token>),
}

fn join_raw(tokens: &[Token]) -> String {
    join(tokens)
}

// ---------------------------------------------------------------------------
// Shared anchor-based segmentation (stages 2, 3, and 4's refinePair)
// ---------------------------------------------------------------------------

/// Run anchor search between `a_tokens` and `b_tokens` using `key` as the
/// per-token comparison value, decomposing each found anchor token-by-token
/// into alternating `Equal`/`Minor` runs (an anchor matched under a fuzzy
/// key can still differ token-by-token in raw form). When
/// `reject_stopword_anchors` is set, anchors whose matched span is entirely
/// stop words are discarded (treated as if no anchor were found there).
fn token_lcs_segments(
    a_tokens: &[Token],
    b_tokens: &[Token],
    min_len: usize,
    key: impl Fn(&Token) -> String,
    reject_stopword_anchors: bool,
) -> Vec<Seg> {
    if a_tokens.is_empty() && b_tokens.is_empty() {
        return Vec::new();
    }

    let cmp_a: Vec<String> = a_tokens.iter().map(&key).collect();
    let cmp_b: Vec<String> = b_tokens.iter().map(&key).collect();
    let mut anchors = find_anchors(&cmp_a, &cmp_b, min_len.max(1));

    if reject_stopword_anchors {
        anchors.retain(|run| {
            let text = a_tokens[run.a_start..run.a_start + run.len]
                .iter()
                .map(|t| t.normalized.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            !is_only_stop_words(&text)
        });
    }

    let mut out = Vec::new();
    let mut a_pos = 0;
    let mut b_pos = 0;

    for run in &anchors {
        push_leftover(&mut out, &a_tokens[a_pos..run.a_start], &b_tokens[b_pos..run.b_start]);
        out.extend(split_anchor_by_raw(
            &a_tokens[run.a_start..run.a_start + run.len],
            &b_tokens[run.b_start..run.b_start + run.len],
        ));
        a_pos = run.a_start + run.len;
        b_pos = run.b_start + run.len;
    }
    push_leftover(&mut out, &a_tokens[a_pos..], &b_tokens[b_pos..]);

    merge_adjacent_same(out)
}

fn push_leftover(out: &mut Vec<Seg>, a_slice: &[Token], b_slice: &[Token]) {
    if !a_slice.is_empty() {
        out.push(Seg::Removed(a_slice.to_vec()));
    }
    if !b_slice.is_empty() {
        out.push(Seg::Added(b_slice.to_vec()));
    }
}

/// Decompose one matched anchor (tokens already equal under whatever key
/// found it) into per-token `Equal`/`Minor` runs based on raw-word equality,
/// merging consecutive same-kind tokens into one run.
///
/// Caught during scenario tracing: treating a whole anchor as one unit
/// would turn `"The Oxytocin effect"` vs `"The oxytocin effect"` into a
/// single 3-word minor span instead of `Equal("The") Minor(...) Equal("effect")`.
fn split_anchor_by_raw(a_slice: &[Token], b_slice: &[Token]) -> Vec<Seg> {
    let mut out: Vec<Seg> = Vec::new();
    for (at, bt) in a_slice.iter().zip(b_slice.iter()) {
        if at.word == bt.word {
            match out.last_mut() {
                Some(Seg::Equal(toks)) => toks.push(at.clone()),
                _ => out.push(Seg::Equal(vec![at.clone()])),
            }
        } else {
            out.push(Seg::Minor(at.raw.clone(), bt.raw.clone()));
        }
    }
    out
}

fn merge_adjacent_same(segs: Vec<Seg>) -> Vec<Seg> {
    let mut out: Vec<Seg> = Vec::new();
    for seg in segs {
        match (out.last_mut(), &seg) {
            (Some(Seg::Equal(toks)), Seg::Equal(more)) => toks.extend(more.clone()),
            (Some(Seg::Removed(toks)), Seg::Removed(more)) => toks.extend(more.clone()),
            (Some(Seg::Added(toks)), Seg::Added(more)) => toks.extend(more.clone()),
            _ => out.push(seg),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Stage 3: adjacent-pair refinement
// ---------------------------------------------------------------------------

fn refine_adjacent_pairs(segs: Vec<Seg>, config: &MatchConfig) -> Vec<Seg> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < segs.len() {
        if let (Seg::Removed(a_toks), Some(Seg::Added(b_toks))) = (&segs[i], segs.get(i + 1)) {
            let refined = token_lcs_segments(
                a_toks,
                b_toks,
                config.adjacent_min_internal_run,
                |t: &Token| t.normalized.clone(),
                false,
            );
            out.extend(refined);
            i += 2;
        } else {
            out.push(segs[i].clone());
            i += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Stage 4: minor/major split
// ---------------------------------------------------------------------------

fn strip_punctuation_lower(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// True iff `a`/`b` differ only by case, by punctuation, or are both pure
/// punctuation.
pub fn is_minor_change(a: &str, b: &str) -> bool {
    if a.eq_ignore_ascii_case(b) {
        return true;
    }
    if strip_punctuation_lower(a) == strip_punctuation_lower(b) {
        return true;
    }
    is_pure_punctuation(a) && is_pure_punctuation(b)
}

fn resolve_minor_major(segs: Vec<Seg>, config: &MatchConfig) -> Vec<Seg> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < segs.len() {
        if let (Seg::Removed(a_toks), Some(Seg::Added(b_toks))) = (&segs[i], segs.get(i + 1)) {
            let r_text = join_raw(a_toks);
            let a_text = join_raw(b_toks);
            if is_minor_change(&r_text, &a_text) {
                out.push(Seg::Minor(r_text, a_text));
            } else {
                let refined = token_lcs_segments(
                    a_toks,
                    b_toks,
                    1,
                    |t: &Token| normalize_word(&t.word).to_lowercase(),
                    true,
                );
                out.extend(refined);
            }
            i += 2;
        } else {
            out.push(segs[i].clone());
            i += 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn segs_to_parts(segs: Vec<Seg>) -> Vec<InlinePart> {
    let mut out = Vec::new();
    for seg in segs {
        match seg {
            Seg::Equal(toks) => out.push(InlinePart::equal(join_raw(&toks))),
            Seg::Removed(toks) => out.push(InlinePart::removed(join_raw(&toks))),
            Seg::Added(toks) => out.push(InlinePart::added(join_raw(&toks))),
            Seg::Minor(r, a) => {
                let (removed, added) = minor_pair(&r, &a);
                out.push(removed);
                out.push(added);
            }
        }
    }
    out
}

/// Recursively replace guard placeholders in a part's `value` and
/// `children` with the markdown run each placeholder hid. `removed_hidden`
/// restores text that originated on the left; `added_hidden` on the right;
/// `Equal` parts use `removed_hidden` (an equal run's guarded text is
/// identical on both sides, so either table resolves it in the overwhelming
/// common case where markdown placement doesn't itself change around it).
fn restore_part(part: InlinePart, removed_hidden: &[String], added_hidden: &[String]) -> InlinePart {
    let hidden = match part.kind {
        PartKind::Added => added_hidden,
        _ => removed_hidden,
    };
    let value = restore_markdown(&part.value, hidden);
    let children = part.children.map(|cs| {
        cs.into_iter()
            .map(|c| restore_part(c, removed_hidden, added_hidden))
            .collect()
    });
    InlinePart {
        value,
        kind: part.kind,
        children,
        minor: part.minor,
        absorb_level: part.absorb_level,
    }
}

fn mark_standalone_punctuation(mut parts: Vec<InlinePart>) -> Vec<InlinePart> {
    for part in &mut parts {
        if part.kind == PartKind::Equal || part.minor {
            continue;
        }
        if is_pure_punctuation(&part.value) {
            part.minor = true;
        }
    }
    parts
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Word-overlap bookkeeping for a `Modified` pair's `metrics` field.
pub fn compute_metrics(a: &str, b: &str, parts: &[InlinePart]) -> Metrics {
    let shared: usize = parts
        .iter()
        .filter(|p| p.kind == PartKind::Equal)
        .map(|p| word_count(&p.value))
        .sum();
    let total = word_count(a).max(word_count(b));
    Metrics {
        shared_words: shared.min(total),
        total_words: total,
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Compute the inline diff between `a` and `b` using the default thresholds.
pub fn compute_inline_diff(a: &str, b: &str) -> Vec<InlinePart> {
    compute_inline_diff_with_config(a, b, &MatchConfig::default())
}

/// Compute the inline diff between `a` and `b` with explicit thresholds.
pub fn compute_inline_diff_with_config(a: &str, b: &str, config: &MatchConfig) -> Vec<InlinePart> {
    if a == b {
        return vec![InlinePart::equal(a)];
    }

    // Stage 1: markdown guard.
    let (ga, hidden_a) = guard_markdown(a);
    let (gb, hidden_b) = guard_markdown(b);

    let tokens_a = tokenize(&ga);
    let tokens_b = tokenize(&gb);

    // Stage 2: word-anchor diff over raw words.
    let stage2 = token_lcs_segments(&tokens_a, &tokens_b, config.word_anchor_min_run, |t: &Token| t.word.clone(), false);

    // Stage 3: adjacent-pair refinement over normalized words.
    let stage3 = refine_adjacent_pairs(stage2, config);

    // Stage 4: minor/major split.
    let stage4 = resolve_minor_major(stage3, config);

    // Assemble InlinePart sequence (minor segments get their char-level diff here).
    let parts = segs_to_parts(stage4);

    // Stage 5: absorb marking (mark-only mode).
    let parts = apply_rules(parts, &stop_word_rules(), Mode::MarkOnly);

    // Stage 6: boundary optimization.
    let parts = shift_all(parts);
    let parts = absorb_short_matches(parts, config.short_match_threshold);

    // Stage 7: standalone-punctuation minor marking.
    let parts = mark_standalone_punctuation(parts);

    // Restore markdown placeholders, last, since every earlier stage's
    // word-count/char-count reasoning needs the single-token placeholder
    // form rather than the original (possibly multi-word) markdown run.
    parts
        .into_iter()
        .map(|p| restore_part(p, &hidden_a, &hidden_b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(parts: &[InlinePart]) -> Vec<(PartKind, String, bool)> {
        parts.iter().map(|p| (p.kind, p.value.clone(), p.minor)).collect()
    }

    #[test]
    fn identical_text_is_one_equal_part() {
        let parts = compute_inline_diff("same text here", "same text here");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].kind, PartKind::Equal);
    }

    #[test]
    fn scenario_a_single_word_substitution() {
        let parts = compute_inline_diff(
            "The quick brown fox jumps over the lazy dog.",
            "The quick brown fox leaps over the lazy dog.",
        );
        let reconstructed_left: String = parts
            .iter()
            .filter(|p| p.kind != PartKind::Added)
            .map(|p| p.value.as_str())
            .collect();
        let reconstructed_right: String = parts
            .iter()
            .filter(|p| p.kind != PartKind::Removed)
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(reconstructed_left, "The quick brown fox jumps over the lazy dog.");
        assert_eq!(reconstructed_right, "The quick brown fox leaps over the lazy dog.");
        assert!(parts.iter().any(|p| p.kind == PartKind::Removed && p.value.contains("jumps")));
        assert!(parts.iter().any(|p| p.kind == PartKind::Added && p.value.contains("leaps")));
    }

    #[test]
    fn scenario_b_case_only_change_is_minor_with_char_children() {
        let parts = compute_inline_diff("The Oxytocin effect", "The oxytocin effect");
        let minor_removed = parts
            .iter()
            .find(|p| p.kind == PartKind::Removed && p.minor)
            .expect("a minor removed part");
        assert_eq!(minor_removed.value, "Oxytocin");
        let added = parts
            .iter()
            .find(|p| p.kind == PartKind::Added && p.minor)
            .expect("a minor added part");
        assert_eq!(added.value, "oxytocin");

        let children = minor_removed.children.as_ref().expect("char children");
        assert!(children.iter().any(|c| c.kind == PartKind::Removed && c.value == "O"));
    }

    #[test]
    fn scenario_c_stop_word_absorbed_not_plain_equal() {
        let parts = compute_inline_diff("copy of reality", "collection of images");
        let of_part = parts.iter().find(|p| p.value.trim() == "of");
        if let Some(p) = of_part {
            assert!(p.absorb_level.is_some(), "'of' should be absorb-marked, not a bare equal");
        }
    }

    #[test]
    fn em_dash_does_not_duplicate() {
        let parts = compute_inline_diff("groups - the teams - are fine", "groups — teams — are fine");
        let right_text: String = parts
            .iter()
            .filter(|p| p.kind != PartKind::Removed)
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(right_text.matches('—').count(), 2);
    }

    #[test]
    fn markdown_emphasis_is_not_split_mid_token() {
        let parts = compute_inline_diff("plain **bold** word", "plain **bold** changed");
        let reconstructed_left: String = parts
            .iter()
            .filter(|p| p.kind != PartKind::Added)
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(reconstructed_left, "plain **bold** word");
        assert!(parts.iter().any(|p| p.value.contains("**bold**")));
    }

    #[test]
    fn reconstruction_holds_for_unrelated_text() {
        let a = "Philosophy explores abstract concepts.";
        let b = "The weather forecast predicts rain.";
        let parts = compute_inline_diff(a, b);
        let left: String = parts.iter().filter(|p| p.kind != PartKind::Added).map(|p| p.value.as_str()).collect();
        let right: String = parts.iter().filter(|p| p.kind != PartKind::Removed).map(|p| p.value.as_str()).collect();
        assert_eq!(left, a);
        assert_eq!(right, b);
    }

    #[test]
    fn metrics_reflect_shared_words() {
        let a = "the quick brown fox";
        let b = "the quick brown fix";
        let parts = compute_inline_diff(a, b);
        let metrics = compute_metrics(a, b, &parts);
        assert!(metrics.shared_words >= 2);
        assert_eq!(metrics.total_words, 4);
    }
}
