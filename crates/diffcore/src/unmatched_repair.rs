//! Unmatched re-pair: scans runs of consecutive `Removed`/`Added` blocks the
//! block matcher gave up on and looks for pairs that share enough words to
//! be a `Modified` pair instead of an independent delete+insert.
//!
//! Grounded in the same greedy best-first pairing shape used across the
//! pack for line/paragraph matching: score every candidate pair, sort by
//! descending score, then take greedily while skipping anything whose
//! partner is already spoken for.

use std::collections::HashSet;

use diffcore_model::Block;

use crate::config::MatchConfig;
use crate::lcs::find_anchors;
use crate::tokenize::tokenize;

/// Total length of all word-level anchor runs shared between `a` and `b`,
/// compared on normalized tokens. Unlike bigram similarity this rewards
/// long exact phrase overlaps specifically, which is what distinguishes "a
/// paragraph that moved/was rephrased" from "an unrelated paragraph that
/// happens to share some common words".
pub fn shared_word_run_score(a: &str, b: &str) -> usize {
    let a_tokens: Vec<String> = tokenize(a).into_iter().map(|t| t.normalized).collect();
    let b_tokens: Vec<String> = tokenize(b).into_iter().map(|t| t.normalized).collect();
    find_anchors(&a_tokens, &b_tokens, 1)
        .iter()
        .map(|run| run.len)
        .sum()
}

/// Greedily pair `removed` blocks with `added` blocks by descending shared
/// word-run score, keeping only pairs at or above
/// `config.min_shared_for_pairing`. Returns `(removed_index, added_index)`
/// pairs; every index appears at most once.
pub fn pair_unmatched(removed: &[&Block], added: &[&Block], config: &MatchConfig) -> Vec<(usize, usize)> {
    let mut candidates: Vec<(usize, usize, usize)> = Vec::new();
    for (ri, r) in removed.iter().enumerate() {
        for (ai, a) in added.iter().enumerate() {
            let score = shared_word_run_score(&r.text, &a.text);
            if score >= config.min_shared_for_pairing {
                candidates.push((ri, ai, score));
            }
        }
    }
    candidates.sort_by(|a, b| b.2.cmp(&a.2));

    let mut used_removed = HashSet::new();
    let mut used_added = HashSet::new();
    let mut pairs = Vec::new();

    for (ri, ai, _) in candidates {
        if used_removed.contains(&ri) || used_added.contains(&ai) {
            continue;
        }
        used_removed.insert(ri);
        used_added.insert(ai);
        pairs.push((ri, ai));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffcore_model::BlockKind;

    fn block(text: &str) -> Block {
        Block::new(BlockKind::Paragraph, text)
    }

    #[test]
    fn shared_run_score_counts_overlap() {
        let score = shared_word_run_score(
            "the quick brown fox jumps over the lazy dog",
            "the quick brown fox leaps over the lazy dog",
        );
        assert!(score >= 5, "expected substantial overlap, got {score}");
    }

    #[test]
    fn unrelated_text_scores_zero() {
        assert_eq!(shared_word_run_score("alpha beta gamma", "delta epsilon zeta"), 0);
    }

    #[test]
    fn pairs_rewritten_paragraph() {
        let removed_block = block("the quick brown fox jumps over the lazy dog in the meadow");
        let added_block = block("the quick brown fox leaps over the lazy dog in the meadow");
        let unrelated_removed = block("completely different content about spreadsheets");
        let unrelated_added = block("totally unrelated discussion of weather patterns");

        let removed = vec![&removed_block, &unrelated_removed];
        let added = vec![&unrelated_added, &added_block];

        let config = MatchConfig::default();
        let pairs = pair_unmatched(&removed, &added, &config);
        assert_eq!(pairs, vec![(0, 1)]);
    }

    #[test]
    fn below_threshold_pairs_are_dropped() {
        let removed_block = block("a short note");
        let added_block = block("a totally different short note");
        let removed = vec![&removed_block];
        let added = vec![&added_block];
        let mut config = MatchConfig::default();
        config.min_shared_for_pairing = 10;
        assert!(pair_unmatched(&removed, &added, &config).is_empty());
    }
}
