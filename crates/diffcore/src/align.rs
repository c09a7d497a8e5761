//! Block matcher: aligns two flat block lists into matched pairs plus
//! unmatched runs, using a similarity-weighted LCS.
//!
//! Unlike a textual LCS, a "match" here isn't character equality but
//! `similarity(a, b) >= config.block_sim_threshold`; the DP score at a
//! diagonal step is `1 + similarity(a, b)`, so the aligner first maximizes
//! the number of matched pairs, with similarity only breaking ties between
//! alignments of equal match count.

use diffcore_model::Block;

use crate::config::MatchConfig;
use crate::similarity::{similarity_cached, BigramCache};

/// The outcome of aligning one position in the left or right document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockMatch {
    /// `left[left]` and `right[right]` are paired, with the given bigram
    /// similarity. Identical text still comes through here (`similarity ==
    /// 1.0`); callers distinguish `Equal` from `Modified` on that basis.
    Matched {
        left: usize,
        right: usize,
        similarity: f64,
    },
    /// A left block with no corresponding right block.
    Removed { left: usize },
    /// A right block with no corresponding left block.
    Added { right: usize },
}

/// Bigram Dice similarity between two blocks' text, with an identity
/// short-circuit.
pub fn block_similarity(a: &Block, b: &Block) -> f64 {
    crate::similarity::similarity(&a.text, &b.text)
}

/// Align `left` against `right`, returning a `BlockMatch` sequence ordered
/// so that the left-document and right-document positions it touches are
/// each non-decreasing (standard LCS traceback order).
///
/// On ties in the traceback (neither extending the match run nor skipping
/// one side dominates), the aligner consumes a left-document block first —
/// i.e. "steps left" — before trying the right. This mirrors a left-biased
/// LCS backtrack and is a deliberate, load-bearing tie-break: changing it
/// changes which block absorbs an ambiguous insertion/deletion.
pub fn match_blocks(left: &[Block], right: &[Block], config: &MatchConfig) -> Vec<BlockMatch> {
    let n = left.len();
    let m = right.len();

    if n == 0 && m == 0 {
        return Vec::new();
    }

    let left_cache: Vec<BigramCache> = left.iter().map(|b| BigramCache::new(&b.text)).collect();
    let right_cache: Vec<BigramCache> = right.iter().map(|b| BigramCache::new(&b.text)).collect();

    let mut sim = vec![vec![0f64; m]; n];
    for i in 0..n {
        for j in 0..m {
            sim[i][j] = if left[i].text == right[j].text {
                1.0
            } else {
                similarity_cached(&left_cache[i], &right_cache[j])
            };
        }
    }

    // dp[i][j] = best achievable score aligning left[i..] with right[j..],
    // where a diagonal step scores `1 + sim[i][j]`: the `1` maximizes match
    // *count* first, with `sim` only breaking ties between equally-long
    // alignments. Filled over suffixes so the forward traceback below can
    // read off the optimal path directly.
    let mut dp = vec![vec![0f64; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let skip_left = dp[i + 1][j];
            let skip_right = dp[i][j + 1];
            let mut best = skip_left.max(skip_right);
            if sim[i][j] >= config.block_sim_threshold {
                best = best.max(dp[i + 1][j + 1] + 1.0 + sim[i][j]);
            }
            dp[i][j] = best;
        }
    }

    let mut out = Vec::with_capacity(n + m);
    let mut i = 0;
    let mut j = 0;
    while i < n && j < m {
        let diagonal_ok = sim[i][j] >= config.block_sim_threshold;
        let diagonal_value = if diagonal_ok {
            dp[i + 1][j + 1] + 1.0 + sim[i][j]
        } else {
            f64::NEG_INFINITY
        };

        if diagonal_ok && diagonal_value == dp[i][j] {
            out.push(BlockMatch::Matched {
                left: i,
                right: j,
                similarity: sim[i][j],
            });
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            out.push(BlockMatch::Removed { left: i });
            i += 1;
        } else {
            out.push(BlockMatch::Added { right: j });
            j += 1;
        }
    }
    while i < n {
        out.push(BlockMatch::Removed { left: i });
        i += 1;
    }
    while j < m {
        out.push(BlockMatch::Added { right: j });
        j += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffcore_model::BlockKind;

    fn blocks(texts: &[&str]) -> Vec<Block> {
        texts
            .iter()
            .map(|t| Block::new(BlockKind::Paragraph, *t))
            .collect()
    }

    #[test]
    fn identical_sequences_all_match() {
        let left = blocks(&["one", "two", "three"]);
        let right = blocks(&["one", "two", "three"]);
        let config = MatchConfig::default();
        let matches = match_blocks(&left, &right, &config);
        assert_eq!(matches.len(), 3);
        assert!(matches
            .iter()
            .all(|m| matches!(m, BlockMatch::Matched { similarity, .. } if *similarity == 1.0)));
    }

    #[test]
    fn pure_insertion_is_all_added() {
        let left: Vec<Block> = vec![];
        let right = blocks(&["brand new paragraph of text"]);
        let config = MatchConfig::default();
        let matches = match_blocks(&left, &right, &config);
        assert_eq!(matches, vec![BlockMatch::Added { right: 0 }]);
    }

    #[test]
    fn pure_deletion_is_all_removed() {
        let left = blocks(&["an old paragraph of text"]);
        let right: Vec<Block> = vec![];
        let config = MatchConfig::default();
        let matches = match_blocks(&left, &right, &config);
        assert_eq!(matches, vec![BlockMatch::Removed { left: 0 }]);
    }

    #[test]
    fn both_empty_yields_nothing() {
        let left: Vec<Block> = vec![];
        let right: Vec<Block> = vec![];
        let config = MatchConfig::default();
        assert!(match_blocks(&left, &right, &config).is_empty());
    }

    #[test]
    fn similar_paragraph_matches_as_modified_candidate() {
        let left = blocks(&["the quick brown fox jumps over the lazy dog"]);
        let right = blocks(&["the quick brown fox jumped over the lazy dog"]);
        let config = MatchConfig::default();
        let matches = match_blocks(&left, &right, &config);
        assert_eq!(matches.len(), 1);
        match matches[0] {
            BlockMatch::Matched { similarity, .. } => assert!(similarity > 0.8),
            other => panic!("expected Matched, got {other:?}"),
        }
    }

    #[test]
    fn insertion_in_the_middle_keeps_surrounding_matches() {
        let left = blocks(&["first paragraph here", "third paragraph here"]);
        let right = blocks(&[
            "first paragraph here",
            "second paragraph inserted",
            "third paragraph here",
        ]);
        let config = MatchConfig::default();
        let matches = match_blocks(&left, &right, &config);
        assert_eq!(
            matches,
            vec![
                BlockMatch::Matched { left: 0, right: 0, similarity: 1.0 },
                BlockMatch::Added { right: 1 },
                BlockMatch::Matched { left: 1, right: 2, similarity: 1.0 },
            ]
        );
    }

    #[test]
    fn completely_dissimilar_blocks_are_not_matched() {
        let left = blocks(&["alpha beta gamma delta"]);
        let right = blocks(&["zulu yankee xray whiskey"]);
        let config = MatchConfig::default();
        let matches = match_blocks(&left, &right, &config);
        assert_eq!(
            matches,
            vec![
                BlockMatch::Removed { left: 0 },
                BlockMatch::Added { right: 0 },
            ]
        );
    }
}
