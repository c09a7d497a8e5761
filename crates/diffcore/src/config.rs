//! Tunable thresholds for the diff pipeline, grouped behind one struct so
//! callers can reach for a named preset instead of hand-picking numbers.

use diffcore_model::error::ModelError;

/// Thresholds consulted at every stage of the pipeline, from block matching
/// down to move detection. Field names match the constant each threshold
/// plays the role of in the component that reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    /// Minimum block-pair similarity to consider a diagonal step (match) in
    /// the block matcher's LCS table.
    pub block_sim_threshold: f64,
    /// Similarity at or above which a matched block pair is emitted as
    /// `Equal` rather than `Modified`. Deliberately looser than a strict
    /// `== 1.0` check: near-identical text (e.g. differing only in a
    /// trailing space the parser didn't canonicalize away) still renders as
    /// unchanged.
    pub exact_threshold: f64,
    /// Minimum similarity improvement a re-pair swap must deliver (n = 2) to
    /// be applied.
    pub repair_improvement_threshold: f64,
    /// Minimum shared-word-run score for the unmatched re-pair stage to
    /// convert a `Removed`/`Added` pair into `Modified`.
    pub min_shared_for_pairing: usize,
    /// Minimum run length for the word-anchor stage of the inline pipeline.
    pub word_anchor_min_run: usize,
    /// Minimum run length accepted when refining the gap between two
    /// adjacent word anchors.
    pub adjacent_min_internal_run: usize,
    /// Matched inline runs at or below this many words are candidates for
    /// absorption into the surrounding change during boundary optimization.
    pub short_match_threshold: usize,
    /// Minimum shared-word-run score for two blocks to be considered a
    /// move rather than an independent add/remove.
    pub min_shared_for_moved: usize,
    /// Minimum block text length (characters) for move detection to run at
    /// all; guards against spurious moves between very short blocks.
    pub min_segment_length_for_moved: usize,
    /// Similarity threshold above which a combined two-block text is judged
    /// to be a split of a single source paragraph.
    pub split_similarity_threshold: f64,
    /// Paragraphs at or above this word count are treated as "long" by
    /// render hints (see [`crate::result::RenderHint`]).
    pub long_paragraph_words: usize,
    /// Minimum shared-word-run score for a pair to be flagged as a good
    /// candidate for side-by-side rendering rather than stacked rendering.
    pub min_shared_words_for_side_by_side: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            block_sim_threshold: 0.4,
            exact_threshold: 0.99,
            repair_improvement_threshold: 0.1,
            min_shared_for_pairing: 5,
            word_anchor_min_run: 3,
            adjacent_min_internal_run: 1,
            short_match_threshold: 3,
            min_shared_for_moved: 8,
            min_segment_length_for_moved: 30,
            split_similarity_threshold: 0.95,
            long_paragraph_words: 40,
            min_shared_words_for_side_by_side: 4,
        }
    }
}

impl MatchConfig {
    /// Tighter thresholds: fewer, higher-confidence matches. Good for
    /// documents where false "modified" pairings are costlier than missed
    /// ones (e.g. legal or contractual prose).
    pub fn strict() -> Self {
        Self {
            block_sim_threshold: 0.45,
            repair_improvement_threshold: 0.15,
            min_shared_for_pairing: 8,
            min_shared_for_moved: 12,
            min_segment_length_for_moved: 40,
            split_similarity_threshold: 0.97,
            ..Self::default()
        }
    }

    /// Looser thresholds: more aggressive matching, more moves and splits
    /// surfaced at the cost of occasional false positives.
    pub fn loose() -> Self {
        Self {
            block_sim_threshold: 0.2,
            repair_improvement_threshold: 0.05,
            min_shared_for_pairing: 3,
            min_shared_for_moved: 5,
            min_segment_length_for_moved: 20,
            split_similarity_threshold: 0.9,
            ..Self::default()
        }
    }

    /// Reject configs with thresholds outside sensible ranges. Called by
    /// callers that accept configuration from the outside (e.g. deserialized
    /// from JSON) rather than from one of the constructors above.
    pub fn validate(&self) -> Result<(), ModelError> {
        let ratios = [
            ("block_sim_threshold", self.block_sim_threshold),
            ("exact_threshold", self.exact_threshold),
            ("repair_improvement_threshold", self.repair_improvement_threshold),
            ("split_similarity_threshold", self.split_similarity_threshold),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ModelError::InvalidInput(format!(
                    "{name} must be within [0.0, 1.0], got {value}"
                )));
            }
        }

        let counts = [
            ("min_shared_for_pairing", self.min_shared_for_pairing),
            ("word_anchor_min_run", self.word_anchor_min_run),
            ("adjacent_min_internal_run", self.adjacent_min_internal_run),
            ("short_match_threshold", self.short_match_threshold),
            ("min_shared_for_moved", self.min_shared_for_moved),
            ("min_segment_length_for_moved", self.min_segment_length_for_moved),
            ("long_paragraph_words", self.long_paragraph_words),
            (
                "min_shared_words_for_side_by_side",
                self.min_shared_words_for_side_by_side,
            ),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ModelError::InvalidInput(format!("{name} must be nonzero")));
            }
        }

        Ok(())
    }
}
