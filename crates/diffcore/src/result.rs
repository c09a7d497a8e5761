//! Output types produced by the diff pipeline: the per-block-pair sequence
//! and the inline (word/char level) diff nested inside `Modified` pairs.

use diffcore_model::Block;
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;

// ---------------------------------------------------------------------------
// InlinePart
// ---------------------------------------------------------------------------

/// Role of one inline diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Equal,
    Added,
    Removed,
}

/// Why a non-equal inline part was downgraded to a minor, non-highlighted
/// change by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorbLevel {
    /// The change consists only of stop words.
    Stopword,
    /// The change is a single word substitution absorbed against a much
    /// larger surrounding equal run.
    Single,
}

/// One segment of an inline (word- or character-level) diff.
///
/// `children` holds a character-level sub-diff for a `Removed`/`Added` pair
/// whose surrounding context marked it `minor`; it is `None` for any part
/// that isn't a minor change and for every `Equal` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlinePart {
    pub value: String,
    pub kind: PartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<InlinePart>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub minor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absorb_level: Option<AbsorbLevel>,
}

impl InlinePart {
    pub fn equal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PartKind::Equal,
            children: None,
            minor: false,
            absorb_level: None,
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PartKind::Added,
            children: None,
            minor: false,
            absorb_level: None,
        }
    }

    pub fn removed(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PartKind::Removed,
            children: None,
            minor: false,
            absorb_level: None,
        }
    }

    pub fn with_minor(mut self, minor: bool) -> Self {
        self.minor = minor;
        self
    }

    pub fn with_children(mut self, children: Vec<InlinePart>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_absorb_level(mut self, level: AbsorbLevel) -> Self {
        self.absorb_level = Some(level);
        self
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Word-level overlap bookkeeping for a `Modified` pair, used by callers
/// that want a cheap "how different is this" number without re-walking the
/// inline diff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub shared_words: usize,
    pub total_words: usize,
}

impl Metrics {
    pub fn ratio(&self) -> f64 {
        if self.total_words == 0 {
            1.0
        } else {
            self.shared_words as f64 / self.total_words as f64
        }
    }
}

// ---------------------------------------------------------------------------
// DiffPair
// ---------------------------------------------------------------------------

/// One aligned unit of the side-by-side diff.
///
/// Variants borrow their blocks rather than carrying optional left/right
/// fields: a block never appears as both the left and right side of the same
/// variant, so the shape of each case is expressed directly in the type
/// instead of via `Option` fields that would always (or never) be populated.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffPair<'a> {
    Equal {
        left: &'a Block,
        right: &'a Block,
    },
    Added {
        right: &'a Block,
        moved_from: Option<&'a Block>,
    },
    Removed {
        left: &'a Block,
        moved_to: Option<&'a Block>,
    },
    Modified {
        left: &'a Block,
        right: &'a Block,
        inline: Vec<InlinePart>,
        metrics: Metrics,
    },
    Split {
        /// The single-paragraph block (always the side that was not split).
        original: &'a Block,
        /// The two blocks realizing `original`'s content on the other side.
        first_part: &'a Block,
        second_part: &'a Block,
        /// Byte offset into `original.text` where the split falls, or
        /// `None` when `first_part`'s text couldn't be located inside it
        /// (the fallback rendering joins `first_part`/`second_part`
        /// directly instead).
        split_point: Option<usize>,
    },
}

impl<'a> DiffPair<'a> {
    /// The left-side block contributing to left-side text reconstruction,
    /// if any. `Added` contributes nothing on the left.
    pub fn left_block(&self) -> Option<&'a Block> {
        match self {
            DiffPair::Equal { left, .. } => Some(left),
            DiffPair::Removed { left, .. } => Some(left),
            DiffPair::Modified { left, .. } => Some(left),
            DiffPair::Split { original, .. } => Some(original),
            DiffPair::Added { .. } => None,
        }
    }

    /// The right-side block(s) contributing to right-side text
    /// reconstruction. `Split` contributes two blocks; every other variant
    /// contributes at most one.
    pub fn right_blocks(&self) -> Vec<&'a Block> {
        match self {
            DiffPair::Equal { right, .. } => vec![right],
            DiffPair::Added { right, .. } => vec![right],
            DiffPair::Modified { right, .. } => vec![right],
            DiffPair::Split {
                first_part,
                second_part,
                ..
            } => vec![first_part, second_part],
            DiffPair::Removed { .. } => vec![],
        }
    }

    /// Render the right side of a `Split` pair as an inline sequence with a
    /// pilcrow marker at the split point. `None` for every other variant.
    pub fn render_split_right(&self) -> Option<Vec<InlinePart>> {
        let DiffPair::Split {
            original,
            first_part,
            second_part,
            split_point,
        } = self
        else {
            return None;
        };

        if let Some(pivot) = split_point {
            let text = &original.text;
            let (before, after) = text.split_at((*pivot).min(text.len()));
            return Some(vec![
                InlinePart::equal(before),
                InlinePart::added("\u{b6} "),
                InlinePart::equal(after),
            ]);
        }

        Some(vec![
            InlinePart::equal(first_part.text.trim().to_string()),
            InlinePart::added("\n\u{b6} "),
            InlinePart::equal(second_part.text.clone()),
        ])
    }

    /// Render an `Added` pair that the move detector marked as moved: a
    /// pilcrow placeholder standing in for text already shown as equal
    /// inside its move source's pair. `None` for every other case (an
    /// `Added` pair with no recorded move source, or any other variant).
    pub fn move_placeholder(&self) -> Option<Vec<InlinePart>> {
        let DiffPair::Added { moved_from: Some(_), .. } = self else {
            return None;
        };
        Some(vec![
            InlinePart::added("\u{b6} "),
            InlinePart::equal("(content shown above)"),
        ])
    }
}

// ---------------------------------------------------------------------------
// Render hints (supplemental feature; see SPEC_FULL.md §4.13)
// ---------------------------------------------------------------------------

/// Cheap, derived rendering guidance a caller can use without re-deriving it
/// from the raw pair (e.g. stacking a long paragraph instead of placing it
/// side by side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderHint {
    pub is_long_paragraph: bool,
    pub prefer_side_by_side: bool,
}

/// Derive [`RenderHint`] for a pair using `config`'s size thresholds.
pub fn render_hint(pair: &DiffPair, config: &MatchConfig) -> RenderHint {
    let word_count = |s: &str| s.split_whitespace().count();

    let max_words = match pair {
        DiffPair::Equal { left, right } => word_count(&left.text).max(word_count(&right.text)),
        DiffPair::Added { right, .. } => word_count(&right.text),
        DiffPair::Removed { left, .. } => word_count(&left.text),
        DiffPair::Modified { left, right, .. } => {
            word_count(&left.text).max(word_count(&right.text))
        }
        DiffPair::Split {
            original,
            first_part,
            second_part,
            ..
        } => word_count(&original.text)
            .max(word_count(&first_part.text) + word_count(&second_part.text)),
    };

    let shared = match pair {
        DiffPair::Modified { metrics, .. } => metrics.shared_words,
        DiffPair::Equal { .. } => max_words,
        _ => 0,
    };

    RenderHint {
        is_long_paragraph: max_words >= config.long_paragraph_words,
        prefer_side_by_side: shared >= config.min_shared_words_for_side_by_side,
    }
}
