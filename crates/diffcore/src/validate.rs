//! Debug-only invariant validator.
//!
//! Not on the hot path: `diff_blocks` never calls this itself. Call it from
//! tests or from a debug assertion at the call site if you want to catch a
//! pipeline bug that silently drops or duplicates a block, or produces an
//! inline diff that doesn't reconstruct the text it claims to.

use diffcore_model::{Block, BlockId};

use crate::error::InvariantViolation;
use crate::result::{DiffPair, InlinePart, PartKind};

/// Check every invariant from the data model against a complete pair
/// sequence for one `(left, right)` document pair.
pub fn validate_pairs(
    left: &[Block],
    right: &[Block],
    pairs: &[DiffPair],
) -> Result<(), InvariantViolation> {
    check_side(left, pairs, Side::Left)?;
    check_side(right, pairs, Side::Right)?;
    check_modified_inline_diffs(pairs)?;
    check_minor_pair_symmetry(pairs)?;
    check_moved_pairs(pairs)?;
    Ok(())
}

enum Side {
    Left,
    Right,
}

fn check_side(blocks: &[Block], pairs: &[DiffPair], side: Side) -> Result<(), InvariantViolation> {
    let mut seen = std::collections::HashSet::new();
    let mut reconstructed = Vec::new();

    for pair in pairs {
        let contributed: Vec<&Block> = match side {
            Side::Left => pair.left_block().into_iter().collect(),
            Side::Right => pair.right_blocks(),
        };
        for block in contributed {
            if !seen.insert(block.id) {
                return Err(match side {
                    Side::Left => InvariantViolation::LeftBlockReused(block.id.to_string()),
                    Side::Right => InvariantViolation::RightBlockReused(block.id.to_string()),
                });
            }
            reconstructed.push(block.id);
        }
    }

    let expected: Vec<BlockId> = blocks.iter().map(|b| b.id).collect();
    if reconstructed != expected {
        return Err(match side {
            Side::Left => InvariantViolation::LeftTextNotPreserved,
            Side::Right => InvariantViolation::RightTextNotPreserved,
        });
    }

    Ok(())
}

fn check_modified_inline_diffs(pairs: &[DiffPair]) -> Result<(), InvariantViolation> {
    for pair in pairs {
        let DiffPair::Modified {
            left,
            right,
            inline,
            ..
        } = pair
        else {
            continue;
        };

        if left.text != right.text && inline.is_empty() {
            return Err(InvariantViolation::ModifiedPairMissingInlineDiff(
                left.id.to_string(),
                right.id.to_string(),
            ));
        }

        let left_reconstructed: String = inline
            .iter()
            .filter(|p| p.kind != PartKind::Added)
            .map(|p| p.value.as_str())
            .collect();
        let right_reconstructed: String = inline
            .iter()
            .filter(|p| p.kind != PartKind::Removed)
            .map(|p| p.value.as_str())
            .collect();

        if left_reconstructed != left.text || right_reconstructed != right.text {
            return Err(InvariantViolation::InlineDiffNotPreserved(
                left.id.to_string(),
            ));
        }
    }
    Ok(())
}

/// Concatenated text of a minor part's `Equal` children, or empty if it
/// carries none (e.g. a wholly-removed or wholly-added minor span).
fn equal_children_text(part: &InlinePart) -> String {
    part.children
        .iter()
        .flatten()
        .filter(|c| c.kind == PartKind::Equal)
        .map(|c| c.value.as_str())
        .collect()
}

/// Check invariant 3 (§3) / universal property 5 (§8): for every minor
/// `(removed, added)` inline pair with character children, the concatenated
/// `Equal` children must render identical visible text on both sides. Minor
/// pairs are produced back-to-back (removed immediately followed by added;
/// see `char_diff::minor_pair` and its call site in `inline.rs`), so this
/// scans each `Modified` pair's inline sequence for adjacent
/// minor-removed/minor-added parts that both carry `children`.
fn check_minor_pair_symmetry(pairs: &[DiffPair]) -> Result<(), InvariantViolation> {
    for pair in pairs {
        let DiffPair::Modified { left, right, inline, .. } = pair else {
            continue;
        };

        for window in inline.windows(2) {
            let (removed, added) = (&window[0], &window[1]);
            if removed.kind != PartKind::Removed || added.kind != PartKind::Added {
                continue;
            }
            if !removed.minor || !added.minor {
                continue;
            }
            if removed.children.is_none() || added.children.is_none() {
                continue;
            }
            if equal_children_text(removed) != equal_children_text(added) {
                return Err(InvariantViolation::MinorPairChildrenMismatch(
                    left.id.to_string(),
                    right.id.to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Check property #2's move clause: a moved `Added` pair's text must appear
/// as equal text inside the pair recorded as its move source, whether that
/// source is a `Removed` pair (whole-block move) or a `Modified` pair (the
/// source's recomputed inline diff per §4.9).
fn check_moved_pairs(pairs: &[DiffPair]) -> Result<(), InvariantViolation> {
    for pair in pairs {
        let DiffPair::Added {
            right,
            moved_from: Some(source),
        } = pair
        else {
            continue;
        };

        let has_removed_source = pairs.iter().any(|p| {
            matches!(
                p,
                DiffPair::Removed { left, moved_to: Some(dest) }
                    if left.id == source.id && dest.id == right.id
            )
        });
        if has_removed_source {
            continue;
        }

        let has_modified_source = pairs.iter().any(|p| {
            let DiffPair::Modified { left, inline, .. } = p else {
                return false;
            };
            if left.id != source.id {
                return false;
            }
            let equal_text: String = inline
                .iter()
                .filter(|part| part.kind == PartKind::Equal)
                .map(|part| part.value.as_str())
                .collect();
            equal_text.contains(right.text.trim())
        });

        if !has_modified_source {
            return Err(InvariantViolation::MovedTextNotPreserved(right.id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffcore_model::BlockKind;

    fn block(text: &str) -> Block {
        Block::new(BlockKind::Paragraph, text)
    }

    #[test]
    fn equal_only_sequence_validates() {
        let l = block("hello");
        let r = block("hello");
        let pairs = vec![DiffPair::Equal { left: &l, right: &r }];
        assert!(validate_pairs(&[l.clone()], &[r.clone()], &pairs).is_ok());
    }

    #[test]
    fn missing_block_fails_left_preservation() {
        let l1 = block("hello");
        let l2 = block("world");
        let r = block("hello");
        let pairs = vec![DiffPair::Equal { left: &l1, right: &r }];
        let err = validate_pairs(&[l1.clone(), l2.clone()], &[r.clone()], &pairs).unwrap_err();
        assert_eq!(err, InvariantViolation::LeftTextNotPreserved);
    }

    #[test]
    fn duplicated_left_block_is_rejected() {
        let l = block("hello");
        let r1 = block("hello");
        let r2 = block("hello again");
        let pairs = vec![
            DiffPair::Equal { left: &l, right: &r1 },
            DiffPair::Removed {
                left: &l,
                moved_to: None,
            },
        ];
        let err = validate_pairs(&[l.clone()], &[r1.clone(), r2.clone()], &pairs);
        assert!(err.is_err());
    }

    #[test]
    fn modified_pair_requires_inline_diff() {
        let l = block("hello world");
        let r = block("hello there");
        let pairs = vec![DiffPair::Modified {
            left: &l,
            right: &r,
            inline: vec![],
            metrics: crate::result::Metrics {
                shared_words: 1,
                total_words: 2,
            },
        }];
        let err = validate_pairs(&[l.clone()], &[r.clone()], &pairs).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::ModifiedPairMissingInlineDiff(l.id.to_string(), r.id.to_string())
        );
    }

    #[test]
    fn modified_pair_with_consistent_inline_diff_validates() {
        use crate::result::InlinePart;
        let l = block("hello world");
        let r = block("hello there");
        let inline = vec![
            InlinePart::equal("hello "),
            InlinePart::removed("world"),
            InlinePart::added("there"),
        ];
        let pairs = vec![DiffPair::Modified {
            left: &l,
            right: &r,
            inline,
            metrics: crate::result::Metrics {
                shared_words: 1,
                total_words: 2,
            },
        }];
        assert!(validate_pairs(&[l.clone()], &[r.clone()], &pairs).is_ok());
    }

    #[test]
    fn minor_pair_with_matching_equal_children_validates() {
        use crate::char_diff::minor_pair;
        let l = block("Oxytocin effect");
        let r = block("oxytocin effect");
        let (removed, added) = minor_pair("Oxytocin", "oxytocin");
        let inline = vec![removed, added, crate::result::InlinePart::equal(" effect")];
        let pairs = vec![DiffPair::Modified {
            left: &l,
            right: &r,
            inline,
            metrics: crate::result::Metrics {
                shared_words: 1,
                total_words: 2,
            },
        }];
        assert!(validate_pairs(&[l.clone()], &[r.clone()], &pairs).is_ok());
    }

    #[test]
    fn minor_pair_with_mismatched_equal_children_is_rejected() {
        use crate::result::{InlinePart, PartKind};
        let l = block("Oxytocin");
        let r = block("oxytocin");
        let removed = InlinePart {
            value: "Oxytocin".to_string(),
            kind: PartKind::Removed,
            children: Some(vec![InlinePart::equal("xytocin")]),
            minor: true,
            absorb_level: None,
        };
        let added = InlinePart {
            value: "oxytocin".to_string(),
            kind: PartKind::Added,
            children: Some(vec![InlinePart::equal("xytocyn")]),
            minor: true,
            absorb_level: None,
        };
        let inline = vec![removed, added];
        let pairs = vec![DiffPair::Modified {
            left: &l,
            right: &r,
            inline,
            metrics: crate::result::Metrics {
                shared_words: 1,
                total_words: 2,
            },
        }];
        let err = validate_pairs(&[l.clone()], &[r.clone()], &pairs).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::MinorPairChildrenMismatch(l.id.to_string(), r.id.to_string())
        );
    }
}
