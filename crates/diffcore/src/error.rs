//! Errors raised by the debug-only invariant validator.
//!
//! The diff pipeline itself (`diff_blocks`, `compute_inline_diff`) is total:
//! it never fails on well-formed input. This error type belongs to
//! [`crate::validate::validate_pairs`], a separate check callers can run in
//! debug builds or tests to catch a pipeline bug that breaks one of the
//! text-preservation or structural invariants.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("left text reconstructed from pairs does not match the original left document")]
    LeftTextNotPreserved,

    #[error("right text reconstructed from pairs does not match the original right document")]
    RightTextNotPreserved,

    #[error("block {0} appears as the left side of more than one pair")]
    LeftBlockReused(String),

    #[error("block {0} appears as the right side of more than one pair")]
    RightBlockReused(String),

    #[error("Modified pair has empty inline diff for non-identical blocks {0} / {1}")]
    ModifiedPairMissingInlineDiff(String, String),

    #[error("inline parts for pair {0} do not reconstruct the pair's left/right text")]
    InlineDiffNotPreserved(String),

    #[error("moved block {0} does not appear as equal text inside its recorded move source")]
    MovedTextNotPreserved(String),

    #[error("minor inline pair for pair {0} / {1} has mismatched equal children between its removed and added sides")]
    MinorPairChildrenMismatch(String, String),
}
