//! Side-by-side rich diff engine core.
//!
//! Pipeline: [`align`] (block matcher) -> [`repair`] (re-pair optimizer) ->
//! [`unmatched_repair`] -> [`movesplit`] (move/split detector), with
//! [`inline`] run over every `Modified` pair's plaintexts. [`pipeline`] wires
//! the stages together behind the public [`diff_blocks`] entry point;
//! [`validate`] is the debug-only invariant checker from spec §8.

pub mod align;
pub mod boundary;
pub mod char_diff;
pub mod config;
pub mod error;
pub mod inline;
pub mod lcs;
pub mod markdown_guard;
pub mod movesplit;
pub mod pipeline;
pub mod repair;
pub mod result;
pub mod rules;
pub mod similarity;
pub mod tokenize;
pub mod unmatched_repair;
pub mod validate;

pub use config::MatchConfig;
pub use error::InvariantViolation;
pub use inline::{compute_inline_diff, compute_inline_diff_with_config};
pub use pipeline::diff_blocks;
pub use result::{AbsorbLevel, DiffPair, InlinePart, Metrics, PartKind, RenderHint};
