//! Top-level orchestration: chains the block matcher, re-pair optimizer,
//! unmatched re-pair, and move/split detector into the single
//! `left blocks, right blocks -> DiffPair sequence` entry point callers use.

use diffcore_model::Block;

use crate::align::{match_blocks, BlockMatch};
use crate::config::MatchConfig;
use crate::inline::{compute_inline_diff_with_config, compute_metrics};
use crate::movesplit::detect_moves_and_splits;
use crate::repair::repair_run;
use crate::result::DiffPair;
use crate::unmatched_repair::pair_unmatched;

/// Diff `left` against `right`, producing the ordered side-by-side sequence.
///
/// Five passes, in order: block matching, initial pair construction (the
/// `Equal`/`Modified` split on `config.exact_threshold`), the re-pair
/// optimizer over contiguous `Modified` runs, unmatched re-pair over
/// contiguous `Removed`/`Added` runs, and finally move/split detection.
pub fn diff_blocks<'a>(left: &'a [Block], right: &'a [Block], config: &MatchConfig) -> Vec<DiffPair<'a>> {
    let matches = match_blocks(left, right, config);
    log::debug!("pipeline: block matcher produced {} entries", matches.len());

    let pairs = build_initial_pairs(left, right, &matches, config);
    let pairs = apply_repair_optimizer(pairs, left, right, config);
    let pairs = apply_unmatched_repair(pairs, config);
    let pairs = detect_moves_and_splits(pairs, config);

    log::debug!("pipeline: final sequence has {} pairs", pairs.len());
    pairs
}

// ---------------------------------------------------------------------------
// Initial pair construction
// ---------------------------------------------------------------------------

fn build_initial_pairs<'a>(
    left: &'a [Block],
    right: &'a [Block],
    matches: &[BlockMatch],
    config: &MatchConfig,
) -> Vec<DiffPair<'a>> {
    matches
        .iter()
        .map(|m| match *m {
            BlockMatch::Matched { left: li, right: ri, similarity } => {
                let l = &left[li];
                let r = &right[ri];
                if similarity >= config.exact_threshold {
                    DiffPair::Equal { left: l, right: r }
                } else {
                    let inline = compute_inline_diff_with_config(&l.text, &r.text, config);
                    let metrics = compute_metrics(&l.text, &r.text, &inline);
                    DiffPair::Modified { left: l, right: r, inline, metrics }
                }
            }
            BlockMatch::Removed { left: li } => DiffPair::Removed { left: &left[li], moved_to: None },
            BlockMatch::Added { right: ri } => DiffPair::Added { right: &right[ri], moved_from: None },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Re-pair optimizer pass
// ---------------------------------------------------------------------------

/// Find maximal runs of consecutive `Modified` pairs and hand each run to
/// [`repair_run`]; a run that yields a better permutation gets its `right`
/// assignments reshuffled and its inline diffs recomputed.
fn apply_repair_optimizer<'a>(
    pairs: Vec<DiffPair<'a>>,
    _left: &'a [Block],
    _right: &'a [Block],
    config: &MatchConfig,
) -> Vec<DiffPair<'a>> {
    let mut pairs = pairs;
    let mut i = 0;
    while i < pairs.len() {
        if !matches!(pairs[i], DiffPair::Modified { .. }) {
            i += 1;
            continue;
        }
        let run_start = i;
        let mut run_end = i + 1;
        while run_end < pairs.len() && matches!(pairs[run_end], DiffPair::Modified { .. }) {
            run_end += 1;
        }

        if run_end - run_start >= 2 {
            let lefts: Vec<&Block> = pairs[run_start..run_end]
                .iter()
                .map(|p| match p {
                    DiffPair::Modified { left, .. } => *left,
                    _ => unreachable!(),
                })
                .collect();
            let rights: Vec<&Block> = pairs[run_start..run_end]
                .iter()
                .map(|p| match p {
                    DiffPair::Modified { right, .. } => *right,
                    _ => unreachable!(),
                })
                .collect();

            if let Some(perm) = repair_run(&lefts, &rights, config) {
                log::debug!("pipeline: re-pair optimizer reordered run [{run_start}, {run_end})");
                for (offset, &new_right_idx) in perm.iter().enumerate() {
                    let l = lefts[offset];
                    let r = rights[new_right_idx];
                    let inline = compute_inline_diff_with_config(&l.text, &r.text, config);
                    let metrics = compute_metrics(&l.text, &r.text, &inline);
                    pairs[run_start + offset] = DiffPair::Modified { left: l, right: r, inline, metrics };
                }
            }
        }

        i = run_end;
    }
    pairs
}

// ---------------------------------------------------------------------------
// Unmatched re-pair pass
// ---------------------------------------------------------------------------

/// Find maximal `Removed+ Added+` runs and hand each to [`pair_unmatched`];
/// accepted pairings become `Modified`, leftovers keep their original
/// variant and relative order (removed-derived output first, then any
/// still-unmatched `Added` pairs, mirroring the block matcher's own
/// removed-before-added flushing convention).
fn apply_unmatched_repair<'a>(pairs: Vec<DiffPair<'a>>, config: &MatchConfig) -> Vec<DiffPair<'a>> {
    let mut out: Vec<DiffPair<'a>> = Vec::with_capacity(pairs.len());
    let mut i = 0;

    while i < pairs.len() {
        if !matches!(pairs[i], DiffPair::Removed { .. }) {
            out.push(pairs[i].clone());
            i += 1;
            continue;
        }

        let removed_start = i;
        let mut removed_end = i;
        while removed_end < pairs.len() && matches!(pairs[removed_end], DiffPair::Removed { .. }) {
            removed_end += 1;
        }
        let added_start = removed_end;
        let mut added_end = added_start;
        while added_end < pairs.len() && matches!(pairs[added_end], DiffPair::Added { .. }) {
            added_end += 1;
        }

        if added_end == added_start {
            // No following Added run: nothing to pair against.
            out.extend(pairs[removed_start..removed_end].iter().cloned());
            i = removed_end;
            continue;
        }

        let removed_blocks: Vec<&Block> = pairs[removed_start..removed_end]
            .iter()
            .map(|p| match p {
                DiffPair::Removed { left, .. } => *left,
                _ => unreachable!(),
            })
            .collect();
        let added_blocks: Vec<&Block> = pairs[added_start..added_end]
            .iter()
            .map(|p| match p {
                DiffPair::Added { right, .. } => *right,
                _ => unreachable!(),
            })
            .collect();

        let accepted = pair_unmatched(&removed_blocks, &added_blocks, config);
        if !accepted.is_empty() {
            log::debug!(
                "pipeline: unmatched re-pair converted {} pair(s) in run [{removed_start}, {added_end})",
                accepted.len()
            );
        }
        let matched_removed: std::collections::HashSet<usize> = accepted.iter().map(|(r, _)| *r).collect();
        let matched_added: std::collections::HashSet<usize> = accepted.iter().map(|(_, a)| *a).collect();
        let added_for_removed: std::collections::HashMap<usize, usize> = accepted.iter().cloned().collect();

        for (ri, removed_block) in removed_blocks.iter().enumerate() {
            if let Some(&ai) = added_for_removed.get(&ri) {
                let added_block = added_blocks[ai];
                let inline = compute_inline_diff_with_config(&removed_block.text, &added_block.text, config);
                let metrics = compute_metrics(&removed_block.text, &added_block.text, &inline);
                out.push(DiffPair::Modified {
                    left: removed_block,
                    right: added_block,
                    inline,
                    metrics,
                });
            } else if !matched_removed.contains(&ri) {
                out.push(DiffPair::Removed { left: removed_block, moved_to: None });
            }
        }
        for (ai, added_block) in added_blocks.iter().enumerate() {
            if !matched_added.contains(&ai) {
                out.push(DiffPair::Added { right: added_block, moved_from: None });
            }
        }

        i = added_end;
    }

    out
}
