//! Re-pair optimizer: locally re-examines a run of consecutive matched block
//! pairs for a better assignment than the monotonic one the LCS block
//! matcher found.
//!
//! The block matcher's alignment is monotonic in both document orders, so
//! it can never represent two adjacent paragraphs that were transposed — the
//! best it can do is match one of the two and leave the other unmatched.
//! This pass looks at small windows of already-matched pairs and checks
//! whether a non-monotonic re-assignment within the window raises the total
//! similarity enough to be worth it.

use diffcore_model::Block;

use crate::align::block_similarity;
use crate::config::MatchConfig;

/// Look for a better assignment of `rights` to `lefts` (same positions,
/// different pairing) than the identity pairing `lefts[i] <-> rights[i]`.
///
/// Returns `Some(perm)` where `perm[i]` is the index into `rights` that
/// `lefts[i]` should be paired with, if reassigning improves the total
/// similarity by more than `config.repair_improvement_threshold`. Returns
/// `None` (including for `lefts.len() < 2`) when the identity assignment
/// should be kept.
pub fn repair_run(lefts: &[&Block], rights: &[&Block], config: &MatchConfig) -> Option<Vec<usize>> {
    let n = lefts.len();
    if n < 2 || rights.len() != n {
        return None;
    }

    let total = |perm: &[usize]| -> f64 {
        perm.iter()
            .enumerate()
            .map(|(i, &j)| block_similarity(lefts[i], rights[j]))
            .sum()
    };

    let identity: Vec<usize> = (0..n).collect();
    let current = total(&identity);

    let candidate = match n {
        2 => vec![1, 0],
        3 | 4 => permutations(n)
            .into_iter()
            .max_by(|a, b| total(a).partial_cmp(&total(b)).unwrap())
            .unwrap_or(identity.clone()),
        _ => greedy_assignment(lefts, rights),
    };

    if candidate == identity {
        return None;
    }
    if total(&candidate) - current > config.repair_improvement_threshold {
        Some(candidate)
    } else {
        None
    }
}

/// Greedy best-similarity-first assignment for windows too large to
/// exhaustively permute: repeatedly pick the highest-scoring still-unused
/// right block for each left block, in left-document order.
fn greedy_assignment(lefts: &[&Block], rights: &[&Block]) -> Vec<usize> {
    let n = lefts.len();
    let mut used = vec![false; n];
    let mut assignment = vec![0usize; n];

    for (i, left) in lefts.iter().enumerate() {
        let (best_j, _) = rights
            .iter()
            .enumerate()
            .filter(|(j, _)| !used[*j])
            .map(|(j, right)| (j, block_similarity(left, right)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .expect("at least one unused right remains");
        used[best_j] = true;
        assignment[i] = best_j;
    }

    assignment
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn helper(remaining: Vec<usize>, current: Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if remaining.is_empty() {
            out.push(current);
            return;
        }
        for i in 0..remaining.len() {
            let mut rem = remaining.clone();
            let v = rem.remove(i);
            let mut cur = current.clone();
            cur.push(v);
            helper(rem, cur, out);
        }
    }
    let mut out = Vec::new();
    helper((0..n).collect(), Vec::new(), &mut out);
    out
}
