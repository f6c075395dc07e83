use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use super::candidate_building::Candidate;

/// Remove duplicate candidates, keeping the first occurrence of each
pub fn dedup_candidates(cnds: &[Candidate]) -> Vec<Candidate> {
    let mut seen: HashSet<&Candidate> = HashSet::with_capacity(cnds.len());
    cnds.iter()
        .filter(|c| seen.insert(*c))
        .cloned()
        .collect()
}

/// Whether `cnd` is strictly dominated by another candidate in `cnds`
///
/// `(A, B)` is dominated by `(A', B')` if `A ⊆ A'`, `B ⊆ B'` and `(A, B) != (A', B')`.
pub fn is_dominated(cnd: &Candidate, cnds: &[Candidate]) -> bool {
    cnds.iter()
        .any(|other| other != cnd && cnd.is_subset_of(other))
}

/// Keep only maximal candidates (`YL`)
///
/// Duplicates are removed first; the remaining candidates keep their relative order.
/// Domination is evaluated against the full (deduplicated) list, so the result
/// does not depend on the order in which candidates are checked.
pub fn reduce_to_maximal(cnds: &[Candidate]) -> Vec<Candidate> {
    let unique = dedup_candidates(cnds);
    debug!("Unique candidates: {} (of {})", unique.len(), cnds.len());
    let keep: Vec<bool> = unique
        .par_iter()
        .map(|cnd| !is_dominated(cnd, &unique))
        .collect();
    let sel: Vec<Candidate> = unique
        .into_iter()
        .zip(keep)
        .filter_map(|(cnd, keep)| keep.then_some(cnd))
        .collect();
    debug!("After maximal (sel): {}", sel.len());
    sel
}
