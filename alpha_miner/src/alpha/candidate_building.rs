use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::{full::AlphaConfig, relations::RelationMatrix};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
/// Place candidate `(A, B)`: every activity in `A` is causally followed by every activity in `B`
///
/// Both sides are kept sorted and free of duplicates, so equal sets compare equal.
/// Candidates can only be created through [`Candidate::new`] (or deserialization, which goes through it).
pub struct Candidate {
    left: Vec<usize>,
    right: Vec<usize>,
}

#[derive(Deserialize)]
struct CandidateSets {
    left: Vec<usize>,
    right: Vec<usize>,
}

impl<'de> Deserialize<'de> for Candidate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sets = CandidateSets::deserialize(deserializer)?;
        Ok(Candidate::new(sets.left, sets.right))
    }
}

impl Candidate {
    /// Create a new candidate (sorting and deduplicating both sides)
    pub fn new(mut left: Vec<usize>, mut right: Vec<usize>) -> Self {
        left.sort_unstable();
        left.dedup();
        right.sort_unstable();
        right.dedup();
        Self { left, right }
    }

    /// Input activities (`A`), sorted
    pub fn left(&self) -> &[usize] {
        &self.left
    }

    /// Output activities (`B`), sorted
    pub fn right(&self) -> &[usize] {
        &self.right
    }

    /// Whether both sides consist of exactly one activity
    pub fn is_singleton(&self) -> bool {
        self.left.len() == 1 && self.right.len() == 1
    }

    /// Componentwise subset check: `A ⊆ A'` and `B ⊆ B'`
    pub fn is_subset_of(&self, other: &Candidate) -> bool {
        self.left.len() <= other.left.len()
            && self.right.len() <= other.right.len()
            && self.left.iter().all(|a| other.left.binary_search(a).is_ok())
            && self.right.iter().all(|b| other.right.binary_search(b).is_ok())
    }

    /// Whether this candidate satisfies the place conditions w.r.t. `matrix`
    ///
    /// Both sides must be non-empty and internally independent, and `a → b` must hold for all `a ∈ A`, `b ∈ B`.
    pub fn is_valid(&self, matrix: &RelationMatrix) -> bool {
        !self.left.is_empty()
            && !self.right.is_empty()
            && matrix.is_independent_set(&self.left)
            && matrix.is_independent_set(&self.right)
            && self
                .left
                .iter()
                .all(|&a| self.right.iter().all(|&b| matrix.is_causal(a, b)))
    }

    /// Descriptive name, e.g. `P({a},{b,c})`
    pub fn display_name(&self, activities: &[String]) -> String {
        let names = |acts: &[usize]| {
            acts.iter()
                .map(|a| activities[*a].as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        format!("P({{{}}},{{{}}})", names(&self.left), names(&self.right))
    }
}

///
/// Lazy enumeration of all pairwise-independent subsets of a set of activities
///
/// Subsets are produced in depth-first (lexicographic) order of the passed `elements`.
/// A partial subset is only extended by activities independent of all its members,
/// so dependent branches are pruned instead of being generated and filtered afterwards.
///
/// The number of subsets is exponential in `elements.len()` in the worst case
/// (all elements mutually independent).
#[derive(Debug, Clone)]
pub struct IndependentSubsets<'a> {
    matrix: &'a RelationMatrix,
    elements: Vec<usize>,
    min_size: usize,
    /// Positions (in `elements`) of the current subset
    stack: Vec<usize>,
    finished: bool,
}

impl<'a> IndependentSubsets<'a> {
    /// Enumerate independent subsets of `elements` with at least `min_size` members
    pub fn new(matrix: &'a RelationMatrix, elements: Vec<usize>, min_size: usize) -> Self {
        Self {
            matrix,
            elements,
            min_size,
            stack: Vec::new(),
            finished: false,
        }
    }

    fn can_extend(&self, pos: usize) -> bool {
        let e = self.elements[pos];
        self.matrix.is_independent(e, e)
            && self
                .stack
                .iter()
                .all(|&k| self.matrix.is_independent(self.elements[k], e))
    }

    /// Move to the next subset in depth-first order; false once exhausted
    fn advance(&mut self) -> bool {
        let mut from = self.stack.last().map_or(0, |&k| k + 1);
        loop {
            if let Some(pos) = (from..self.elements.len()).find(|&pos| self.can_extend(pos)) {
                self.stack.push(pos);
                return true;
            }
            match self.stack.pop() {
                Some(k) => from = k + 1,
                None => return false,
            }
        }
    }
}

impl Iterator for IndependentSubsets<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if !self.advance() {
                self.finished = true;
                break;
            }
            if self.stack.len() >= self.min_size {
                return Some(self.stack.iter().map(|&k| self.elements[k]).collect());
            }
        }
        None
    }
}

/// `({a}, {b})` for every causal pair `a → b`
pub fn singleton_candidates(matrix: &RelationMatrix) -> Vec<Candidate> {
    matrix
        .causal_pairs()
        .into_iter()
        .filter(|&(a, b)| matrix.is_independent(a, a) && matrix.is_independent(b, b))
        .map(|(a, b)| Candidate::new(vec![a], vec![b]))
        .collect()
}

/// `({a}, S)` for every independent subset `S` of the causal successors of `a`
///
/// `S` has at least two members unless `include_singleton_subsets` is set.
pub fn split_candidates(matrix: &RelationMatrix, include_singleton_subsets: bool) -> Vec<Candidate> {
    let min_size = if include_singleton_subsets { 1 } else { 2 };
    (0..matrix.len())
        .filter(|&a| matrix.is_independent(a, a))
        .flat_map(|a| {
            IndependentSubsets::new(matrix, matrix.causal_successors(a), min_size)
                .map(move |s| Candidate::new(vec![a], s))
        })
        .collect()
}

/// `({a, b}, B)` for every independent pair `a # b`
///
/// `B` is grown greedily over the causal successors of `a` (in activity order),
/// adding each `c` with `b → c` that is independent of everything already in `B`.
pub fn merge_candidates(matrix: &RelationMatrix) -> Vec<Candidate> {
    matrix
        .independent_pairs()
        .into_iter()
        .filter(|&(a, b)| matrix.is_independent(a, a) && matrix.is_independent(b, b))
        .filter_map(|(a, b)| {
            let mut outputs: Vec<usize> = Vec::new();
            for c in matrix.causal_successors(a) {
                if matrix.is_causal(b, c)
                    && !outputs.contains(&c)
                    && matrix.is_independent(c, c)
                    && outputs.iter().all(|&o| matrix.is_independent(o, c))
                {
                    outputs.push(c);
                }
            }
            if outputs.is_empty() {
                None
            } else {
                Some(Candidate::new(vec![a, b], outputs))
            }
        })
        .collect()
}

/// Build all place candidates (`XL`)
///
/// Concatenation of [`singleton_candidates`], [`split_candidates`] and [`merge_candidates`] (in that order).
/// May contain duplicates and non-maximal candidates; see [`super::candidate_pruning::reduce_to_maximal`].
pub fn build_candidates(matrix: &RelationMatrix, config: &AlphaConfig) -> Vec<Candidate> {
    let mut cnds = singleton_candidates(matrix);
    debug!("Singleton candidates: {}", cnds.len());
    let split = split_candidates(matrix, config.include_singleton_subsets);
    debug!("Split candidates: {}", split.len());
    cnds.extend(split);
    let merge = merge_candidates(matrix);
    debug!("Merge candidates: {}", merge.len());
    cnds.extend(merge);
    cnds
}
