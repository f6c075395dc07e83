use std::{collections::HashSet, fmt};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::event_log::activity_log::ActivityLog;

use super::full::AlphaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Footprint relation between an ordered pair of activities `(a, b)`
pub enum Relation {
    /// `a → b`: `b` directly follows `a`, but never the other way around
    Causal,
    /// `a ← b`: `a` directly follows `b`, but never the other way around
    ReverseCausal,
    /// `a || b`: both directly follow each other
    Parallel,
    /// `a # b`: neither directly follows the other
    Independent,
}

impl Relation {
    /// Classify `(a, b)` from whether `a > b` and `b > a` hold
    pub fn classify(a_follows_b: bool, b_follows_a: bool) -> Self {
        match (a_follows_b, b_follows_a) {
            (true, false) => Relation::Causal,
            (false, true) => Relation::ReverseCausal,
            (true, true) => Relation::Parallel,
            (false, false) => Relation::Independent,
        }
    }

    /// The relation of the mirrored pair `(b, a)`
    pub fn inverse(self) -> Self {
        match self {
            Relation::Causal => Relation::ReverseCausal,
            Relation::ReverseCausal => Relation::Causal,
            r => r,
        }
    }

    /// Footprint symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Causal => "→",
            Relation::ReverseCausal => "←",
            Relation::Parallel => "||",
            Relation::Independent => "#",
        }
    }
}

/// Compute the directly-follows relation of a log
///
/// Contains `(a, b)` iff some trace has `b` immediately after `a`.
/// Self-succession `(a, a)` is only included if [`AlphaConfig::count_self_succession`] is set.
pub fn directly_follows(log: &ActivityLog, config: &AlphaConfig) -> HashSet<(usize, usize)> {
    log.traces
        .iter()
        .flat_map(|t| t.iter().copied().tuple_windows::<(usize, usize)>())
        .filter(|(a, b)| a != b || config.count_self_succession)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Footprint matrix of an [`ActivityLog`]
///
/// Dense `n × n` table (row-major) indexed by activity index.
/// Built once from the directly-follows relation and read-only afterwards.
///
pub struct RelationMatrix {
    activities: Vec<String>,
    relations: Vec<Relation>,
}

impl RelationMatrix {
    /// Compute the [`RelationMatrix`] of a log
    pub fn from_log(log: &ActivityLog, config: &AlphaConfig) -> Self {
        let df = directly_follows(log, config);
        Self::from_directly_follows(log.activities.clone(), &df)
    }

    /// Compute the [`RelationMatrix`] for the given activities from a directly-follows relation
    pub fn from_directly_follows(activities: Vec<String>, df: &HashSet<(usize, usize)>) -> Self {
        let n = activities.len();
        let relations: Vec<Relation> = (0..n)
            .cartesian_product(0..n)
            .map(|(a, b)| {
                if a == b {
                    // Self-succession makes an activity parallel to itself
                    if df.contains(&(a, a)) {
                        Relation::Parallel
                    } else {
                        Relation::Independent
                    }
                } else {
                    Relation::classify(df.contains(&(a, b)), df.contains(&(b, a)))
                }
            })
            .collect();
        let matrix = Self {
            activities,
            relations,
        };
        debug_assert!(matrix.is_consistent());
        matrix
    }

    /// Number of activities
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Whether the matrix has no activities
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Activity names (by index)
    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    /// Relation of the ordered pair `(a, b)`
    pub fn relation(&self, a: usize, b: usize) -> Relation {
        self.relations[a * self.len() + b]
    }

    /// Relation of the ordered pair `(a, b)` referred to by activity names
    pub fn relation_by_name(&self, a: &str, b: &str) -> Option<Relation> {
        let a = self.activities.iter().position(|act| act == a)?;
        let b = self.activities.iter().position(|act| act == b)?;
        Some(self.relation(a, b))
    }

    /// `a → b`
    pub fn is_causal(&self, a: usize, b: usize) -> bool {
        self.relation(a, b) == Relation::Causal
    }

    /// `a # b`
    pub fn is_independent(&self, a: usize, b: usize) -> bool {
        self.relation(a, b) == Relation::Independent
    }

    /// Whether all activities in `set` are pairwise independent (including each with itself)
    pub fn is_independent_set(&self, set: &[usize]) -> bool {
        set.iter()
            .enumerate()
            .all(|(i, &a)| set[i..].iter().all(|&b| self.is_independent(a, b)))
    }

    /// All activities `b` with `a → b`, in activity order
    pub fn causal_successors(&self, a: usize) -> Vec<usize> {
        (0..self.len()).filter(|&b| self.is_causal(a, b)).collect()
    }

    /// All ordered pairs `(a, b)` with `a → b`, in activity order
    pub fn causal_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.len())
            .cartesian_product(0..self.len())
            .filter(|&(a, b)| self.is_causal(a, b))
            .collect()
    }

    /// All unordered pairs `(a, b)` with `a < b` and `a # b`, in activity order
    pub fn independent_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.len())
            .tuple_combinations()
            .filter(|&(a, b)| self.is_independent(a, b))
            .collect()
    }

    /// Check that every pair holds exactly one mirrored pattern (`→`/`←`, `||`/`||` or `#`/`#`)
    pub fn is_consistent(&self) -> bool {
        (0..self.len())
            .cartesian_product(0..self.len())
            .all(|(a, b)| self.relation(a, b) == self.relation(b, a).inverse())
    }
}

impl fmt::Display for RelationMatrix {
    /// Footprint table, one row per activity
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .activities
            .iter()
            .map(|a| a.chars().count())
            .max()
            .unwrap_or(0)
            .max(2);
        write!(f, "{:width$}", "")?;
        for act in &self.activities {
            write!(f, " {:width$}", act)?;
        }
        writeln!(f)?;
        for (a, act) in self.activities.iter().enumerate() {
            write!(f, "{:width$}", act)?;
            for b in 0..self.len() {
                write!(f, " {:width$}", self.relation(a, b).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{alpha::full::AlphaConfig, event_log::activity_log::ActivityLog};

    use super::{directly_follows, Relation, RelationMatrix};

    fn matrix(traces: Vec<Vec<&str>>) -> RelationMatrix {
        RelationMatrix::from_log(&ActivityLog::new(traces), &AlphaConfig::default())
    }

    #[test]
    fn sequential_log() {
        let m = matrix(vec![vec!["a", "b", "c"], vec!["a", "b", "c"]]);
        assert_eq!(m.relation_by_name("a", "b"), Some(Relation::Causal));
        assert_eq!(m.relation_by_name("b", "a"), Some(Relation::ReverseCausal));
        assert_eq!(m.relation_by_name("b", "c"), Some(Relation::Causal));
        assert_eq!(m.relation_by_name("a", "c"), Some(Relation::Independent));
        assert_eq!(m.relation_by_name("a", "x"), None);
        assert_eq!(m.causal_pairs(), vec![(0, 1), (1, 2)]);
        assert_eq!(m.independent_pairs(), vec![(0, 2)]);
    }

    #[test]
    fn choice_and_parallel() {
        let m = matrix(vec![
            vec!["a", "b", "d"],
            vec!["a", "c", "d"],
            vec!["e", "f", "g", "h"],
            vec!["e", "g", "f", "h"],
        ]);
        assert_eq!(m.relation_by_name("b", "c"), Some(Relation::Independent));
        assert_eq!(m.relation_by_name("f", "g"), Some(Relation::Parallel));
        assert_eq!(m.relation_by_name("g", "f"), Some(Relation::Parallel));
        let a = 0;
        assert_eq!(
            m.causal_successors(a),
            vec![1, 3],
            "a → b and a → c (b = 1, c = 3)"
        );
    }

    #[test]
    fn relations_are_total_and_exclusive() {
        let m = matrix(vec![
            vec!["a", "b", "c", "d"],
            vec!["a", "c", "b", "d"],
            vec!["a", "e", "d"],
            vec!["d", "a"],
        ]);
        assert!(m.is_consistent());
        for a in 0..m.len() {
            assert_eq!(m.relation(a, a), Relation::Independent);
            for b in 0..m.len() {
                let r = m.relation(a, b);
                let matches = [
                    Relation::Causal,
                    Relation::ReverseCausal,
                    Relation::Parallel,
                    Relation::Independent,
                ]
                .iter()
                .filter(|x| **x == r)
                .count();
                assert_eq!(matches, 1);
                assert_eq!(m.is_causal(a, b), m.relation(b, a) == Relation::ReverseCausal);
            }
        }
    }

    #[test]
    fn self_succession_is_ignored_by_default() {
        let log = ActivityLog::new(vec![vec!["a", "a", "b"]]);
        let df = directly_follows(&log, &AlphaConfig::default());
        assert_eq!(df.into_iter().collect::<Vec<_>>(), vec![(0, 1)]);

        let m = RelationMatrix::from_log(&log, &AlphaConfig::default());
        assert_eq!(m.relation(0, 0), Relation::Independent);
        assert!(m.is_causal(0, 1));
    }

    #[test]
    fn self_succession_when_counted() {
        let log = ActivityLog::new(vec![vec!["a", "a", "b"]]);
        let config = AlphaConfig {
            count_self_succession: true,
            ..AlphaConfig::default()
        };
        let df = directly_follows(&log, &config);
        assert!(df.contains(&(0, 0)));
        let m = RelationMatrix::from_log(&log, &config);
        assert_eq!(m.relation(0, 0), Relation::Parallel);
        assert!(!m.is_independent_set(&[0]));
        assert!(m.is_consistent());
    }

    #[test]
    fn empty_log_yields_empty_matrix() {
        let m = matrix(vec![]);
        assert!(m.is_empty());
        assert!(m.causal_pairs().is_empty());
        assert_eq!(m.to_string(), "  \n");
    }

    #[test]
    fn footprint_display() {
        let m = matrix(vec![vec!["a", "b"]]);
        assert_eq!(m.to_string(), "   a  b \na  #  → \nb  ←  # \n");
    }
}
