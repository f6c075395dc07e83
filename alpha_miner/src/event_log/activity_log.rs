use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Projection of an event log on just activity labels
///
/// Activities are interned to `usize` indices in order of first appearance.
/// This index order is the enumeration order used throughout discovery.
///
/// Empty traces are dropped on construction, so every trace in `traces` is non-empty.
pub struct ActivityLog {
    /// Activity names, indexed by activity index (the activity universe)
    pub activities: Vec<String>,
    /// Mapping of activity names to their index in `activities`
    pub act_to_index: HashMap<String, usize>,
    /// Traces as sequences of activity indices
    pub traces: Vec<Vec<usize>>,
}

impl ActivityLog {
    /// Create a new [`ActivityLog`] from traces of activity labels
    ///
    /// Empty traces are skipped.
    pub fn new<T, I, S>(traces: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut log = Self::default();
        for trace in traces {
            let trace_acts: Vec<usize> = trace
                .into_iter()
                .map(|act| log.intern(act.as_ref()))
                .collect();
            if !trace_acts.is_empty() {
                log.traces.push(trace_acts);
            }
        }
        log
    }

    fn intern(&mut self, act: &str) -> usize {
        if let Some(index) = self.act_to_index.get(act) {
            *index
        } else {
            let new_act_index = self.activities.len();
            self.activities.push(act.to_string());
            self.act_to_index.insert(act.to_string(), new_act_index);
            new_act_index
        }
    }

    /// Number of distinct activities
    pub fn num_activities(&self) -> usize {
        self.activities.len()
    }

    /// Returns true if the log has no (non-empty) traces
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Index of an activity name, if it occurs in the log
    pub fn index_of<S: AsRef<str>>(&self, act: S) -> Option<usize> {
        self.act_to_index.get(act.as_ref()).copied()
    }

    /// First activity of every trace (deduplicated, in order of first appearance)
    pub fn start_activities(&self) -> Vec<usize> {
        dedup_in_order(self.traces.iter().filter_map(|t| t.first().copied()))
    }

    /// Last activity of every trace (deduplicated, in order of first appearance)
    pub fn end_activities(&self) -> Vec<usize> {
        dedup_in_order(self.traces.iter().filter_map(|t| t.last().copied()))
    }

    /// Map activity indices to their names (keeping the passed order)
    pub fn acts_to_names(&self, acts: &[usize]) -> Vec<String> {
        acts.iter()
            .map(|act| self.activities[*act].clone())
            .collect()
    }

    /// Traces as activity names
    pub fn named_traces(&self) -> Vec<Vec<&str>> {
        self.traces
            .iter()
            .map(|t| t.iter().map(|a| self.activities[*a].as_str()).collect())
            .collect()
    }

    /// Serialize to JSON string (list of traces, each a list of activity names)
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    /// Deserialize from JSON string (list of traces, each a list of activity names)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn dedup_in_order(acts: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut seen: HashSet<usize> = HashSet::new();
    acts.filter(|a| seen.insert(*a)).collect()
}

impl Serialize for ActivityLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.named_traces().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActivityLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let traces: Vec<Vec<String>> = Vec::deserialize(deserializer)?;
        Ok(ActivityLog::new(traces))
    }
}

impl<S: AsRef<str>> FromIterator<Vec<S>> for ActivityLog {
    fn from_iter<T: IntoIterator<Item = Vec<S>>>(iter: T) -> Self {
        ActivityLog::new(iter)
    }
}
