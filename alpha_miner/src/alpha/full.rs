use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    event_log::activity_log::ActivityLog,
    petri_net::petri_net_struct::{ArcType, Marking, PetriNet, TransitionID},
};

use super::{
    candidate_building::{build_candidates, Candidate},
    candidate_pruning::reduce_to_maximal,
    relations::RelationMatrix,
};

/// Name of the designated start place
pub const START_PLACE: &str = "start";
/// Name of the designated end place
pub const END_PLACE: &str = "end";

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Duration (in seconds) per parts of the Alpha algorithm (+ total time)
pub struct AlgoDuration {
    /// Duration for computing the footprint relations (in seconds)
    pub relations: f32,
    /// Duration for building place candidates (in seconds)
    pub cnd_building: f32,
    /// Duration for reducing candidates to maximal ones (in seconds)
    pub prune_cnd: f32,
    /// Duration for constructing Petri net (in seconds)
    pub build_net: f32,
    /// Total duration (in seconds)
    pub total: f32,
}
impl AlgoDuration {
    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

/// Get current system time milliseconds
pub fn get_current_time_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
/// Algorithm parameters for the Alpha algorithm
pub struct AlphaConfig {
    /// Whether `a` directly followed by `a` counts as a directly-follows pair
    ///
    /// If set, a self-looping activity is parallel to itself and can not take part in any place.
    /// Default: `false` (self-succession is ignored)
    pub count_self_succession: bool,
    /// Whether split candidates `({a}, S)` also include single-element subsets `S`
    ///
    /// These duplicate the singleton candidates and are removed again during reduction.
    /// Default: `false`
    pub include_singleton_subsets: bool,
}
impl AlphaConfig {
    /// Serialize Alpha parameters to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
    /// Deserialize Alpha parameters from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// All intermediate results of an Alpha discovery run
pub struct Discovery {
    /// Footprint matrix
    pub relations: RelationMatrix,
    /// Start activities (first activities of traces)
    pub start_activities: Vec<usize>,
    /// End activities (last activities of traces)
    pub end_activities: Vec<usize>,
    /// All place candidates (`XL`)
    pub candidates: Vec<Candidate>,
    /// Maximal place candidates (`YL`)
    pub maximal_candidates: Vec<Candidate>,
    /// Discovered Petri net
    pub net: PetriNet,
    /// Durations of the individual steps
    pub durations: AlgoDuration,
}

///
/// Build the Alpha [`PetriNet`] from maximal candidates
///
/// * One transition per activity (in activity order)
/// * One place `p1..pn` per candidate (in order), connected from all activities in `A` and to all activities in `B`
/// * A `start` place (initial marking) connected to all start activities and an `end` place (final marking) connected from all end activities
///
pub fn build_net(
    activities: &[String],
    maximal_candidates: &[Candidate],
    start_activities: &[usize],
    end_activities: &[usize],
) -> PetriNet {
    let mut pn = PetriNet::new();
    let transitions: Vec<TransitionID> = activities
        .iter()
        .map(|act_name| pn.add_transition(Some(act_name.clone())))
        .collect();

    maximal_candidates.iter().enumerate().for_each(|(i, cnd)| {
        let place_id = pn.add_place(format!("p{}", i + 1), Some(cnd.display_name(activities)));
        cnd.left().iter().for_each(|in_act| {
            pn.add_arc(
                ArcType::transition_to_place(transitions[*in_act], place_id),
                None,
            )
        });
        cnd.right().iter().for_each(|out_act| {
            pn.add_arc(
                ArcType::place_to_transition(place_id, transitions[*out_act]),
                None,
            )
        });
    });

    let start_place = pn.add_place(START_PLACE, None);
    let end_place = pn.add_place(END_PLACE, None);
    start_activities.iter().for_each(|act| {
        pn.add_arc(
            ArcType::place_to_transition(start_place, transitions[*act]),
            None,
        )
    });
    end_activities.iter().for_each(|act| {
        pn.add_arc(
            ArcType::transition_to_place(transitions[*act], end_place),
            None,
        )
    });

    pn.initial_marking = Some(Marking::from([(start_place, 1)]));
    pn.final_markings = Some(vec![Marking::from([(end_place, 1)])]);
    pn
}

/// Run Alpha discovery, returning all intermediate results
///
/// Measures [`AlgoDuration`] using the passed `get_time_millis_fn` function
pub fn discover_with_details_and_timing_fn(
    log: &ActivityLog,
    config: AlphaConfig,
    get_time_millis_fn: &dyn Fn() -> u128,
) -> Discovery {
    info!(
        "Started Alpha Discovery ({} traces, {} activities)",
        log.traces.len(),
        log.num_activities()
    );
    let mut algo_dur = AlgoDuration::default();
    let elapsed_secs = |start: u128| get_time_millis_fn().saturating_sub(start) as f32 / 1000.0;
    let total_start = get_time_millis_fn();

    let mut start = get_time_millis_fn();
    let relations = RelationMatrix::from_log(log, &config);
    let start_activities = log.start_activities();
    let end_activities = log.end_activities();
    algo_dur.relations = elapsed_secs(start);
    debug!("Footprint:\n{}", relations);

    start = get_time_millis_fn();
    let candidates = build_candidates(&relations, &config);
    algo_dur.cnd_building = elapsed_secs(start);
    debug!("Built candidates {}", candidates.len());

    start = get_time_millis_fn();
    let maximal_candidates = reduce_to_maximal(&candidates);
    algo_dur.prune_cnd = elapsed_secs(start);
    debug!("Final maximal candidates: {}", maximal_candidates.len());

    start = get_time_millis_fn();
    let net = build_net(
        &log.activities,
        &maximal_candidates,
        &start_activities,
        &end_activities,
    );
    algo_dur.build_net = elapsed_secs(start);

    algo_dur.total = elapsed_secs(total_start);
    info!(
        "Discovered Petri net with {} places, {} transitions and {} arcs in {:.4}s",
        net.places.len(),
        net.transitions.len(),
        net.arcs.len(),
        algo_dur.total
    );
    Discovery {
        relations,
        start_activities,
        end_activities,
        candidates,
        maximal_candidates,
        net,
        durations: algo_dur,
    }
}

/// Run Alpha discovery, returning all intermediate results
pub fn discover_with_details(log: &ActivityLog, config: AlphaConfig) -> Discovery {
    discover_with_details_and_timing_fn(log, config, &get_current_time_millis)
}

///
/// Discover a [`PetriNet`] using the Alpha Process Discovery algorithm
///
/// Additionally returns the durations for performance measurements
///
pub fn alpha_discover_petri_net(log: &ActivityLog, config: AlphaConfig) -> (PetriNet, AlgoDuration) {
    let discovery = discover_with_details(log, config);
    (discovery.net, discovery.durations)
}

///
/// Discover a [`PetriNet`] using the Alpha Process Discovery algorithm (with default [`AlphaConfig`])
///
pub fn discover(log: &ActivityLog) -> PetriNet {
    alpha_discover_petri_net(log, AlphaConfig::default()).0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{
        event_log::activity_log::ActivityLog,
        petri_net::petri_net_struct::{PetriNet, PlaceID},
    };

    use super::{
        alpha_discover_petri_net, discover, discover_with_details, AlphaConfig, END_PLACE,
        START_PLACE,
    };

    fn arcs(net: &PetriNet) -> Vec<(String, String)> {
        net.arcs_as_names()
    }

    fn named(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    fn place_names(net: &PetriNet) -> Vec<&str> {
        net.places.iter().map(|p| p.name.as_str()).collect()
    }

    fn transition_labels(net: &PetriNet) -> Vec<&str> {
        net.transitions
            .iter()
            .filter_map(|t| t.label.as_deref())
            .collect()
    }

    #[test]
    fn sequential_log() {
        let log = ActivityLog::new(vec![vec!["a", "b", "c"], vec!["a", "b", "c"]]);
        let net = discover(&log);
        assert_eq!(transition_labels(&net), vec!["a", "b", "c"]);
        assert_eq!(place_names(&net), vec!["p1", "p2", START_PLACE, END_PLACE]);
        assert_eq!(
            arcs(&net),
            named(&[
                ("a", "p1"),
                ("p1", "b"),
                ("b", "p2"),
                ("p2", "c"),
                ("start", "a"),
                ("c", "end"),
            ])
        );
        assert_eq!(net.places[0].label.as_deref(), Some("P({a},{b})"));
    }

    #[test]
    fn exclusive_choice_log() {
        let log = ActivityLog::new(vec![vec!["a", "b", "d"], vec!["a", "c", "d"]]);
        let details = discover_with_details(&log, AlphaConfig::default());
        assert_eq!(details.candidates.len(), 6);
        assert_eq!(details.maximal_candidates.len(), 2);

        let net = details.net;
        assert_eq!(place_names(&net), vec!["p1", "p2", START_PLACE, END_PLACE]);
        assert_eq!(net.places[0].label.as_deref(), Some("P({a},{b,c})"));
        assert_eq!(net.places[1].label.as_deref(), Some("P({b,c},{d})"));

        let p1 = net.place_by_name("p1").unwrap();
        let p2 = net.place_by_name("p2").unwrap();
        let t = |label: &str| net.transition_by_label(label).unwrap();
        assert_eq!(net.preset_of_place(p1), vec![t("a")]);
        assert_eq!(net.postset_of_place(p1), vec![t("b"), t("c")]);
        assert_eq!(net.preset_of_place(p2), vec![t("b"), t("c")]);
        assert_eq!(net.postset_of_place(p2), vec![t("d")]);
    }

    #[test]
    fn empty_log() {
        let net = discover(&ActivityLog::new(Vec::<Vec<&str>>::new()));
        assert!(net.transitions.is_empty());
        assert!(net.arcs.is_empty());
        assert_eq!(place_names(&net), vec![START_PLACE, END_PLACE]);
        assert!(net.is_in_initial_marking(&PlaceID(0)));
        assert!(net.is_in_a_final_marking(&PlaceID(1)));
    }

    #[test]
    fn self_succession_is_ignored() {
        let log = ActivityLog::new(vec![vec!["a", "a", "b"]]);
        let details = discover_with_details(&log, AlphaConfig::default());
        assert!(details.relations.is_causal(0, 1));
        assert!(details.relations.is_independent(0, 0));
        assert_eq!(
            arcs(&details.net),
            named(&[("a", "p1"), ("p1", "b"), ("start", "a"), ("b", "end")])
        );
    }

    #[test]
    fn isolated_activity_is_a_transition() {
        let log = ActivityLog::new(vec![vec!["a", "b"], vec!["x"]]);
        let net = discover(&log);
        let x = net.transition_by_label("x").unwrap();
        assert_eq!(net.preset_of_transition(x).len(), 1);
        assert_eq!(net.postset_of_transition(x).len(), 1);
        let start = net.place_by_name(START_PLACE).unwrap();
        assert_eq!(net.postset_of_place(start).len(), 2);
    }

    #[test]
    fn parallel_log() {
        let log = ActivityLog::new(vec![
            vec!["a", "b", "c", "d"],
            vec!["a", "c", "b", "d"],
            vec!["a", "e", "d"],
        ]);
        let details = discover_with_details(&log, AlphaConfig::default());
        let labels: HashSet<&str> = details
            .net
            .places
            .iter()
            .filter_map(|p| p.label.as_deref())
            .collect();
        assert_eq!(
            labels,
            HashSet::from([
                "P({a},{b,e})",
                "P({a},{c,e})",
                "P({b,e},{d})",
                "P({c,e},{d})"
            ])
        );
    }

    #[test]
    fn maximality_and_validity() {
        let log = ActivityLog::new(vec![
            vec!["a", "b", "c", "d"],
            vec!["a", "c", "b", "d"],
            vec!["a", "e", "d"],
            vec!["f", "e", "g"],
            vec!["f", "b", "g"],
        ]);
        let details = discover_with_details(&log, AlphaConfig::default());
        for x in &details.maximal_candidates {
            assert!(x.is_valid(&details.relations));
            for y in &details.maximal_candidates {
                assert!(x == y || !x.is_subset_of(y));
            }
        }
        for cnd in &details.candidates {
            assert!(cnd.is_valid(&details.relations));
            assert!(details
                .maximal_candidates
                .iter()
                .any(|m| cnd.is_subset_of(m)));
        }
    }

    #[test]
    fn start_end_coverage() {
        let log = ActivityLog::new(vec![
            vec!["a", "b", "c"],
            vec!["b", "c"],
            vec!["a", "c", "b"],
        ]);
        let net = discover(&log);
        let start = net.place_by_name(START_PLACE).unwrap();
        let end = net.place_by_name(END_PLACE).unwrap();
        for act in ["a", "b"] {
            let t = net.transition_by_label(act).unwrap();
            assert_eq!(
                net.postset_of_place(start).iter().filter(|x| **x == t).count(),
                1
            );
        }
        for act in ["c", "b"] {
            let t = net.transition_by_label(act).unwrap();
            assert_eq!(
                net.preset_of_place(end).iter().filter(|x| **x == t).count(),
                1
            );
        }
        assert_eq!(net.postset_of_place(start).len(), 2);
        assert_eq!(net.preset_of_place(end).len(), 2);
    }

    #[test]
    fn deterministic() {
        let traces = vec![
            vec!["register", "examine", "decide", "pay"],
            vec!["register", "check", "decide", "reject"],
            vec!["register", "examine", "check", "decide", "pay"],
            vec!["register", "check", "examine", "decide", "reject"],
        ];
        let first = discover(&ActivityLog::new(traces.clone()));
        for _ in 0..5 {
            let again = discover(&ActivityLog::new(traces.clone()));
            assert_eq!(again, first);
            assert_eq!(again.to_json(), first.to_json());
        }
    }

    #[test]
    fn config_json() {
        let config = AlphaConfig {
            count_self_succession: true,
            include_singleton_subsets: false,
        };
        assert_eq!(AlphaConfig::from_json(&config.to_json()).unwrap(), config);
        assert_eq!(AlphaConfig::from_json("{}").unwrap(), AlphaConfig::default());
    }

    #[test]
    fn singleton_subsets_do_not_change_result() {
        let log = ActivityLog::new(vec![vec!["a", "b", "d"], vec!["a", "c", "d"]]);
        let (default_net, _) = alpha_discover_petri_net(&log, AlphaConfig::default());
        let (net, durations) = alpha_discover_petri_net(
            &log,
            AlphaConfig {
                include_singleton_subsets: true,
                ..AlphaConfig::default()
            },
        );
        assert_eq!(net, default_net);
        assert!(durations.total >= 0.0);
    }

    #[test]
    fn counted_self_loops_leave_activity_unconnected() {
        let log = ActivityLog::new(vec![vec!["a", "b", "b", "c"]]);
        let (net, _) = alpha_discover_petri_net(
            &log,
            AlphaConfig {
                count_self_succession: true,
                ..AlphaConfig::default()
            },
        );
        assert_eq!(arcs(&net), named(&[("start", "a"), ("c", "end")]));
    }
}
