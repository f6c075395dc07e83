use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Place (control point) in a Petri net
pub struct Place {
    /// Unique place name (e.g., `p1`, `start`, `end`)
    pub name: String,
    /// Optional descriptive label (e.g., `P({a},{b,c})`)
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Transition in a Petri net
pub struct Transition {
    /// Transition label (None if this transition is _invisible_)
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "nodes")]
/// Arc type in a Petri net
pub enum ArcType {
    /// From Place to Transition
    PlaceTransition(PlaceID, TransitionID),
    /// From Transition to Place
    TransitionPlace(TransitionID, PlaceID),
}

impl ArcType {
    /// Create new from place to transition
    pub fn place_to_transition(from: PlaceID, to: TransitionID) -> ArcType {
        ArcType::PlaceTransition(from, to)
    }
    /// Create new from transition to place
    pub fn transition_to_place(from: TransitionID, to: PlaceID) -> ArcType {
        ArcType::TransitionPlace(from, to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Arc in a Petri net
///
/// Connecting a transition and a place (or the other way around)
pub struct Arc {
    /// Source and target of Arc
    pub from_to: ArcType,
    /// Weight (i.e., how many tokens this arc moves)
    pub weight: u32,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
/// Place ID (index into [`PetriNet::places`])
pub struct PlaceID(pub usize);

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
/// Transition ID (index into [`PetriNet::transitions`])
pub struct TransitionID(pub usize);

/// Marking of a Petri net: Assigning [`PlaceID`]s to a number of tokens
pub type Marking = BTreeMap<PlaceID, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
///
/// A Petri net of [`Place`]s and [`Transition`]s
///
/// Bipartite graph of [`Place`]s and [`Transition`]s with [`Arc`]s connecting them, as well as initial and final [`Marking`]s.
///
/// Places and transitions are stored in insertion order, so two nets built by the same
/// sequence of calls are identical (including their JSON serialization).
pub struct PetriNet {
    /// Places
    pub places: Vec<Place>,
    /// Transitions
    pub transitions: Vec<Transition>,
    /// Arcs
    pub arcs: Vec<Arc>,
    /// Initial marking
    pub initial_marking: Option<Marking>,
    /// Final markings (any of them are accepted as a final marking)
    pub final_markings: Option<Vec<Marking>>,
}

impl PetriNet {
    /// Create new [`PetriNet`] with no places or transitions
    pub fn new() -> Self {
        Self::default()
    }
    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
    /// Add a place with a name and an optional descriptive label
    pub fn add_place<S: Into<String>>(&mut self, name: S, label: Option<String>) -> PlaceID {
        self.places.push(Place {
            name: name.into(),
            label,
        });
        PlaceID(self.places.len() - 1)
    }

    /// Add a transition with an (optional) label
    pub fn add_transition(&mut self, label: Option<String>) -> TransitionID {
        self.transitions.push(Transition { label });
        TransitionID(self.transitions.len() - 1)
    }
    /// Add an arc
    pub fn add_arc(&mut self, from_to: ArcType, weight: Option<u32>) {
        self.arcs.push(Arc {
            from_to,
            weight: weight.unwrap_or(1),
        });
    }

    /// Get a [`Place`] by its ID
    pub fn place(&self, p: PlaceID) -> &Place {
        &self.places[p.0]
    }

    /// Get a [`Transition`] by its ID
    pub fn transition(&self, t: TransitionID) -> &Transition {
        &self.transitions[t.0]
    }

    /// Find a place by name
    pub fn place_by_name(&self, name: &str) -> Option<PlaceID> {
        self.places
            .iter()
            .position(|p| p.name == name)
            .map(PlaceID)
    }

    /// Find a (visible) transition by label
    pub fn transition_by_label(&self, label: &str) -> Option<TransitionID> {
        self.transitions
            .iter()
            .position(|t| t.label.as_deref() == Some(label))
            .map(TransitionID)
    }

    /// Get the preset of a [`PetriNet`] place
    pub fn preset_of_place(&self, p: PlaceID) -> Vec<TransitionID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::TransitionPlace(from, to) if to == p => Some(from),
                _ => None,
            })
            .collect()
    }

    /// Get the preset of [`PetriNet`] transition
    pub fn preset_of_transition(&self, t: TransitionID) -> Vec<PlaceID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::PlaceTransition(from, to) if to == t => Some(from),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] place
    pub fn postset_of_place(&self, p: PlaceID) -> Vec<TransitionID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::PlaceTransition(from, to) if from == p => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] transition
    pub fn postset_of_transition(&self, t: TransitionID) -> Vec<PlaceID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::TransitionPlace(from, to) if from == t => Some(to),
                _ => None,
            })
            .collect()
    }

    /// Display name of a transition (its label, or `τ` for invisible transitions)
    pub fn transition_name(&self, t: TransitionID) -> &str {
        self.transition(t).label.as_deref().unwrap_or("τ")
    }

    /// All arcs as `(source name, target name)` pairs, in insertion order
    pub fn arcs_as_names(&self) -> Vec<(String, String)> {
        self.arcs
            .iter()
            .map(|arc| match arc.from_to {
                ArcType::PlaceTransition(p, t) => (
                    self.place(p).name.clone(),
                    self.transition_name(t).to_string(),
                ),
                ArcType::TransitionPlace(t, p) => (
                    self.transition_name(t).to_string(),
                    self.place(p).name.clone(),
                ),
            })
            .collect()
    }

    /// Check if place is in initial marking
    pub fn is_in_initial_marking(&self, p: &PlaceID) -> bool {
        self.initial_marking
            .as_ref()
            .is_some_and(|m| m.contains_key(p))
    }

    /// Check if place is in _any_ final marking
    pub fn is_in_a_final_marking(&self, p: &PlaceID) -> bool {
        self.final_markings
            .as_ref()
            .is_some_and(|markings| markings.iter().any(|m| m.contains_key(p)))
    }

    #[cfg(feature = "graphviz-export")]
    /// Export Petri net as a PNG image
    ///
    /// The PNG file is written to the specified filepath
    ///
    /// _Note_: This is an export method for __visualizing__ the Petri net.
    /// For saving the net data, see [`PetriNet::export_pnml`] or [`PetriNet::to_json`].
    ///
    /// Only available with the `graphviz-export` feature.
    pub fn export_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), std::io::Error> {
        super::image_export::export_petri_net_image_png(self, path)
    }

    #[cfg(feature = "graphviz-export")]
    /// Export Petri net as a SVG image
    ///
    /// The SVG file is written to the specified filepath
    ///
    /// Only available with the `graphviz-export` feature.
    pub fn export_svg<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), std::io::Error> {
        super::image_export::export_petri_net_image_svg(self, path)
    }

    /// Export Petri net to a PNML file
    ///
    /// The PNML file is written to the specified filepath
    pub fn export_pnml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), super::export_pnml::ExportError> {
        super::export_pnml::export_petri_net_to_pnml_path(self, path)
    }
}
