#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]
#![allow(clippy::needless_doctest_main)]
#![doc = include_str!("../README.md")]

///
/// Event logs as sequences of activity labels ([`ActivityLog`])
///
pub mod event_log {
    /// [`ActivityLog`] struct
    pub mod activity_log;
    /// Constants
    pub mod constants;
    /// XES Import (activity labels only)
    pub mod import_xes;

    #[doc(inline)]
    pub use activity_log::ActivityLog;
    #[cfg(test)]
    mod tests;
}

///
/// Module for the Alpha Process Discovery algorithm
///
pub mod alpha {
    /// Footprint relations (directly-follows, causal, parallel, independent)
    pub mod relations;
    /// Alpha Place Candidate Building
    pub mod candidate_building;
    /// Reduction of place candidates to maximal ones
    pub mod candidate_pruning;
    /// Full Alpha Discovery algorithm
    pub mod full;
}

/// Util module with smaller helper functions, structs or enums
pub mod utils;

///
/// Petri nets
///
pub mod petri_net {
    /// Export [`PetriNet`] to `.pnml`
    pub mod export_pnml;
    #[cfg(feature = "graphviz-export")]
    /// Export [`PetriNet`] to images (SVG, PNG, ...)
    ///
    /// __Requires the `graphviz-export` feature to be enabled__
    ///
    /// Also requires an active graphviz installation in the PATH.
    /// See also <https://github.com/besok/graphviz-rust?tab=readme-ov-file#caveats> and <https://graphviz.org/download/>
    pub mod image_export;
    /// [`PetriNet`] struct
    pub mod petri_net_struct;

    #[doc(inline)]
    pub use petri_net_struct::PetriNet;
}

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[doc(inline)]
pub use alpha::full::alpha_discover_petri_net;

#[doc(inline)]
pub use alpha::full::discover;

#[doc(inline)]
pub use alpha::full::discover_with_details;

#[doc(inline)]
pub use alpha::full::AlphaConfig;

#[doc(inline)]
pub use alpha::relations::RelationMatrix;

#[doc(inline)]
pub use event_log::activity_log::ActivityLog;

#[doc(inline)]
pub use event_log::import_xes::import_xes_file;

#[doc(inline)]
pub use event_log::import_xes::import_xes_slice;

#[doc(inline)]
pub use event_log::import_xes::XESParseError;

#[doc(inline)]
pub use petri_net::petri_net_struct::PetriNet;

#[cfg(feature = "graphviz-export")]
#[doc(inline)]
pub use petri_net::image_export::export_petri_net_image_png;

#[cfg(feature = "graphviz-export")]
#[doc(inline)]
pub use petri_net::image_export::export_petri_net_image_svg;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml;

#[doc(inline)]
pub use petri_net::export_pnml::export_petri_net_to_pnml_path;

///
/// Serialize a [`PetriNet`] as a JSON [`String`]
///
pub fn petrinet_to_json(net: &PetriNet) -> String {
    net.to_json()
}

///
/// Deserialize a [`PetriNet`] from a JSON [`String`]
///
pub fn json_to_petrinet(net_json: &str) -> Result<PetriNet, serde_json::Error> {
    PetriNet::from_json(net_json)
}

///
/// Import an [`ActivityLog`] from a JSON file given by a filepath
///
/// The file is expected to contain a list of traces, each a list of activity labels
/// (e.g., `[["a","b","d"],["a","c","d"]]`).
///
pub fn import_activity_log_json_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<ActivityLog, std::io::Error> {
    let reader: BufReader<File> = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::{discover, import_activity_log_json_from_path, json_to_petrinet, petrinet_to_json};

    #[test]
    fn json_log_to_net() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[["a","b","d"],["a","c","d"]]"#).unwrap();
        let log = import_activity_log_json_from_path(file.path()).unwrap();
        assert_eq!(log.activities, vec!["a", "b", "d", "c"]);

        let net = discover(&log);
        let json = petrinet_to_json(&net);
        assert_eq!(json_to_petrinet(&json).unwrap(), net);
        assert!(json_to_petrinet("{").is_err());
    }

    #[test]
    fn invalid_json_log() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"traces": 1}"#).unwrap();
        assert!(import_activity_log_json_from_path(file.path()).is_err());
        assert!(import_activity_log_json_from_path("does/not/exist.json").is_err());
    }
}
