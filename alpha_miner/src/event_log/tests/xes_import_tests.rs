use std::io::Write;

use crate::event_log::import_xes::{import_xes_file, import_xes_slice, XESParseError};

const CHOICE_XES: &[u8] = include_bytes!("test_data/choice.xes");

#[test]
fn test_xes_import_activities() {
    let log = import_xes_slice(CHOICE_XES, false).unwrap();

    // Third trace has no events and is dropped
    assert_eq!(log.traces.len(), 2);
    assert_eq!(
        log.activities,
        vec![
            "register request",
            "check ticket",
            "decide & pay",
            "examine casually"
        ]
    );
    assert_eq!(
        log.named_traces(),
        vec![
            vec!["register request", "check ticket", "decide & pay"],
            vec!["register request", "examine casually", "decide & pay"],
        ]
    );
}

#[test]
fn test_xes_gz_import() {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(CHOICE_XES).unwrap();
    let gz_bytes = encoder.finish().unwrap();

    let log = import_xes_slice(&gz_bytes, true).unwrap();
    assert_eq!(log, import_xes_slice(CHOICE_XES, false).unwrap());
}

#[test]
fn test_xes_file_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("choice.xes");
    std::fs::write(&path, CHOICE_XES).unwrap();
    let log = import_xes_file(&path).unwrap();
    assert_eq!(log.num_activities(), 4);

    let missing = import_xes_file(dir.path().join("does-not-exist.xes"));
    assert!(matches!(missing, Err(XESParseError::IOError(_))));
}

#[test]
fn test_event_without_activity_is_rejected() {
    let xes = br#"<log>
        <trace>
            <event><string key="concept:name" value="a"/></event>
            <event><string key="org:resource" value="Pete"/></event>
        </trace>
    </log>"#;
    match import_xes_slice(xes, false) {
        Err(XESParseError::MissingActivity { trace, event }) => {
            assert_eq!(trace, 0);
            assert_eq!(event, 1);
        }
        other => panic!("Expected MissingActivity error, got {other:?}"),
    }
}

#[test]
fn test_global_event_default_activity() {
    let xes = br#"<log>
        <global scope="event"><string key="concept:name" value="unnamed"/></global>
        <trace>
            <event><string key="concept:name" value="a"/></event>
            <event/>
        </trace>
    </log>"#;
    let log = import_xes_slice(xes, false).unwrap();
    assert_eq!(log.named_traces(), vec![vec!["a", "unnamed"]]);
}

#[test]
fn test_no_top_level_log() {
    let xes = br#"<trace><event><string key="concept:name" value="a"/></event></trace>"#;
    assert!(matches!(
        import_xes_slice(xes, false),
        Err(XESParseError::NoTopLevelLog)
    ));
}

#[test]
fn test_empty_log() {
    let log = import_xes_slice(b"<log></log>", false).unwrap();
    assert!(log.is_empty());
    assert_eq!(log.num_activities(), 0);
}

#[test]
fn test_nested_attributes_do_not_override_activity() {
    let xes = br#"<log>
        <trace>
            <event>
                <string key="concept:name" value="a"/>
                <list key="tags">
                    <string key="concept:name" value="in-list"/>
                </list>
                <container key="meta">
                    <string key="concept:name" value="in-container"/>
                    <container key="inner">
                        <string key="concept:name" value="deeply-nested"/>
                    </container>
                </container>
            </event>
            <event>
                <container key="meta">
                    <string key="concept:name" value="in-container"/>
                </container>
                <string key="concept:name" value="b"/>
            </event>
        </trace>
    </log>"#;
    let log = import_xes_slice(xes, false).unwrap();
    assert_eq!(log.named_traces(), vec![vec!["a", "b"]]);
    assert_eq!(log.activities, vec!["a", "b"]);
}

#[test]
fn test_unclosed_document_keeps_completed_traces() {
    let xes = br#"<log>
        <trace>
            <event><string key="concept:name" value="a"/></event>
            <event><string key="concept:name" value="b"/></event>
        </trace>
        <trace>
            <event><string key="concept:name" value="c"/></event>"#;
    let log = import_xes_slice(xes, false).unwrap();
    assert_eq!(log.named_traces(), vec![vec!["a", "b"]]);
    assert_eq!(log.num_activities(), 2);
}
