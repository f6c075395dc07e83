use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::GzDecoder;
use quick_xml::events::BytesStart;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, warn};

use super::activity_log::ActivityLog;
use super::constants::ACTIVITY_NAME;

///
/// Error encountered while parsing XES
///
#[derive(Debug, Error)]
pub enum XESParseError {
    /// There is no top-level `<log>`
    #[error("Failed to parse XES: no top-level <log> element")]
    NoTopLevelLog,
    /// An event has no activity label (neither its own nor a global default)
    #[error("Failed to parse XES: event {event} of trace {trace} has no `concept:name` attribute")]
    MissingActivity {
        /// Index of the trace (in document order)
        trace: usize,
        /// Index of the event within its trace
        event: usize,
    },
    /// An `<event>` was encountered outside an open `<trace>`
    #[error("Failed to parse XES: <event> outside of <trace>")]
    EventOutsideTrace,
    /// IO error
    #[error("Failed to read XES: {0}")]
    IOError(#[from] std::io::Error),
    /// XML error (e.g., incorrect XML format)
    #[error("Failed to parse XES: {0}")]
    XMLParsingError(#[from] quick_xml::Error),
    /// Malformed XML attribute on an element
    #[error("Failed to parse XES: {0}")]
    XMLAttributeError(#[from] quick_xml::events::attributes::AttrError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Current parsing mode (i.e., which tag is currently open)
enum Mode {
    None,
    Log,
    GlobalEventAttributes,
    Global,
    Trace,
    Event,
}

fn read_to_string(x: &[u8]) -> String {
    if let Ok(x_str) = std::str::from_utf8(x) {
        if let Ok(escaped) = quick_xml::escape::unescape(x_str) {
            return escaped.to_string();
        }
        return x_str.to_string();
    }
    String::from_utf8_lossy(x).to_string()
}

/// Returns the `value` of a `<string key="concept:name" value="..."/>` tag
fn activity_from_tag(t: &BytesStart<'_>) -> Result<Option<String>, XESParseError> {
    if t.name().as_ref() != b"string" {
        return Ok(None);
    }
    match t.try_get_attribute("key")? {
        Some(key) if key.value.as_ref() == ACTIVITY_NAME.as_bytes() => {
            Ok(t.try_get_attribute("value")?
                .map(|v| read_to_string(v.value.as_ref())))
        }
        _ => Ok(None),
    }
}

struct XESActivityParser {
    mode: Mode,
    /// Depth of nested (non-structural) elements currently open
    nested: usize,
    encountered_log: bool,
    default_activity: Option<String>,
    traces: Vec<Vec<String>>,
    current_trace: Vec<String>,
    current_activity: Option<String>,
}

impl XESActivityParser {
    fn new() -> Self {
        Self {
            mode: Mode::None,
            nested: 0,
            encountered_log: false,
            default_activity: None,
            traces: Vec::new(),
            current_trace: Vec::new(),
            current_activity: None,
        }
    }

    fn open(&mut self, t: &BytesStart<'_>, is_empty: bool) -> Result<(), XESParseError> {
        if self.nested > 0 {
            if !is_empty {
                self.nested += 1;
            }
            return Ok(());
        }
        match (self.mode, t.name().as_ref()) {
            (Mode::None, b"log") => {
                self.encountered_log = true;
                self.mode = Mode::Log;
            }
            (Mode::Log, b"global") => {
                let is_event_scope = matches!(
                    t.try_get_attribute("scope")?,
                    Some(a) if a.value.as_ref() == b"event"
                );
                if !is_empty {
                    self.mode = if is_event_scope {
                        Mode::GlobalEventAttributes
                    } else {
                        Mode::Global
                    };
                }
            }
            (Mode::Log, b"trace") => {
                self.current_trace = Vec::new();
                if is_empty {
                    self.close_trace();
                } else {
                    self.mode = Mode::Trace;
                }
            }
            (Mode::Trace, b"event") => {
                self.current_activity = None;
                if is_empty {
                    self.close_event()?;
                } else {
                    self.mode = Mode::Event;
                }
            }
            (Mode::Log, b"event") => return Err(XESParseError::EventOutsideTrace),
            (Mode::Event, _) => {
                if let Some(act) = activity_from_tag(t)? {
                    self.current_activity = Some(act);
                }
                if !is_empty {
                    self.nested += 1;
                }
            }
            (Mode::GlobalEventAttributes, _) => {
                if let Some(act) = activity_from_tag(t)? {
                    self.default_activity = Some(act);
                }
                if !is_empty {
                    self.nested += 1;
                }
            }
            _ => {
                if !is_empty {
                    self.nested += 1;
                }
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<(), XESParseError> {
        if self.nested > 0 {
            self.nested -= 1;
            return Ok(());
        }
        match (self.mode, name) {
            (Mode::Event, b"event") => {
                self.close_event()?;
                self.mode = Mode::Trace;
            }
            (Mode::Trace, b"trace") => {
                self.close_trace();
                self.mode = Mode::Log;
            }
            (Mode::GlobalEventAttributes | Mode::Global, b"global") => self.mode = Mode::Log,
            (Mode::Log, b"log") => self.mode = Mode::None,
            _ => {}
        }
        Ok(())
    }

    fn close_event(&mut self) -> Result<(), XESParseError> {
        match self
            .current_activity
            .take()
            .or_else(|| self.default_activity.clone())
        {
            Some(act) => {
                self.current_trace.push(act);
                Ok(())
            }
            None => Err(XESParseError::MissingActivity {
                trace: self.traces.len(),
                event: self.current_trace.len(),
            }),
        }
    }

    fn close_trace(&mut self) {
        let trace = std::mem::take(&mut self.current_trace);
        if trace.is_empty() {
            debug!("Skipping empty trace #{}", self.traces.len());
        }
        self.traces.push(trace);
    }
}

///
/// Import an [`ActivityLog`] from an XES reader
///
/// Only the `concept:name` attribute of events is read (falling back to a global event default).
/// Events without an activity label are rejected with [`XESParseError::MissingActivity`].
///
pub fn import_xes<T>(reader: &mut Reader<T>) -> Result<ActivityLog, XESParseError>
where
    T: BufRead,
{
    reader.config_mut().trim_text(true);
    let mut buf: Vec<u8> = Vec::new();
    let mut parser = XESActivityParser::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            quick_xml::events::Event::Start(t) => parser.open(&t, false)?,
            quick_xml::events::Event::Empty(t) => parser.open(&t, true)?,
            quick_xml::events::Event::End(t) => parser.close(t.name().as_ref())?,
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if !parser.encountered_log {
        return Err(XESParseError::NoTopLevelLog);
    }
    if parser.mode != Mode::None {
        warn!("XES document ended with unclosed elements; using traces parsed so far");
    }
    let log = ActivityLog::new(parser.traces);
    debug!(
        "Imported XES with {} traces and {} activities",
        log.traces.len(),
        log.num_activities()
    );
    Ok(log)
}

///
/// Import an [`ActivityLog`] from a byte slice of XES data
///
/// If `is_compressed_gz` is set, the data is decompressed (gzip) first.
///
pub fn import_xes_slice(
    xes_data: &[u8],
    is_compressed_gz: bool,
) -> Result<ActivityLog, XESParseError> {
    if is_compressed_gz {
        let gz = GzDecoder::new(xes_data);
        import_xes(&mut Reader::from_reader(BufReader::new(gz)))
    } else {
        import_xes(&mut Reader::from_reader(xes_data))
    }
}

///
/// Import an [`ActivityLog`] from an XES file (auto-detecting gz compression from the file extension)
///
pub fn import_xes_file<P: AsRef<Path>>(path: P) -> Result<ActivityLog, XESParseError> {
    let is_gz = path
        .as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let file = BufReader::new(File::open(path)?);
    if is_gz {
        import_xes(&mut Reader::from_reader(BufReader::new(GzDecoder::new(file))))
    } else {
        import_xes(&mut Reader::from_reader(file))
    }
}
