use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use thiserror::Error;

use crate::utils::xml_utils::XMLWriterWrapper;

use super::petri_net_struct::{ArcType, Marking, PetriNet, PlaceID};

const PNML_NET_TYPE: &str = "http://www.pnml.org/version-2009/grammar/pnmlcoremodel";

///
/// Error encountered while exporting a [`PetriNet`]
///
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error (e.g., file could not be created)
    #[error("Failed to write Petri net: {0}")]
    IOError(#[from] std::io::Error),
    /// XML writer error
    #[error("Failed to write PNML: {0}")]
    XMLError(#[from] quick_xml::Error),
}

fn transition_id(index: usize) -> String {
    format!("t{}", index)
}

fn open<W: Write>(writer: &mut Writer<W>, tag: BytesStart<'_>) -> Result<(), ExportError> {
    writer.write_event(Event::Start(tag))?;
    Ok(())
}

fn close<W: Write>(writer: &mut Writer<W>, tag: &str) -> Result<(), ExportError> {
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Write `<tag><text>content</text></tag>`
fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    content: &str,
) -> Result<(), ExportError> {
    open(writer, BytesStart::new(tag))?;
    open(writer, BytesStart::new("text"))?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    close(writer, "text")?;
    close(writer, tag)
}

fn write_marking<W: Write>(
    writer: &mut Writer<W>,
    pn: &PetriNet,
    marking: &Marking,
) -> Result<(), ExportError> {
    open(writer, BytesStart::new("marking"))?;
    for (place_id, tokens) in marking {
        let mut place = BytesStart::new("place");
        place.push_attribute(("idref", pn.place(*place_id).name.as_str()));
        open(writer, place)?;
        open(writer, BytesStart::new("text"))?;
        writer.write_event(Event::Text(BytesText::new(&tokens.to_string())))?;
        close(writer, "text")?;
        close(writer, "place")?;
    }
    close(writer, "marking")
}

///
/// Export a [`PetriNet`] to the PNML format and write the result to the provided writer which implements into [`quick_xml::Writer`] / [`std::io::Write`]
///
/// Places are identified by their name, transitions by `t<index>`.
///
pub fn export_petri_net_to_pnml<'a, W>(
    pn: &PetriNet,
    into_writer: impl Into<XMLWriterWrapper<'a, W>>,
) -> Result<(), ExportError>
where
    W: Write + 'a,
{
    let mut xml_writer: XMLWriterWrapper<'_, W> = into_writer.into();
    let writer = xml_writer.writer();
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    open(writer, BytesStart::new("pnml"))?;
    open(
        writer,
        BytesStart::new("net").with_attributes([("id", "net1"), ("type", PNML_NET_TYPE)]),
    )?;
    write_text_element(writer, "name", "Alpha Miner Petri net")?;
    open(writer, BytesStart::new("page").with_attributes([("id", "n0")]))?;

    for (index, place) in pn.places.iter().enumerate() {
        open(
            writer,
            BytesStart::new("place").with_attributes([("id", place.name.as_str())]),
        )?;
        write_text_element(
            writer,
            "name",
            place.label.as_deref().unwrap_or(place.name.as_str()),
        )?;
        let tokens = pn
            .initial_marking
            .as_ref()
            .and_then(|m| m.get(&PlaceID(index)));
        if let Some(tokens) = tokens {
            write_text_element(writer, "initialMarking", &tokens.to_string())?;
        }
        close(writer, "place")?;
    }

    for (index, transition) in pn.transitions.iter().enumerate() {
        let id = transition_id(index);
        open(
            writer,
            BytesStart::new("transition").with_attributes([("id", id.as_str())]),
        )?;
        write_text_element(
            writer,
            "name",
            transition.label.as_deref().unwrap_or("Tau"),
        )?;
        if transition.label.is_none() {
            writer.write_event(Event::Empty(BytesStart::new("toolspecific").with_attributes([
                ("tool", "ProM"),
                ("version", "6.4"),
                ("activity", "$invisible$"),
                ("localNodeID", id.as_str()),
            ])))?;
        }
        close(writer, "transition")?;
    }

    for (index, arc) in pn.arcs.iter().enumerate() {
        let (source_id, target_id) = match arc.from_to {
            ArcType::PlaceTransition(p, t) => (pn.place(p).name.clone(), transition_id(t.0)),
            ArcType::TransitionPlace(t, p) => (transition_id(t.0), pn.place(p).name.clone()),
        };
        let arc_id = format!("a{}", index);
        open(
            writer,
            BytesStart::new("arc").with_attributes([
                ("id", arc_id.as_str()),
                ("source", source_id.as_str()),
                ("target", target_id.as_str()),
            ]),
        )?;
        write_text_element(writer, "inscription", &arc.weight.to_string())?;
        close(writer, "arc")?;
    }
    close(writer, "page")?;

    if let Some(final_markings) = &pn.final_markings {
        open(writer, BytesStart::new("finalmarkings"))?;
        for marking in final_markings {
            write_marking(writer, pn, marking)?;
        }
        close(writer, "finalmarkings")?;
    }

    close(writer, "net")?;
    close(writer, "pnml")
}

/// Export a [`PetriNet`] to a `.pnml` file (specified through path)
///
/// Also consider using [`PetriNet::export_pnml`] for convenience or [`export_petri_net_to_pnml`] for more control.
pub fn export_petri_net_to_pnml_path<P: AsRef<Path>>(
    pn: &PetriNet,
    path: P,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    export_petri_net_to_pnml(pn, XMLWriterWrapper::indented(BufWriter::new(file)))
}
