use std::{fs::File, io::Write, path::Path};

use graphviz_rust::{
    cmd::Format,
    dot_generator::{attr, edge, graph, id, node, node_id, stmt},
    dot_structures::*,
    printer::{DotPrinter, PrinterContext},
};

use super::petri_net_struct::{ArcType, PetriNet, PlaceID, TransitionID};

fn place_node_id(net: &PetriNet, p: PlaceID) -> String {
    format!("place_{}", net.place(p).name)
}

fn transition_node_id(t: TransitionID) -> String {
    format!("transition_{}", t.0)
}

///
/// Build the graphviz [`Graph`] of a [`PetriNet`]
///
/// Places are drawn as circles (initial places with a token, final places as double circles),
/// transitions as boxes labeled with their activity.
///
pub fn petri_net_to_graph(net: &PetriNet, dpi_factor: Option<f32>) -> Graph {
    let place_nodes: Vec<_> = (0..net.places.len())
        .map(PlaceID)
        .map(|p| {
            let symbol = if net.is_in_initial_marking(&p) { "●" } else { "" };
            let is_final = net.is_in_a_final_marking(&p);
            let shape = if is_final { "doublecircle" } else { "circle" };
            let size = if is_final { 0.4 } else { 0.5 };
            let tooltip = net.place(p).label.clone().unwrap_or_else(|| net.place(p).name.clone());
            let p_id = place_node_id(net, p);
            stmt!(node!(esc p_id; attr!("label", esc symbol), attr!("tooltip", esc tooltip), attr!("shape",shape), attr!("fixedsize",true), attr!("width",size), attr!("height",size)))
        })
        .collect();

    let transition_nodes: Vec<_> = (0..net.transitions.len())
        .map(TransitionID)
        .map(|t| {
            let label = net.transition(t).label.clone().unwrap_or_default();
            let fill_color = if net.transition(t).label.is_none() { "black" } else { "white" };
            let t_id = transition_node_id(t);
            stmt!(node!(esc t_id; attr!("label", esc label), attr!("shape","box"), attr!("style","filled"), attr!("fillcolor",fill_color), attr!("width",1.0), attr!("height",0.5)))
        })
        .collect();

    let arcs: Vec<_> = net
        .arcs
        .iter()
        .map(|arc| {
            let (from_id, to_id) = match arc.from_to {
                ArcType::PlaceTransition(p, t) => (place_node_id(net, p), transition_node_id(t)),
                ArcType::TransitionPlace(t, p) => (transition_node_id(t), place_node_id(net, p)),
            };
            stmt!(edge!(node_id!(esc from_id) => node_id!(esc to_id)))
        })
        .collect();

    let mut global_graph_options = vec![stmt!(attr!("rankdir", "LR"))];
    if let Some(dpi_fac) = dpi_factor {
        global_graph_options.push(stmt!(attr!("dpi", (dpi_fac * 96.0))))
    }

    graph!(strict di id!("id"), vec![global_graph_options, place_nodes, transition_nodes, arcs].into_iter().flatten().collect())
}

///
/// Render a [`PetriNet`] to a DOT string (does not require a graphviz installation)
///
pub fn petri_net_to_dot(net: &PetriNet) -> String {
    petri_net_to_graph(net, None).print(&mut PrinterContext::default())
}

///
/// Export the image of a [`PetriNet`]
///
/// Also see [`export_petri_net_image_svg`] and [`export_petri_net_image_png`]
///
pub fn export_petri_net_image<P: AsRef<Path>>(
    net: &PetriNet,
    path: P,
    format: Format,
    dpi_factor: Option<f32>,
) -> Result<(), std::io::Error> {
    let g = petri_net_to_graph(net, dpi_factor);
    let out = graphviz_rust::exec(g, &mut PrinterContext::default(), vec![format.into()])?;

    let mut f = File::create(path)?;
    f.write_all(&out)?;
    Ok(())
}

///
/// Export the image of a [`PetriNet`] as a SVG file
///
pub fn export_petri_net_image_svg<P: AsRef<Path>>(
    net: &PetriNet,
    path: P,
) -> Result<(), std::io::Error> {
    export_petri_net_image(net, path, Format::Svg, None)
}

///
/// Export the image of a [`PetriNet`] as a PNG file
///
pub fn export_petri_net_image_png<P: AsRef<Path>>(
    net: &PetriNet,
    path: P,
) -> Result<(), std::io::Error> {
    export_petri_net_image(net, path, Format::Png, Some(2.0))
}
