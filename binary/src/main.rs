use std::path::{Path, PathBuf};

use alpha_miner::{
    discover_with_details, import_activity_log_json_from_path, import_xes_file, ActivityLog,
    AlphaConfig,
};
use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "alpha-miner")]
#[command(about = "Discover a Petri net from an event log using the Alpha algorithm")]
#[command(version)]
struct Cli {
    /// Event log (`.xes`, `.xes.gz` or `.json` list of traces)
    log: PathBuf,
    /// Write the discovered Petri net as JSON to this file (printed to stdout if no output is given)
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write the discovered Petri net as PNML to this file
    #[arg(long)]
    pnml: Option<PathBuf>,
    /// Render the discovered Petri net as PNG (requires the `graphviz-export` feature)
    #[arg(long)]
    png: Option<PathBuf>,
    /// Render the discovered Petri net as SVG (requires the `graphviz-export` feature)
    #[arg(long)]
    svg: Option<PathBuf>,
    /// JSON file with an `AlphaConfig`
    #[arg(long)]
    config: Option<PathBuf>,
    /// Treat `a` directly followed by `a` as a directly-follows pair
    #[arg(long)]
    count_self_succession: bool,
    /// Also build split candidates with single-element output sets
    #[arg(long)]
    include_singleton_subsets: bool,
    /// Print the footprint matrix to stdout
    #[arg(long)]
    print_footprint: bool,
}

impl Cli {
    fn has_output(&self) -> bool {
        self.json.is_some() || self.pnml.is_some() || self.png.is_some() || self.svg.is_some()
    }
}

fn load_log(path: &Path) -> anyhow::Result<ActivityLog> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".xes") || name.ends_with(".xes.gz") {
        import_xes_file(path).with_context(|| format!("Failed to import XES log {:?}", path))
    } else if name.ends_with(".json") {
        import_activity_log_json_from_path(path)
            .with_context(|| format!("Failed to import JSON log {:?}", path))
    } else {
        bail!(
            "Unsupported log format {:?} (expected .xes, .xes.gz or .json)",
            path
        )
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AlphaConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            AlphaConfig::from_json(&json)
                .with_context(|| format!("Invalid config {:?}", path))?
        }
        None => AlphaConfig::default(),
    };
    config.count_self_succession |= cli.count_self_succession;
    config.include_singleton_subsets |= cli.include_singleton_subsets;
    Ok(config)
}

#[cfg(feature = "graphviz-export")]
fn export_images(cli: &Cli, net: &alpha_miner::PetriNet) -> anyhow::Result<()> {
    if let Some(path) = &cli.png {
        net.export_png(path)
            .with_context(|| format!("Failed to render PNG {:?}", path))?;
    }
    if let Some(path) = &cli.svg {
        net.export_svg(path)
            .with_context(|| format!("Failed to render SVG {:?}", path))?;
    }
    Ok(())
}

#[cfg(not(feature = "graphviz-export"))]
fn export_images(cli: &Cli, _net: &alpha_miner::PetriNet) -> anyhow::Result<()> {
    if cli.png.is_some() || cli.svg.is_some() {
        bail!("Image export requires building with the `graphviz-export` feature");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let log = load_log(&cli.log)?;
    info!(
        "Loaded {} traces with {} activities from {:?}",
        log.traces.len(),
        log.num_activities(),
        cli.log
    );

    let discovery = discover_with_details(&log, config);
    if cli.print_footprint {
        print!("{}", discovery.relations);
    }
    info!("Durations: {}", discovery.durations.to_json());
    let net = discovery.net;

    if let Some(path) = &cli.json {
        std::fs::write(path, net.to_json())
            .with_context(|| format!("Failed to write JSON {:?}", path))?;
    }
    if let Some(path) = &cli.pnml {
        net.export_pnml(path)
            .with_context(|| format!("Failed to write PNML {:?}", path))?;
    }
    export_images(&cli, &net)?;
    if !cli.has_output() {
        println!("{}", net.to_json());
    }
    Ok(())
}
