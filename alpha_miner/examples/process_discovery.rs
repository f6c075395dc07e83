use alpha_miner::{alpha_discover_petri_net, import_xes_file, AlphaConfig};
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <path_to_xes_log> <output_pnml_path>", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);

    println!("Importing event log from {:?}", input_path);
    let log = import_xes_file(&input_path)?;
    println!(
        "Imported {} traces over {} activities.",
        log.traces.len(),
        log.num_activities()
    );

    println!("Discovering Petri net using the Alpha algorithm...");
    let (petri_net, durations) = alpha_discover_petri_net(&log, AlphaConfig::default());

    println!(
        "Discovered Petri net with {} places and {} transitions in {:.3}s.",
        petri_net.places.len(),
        petri_net.transitions.len(),
        durations.total
    );

    println!("Exporting Petri net to {:?}", output_path);
    petri_net.export_pnml(&output_path)?;

    println!("Done!");
    Ok(())
}
