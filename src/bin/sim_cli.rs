//! Command-line front end: reads a `RunRequest` JSON document, plays the
//! battle, and writes the resulting trace back out as JSON.

use clap::Parser;
use hexbattle_sim::api::dto::RunRequest;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sim_cli")]
#[command(about = "Runs one hexagonal auto-battler simulation from a JSON request file")]
struct Cli {
    /// Path to a RunRequest JSON document (rosters, seed, config, templates).
    request: PathBuf,

    /// Where to write the resulting trace. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let content = fs::read_to_string(&cli.request)?;
    let request: RunRequest = serde_json::from_str(&content)?;

    log::info!("running simulation seed={} grid={}x{}", request.seed, request.config.grid_width, request.config.grid_height);
    let output = hexbattle_sim::run(request)?;
    log::info!("simulation finished after {} ticks, winner={:?}", output.total_ticks, output.winner_team);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match cli.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
