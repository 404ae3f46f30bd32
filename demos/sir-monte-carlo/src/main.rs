use std::error::Error;
use std::time::Instant;

use clap::{ArgEnum, Parser};
use log::info;

use episim::epidemic::{SeirConfig, SeirsConfig, SirConfig};
use episim::{Ensemble, Method, ReactionModel, Ssa};

#[derive(Clone, Copy, Debug, ArgEnum)]
enum Scenario {
    Sir,
    Seir,
    Seirs,
}

/// Monte Carlo simulation of epidemic compartment models
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// Compartment model
    #[clap(long, arg_enum, default_value = "sir")]
    model: Scenario,

    /// Simulation method (direct or first_reaction)
    #[clap(long, default_value = "direct")]
    method: Method,

    /// Number of trajectories
    #[clap(long, short, default_value_t = 300)]
    trajectories: usize,

    /// Random seed
    #[clap(long, default_value_t = 123)]
    seed: u64,

    /// Path to JSON file with model configuration (defaults are used for missing fields)
    #[clap(long)]
    config: Option<String>,

    /// Print the collected trajectory summaries as JSON
    #[clap(long)]
    json: bool,
}

fn build_model(scenario: Scenario, config: Option<&str>) -> Result<ReactionModel, Box<dyn Error>> {
    let model = match scenario {
        Scenario::Sir => config.map(SirConfig::from_json).transpose()?.unwrap_or_default().model()?,
        Scenario::Seir => config.map(SeirConfig::from_json).transpose()?.unwrap_or_default().model()?,
        Scenario::Seirs => config.map(SeirsConfig::from_json).transpose()?.unwrap_or_default().model()?,
    };
    Ok(model)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = args.config.as_deref().map(std::fs::read_to_string).transpose()?;
    let mut model = build_model(args.model, config.as_deref())?;
    let species = model.species_names().to_vec();

    info!(
        "Simulating {} trajectories of {:?} model with {} method",
        args.trajectories, args.model, args.method
    );
    let t = Instant::now();
    let mut ensemble = Ensemble::new();
    let mut ssa = Ssa::new(&mut model, args.seed);
    for trajectory in ssa.trajectories(args.method).take(args.trajectories) {
        ensemble.add(&trajectory?);
    }
    let elapsed = t.elapsed().as_secs_f64();
    info!("Simulation finished in {:.2}s", elapsed);

    if let (Some(steps), Some(duration)) = (ensemble.steps(), ensemble.final_time()) {
        println!("Trajectories: {}", ensemble.len());
        println!("Reactions per trajectory: {:.1} ± {:.1}", steps.mean, steps.std_dev);
        println!(
            "Duration: {:.2} ± {:.2} (min {:.2}, max {:.2})",
            duration.mean, duration.std_dev, duration.min, duration.max
        );
        println!("Reactions per second: {:.0}", steps.mean * steps.count as f64 / elapsed);
    }
    println!();
    println!("{:<8} {:>16} {:>16} {:>16}", "species", "final", "peak", "peak time");
    for name in &species {
        if let (Some(last), Some(peak), Some(peak_time)) =
            (ensemble.final_value(name), ensemble.peak(name), ensemble.peak_time(name))
        {
            println!(
                "{:<8} {:>8.1} ± {:<5.1} {:>8.1} ± {:<5.1} {:>8.2} ± {:<5.2}",
                name, last.mean, last.std_dev, peak.mean, peak.std_dev, peak_time.mean, peak_time.std_dev
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ensemble)?);
    }
    Ok(())
}
