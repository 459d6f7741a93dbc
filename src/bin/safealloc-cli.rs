//! SafeAlloc CLI - run the safety engine over scenario files
//!
//! Usage:
//!   safealloc-cli safety scenario.json
//!   safealloc-cli request scenario.json --process 1 --amounts 1,0,2
//!   safealloc-cli detect scenario.json
//!   safealloc-cli demo

use anyhow::Context;
use clap::{Parser, Subcommand};
use safealloc_core::banker::format_sequence;
use safealloc_core::observability::init_tracing;
use safealloc_core::{Decision, EngineConfig, ProcessId, Scenario, Units};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "safealloc-cli")]
#[command(about = "Banker's algorithm and deadlock detection over resource snapshots", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON engine configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the scenario's state is safe
    Safety {
        /// Scenario file
        scenario: PathBuf,
    },

    /// Evaluate a single resource request
    Request {
        /// Scenario file
        scenario: PathBuf,

        /// Requesting process index
        #[arg(short, long)]
        process: usize,

        /// Requested units per resource type, comma separated
        #[arg(short, long, value_delimiter = ',')]
        amounts: Vec<Units>,
    },

    /// Detect deadlock from the scenario's outstanding requests
    Detect {
        /// Scenario file
        scenario: PathBuf,
    },

    /// Run the built-in classic examples
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::from_env()?,
    };
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Safety { scenario } => {
            let scenario = load(&scenario)?;
            safety(&scenario, &config, cli.json)
        }
        Commands::Request {
            scenario,
            process,
            amounts,
        } => {
            let scenario = load(&scenario)?;
            request(&scenario, &config, ProcessId(process), &amounts, cli.json)
        }
        Commands::Detect { scenario } => {
            let scenario = load(&scenario)?;
            detect(&scenario, &config, cli.json)
        }
        Commands::Demo => demo(&config, cli.json),
    }
}

fn load(path: &Path) -> anyhow::Result<Scenario> {
    Scenario::from_file(path).with_context(|| format!("loading scenario {}", path.display()))
}

fn safety(scenario: &Scenario, config: &EngineConfig, as_json: bool) -> anyhow::Result<()> {
    let engine = scenario.engine(config)?;
    let result = engine.is_safe();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.safe {
        println!("SAFE: sequence {}", format_sequence(&result.order));
    } else {
        println!(
            "UNSAFE: only {} can complete",
            format_sequence(&result.order)
        );
    }
    Ok(())
}

fn request(
    scenario: &Scenario,
    config: &EngineConfig,
    process: ProcessId,
    amounts: &[Units],
    as_json: bool,
) -> anyhow::Result<()> {
    let mut engine = scenario.engine(config)?;
    let decision = engine.evaluate(process, amounts)?;

    if as_json {
        let output = json!({
            "decision": decision,
            "available": engine.state().available(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match decision {
        Decision::Granted { safe_sequence } => {
            println!(
                "GRANTED: {} receives {:?}, safe sequence {}",
                process,
                amounts,
                format_sequence(&safe_sequence)
            );
            println!("Available now {:?}", engine.state().available());
        }
        Decision::Denied(reason) => println!("DENIED: {}", reason),
    }
    Ok(())
}

fn detect(scenario: &Scenario, config: &EngineConfig, as_json: bool) -> anyhow::Result<()> {
    let engine = scenario.engine(config)?;
    let requests = scenario.outstanding_requests();
    let graph = engine.wait_for_graph(&requests)?;
    let result = engine.check_deadlock(&requests)?;

    if as_json {
        let output = json!({
            "result": result,
            "graph": graph,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", graph);
        if result.deadlocked {
            println!("DEADLOCK: cycle {}", format_sequence(&result.cycle));
        } else {
            println!("No deadlock detected");
        }
    }
    Ok(())
}

fn demo(config: &EngineConfig, as_json: bool) -> anyhow::Result<()> {
    let bankers = Scenario::classic_bankers();
    println!("== Banker's algorithm");
    safety(&bankers, config, as_json)?;
    request(&bankers, config, ProcessId(0), &[1, 2, 1], as_json)?;
    request(&bankers, config, ProcessId(1), &[1, 0, 2], as_json)?;

    println!("== Deadlock detection");
    detect(&Scenario::classic_detection(), config, as_json)
}
