//! RNN_SIM - CLI Entry Point
//!
//! Runs a recurrent network simulation and writes its records.

use clap::{Parser, Subcommand};
use rnn_sim::checkpoint::Checkpoint;
use rnn_sim::record::{save_record, NetworkRecord};
use rnn_sim::stats::NetworkStats;
use rnn_sim::{Activation, ActivationLog, Config, RecordShape, Simulation};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "rnn_sim")]
#[command(version)]
#[command(about = "Recurrent neural network simulator with structural mutation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate (overrides the config)
        #[arg(short, long)]
        steps: Option<u64>,

        /// Output directory for records and the final checkpoint
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Mutate the network after every tick
        #[arg(long)]
        evolve: bool,

        /// Quiet mode (warnings only)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume simulation from checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Number of additional ticks
        #[arg(short, long, default_value = "50")]
        steps: u64,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Summarize a network record file
    Inspect {
        /// Record file
        record: PathBuf,

        /// Record omits the input/output counts
        #[arg(long, requires_all = ["inputs", "outputs"])]
        compact: bool,

        /// Input count for compact records
        #[arg(long)]
        inputs: Option<usize>,

        /// Output count for compact records
        #[arg(long)]
        outputs: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config: config_path,
            steps,
            output,
            seed,
            evolve,
            quiet,
        } => {
            let config = Config::from_file_or_default(&config_path)?;
            init_logging(if quiet { "warn" } else { config.logging.log_level.as_str() });
            if config_path.exists() {
                log::info!("Loaded config from: {:?}", config_path);
            } else {
                log::info!("Using default configuration");
            }
            run_simulation(config, steps, output, seed, evolve)
        }

        Commands::Resume {
            checkpoint,
            steps,
            output,
        } => {
            init_logging("info");
            resume_simulation(checkpoint, steps, output)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }

        Commands::Inspect {
            record,
            compact,
            inputs,
            outputs,
        } => {
            init_logging("info");
            inspect_record(record, compact, inputs.zip(outputs))
        }
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Empty names disable an output file
fn output_path(dir: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        None
    } else {
        Some(dir.join(name))
    }
}

fn run_simulation(
    mut config: Config,
    steps: Option<u64>,
    output: PathBuf,
    seed: Option<u64>,
    evolve: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(s) = seed {
        config.run.seed = Some(s);
    }
    if evolve {
        config.mutation.enabled = true;
    }
    let steps = steps.unwrap_or(config.run.steps);

    std::fs::create_dir_all(&output)?;

    let mut sim = Simulation::new(config.clone())?;
    log::info!("Using seed: {}", sim.seed());
    sim.prepare();

    let shape = config.output.record_shape;
    if let Some(path) = output_path(&output, &config.output.network_file) {
        save_record(&sim.network, shape, &path)?;
        log::info!("Initial network: {:?}", path);
    }

    let mut activations = ActivationLog::create(output_path(&output, &config.output.activation_file))?;

    let start = Instant::now();
    sim.run(steps, &mut activations)?;
    let elapsed = start.elapsed();

    log::info!("=== Simulation Complete ===");
    log::info!(
        "{} ticks in {:.3}s ({:.1} ticks/s)",
        steps,
        elapsed.as_secs_f64(),
        steps as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    log::info!("{}", sim.stats().summary());

    write_outputs(&sim, &output)
}

fn resume_simulation(
    checkpoint_path: PathBuf,
    steps: u64,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Loading checkpoint: {:?}", checkpoint_path);

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let mut sim = Simulation::from_checkpoint(checkpoint);
    log::info!("Resumed at tick {}", sim.tick);

    std::fs::create_dir_all(&output)?;

    // Appending would interleave two runs; resumed traces get their own file
    let activations_name = if sim.config.output.activation_file.is_empty() {
        String::new()
    } else {
        format!("resumed_{}", sim.config.output.activation_file)
    };
    let mut activations = ActivationLog::create(output_path(&output, &activations_name))?;

    sim.run(steps, &mut activations)?;
    log::info!("{}", sim.stats().summary());

    write_outputs(&sim, &output)
}

/// Final record, stats history and checkpoint
fn write_outputs(sim: &Simulation, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = &sim.config;

    if let Some(path) = output_path(output, &config.output.final_network_file) {
        save_record(&sim.network, config.output.record_shape, &path)?;
        log::info!("Final network: {:?}", path);
    }

    if let Some(path) = output_path(output, &config.output.stats_file) {
        sim.stats_history.save(&path)?;
        log::info!("Stats history: {:?}", path);
    }

    let checkpoint_path = output.join("checkpoint_final.bin");
    sim.create_checkpoint().save(&checkpoint_path)?;
    log::info!("Final checkpoint: {:?}", checkpoint_path);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn inspect_record(
    path: PathBuf,
    compact: bool,
    layers: Option<(usize, usize)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shape = if compact { RecordShape::Compact } else { RecordShape::Full };
    let record = NetworkRecord::load(&path, shape)?;
    let network = record.to_network(layers, Activation::default())?;
    let stats = NetworkStats::capture(0, &network);

    println!("=== Network Record ===");
    println!("File: {:?}", path);
    println!("Inputs: {}", network.n_inputs());
    println!("Outputs: {}", network.n_outputs());
    println!("Hidden neurons: {}", stats.hidden);
    println!("Connections: {}", stats.connections);
    println!("Mean bias: {:.4}", stats.bias_mean);
    println!("Mean |weight|: {:.4}", stats.weight_abs_mean);

    let self_loops = network
        .connections()
        .iter()
        .filter(|c| c.source() == c.target())
        .count();
    println!("Self-loops: {}", self_loops);

    Ok(())
}
