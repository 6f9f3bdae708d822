//! symbios-lab CLI - quadratic GA and map/reduce text counter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use symbios_lab::algorithms::simple::{SimpleGA, write_result};
use symbios_lab::counting::{count_in_process, run_mapper, run_reducer};
use symbios_lab::{AppConfig, SumOfSquares};

#[derive(Parser)]
#[command(name = "symbios-lab")]
#[command(about = "Quadratic GA and map/reduce text counter", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Minimise the sum of squares with a genetic algorithm
    Evolve {
        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Number of generations
        #[arg(long)]
        generations: Option<usize>,
        /// Population size
        #[arg(long)]
        population: Option<usize>,
    },
    /// Emit `<key>\t1` records for every character and word on stdin
    Map,
    /// Sum `<key>\t<value>` records from stdin and print the report
    Reduce {
        /// Abort on a malformed record instead of skipping it
        #[arg(long)]
        strict: bool,
    },
    /// Map, shuffle and reduce stdin in one process
    Count,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Evolve {
            seed,
            generations,
            population,
        } => {
            let evolution = config.evolution.with_overrides(seed, generations, population);
            let mut ga = SimpleGA::new(evolution).context("invalid evolution config")?;
            let best = ga
                .run(&SumOfSquares)
                .context("population is empty")?;
            info!("finished {} generation(s) with seed {}", ga.generation(), ga.seed());

            write_result(&best, BufWriter::new(io::stdout().lock()))?;
        }
        Commands::Map => {
            let emitted = run_mapper(io::stdin().lock(), BufWriter::new(io::stdout().lock()))?;
            info!("emitted {emitted} record(s)");
        }
        Commands::Reduce { strict } => {
            let policy = config.counter.policy(strict);
            run_reducer(io::stdin().lock(), BufWriter::new(io::stdout().lock()), policy)?;
        }
        Commands::Count => {
            count_in_process(io::stdin().lock(), BufWriter::new(io::stdout().lock()))?;
        }
    }

    Ok(())
}
