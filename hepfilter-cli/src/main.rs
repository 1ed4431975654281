//! hepfilter command-line interface.
//!
//! Runs the nearest-match weight table or the bad-cell veto over an event
//! file and writes per-event results.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};
use hepfilter_algorithms::{
    filter_events, produce_tables, BadCellVeto, NearestMatchWeightTable, VetoStatistics,
};
use hepfilter_io::{read_config, read_events, read_geometry, DataFileWriter, RunConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    HepfilterIo(#[from] hepfilter_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] hepfilter_core::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Output file format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Comma-separated values
    Csv,
    /// Pretty-printed JSON
    Json,
}

/// Per-event jet weight tables and calorimeter bad-cell vetoes.
#[derive(Parser)]
#[command(name = "hepfilter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of worker threads (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match jets to the reference collection and tabulate weights
    Weights {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Event file (JSON)
        #[arg(short, long)]
        events: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Matching gate, overrides the configuration
        #[arg(long)]
        delta_r: Option<f64>,
    },

    /// Evaluate the bad-cell filter on every event
    Veto {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Event file (JSON)
        #[arg(short, long)]
        events: PathBuf,

        /// Cell geometry file (JSON)
        #[arg(short, long)]
        geometry: PathBuf,

        /// Output file path for per-event decisions
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Keep failing events and only record the verdict
        #[arg(long)]
        tagging: bool,

        /// Log every evaluated cell
        #[arg(long)]
        debug: bool,
    },

    /// Show information about an event file
    Info {
        /// Event file (JSON)
        events: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading configuration");
            Ok(read_config(path)?)
        }
        None => Ok(RunConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Weights {
            config,
            events,
            output,
            format,
            delta_r,
        } => {
            let mut config = load_config(config.as_deref())?.weight_table;
            if let Some(delta_r) = delta_r {
                config.delta_r = delta_r;
            }
            info!(
                table = %config.name,
                delta_r = config.delta_r,
                sources = config.weight_sources.len(),
                "weight table configuration"
            );

            let start = Instant::now();
            let producer = NearestMatchWeightTable::new(config)?;
            let events = read_events(&events)?;
            let inputs: Vec<_> = events.iter().map(|e| e.match_input()).collect();
            let tables = produce_tables(&producer, &inputs)?;

            let mut writer = DataFileWriter::create(&output)?;
            match format {
                Format::Csv => writer.write_tables_csv(&tables)?,
                Format::Json => writer.write_tables_json(&tables)?,
            }

            let rows: usize = tables.iter().map(|t| t.n_rows()).sum();
            println!(
                "Processed {} events in {:.2}s",
                events.len(),
                start.elapsed().as_secs_f64()
            );
            println!("Total rows: {}", rows);
            println!("Output: {}", output.display());
        }

        Commands::Veto {
            config,
            events,
            geometry,
            output,
            format,
            tagging,
            debug,
        } => {
            let mut config = load_config(config.as_deref())?.bad_cell_veto;
            config.tagging_mode |= tagging;
            config.debug |= debug;
            info!(
                eb_min_et = config.eb_min_et,
                ee_min_et = config.ee_min_et,
                eb_cells = config.bad_det_eb.len(),
                ee_cells = config.bad_det_ee.len(),
                tagging_mode = config.tagging_mode,
                "bad-cell veto configuration"
            );

            let start = Instant::now();
            let veto = BadCellVeto::new(config)?;
            let geometry = read_geometry(&geometry)?;
            let events = read_events(&events)?;
            let inputs: Vec<_> = events.iter().map(|e| e.veto_input()).collect();
            let decisions = filter_events(&veto, &inputs, &geometry)?;

            if let Some(output) = output {
                let mut writer = DataFileWriter::create(&output)?;
                match format {
                    Format::Csv => writer.write_decisions_csv(&decisions)?,
                    Format::Json => writer.write_decisions_json(&decisions)?,
                }
            }

            let stats = VetoStatistics::from_decisions(&decisions);
            println!(
                "Processed {} events in {:.2}s",
                stats.events_processed,
                start.elapsed().as_secs_f64()
            );
            println!("Passed: {}", stats.events_passed);
            println!("Failed: {}", stats.events_failed());
            println!("Kept: {}", stats.events_kept);
        }

        Commands::Info { events } => {
            let loaded = read_events(&events)?;
            let count = |f: fn(&hepfilter_io::Event) -> usize| -> usize {
                loaded.iter().map(f).sum()
            };

            println!("File: {}", events.display());
            println!("Events: {}", loaded.len());
            println!("Gen jets: {}", count(|e| e.gen_jets.len()));
            println!("Gen jets with nu: {}", count(|e| e.gen_jets_with_nu.len()));
            println!("Barrel rec hits: {}", count(|e| e.eb_hits.len()));
            println!("Endcap rec hits: {}", count(|e| e.ee_hits.len()));

            let mut sources: Vec<&str> = loaded
                .iter()
                .flat_map(|e| e.weights.keys().map(String::as_str))
                .collect();
            sources.sort_unstable();
            sources.dedup();
            println!("Weight sources: {}", sources.join(", "));
        }
    }

    Ok(())
}
