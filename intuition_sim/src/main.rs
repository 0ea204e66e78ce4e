//! Intuition Pump Simulator CLI
//!
//! Run the evidence-sequence experiment grid and write one result table per
//! confidence modifier.

use clap::Parser;
use intuition_core::SpeakerSelection;
use intuition_env::{EntropySource, FsSink, OsEntropy, SeededEntropy};
use intuition_sim::{
    report, ConfidenceModifier, ExperimentConfig, ExperimentDriver, ExperimentExport, ModifierTable,
    RunError,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Intuition pump evidence-sequence experiment
#[derive(Parser, Debug)]
#[command(name = "intuition-sim")]
#[command(
    about = "Evolve evidence-gathering sequences and regress success on sequence shape",
    long_about = None
)]
struct Args {
    /// Master seed (0 = unseeded, drawn from OS entropy)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Confidence modifier to run (under, control, over, all)
    #[arg(short, long, default_value = "all")]
    modifier: String,

    /// Shortest sequence length
    #[arg(long)]
    min_trials: Option<usize>,

    /// Longest sequence length
    #[arg(long)]
    max_trials: Option<usize>,

    /// Repetitions per sequence length
    #[arg(short, long)]
    repetitions: Option<usize>,

    /// Scenarios per population
    #[arg(short, long)]
    population: Option<usize>,

    /// Directory for the CSV tables
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// JSON experiment config (CLI flags override it)
    #[arg(short, long)]
    config: Option<String>,

    /// Fit without an intercept term
    #[arg(long)]
    no_intercept: bool,

    /// Use the biased partial-swap speaker shuffle
    #[arg(long)]
    legacy_shuffle: bool,

    /// Export the full experiment to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Merges the config file (if any) with command-line overrides.
fn build_config(
    args: &Args,
    modifiers: Vec<ConfidenceModifier>,
) -> Result<ExperimentConfig, RunError> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::from_json_file(path)?,
        None => ExperimentConfig::default(),
    };

    // An explicit modifier flag replaces the file's list
    if args.modifier != "all" || args.config.is_none() {
        config.modifiers = modifiers;
    }
    if let Some(min) = args.min_trials {
        config.min_trials = min;
    }
    if let Some(max) = args.max_trials {
        config.max_trials = max;
    }
    if let Some(repetitions) = args.repetitions {
        config.repetitions = repetitions;
    }
    if let Some(size) = args.population {
        config.population.size = size;
    }
    if args.no_intercept {
        config.fit_intercept = false;
    }
    if args.legacy_shuffle {
        config.population.evidence.speaker_selection = SpeakerSelection::LegacyPartialSwap;
    }

    config.validate()?;
    Ok(config)
}

type WriteOutcome = (ConfidenceModifier, Result<String, RunError>);

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let modifiers = match ConfidenceModifier::parse_selection(&args.modifier) {
        Ok(modifiers) => modifiers,
        Err(e) => {
            error!("{}", e);
            eprintln!("Available modifiers: under, control, over, all");
            std::process::exit(1);
        }
    };

    let config = match build_config(&args, modifiers) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let entropy: Arc<dyn EntropySource> = if args.seed == 0 {
        OsEntropy::shared()
    } else {
        SeededEntropy::shared(args.seed)
    };

    info!("Intuition Pump Simulator v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "{} modifier(s) × trials {}..={} × {} repetitions, population {}, seed={}",
        config.modifiers.len(),
        config.min_trials,
        config.max_trials,
        config.repetitions,
        config.population.size,
        if entropy.is_deterministic() {
            entropy.seed().to_string()
        } else {
            "unseeded".to_string()
        }
    );

    let sink = FsSink::shared(&args.output_dir);
    let driver = ExperimentDriver::new(config.clone(), entropy.clone());

    let mut writes: JoinSet<WriteOutcome> = JoinSet::new();
    let mut tables: Vec<ModifierTable> = Vec::new();
    let mut failed_count = 0;

    for modifier in &config.modifiers {
        let table = match driver.run_modifier(*modifier) {
            Ok(table) => table,
            Err(e) => {
                error!("✗ {} aborted: {}", modifier, e);
                failed_count += 1;
                continue;
            }
        };

        match report::render_table(&table) {
            Ok(bytes) => {
                let sink = sink.clone();
                let modifier = *modifier;
                // Writes proceed while the next modifier simulates
                writes.spawn(async move {
                    let result = report::save_table(sink.as_ref(), modifier, bytes).await;
                    (modifier, result)
                });
            }
            Err(e) => {
                error!("✗ {} table could not be rendered: {}", modifier, e);
                failed_count += 1;
            }
        }

        tables.push(table);
    }

    // Every dispatched write completes or reports before exit
    while let Some(joined) = writes.join_next().await {
        match joined {
            Ok((modifier, Ok(location))) => info!("✓ {} saved to {}", modifier, location),
            Ok((modifier, Err(e))) => {
                error!("✗ {} not saved: {}", modifier, e);
                failed_count += 1;
            }
            Err(e) => {
                error!("✗ write task failed: {}", e);
                failed_count += 1;
            }
        }
    }

    if let Some(export_path) = &args.export {
        let mut export = ExperimentExport::new(entropy.seed(), config.clone());
        for table in &tables {
            export.add_table(table);
        }
        if let Err(e) = export.write_to_file(export_path) {
            error!("Failed to write export: {}", e);
            failed_count += 1;
        } else {
            info!("Exported {} table(s) to {}", export.tables.len(), export_path);
        }
    }

    if args.json {
        let summary = serde_json::json!({
            "seed": entropy.seed(),
            "failed": failed_count,
            "tables": tables.iter().map(|t| {
                serde_json::json!({
                    "modifier": t.modifier.name(),
                    "rows": t.rows.iter().map(|r| {
                        serde_json::json!({
                            "trials": r.number_of_trials,
                            "coefficients": r.fit.coefficients,
                            "percent_correct": r.mean_percent_correct,
                            "std_error": r.fit.std_error,
                        })
                    }).collect::<Vec<_>>(),
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to render summary: {}", e);
                failed_count += 1;
            }
        }
    }

    if failed_count == 0 {
        info!("✅ All {} modifier table(s) completed", tables.len());
    } else {
        error!("❌ {} failure(s)", failed_count);
        std::process::exit(1);
    }
}
