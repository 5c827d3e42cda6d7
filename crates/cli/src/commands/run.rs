//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{AnalysisConfig, EventKind};
use tracing::info;

use super::load_config;
use crate::cli::RunArgs;
use crate::pipeline::{BatchConfig, BatchRunner};

/// Execute the `run` command
pub fn run_batch(args: &RunArgs) -> Result<()> {
    let analysis = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            load_config(path)?
        }
        None => {
            info!("No configuration given, using built-in defaults");
            AnalysisConfig::default()
        }
    };

    let mut kinds: Vec<EventKind> = Vec::with_capacity(args.features.len());
    for kind in args.features.iter().copied().map(EventKind::from) {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        features = ?kinds,
        calibrations = analysis.calibration.len(),
        "Configuration loaded"
    );

    let runner = BatchRunner::new(BatchConfig {
        analysis,
        input: args.input.clone(),
        output: args.output.clone(),
        kinds,
        pretty: args.pretty,
        skip_segmentation: args.skip_segmentation,
    })?;

    if args.dry_run {
        let recordings = runner.recordings()?;
        info!(recordings = recordings.len(), "Dry run mode - configuration is valid, exiting");
        println!("\n=== Dry Run ===\n");
        for path in &recordings {
            println!("  - {}", path.display());
        }
        println!();
        return Ok(());
    }

    let stats = runner.run().context("Batch execution failed")?;
    info!(
        recordings = stats.metrics.recordings,
        failed = stats.metrics.failed_recordings,
        rows = stats.metrics.rows_computed,
        duration_secs = stats.duration.as_secs_f64(),
        "Batch completed"
    );
    stats.print_summary();

    Ok(())
}
