//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{AebDetectionPolicy, AnalysisConfig, Calibratable};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    calibration_count: usize,
    kpi_column_count: usize,
    channel_alias_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(&args.config) {
        Ok(config) => {
            let kpi_column_count = config.schema().map(|s| s.len()).unwrap_or_default();
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: collect_warnings(&config),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    calibration_count: config.calibration.len(),
                    kpi_column_count,
                    channel_alias_count: config.channels.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("{e:#}")),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &AnalysisConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    for cal in Calibratable::ALL {
        if config.calibration.get(cal).is_none() {
            warnings.push(format!(
                "Calibration '{}' missing - dependent thresholds will be NaN",
                cal.key()
            ));
        }
    }

    if config.kpi.is_empty() {
        warnings.push("No [[kpi]] columns declared - using the built-in schema".to_string());
    }

    if config.params.segmentation.aeb_policy == AebDetectionPolicy::DerivativeThreshold {
        warnings.push("AEB detection uses the derivative-threshold policy".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Calibrations: {}", summary.calibration_count);
            println!("  KPI columns: {}", summary.kpi_column_count);
            println!("  Channel aliases: {}", summary.channel_alias_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
