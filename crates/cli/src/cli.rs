//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::EventKind;
use std::path::PathBuf;

/// KPI Extractor - AEB/FCW event segmentation and KPI extraction for vehicle logs
#[derive(Parser, Debug)]
#[command(
    name = "kpi-extractor",
    author,
    version,
    about = "AEB/FCW event segmentation and KPI extraction",
    long_about = "Batch tool for vehicle test-drive recordings.\n\n\
                  Detects AEB and FCW events, cuts padded event windows, \n\
                  computes per-event KPIs and exports one KPI table per feature."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "KPI_EXTRACTOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "KPI_EXTRACTOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment recordings and compute KPI tables
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "KPI_EXTRACTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Recording file or directory of recordings
    #[arg(short, long, env = "KPI_EXTRACTOR_INPUT")]
    pub input: PathBuf,

    /// Output directory for event windows and KPI tables
    #[arg(short, long, default_value = "kpi_out", env = "KPI_EXTRACTOR_OUTPUT")]
    pub output: PathBuf,

    /// Features to process
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [Feature::Aeb, Feature::Fcw])]
    pub features: Vec<Feature>,

    /// Pretty-print persisted windows
    #[arg(long)]
    pub pretty: bool,

    /// Compute KPIs from windows already under the output directory
    #[arg(long)]
    pub skip_segmentation: bool,

    /// Load configuration and list recordings, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (disabled when omitted)
    #[arg(long, env = "KPI_EXTRACTOR_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "kpi_config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "kpi_config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the KPI schema
    #[arg(long)]
    pub schema: bool,

    /// Show calibration tables
    #[arg(long)]
    pub calibration: bool,
}

/// Feature selector
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Aeb,
    Fcw,
}

impl From<Feature> for EventKind {
    fn from(f: Feature) -> Self {
        match f {
            Feature::Aeb => EventKind::Aeb,
            Feature::Fcw => EventKind::Fcw,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(f: LogFormat) -> Self {
        match f {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["kpi-extractor", "run", "--input", "logs"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.features, vec![Feature::Aeb, Feature::Fcw]);
        assert_eq!(args.output, PathBuf::from("kpi_out"));
        assert!(args.config.is_none());
        assert!(args.metrics_port.is_none());
    }

    #[test]
    fn test_features_list_and_verbosity() {
        let cli = Cli::parse_from(["kpi-extractor", "-vv", "run", "-i", "x", "--features", "fcw"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.features, vec![Feature::Fcw]);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["kpi-extractor", "-q", "-v", "info"]).is_err());
    }
}
