//! Batch statistics.

use std::path::PathBuf;
use std::time::Duration;

use observability::BatchMetricsAggregator;

/// Statistics from one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Recordings found in the input
    pub recordings_found: usize,

    /// Total duration of the run
    pub duration: Duration,

    /// Exported KPI tables
    pub exported: Vec<PathBuf>,

    /// Segmentation and KPI aggregator
    pub metrics: BatchMetricsAggregator,
}

impl BatchStats {
    /// Recordings processed per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.recordings_found as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== KPI Extraction Run ===");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Recordings found: {}", self.recordings_found);
        println!("Throughput: {:.2} recordings/s\n", self.throughput());

        print!("{}", self.metrics.summary());

        if !self.exported.is_empty() {
            println!("\nKPI tables:");
            for path in &self.exported {
                println!("  - {}", path.display());
            }
        }
        println!();
    }
}
