//! Loader configuration and metrics

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::FilterParams;

/// Recording loader configuration
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Logical channel name -> raw logger names, tried in order
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Filter used for derived `*Flt` channels
    pub filter: FilterParams,

    /// Sample spacing of a synthesized time vector when the file gives no rate (s)
    pub fallback_dt: f64,

    /// Derive missing filtered acceleration channels from raw ones
    pub derive_filtered: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            filter: FilterParams::default(),
            fallback_dt: 1.0,
            derive_filtered: true,
        }
    }
}

impl IngestionConfig {
    /// Create configuration from an alias map and filter parameters
    pub fn new(aliases: BTreeMap<String, Vec<String>>, filter: FilterParams) -> Self {
        Self {
            aliases,
            filter,
            ..Default::default()
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Recordings loaded
    pub recordings_loaded: AtomicU64,

    /// Recordings that failed to load
    pub recordings_failed: AtomicU64,

    /// Recordings whose time vector was synthesized
    pub time_synthesized: AtomicU64,

    /// Channels resolved through an alias
    pub channels_aliased: AtomicU64,

    /// Channels dropped for a length mismatch
    pub channels_skipped: AtomicU64,

    /// Filtered channels derived from raw ones
    pub channels_derived: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            recordings_loaded: self.recordings_loaded.load(Ordering::Relaxed),
            recordings_failed: self.recordings_failed.load(Ordering::Relaxed),
            time_synthesized: self.time_synthesized.load(Ordering::Relaxed),
            channels_aliased: self.channels_aliased.load(Ordering::Relaxed),
            channels_skipped: self.channels_skipped.load(Ordering::Relaxed),
            channels_derived: self.channels_derived.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub recordings_loaded: u64,
    pub recordings_failed: u64,
    pub time_synthesized: u64,
    pub channels_aliased: u64,
    pub channels_skipped: u64,
    pub channels_derived: u64,
}

impl From<&contracts::AnalysisConfig> for IngestionConfig {
    fn from(config: &contracts::AnalysisConfig) -> Self {
        Self::new(config.channels.clone(), config.params.filter.clone())
    }
}
