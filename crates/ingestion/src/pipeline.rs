//! Recording loader: adapter dispatch and recording assembly

use std::path::{Path, PathBuf};
use std::sync::Arc;

use contracts::{ChannelStore, Recording};
use tracing::{debug, info, instrument, warn};

use crate::adapter::{RawRecording, RecordingAdapter};
use crate::adapters::common::{derive_filtered, fill_gaps, resolve_aliases, usable_time};
use crate::adapters::JsonRecordingAdapter;
use crate::config::{IngestionConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};

/// Loads recordings from disk into aligned [`Recording`]s
pub struct RecordingLoader {
    adapters: Vec<Box<dyn RecordingAdapter>>,
    config: IngestionConfig,
    metrics: Arc<IngestionMetrics>,
}

impl Default for RecordingLoader {
    fn default() -> Self {
        Self::new(IngestionConfig::default())
    }
}

impl RecordingLoader {
    /// Create a loader with the built-in JSON adapter
    pub fn new(config: IngestionConfig) -> Self {
        Self {
            adapters: vec![Box::new(JsonRecordingAdapter)],
            config,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Register an additional adapter; later registrations win on shared extensions
    pub fn register_adapter(&mut self, adapter: Box<dyn RecordingAdapter>) {
        info!(format = adapter.format(), extensions = ?adapter.extensions(), "recording adapter registered");
        self.adapters.insert(0, adapter);
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    fn adapter_for(&self, path: &Path) -> Option<&dyn RecordingAdapter> {
        self.adapters
            .iter()
            .find(|a| a.supports(path))
            .map(|a| a.as_ref())
    }

    /// Whether some adapter can read `path`
    pub fn supports(&self, path: &Path) -> bool {
        self.adapter_for(path).is_some()
    }

    /// Read and assemble one recording
    ///
    /// # Errors
    /// Returns an error when no adapter matches, the file cannot be read or
    /// parsed, or the assembled recording has no samples.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<Recording> {
        let result = self
            .adapter_for(path)
            .ok_or_else(|| IngestionError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
            .and_then(|adapter| adapter.read(path))
            .and_then(|raw| self.assemble(raw, &file_stem(path)));

        match &result {
            Ok(rec) => {
                IngestionMetrics::add(&self.metrics.recordings_loaded, 1);
                info!(
                    recording = rec.name(),
                    samples = rec.len(),
                    channels = rec.channel_count(),
                    "recording loaded"
                );
            }
            Err(e) => {
                IngestionMetrics::add(&self.metrics.recordings_failed, 1);
                warn!(error = %e, "recording load failed");
            }
        }
        result
    }

    /// Turn a raw recording into an aligned one
    ///
    /// Aliases are resolved first. Without a usable time vector an
    /// equidistant one is synthesized from the sample rate, or from
    /// `fallback_dt`. Channels of the wrong length are dropped.
    pub fn assemble(&self, raw: RawRecording, fallback_name: &str) -> Result<Recording> {
        let RawRecording {
            name,
            time,
            sample_rate_hz,
            mut channels,
        } = raw;
        let name = name.unwrap_or_else(|| fallback_name.to_string());

        let aliased = resolve_aliases(&mut channels, &self.config.aliases);
        IngestionMetrics::add(&self.metrics.channels_aliased, aliased as u64);

        // a "time" channel stands in for the top-level vector
        let time_channel = channels.remove("time").map(fill_gaps);
        let mut recording = match usable_time(time.or(time_channel)) {
            Some(time) => Recording::new(name.clone(), time)?,
            None => {
                let len = channels.values().map(Vec::len).max().unwrap_or(0);
                let dt = sample_rate_hz
                    .filter(|hz| hz.is_finite() && *hz > 0.0)
                    .map_or(self.config.fallback_dt, |hz| 1.0 / hz);
                warn!(recording = %name, samples = len, dt, "synthesized time vector (equidistant)");
                IngestionMetrics::add(&self.metrics.time_synthesized, 1);
                Recording::with_equidistant_time(name.clone(), len, dt)
            }
        };
        if recording.is_empty() {
            return Err(IngestionError::Empty { name });
        }

        for (channel, values) in channels {
            if let Err(e) = recording.insert_channel(channel.as_str(), fill_gaps(values)) {
                warn!(recording = %name, channel = %channel, error = %e, "channel skipped");
                IngestionMetrics::add(&self.metrics.channels_skipped, 1);
            }
        }

        if self.config.derive_filtered {
            let derived = derive_filtered(&mut recording, &self.config.filter);
            IngestionMetrics::add(&self.metrics.channels_derived, derived.len() as u64);
            if !derived.is_empty() {
                debug!(recording = %name, derived = ?derived, "filtered channels derived");
            }
        }

        debug!(recording = recording.name(), channels = recording.channel_names().len(), "recording assembled");
        Ok(recording)
    }

    /// Supported files directly under `dir`, sorted by path
    ///
    /// # Errors
    /// Returns `Read` if the directory cannot be listed.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|source| IngestionError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && self.supports(p))
            .collect();
        paths.sort();
        debug!(dir = %dir.display(), files = paths.len(), "recordings discovered");
        Ok(paths)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("recording")
        .to_string()
}
