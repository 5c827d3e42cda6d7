//! Batch runner - coordinates loading, segmentation and KPI computation.
//!
//! Phase 1 segments every recording and persists its windows; each recording
//! is dropped before the next one is read. Phase 2 reads the windows back one
//! at a time and fills one KPI table per feature.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{AnalysisConfig, EventKind};
use ingestion::{IngestionConfig, RecordingLoader};
use kpi_engine::{KpiEngine, KpiTable, RowStatus};
use segmenter::{list_windows, load_window, FileSink, FileSinkConfig, Segmenter};
use tracing::{info, instrument, warn};

use super::{export_table, BatchStats};
use crate::error::CliError;

/// Batch configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Loaded analysis configuration
    pub analysis: AnalysisConfig,

    /// Recording file or directory
    pub input: PathBuf,

    /// Output directory
    pub output: PathBuf,

    /// Features to process, in order
    pub kinds: Vec<EventKind>,

    /// Pretty-print persisted windows
    pub pretty: bool,

    /// Compute KPIs from windows already in `output`
    pub skip_segmentation: bool,
}

/// Batch orchestrator
pub struct BatchRunner {
    config: BatchConfig,
    loader: RecordingLoader,
    segmenter: Segmenter,
    engine: KpiEngine,
}

impl BatchRunner {
    /// Create a runner for the given configuration
    pub fn new(config: BatchConfig) -> Result<Self> {
        let engine = KpiEngine::new(&config.analysis).context("Failed to build KPI engine")?;
        Ok(Self {
            loader: RecordingLoader::new(IngestionConfig::from(&config.analysis)),
            segmenter: Segmenter::new(config.analysis.params.segmentation.clone()),
            engine,
            config,
        })
    }

    /// Recording files named by the input path
    pub fn recordings(&self) -> Result<Vec<PathBuf>> {
        let input = &self.config.input;
        if input.is_dir() {
            return self
                .loader
                .discover(input)
                .with_context(|| format!("Failed to list {}", input.display()));
        }
        if input.is_file() {
            return Ok(vec![input.clone()]);
        }
        Err(CliError::input_not_found(input).into())
    }

    /// Run both phases and export the KPI tables
    pub fn run(&self) -> Result<BatchStats> {
        let started = Instant::now();
        let mut stats = BatchStats::default();

        std::fs::create_dir_all(&self.config.output).with_context(|| {
            format!("Failed to create output directory {}", self.config.output.display())
        })?;

        let window_paths = if self.config.skip_segmentation {
            self.existing_windows()?
        } else {
            self.segment_all(&mut stats)?
        };

        for &kind in &self.config.kinds {
            let phase = Instant::now();
            let paths: Vec<PathBuf> = window_paths
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, p)| p.clone())
                .collect();
            let table = self.compute_kind(kind, &paths, &mut stats)?;
            let path = export_table(kind, &table, &self.config.output)?;
            info!(feature = %kind, rows = table.row_count(), path = %path.display(), "KPI table exported");
            observability::record_stage_duration_ms("kpi", phase.elapsed().as_secs_f64() * 1000.0);
            stats.exported.push(path);
        }

        stats.duration = started.elapsed();
        Ok(stats)
    }

    /// Phase 1: load, segment and persist every recording
    fn segment_all(&self, stats: &mut BatchStats) -> Result<Vec<(EventKind, PathBuf)>> {
        let paths = self.recordings()?;
        if paths.is_empty() {
            return Err(CliError::NoRecordings {
                path: self.config.input.clone(),
            }
            .into());
        }
        stats.recordings_found = paths.len();

        let mut sink_config = FileSinkConfig::new(&self.config.output);
        sink_config.pretty = self.config.pretty;
        let kind_dirs: Vec<(EventKind, PathBuf)> = EventKind::ALL
            .into_iter()
            .map(|k| (k, sink_config.kind_dir(k)))
            .collect();
        let mut sink = FileSink::new("chunks", sink_config)?;

        for path in &paths {
            let phase = Instant::now();
            if self.segment_one(path, &mut sink, stats) {
                stats.metrics.recording_done();
            } else {
                stats.metrics.recording_failed();
            }
            observability::record_stage_duration_ms("segment", phase.elapsed().as_secs_f64() * 1000.0);
        }

        if stats.metrics.recordings == 0 {
            return Err(CliError::AllRecordingsFailed { count: paths.len() }.into());
        }

        let written = sink
            .written_paths()
            .iter()
            .filter_map(|p| {
                kind_dirs
                    .iter()
                    .find(|(_, dir)| p.parent() == Some(dir.as_path()))
                    .map(|(k, _)| (*k, p.clone()))
            })
            .collect();
        Ok(written)
    }

    /// Segment one recording for every selected kind; false if it could not be loaded
    #[instrument(level = "debug", skip(self, sink, stats), fields(path = %path.display()))]
    fn segment_one(&self, path: &Path, sink: &mut FileSink, stats: &mut BatchStats) -> bool {
        let recording = match self.loader.load(path) {
            Ok(recording) => recording,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "recording skipped");
                observability::record_recording_failed("load");
                return false;
            }
        };

        for &kind in &self.config.kinds {
            match self.segmenter.segment(&recording, kind, sink) {
                Ok(report) => {
                    observability::record_segmentation(
                        kind,
                        report.events,
                        &report.window_durations,
                        report.discarded.len(),
                    );
                    stats.metrics.update_segmentation(
                        kind,
                        report.events,
                        &report.window_durations,
                        report.discarded.len(),
                    );
                }
                Err(e) => {
                    warn!(path = %path.display(), feature = %kind, error = %e, "segmentation skipped");
                    observability::record_recording_failed("segment");
                }
            }
        }
        true
    }

    /// Windows persisted by an earlier run
    fn existing_windows(&self) -> Result<Vec<(EventKind, PathBuf)>> {
        let mut all = Vec::new();
        for &kind in &self.config.kinds {
            let paths = list_windows(&self.config.output, kind)
                .with_context(|| format!("Failed to list {kind} windows"))?;
            info!(feature = %kind, windows = paths.len(), "reusing persisted windows");
            all.extend(paths.into_iter().map(|p| (kind, p)));
        }
        Ok(all)
    }

    /// Phase 2: one finalized table for the windows of `kind`
    fn compute_kind(&self, kind: EventKind, paths: &[PathBuf], stats: &mut BatchStats) -> Result<KpiTable> {
        let labels = paths.iter().map(|p| window_label(p)).collect();
        let mut table = self
            .engine
            .create_table(kind, labels)
            .with_context(|| format!("Failed to create {kind} KPI table"))?;

        let (mut computed, mut skipped) = (0, 0);
        for (row, path) in paths.iter().enumerate() {
            // one window in memory at a time
            let status = match load_window(path) {
                Ok(window) => self.engine.process_window(&window, &mut table, row),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "window unreadable, row keeps defaults");
                    RowStatus::Skipped
                }
            };
            match status {
                RowStatus::Computed => computed += 1,
                RowStatus::Skipped => skipped += 1,
            }
        }

        table.finalize(self.engine.params().round_decimals);
        observability::record_kpi_rows(kind, computed, skipped);
        stats.metrics.update_rows(computed, skipped);
        Ok(table)
    }
}

fn window_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::channels;
    use std::io::Write;

    fn write_fcw_recording(dir: &Path, name: &str) {
        // 30 s at 1 Hz, one FCW burst at 10-12 s
        let n = 30;
        let time: Vec<String> = (0..n).map(|i| format!("{i}.0")).collect();
        let request: Vec<&str> = (0..n)
            .map(|i| if (10..12).contains(&i) { "2" } else { "0" })
            .collect();
        let speed = vec!["50.0"; n];
        let body = format!(
            r#"{{"time": [{}], "channels": {{"{}": [{}], "{}": [{}]}}}}"#,
            time.join(","),
            channels::FCW_REQUEST,
            request.join(","),
            channels::EGO_SPEED_KPH,
            speed.join(",")
        );
        let mut f = std::fs::File::create(dir.join(format!("{name}.json"))).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    fn config(input: &Path, output: &Path) -> BatchConfig {
        BatchConfig {
            analysis: AnalysisConfig::default(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            kinds: vec![EventKind::Fcw],
            pretty: false,
            skip_segmentation: false,
        }
    }

    #[test]
    fn test_run_fcw_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fcw_recording(input.path(), "drive_a");
        write_fcw_recording(input.path(), "drive_b");

        let runner = BatchRunner::new(config(input.path(), output.path())).unwrap();
        let stats = runner.run().unwrap();

        assert_eq!(stats.recordings_found, 2);
        assert_eq!(stats.metrics.recordings, 2);
        assert_eq!(stats.exported.len(), 1);
        assert!(output.path().join("fcw_chunks/drive_a_fcw_01.json").exists());

        let doc: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&stats.exported[0]).unwrap()).unwrap();
        assert_eq!(doc["rows"].as_array().unwrap().len(), 2);
        assert_eq!(doc["rows"][0]["vehSpd [kph]"], serde_json::json!(50.0));
    }

    #[test]
    fn test_skip_segmentation_reuses_windows() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fcw_recording(input.path(), "drive");
        BatchRunner::new(config(input.path(), output.path()))
            .unwrap()
            .run()
            .unwrap();

        let mut again = config(Path::new("/unused"), output.path());
        again.skip_segmentation = true;
        let stats = BatchRunner::new(again).unwrap().run().unwrap();
        assert_eq!(stats.metrics.rows_computed, 1);
    }

    #[test]
    fn test_empty_input_is_error() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let result = BatchRunner::new(config(input.path(), output.path())).unwrap().run();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("No recordings"));
    }

    #[test]
    fn test_all_recordings_broken_is_error() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("bad.json"), "{").unwrap();
        let result = BatchRunner::new(config(input.path(), output.path())).unwrap().run();
        assert!(result.unwrap_err().to_string().contains("All 1 recordings"));
    }
}
