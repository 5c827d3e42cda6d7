//! Detection + extraction + persistence for one recording

use contracts::{
    ChannelStore, EventKind, Recording, SegmentationParams, WindowSink,
};
use event_detector::{DetectionPolicy, EventDetector};
use tracing::{error, info, instrument};

use crate::chunker::{extract_windows, DiscardedWindow};
use crate::SegmenterError;

/// Outcome of segmenting one recording for one kind
#[derive(Debug, Clone)]
pub struct SegmentReport {
    pub source: String,
    pub kind: EventKind,
    pub policy: DetectionPolicy,
    /// Detected (merged) events
    pub events: usize,
    /// Names of the windows handed to the sink
    pub windows: Vec<String>,
    /// Durations of the persisted windows in seconds
    pub window_durations: Vec<f64>,
    pub discarded: Vec<DiscardedWindow>,
    /// Windows the sink refused
    pub failed_writes: usize,
}

/// Window extractor bound to a detector and padding parameters
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    detector: EventDetector,
}

impl Segmenter {
    pub fn new(params: SegmentationParams) -> Self {
        Self {
            detector: EventDetector::new(params),
        }
    }

    pub fn params(&self) -> &SegmentationParams {
        self.detector.params()
    }

    /// `(pre_pad, post_pad)` for `kind`
    pub fn pads(&self, kind: EventKind) -> (f64, f64) {
        let p = self.params();
        match kind {
            EventKind::Aeb => (p.aeb_pre_time, p.aeb_post_time),
            EventKind::Fcw => (p.fcw_pre_time, p.fcw_post_time),
        }
    }

    /// Detect events of `kind`, cut windows and write them to `sink`
    ///
    /// A window the sink fails to persist is logged and counted; the
    /// remaining windows are still written.
    ///
    /// # Errors
    /// Returns an error when detection itself fails (trigger channel missing).
    #[instrument(level = "debug", skip(self, recording, sink), fields(source = recording.name(), sink = sink.name()))]
    pub fn segment(
        &self,
        recording: &Recording,
        kind: EventKind,
        sink: &mut dyn WindowSink,
    ) -> Result<SegmentReport, SegmenterError> {
        let detection = self.detector.detect(recording, kind)?;
        metrics::counter!("kpi_events_detected_total", "kind" => kind.as_str())
            .increment(detection.boundaries.len() as u64);

        let (pre, post) = self.pads(kind);
        let extraction = extract_windows(recording, kind, &detection.boundaries, pre, post);

        for discarded in &extraction.discarded {
            metrics::counter!(
                "kpi_windows_discarded_total",
                "kind" => kind.as_str(),
                "reason" => discarded.reason.as_str()
            )
            .increment(1);
        }

        let mut report = SegmentReport {
            source: recording.name().to_string(),
            kind,
            policy: detection.policy,
            events: detection.boundaries.len(),
            windows: Vec::with_capacity(extraction.windows.len()),
            window_durations: Vec::with_capacity(extraction.windows.len()),
            discarded: extraction.discarded,
            failed_writes: 0,
        };

        for window in &extraction.windows {
            match sink.write(window) {
                Ok(()) => {
                    metrics::counter!("kpi_windows_extracted_total", "kind" => kind.as_str())
                        .increment(1);
                    report.windows.push(window.name.clone());
                    report.window_durations.push(window.duration());
                }
                Err(e) => {
                    error!(window = %window.name, error = %e, "window not persisted");
                    report.failed_writes += 1;
                }
            }
        }
        sink.flush()?;

        info!(
            source = %report.source,
            kind = %kind,
            events = report.events,
            windows = report.windows.len(),
            discarded = report.discarded.len(),
            "recording segmented"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySink;
    use contracts::{channels, ContractError, EventWindow};

    fn fcw_recording() -> Recording {
        // 20 s at 1 Hz, two bursts 2 s apart
        let mut request = vec![0.0; 20];
        for v in &mut request[5..7] {
            *v = 2.0;
        }
        for v in &mut request[9..11] {
            *v = 3.0;
        }
        Recording::with_equidistant_time("drive", 20, 1.0)
            .with_channel(channels::FCW_REQUEST, request)
            .unwrap()
    }

    #[test]
    fn test_segment_fcw_into_memory() {
        let segmenter = Segmenter::default();
        let mut sink = MemorySink::new("mem");
        let report = segmenter
            .segment(&fcw_recording(), EventKind::Fcw, &mut sink)
            .unwrap();

        assert_eq!(report.events, 1);
        assert_eq!(report.windows, vec!["drive_fcw_01".to_string()]);
        let w = &sink.windows()[0];
        // merged event (5, 11), padded by 6 s / 3 s
        assert!((w.start - 0.0).abs() < 1e-9);
        assert!((w.end - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_trigger_is_error() {
        let rec = Recording::with_equidistant_time("empty", 5, 1.0);
        let mut sink = MemorySink::new("mem");
        assert!(Segmenter::default()
            .segment(&rec, EventKind::Aeb, &mut sink)
            .is_err());
    }

    struct RejectingSink;

    impl WindowSink for RejectingSink {
        fn name(&self) -> &str {
            "reject"
        }

        fn write(&mut self, window: &EventWindow) -> Result<(), ContractError> {
            Err(ContractError::sink_write("reject", &window.name))
        }
    }

    #[test]
    fn test_sink_failure_is_counted_not_fatal() {
        let report = Segmenter::default()
            .segment(&fcw_recording(), EventKind::Fcw, &mut RejectingSink)
            .unwrap();
        assert_eq!(report.failed_writes, 1);
        assert!(report.windows.is_empty());
    }
}
