//! Window extraction around event boundaries

use contracts::{ChannelStore, EventBoundary, EventKind, EventWindow, Recording};
use tracing::{debug, instrument, warn};

/// Why a boundary produced no window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// `window_end <= window_start` after clamping
    NonPositiveDuration,
    /// The clamped range contains no samples or no channels
    NoSamples,
}

impl DiscardReason {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::NonPositiveDuration => "non_positive_duration",
            DiscardReason::NoSamples => "no_samples",
        }
    }
}

/// Boundary that was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardedWindow {
    pub name: String,
    pub boundary: EventBoundary,
    pub reason: DiscardReason,
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub windows: Vec<EventWindow>,
    pub discarded: Vec<DiscardedWindow>,
}

/// Deterministic window name
///
/// `index` is 1-based and zero-padded to two digits.
pub fn window_name(source: &str, kind: EventKind, index: usize) -> String {
    format!("{source}_{kind}_{index:02}")
}

/// Cut one window per boundary out of `source`
///
/// The window covers `[start - pre_pad, end + post_pad]`, or
/// `[start - pre_pad, start + post_pad]` for an open boundary, clamped to the
/// source time range. Every window satisfies
/// `t_min <= window.start < window.end <= t_max`.
#[instrument(
    level = "debug",
    skip(source, boundaries),
    fields(source = source.name(), events = boundaries.len())
)]
pub fn extract_windows(
    source: &Recording,
    kind: EventKind,
    boundaries: &[EventBoundary],
    pre_pad: f64,
    post_pad: f64,
) -> Extraction {
    let mut extraction = Extraction::default();
    let (Some(t_min), Some(t_max)) = (source.t_min(), source.t_max()) else {
        if !boundaries.is_empty() {
            warn!(source = source.name(), "source recording has no samples");
        }
        return extraction;
    };

    for (j, boundary) in boundaries.iter().enumerate() {
        let name = window_name(source.name(), kind, j + 1);
        let start = (boundary.start - pre_pad).max(t_min);
        let end = match boundary.end {
            Some(e) => (e + post_pad).min(t_max),
            None => (boundary.start + post_pad).min(t_max),
        };

        // NaN bounds fall through here as well
        if !(end > start) {
            warn!(window = %name, start, end, "window has non-positive duration, skipped");
            extraction.discarded.push(DiscardedWindow {
                name,
                boundary: *boundary,
                reason: DiscardReason::NonPositiveDuration,
            });
            continue;
        }

        let recording = source.slice(name.clone(), start, end);
        if recording.is_empty() || recording.channel_count() == 0 {
            warn!(window = %name, start, end, "window contains no samples, discarded");
            extraction.discarded.push(DiscardedWindow {
                name,
                boundary: *boundary,
                reason: DiscardReason::NoSamples,
            });
            continue;
        }

        debug!(window = %name, start, end, samples = recording.len(), "window extracted");
        extraction.windows.push(EventWindow {
            name,
            source: source.name().to_string(),
            kind,
            index: j + 1,
            boundary: *boundary,
            start,
            end,
            recording,
        });
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0.0 ..= 12.0 at 10 Hz with one speed channel
    fn source() -> Recording {
        let n = 121;
        let speed = (0..n).map(|i| i as f64).collect();
        Recording::with_equidistant_time("drive", n, 0.1)
            .with_channel("egoSpeedKph", speed)
            .unwrap()
    }

    #[test]
    fn test_open_boundary_clamped_to_source_end() {
        let rec = source();
        let ex = extract_windows(&rec, EventKind::Aeb, &[EventBoundary::open(10.0)], 6.0, 3.0);
        assert_eq!(ex.windows.len(), 1);
        let w = &ex.windows[0];
        assert!((w.start - 4.0).abs() < 1e-9);
        assert!((w.end - 12.0).abs() < 1e-9);
        assert_eq!(w.name, "drive_aeb_01");
        assert_eq!(w.index, 1);
    }

    #[test]
    fn test_windows_stay_inside_source() {
        let rec = source();
        let boundaries = [
            EventBoundary::new(0.5, 1.0),
            EventBoundary::new(5.0, 6.0),
            EventBoundary::new(11.0, 11.9),
        ];
        let ex = extract_windows(&rec, EventKind::Fcw, &boundaries, 6.0, 3.0);
        assert_eq!(ex.windows.len(), 3);
        for w in &ex.windows {
            assert!(w.start >= 0.0);
            assert!(w.start < w.end);
            assert!(w.end <= 12.0 + 1e-9);
            let t = w.recording.time();
            assert!(t.first().unwrap() >= &w.start);
            assert!(t.last().unwrap() <= &w.end);
        }
        assert_eq!(ex.windows[2].name, "drive_fcw_03");
    }

    #[test]
    fn test_boundary_outside_source_is_discarded() {
        let rec = source();
        let ex = extract_windows(
            &rec,
            EventKind::Aeb,
            &[EventBoundary::new(1.0, 2.0), EventBoundary::open(30.0)],
            0.0,
            0.0,
        );
        assert_eq!(ex.windows.len(), 1);
        assert_eq!(ex.discarded.len(), 1);
        assert_eq!(ex.discarded[0].reason, DiscardReason::NonPositiveDuration);
        assert_eq!(ex.discarded[0].name, "drive_aeb_02");
    }

    #[test]
    fn test_window_between_samples_has_no_samples() {
        let rec = Recording::new("sparse", vec![0.0, 10.0])
            .unwrap()
            .with_channel("a", vec![1.0, 2.0])
            .unwrap();
        let ex = extract_windows(&rec, EventKind::Fcw, &[EventBoundary::new(4.0, 5.0)], 0.5, 0.5);
        assert!(ex.windows.is_empty());
        assert_eq!(ex.discarded[0].reason, DiscardReason::NoSamples);
    }

    #[test]
    fn test_window_without_channels_is_discarded() {
        let rec = Recording::with_equidistant_time("bare", 10, 1.0);
        let ex = extract_windows(&rec, EventKind::Aeb, &[EventBoundary::new(2.0, 4.0)], 1.0, 1.0);
        assert!(ex.windows.is_empty());
        assert_eq!(ex.discarded[0].reason, DiscardReason::NoSamples);
    }

    #[test]
    fn test_window_name_padding() {
        assert_eq!(window_name("log", EventKind::Fcw, 7), "log_fcw_07");
        assert_eq!(window_name("log", EventKind::Aeb, 123), "log_aeb_123");
    }
}
