//! FCW edge detection and burst merging

use contracts::EventBoundary;
use tracing::debug;

use crate::levels::{is_in, is_zero};

/// Raw FCW activations from request-level edges
///
/// A start is a sample whose previous sample is 0 and whose own level is in
/// `active_levels`; an end is the reverse. The first sample's "previous" is
/// itself, so a recording that begins active produces no start at index 0.
/// Each start is paired with the first end at or after it; a start without
/// one is closed at the last timestamp.
pub fn detect_fcw_edges(time: &[f64], request: &[f64], active_levels: &[i64]) -> Vec<EventBoundary> {
    let n = time.len().min(request.len());
    if n == 0 {
        return Vec::new();
    }

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for k in 0..n {
        let prev = if k == 0 { request[0] } else { request[k - 1] };
        let cur = request[k];
        if is_zero(prev) && is_in(cur, active_levels) {
            starts.push(k);
        } else if is_in(prev, active_levels) && is_zero(cur) {
            ends.push(k);
        }
    }

    let last_time = time[n - 1];
    starts
        .into_iter()
        .map(|s| {
            let end = ends
                .iter()
                .find(|&&e| e >= s)
                .map(|&e| time[e])
                .unwrap_or_else(|| {
                    debug!(start = time[s], "FCW still active at end of recording");
                    last_time
                });
            EventBoundary::new(time[s], end)
        })
        .collect()
}

/// Merge events separated by at most `merge_window` seconds
///
/// Linear left-to-right scan with a running `(start, end)` accumulator.
/// Idempotent: merging an already merged list returns it unchanged.
pub fn merge_events(events: &[EventBoundary], merge_window: f64) -> Vec<EventBoundary> {
    let mut iter = events.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::with_capacity(events.len());
    let mut cur_start = first.start;
    let mut cur_end = first.end.unwrap_or(first.start);

    for event in iter {
        let end = event.end.unwrap_or(event.start);
        if event.start - cur_end <= merge_window {
            cur_end = cur_end.max(end);
        } else {
            merged.push(EventBoundary::new(cur_start, cur_end));
            cur_start = event.start;
            cur_end = end;
        }
    }
    merged.push(EventBoundary::new(cur_start, cur_end));
    merged
}

/// Detect and merge FCW events
pub fn detect_fcw_events(
    time: &[f64],
    request: &[f64],
    active_levels: &[i64],
    merge_window: f64,
) -> Vec<EventBoundary> {
    let raw = detect_fcw_edges(time, request, active_levels);
    let merged = merge_events(&raw, merge_window);
    if merged.len() != raw.len() {
        debug!(raw = raw.len(), merged = merged.len(), "merged FCW bursts");
    }
    merged
}
