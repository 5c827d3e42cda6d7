//! Recording assembly helpers shared by all adapters

use std::collections::BTreeMap;

use contracts::{channels, ChannelStore, FilterParams, Recording};
use signal_tools::lowpass;
use tracing::{debug, warn};

/// Rename raw channels to their logical names
///
/// A logical name already present wins; otherwise the first raw name found
/// is moved over. Returns the number of channels renamed.
pub fn resolve_aliases<T>(
    channels: &mut BTreeMap<String, T>,
    aliases: &BTreeMap<String, Vec<String>>,
) -> usize {
    let mut renamed = 0;
    for (logical, raw_names) in aliases {
        if channels.contains_key(logical) {
            continue;
        }
        if let Some(raw) = raw_names.iter().find(|r| channels.contains_key(r.as_str())) {
            if let Some(values) = channels.remove(raw.as_str()) {
                debug!(logical = %logical, raw = %raw, "channel alias resolved");
                channels.insert(logical.clone(), values);
                renamed += 1;
            }
        }
    }
    renamed
}

/// Gaps become NaN
pub fn fill_gaps(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

/// Time vector, or `None` when absent, empty or not strictly increasing
pub fn usable_time(time: Option<Vec<f64>>) -> Option<Vec<f64>> {
    let time = time.filter(|t| !t.is_empty())?;
    let monotonic = time.iter().all(|t| t.is_finite()) && time.windows(2).all(|w| w[1] > w[0]);
    if monotonic {
        Some(time)
    } else {
        warn!(samples = time.len(), "time vector not strictly increasing, ignored");
        None
    }
}

/// Add `*Flt` channels computed from their raw counterparts when missing
///
/// Returns the names of the derived channels.
pub fn derive_filtered(recording: &mut Recording, filter: &FilterParams) -> Vec<&'static str> {
    let mut derived = Vec::new();
    for &(raw, filtered) in channels::DERIVED_FILTERED {
        if recording.has_channel(filtered) {
            continue;
        }
        let Some(values) = recording.channel(raw) else {
            continue;
        };
        let outcome = lowpass(values, recording.time(), filter);
        if !outcome.filtered {
            warn!(channel = raw, "low-pass not applicable, derived channel is unfiltered");
        }
        match recording.set_derived_channel(filtered, outcome.values) {
            Ok(()) => derived.push(filtered),
            Err(e) => warn!(channel = filtered, error = %e, "derived channel rejected"),
        }
    }
    derived
}
