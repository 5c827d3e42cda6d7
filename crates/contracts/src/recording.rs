//! Recording - multi-channel time series sharing one time vector
//!
//! Missing channels are a first-class `None`, never an error. Derived
//! channels are added explicitly through [`Recording::set_derived_channel`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ContractError;

/// Read access to an aligned multi-channel time series
pub trait ChannelStore {
    /// Recording name (used for window naming and diagnostics)
    fn name(&self) -> &str;

    /// Shared time vector (seconds, strictly increasing)
    fn time(&self) -> &[f64];

    /// Channel values aligned to [`ChannelStore::time`]
    ///
    /// Returns `None` when the channel is absent or empty.
    fn channel(&self, name: &str) -> Option<&[f64]>;

    /// Names of all non-empty channels
    fn channel_names(&self) -> Vec<&str>;

    /// First timestamp
    fn t_min(&self) -> Option<f64> {
        self.time().first().copied()
    }

    /// Last timestamp
    fn t_max(&self) -> Option<f64> {
        self.time().last().copied()
    }

    /// Index of the sample closest to `t`
    fn nearest_index(&self, t: f64) -> Option<usize> {
        let time = self.time();
        if time.is_empty() || !t.is_finite() {
            return None;
        }
        let pos = time.partition_point(|&v| v < t);
        if pos == 0 {
            return Some(0);
        }
        if pos >= time.len() {
            return Some(time.len() - 1);
        }
        if (time[pos] - t).abs() < (t - time[pos - 1]).abs() {
            Some(pos)
        } else {
            Some(pos - 1)
        }
    }
}

/// In-memory recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    name: String,
    time: Vec<f64>,
    #[serde(default, with = "nan_as_null")]
    channels: BTreeMap<String, Vec<f64>>,
}

impl Recording {
    /// Create a recording from a strictly increasing time vector
    ///
    /// # Errors
    /// Returns `NonMonotonicTime` if the time vector is not strictly increasing
    /// or contains non-finite values.
    pub fn new(name: impl Into<String>, time: Vec<f64>) -> Result<Self, ContractError> {
        if let Some(index) = first_non_monotonic(&time) {
            return Err(ContractError::NonMonotonicTime { index });
        }
        Ok(Self {
            name: name.into(),
            time,
            channels: BTreeMap::new(),
        })
    }

    /// Create a recording with a synthesized equidistant time base
    pub fn with_equidistant_time(name: impl Into<String>, len: usize, dt: f64) -> Self {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 1.0 };
        Self {
            name: name.into(),
            time: (0..len).map(|i| i as f64 * dt).collect(),
            channels: BTreeMap::new(),
        }
    }

    /// Builder-style channel insertion
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, ContractError> {
        self.insert_channel(name, values)?;
        Ok(self)
    }

    /// Insert or replace a channel
    ///
    /// # Errors
    /// Returns `ChannelLength` if `values` is non-empty and not aligned to the time vector.
    pub fn insert_channel(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), ContractError> {
        let name = name.into();
        if !values.is_empty() && values.len() != self.time.len() {
            return Err(ContractError::ChannelLength {
                channel: name,
                expected: self.time.len(),
                actual: values.len(),
            });
        }
        self.channels.insert(name, values);
        Ok(())
    }

    /// Store a channel computed from other channels (e.g. a filtered copy)
    pub fn set_derived_channel(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), ContractError> {
        self.insert_channel(name, values)
    }

    /// Check whether a non-empty channel exists
    pub fn has_channel(&self, name: &str) -> bool {
        self.channel(name).is_some()
    }

    /// Remove a channel, returning its values
    pub fn remove_channel(&mut self, name: &str) -> Option<Vec<f64>> {
        self.channels.remove(name)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True if the recording has no samples
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of non-empty channels
    pub fn channel_count(&self) -> usize {
        self.channels.values().filter(|v| !v.is_empty()).count()
    }

    /// Slice every channel to `[start, end]` (inclusive)
    ///
    /// The result may be empty when the range does not overlap the recording.
    pub fn slice(&self, name: impl Into<String>, start: f64, end: f64) -> Recording {
        let lo = self.time.partition_point(|&t| t < start);
        let hi = self.time.partition_point(|&t| t <= end);
        let range = if lo < hi { lo..hi } else { 0..0 };

        let channels = self
            .channels
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(k, values)| (k.clone(), values[range.clone()].to_vec()))
            .collect();

        Recording {
            name: name.into(),
            time: self.time[range].to_vec(),
            channels,
        }
    }

    /// Re-check invariants after deserialization
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ContractError> {
        if let Some(index) = first_non_monotonic(&self.time) {
            return Err(ContractError::NonMonotonicTime { index });
        }
        for (name, values) in &self.channels {
            if !values.is_empty() && values.len() != self.time.len() {
                return Err(ContractError::ChannelLength {
                    channel: name.clone(),
                    expected: self.time.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }
}

impl ChannelStore for Recording {
    fn name(&self) -> &str {
        &self.name
    }

    fn time(&self) -> &[f64] {
        &self.time
    }

    fn channel(&self, name: &str) -> Option<&[f64]> {
        self.channels
            .get(name)
            .filter(|v| !v.is_empty())
            .map(Vec::as_slice)
    }

    fn channel_names(&self) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// JSON has no NaN: gaps are written as `null` and read back as NaN
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        channels: &BTreeMap<String, Vec<f64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let view: BTreeMap<&str, Vec<Option<f64>>> = channels
            .iter()
            .map(|(k, v)| (k.as_str(), v.iter().map(|x| x.is_finite().then_some(*x)).collect()))
            .collect();
        view.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<f64>>, D::Error> {
        let raw = BTreeMap::<String, Vec<Option<f64>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect()))
            .collect())
    }
}

fn first_non_monotonic(time: &[f64]) -> Option<usize> {
    if let Some(i) = time.iter().position(|t| !t.is_finite()) {
        return Some(i);
    }
    time.windows(2).position(|w| w[1] <= w[0]).map(|i| i + 1)
}
