//! Event boundaries and extracted event windows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Recording;

/// Safety feature an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Automatic Emergency Braking
    Aeb,
    /// Forward Collision Warning
    Fcw,
}

impl EventKind {
    /// Lowercase tag used in window names and directories
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Aeb => "aeb",
            EventKind::Fcw => "fcw",
        }
    }

    /// All supported kinds
    pub const ALL: [EventKind; 2] = [EventKind::Aeb, EventKind::Fcw];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aeb" => Ok(EventKind::Aeb),
            "fcw" => Ok(EventKind::Fcw),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

/// Detected event in the recording's time base
///
/// `end` is `None` when no end was found; the window extractor then pads
/// from the start only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventBoundary {
    pub start: f64,
    pub end: Option<f64>,
}

impl EventBoundary {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn open(start: f64) -> Self {
        Self { start, end: None }
    }

    /// Pair start and end arrays by position
    ///
    /// Starts without a matching end become open boundaries.
    pub fn zip(starts: &[f64], ends: &[f64]) -> Vec<EventBoundary> {
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| EventBoundary {
                start,
                end: ends.get(i).copied(),
            })
            .collect()
    }

    /// Duration if the end is known
    pub fn duration(&self) -> Option<f64> {
        self.end.map(|e| e - self.start)
    }
}

/// One extracted sub-recording around an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWindow {
    /// Deterministic name `<source>_<kind>_<NN>`
    pub name: String,
    /// Source recording name
    pub source: String,
    pub kind: EventKind,
    /// 1-based position among the events of the source recording
    pub index: usize,
    pub boundary: EventBoundary,
    /// Clamped window start
    pub start: f64,
    /// Clamped window end
    pub end: f64,
    pub recording: Recording,
}

impl EventWindow {
    /// Window duration
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}
