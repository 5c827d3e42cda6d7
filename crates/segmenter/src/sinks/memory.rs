//! MemorySink - keeps extracted windows in memory

use contracts::{ContractError, EventWindow, WindowSink};
use tracing::debug;

/// Sink that collects windows for in-process consumers and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    name: String,
    windows: Vec<EventWindow>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            windows: Vec::new(),
        }
    }

    pub fn windows(&self) -> &[EventWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Hand the collected windows over, leaving the sink empty
    pub fn drain(&mut self) -> Vec<EventWindow> {
        std::mem::take(&mut self.windows)
    }

    pub fn into_windows(self) -> Vec<EventWindow> {
        self.windows
    }
}

impl WindowSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, window: &EventWindow) -> Result<(), ContractError> {
        debug!(sink = %self.name, window = %window.name, "window stored in memory");
        self.windows.push(window.clone());
        Ok(())
    }
}
