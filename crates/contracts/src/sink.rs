//! WindowSink trait - persistence interface for extracted event windows

use crate::{ContractError, EventWindow};

/// Event window output trait
///
/// All sink implementations must implement this trait.
pub trait WindowSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist one event window
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&mut self, window: &EventWindow) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
