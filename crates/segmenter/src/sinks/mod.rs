//! Sink implementations
//!
//! Contains MemorySink and FileSink.

mod file;
mod memory;

pub use self::file::{list_windows, load_window, FileSink, FileSinkConfig};
pub use self::memory::MemorySink;
