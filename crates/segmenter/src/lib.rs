//! # Segmenter
//!
//! 事件窗口切分模块。
//!
//! 负责：
//! - 根据事件边界截取前后填充的时间窗口（chunk）
//! - 窗口确定性命名 `<source>_<kind>_<NN>`
//! - 将窗口交给 sink 持久化（内存 / JSON 文件）

pub mod chunker;
pub mod error;
pub mod segmenter;
pub mod sinks;

pub use chunker::{extract_windows, window_name, DiscardReason, DiscardedWindow, Extraction};
pub use contracts::{EventWindow, WindowSink};
pub use error::SegmenterError;
pub use segmenter::{SegmentReport, Segmenter};
pub use sinks::{list_windows, load_window, FileSink, FileSinkConfig, MemorySink};
