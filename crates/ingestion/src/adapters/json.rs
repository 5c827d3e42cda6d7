//! JSON 记录适配器
//!
//! 文件格式：
//!
//! ```json
//! {
//!   "name": "drive_001",
//!   "time": [0.0, 0.01, 0.02],
//!   "channels": { "VehSpd": [50.0, 50.1, null] }
//! }
//! ```

use std::path::Path;

use tracing::debug;

use crate::adapter::{RawRecording, RecordingAdapter};
use crate::error::{IngestionError, Result};

/// JSON 记录适配器
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordingAdapter;

impl JsonRecordingAdapter {
    /// 从字符串解析
    pub fn parse_str(&self, path: &Path, content: &str) -> Result<RawRecording> {
        serde_json::from_str(content).map_err(|e| IngestionError::parse_failed(path, e.to_string()))
    }
}

impl RecordingAdapter for JsonRecordingAdapter {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn read(&self, path: &Path) -> Result<RawRecording> {
        let content = std::fs::read_to_string(path).map_err(|source| IngestionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = self.parse_str(path, &content)?;
        debug!(path = %path.display(), channels = raw.channels.len(), "json recording parsed");
        Ok(raw)
    }
}
