//! # Ingestion
//!
//! 记录文件加载模块。
//!
//! 负责：
//! - 按扩展名分派到记录适配器（内置 JSON）
//! - 通道别名解析，缺失样本转为 NaN
//! - 时间轴缺失或非单调时合成等间距时间轴
//! - 由原始加速度派生低通滤波通道
//!
//! ## 使用示例
//!
//! ```ignore
//! use ingestion::{IngestionConfig, RecordingLoader};
//!
//! let loader = RecordingLoader::new(IngestionConfig::from(&config));
//! for path in loader.discover(dir)? {
//!     let recording = loader.load(&path)?;
//! }
//! ```

mod adapter;
pub mod adapters;
mod config;
mod error;
mod pipeline;

pub use adapter::{RawRecording, RecordingAdapter};
pub use adapters::JsonRecordingAdapter;
pub use config::{IngestionConfig, IngestionMetrics, MetricsSnapshot};
pub use error::{IngestionError, Result};
pub use pipeline::RecordingLoader;

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{channels, ChannelStore};
    use std::io::Write;

    fn write(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<String> = (0..100).map(|i| format!("{}", -(i as f64) / 10.0)).collect();
        let times: Vec<String> = (0..100).map(|i| format!("{}", i as f64 / 100.0)).collect();
        let body = format!(
            r#"{{"time": [{}], "channels": {{"{}": [{}]}}}}"#,
            times.join(","),
            channels::LONG_ACCEL,
            samples.join(",")
        );
        let b = write(dir.path(), "b_drive.json", &body);
        let a = write(dir.path(), "a_drive.json", &body);
        write(dir.path(), "notes.txt", "ignored");

        let loader = RecordingLoader::default();
        assert_eq!(loader.discover(dir.path()).unwrap(), vec![a.clone(), b]);

        let rec = loader.load(&a).unwrap();
        assert_eq!(rec.name(), "a_drive");
        assert!(rec.has_channel(channels::LONG_ACCEL_FLT));
        let snap = loader.metrics().snapshot();
        assert_eq!(snap.recordings_loaded, 1);
        assert_eq!(snap.channels_derived, 1);
    }

    #[test]
    fn test_load_unsupported_and_broken() {
        let dir = tempfile::tempdir().unwrap();
        let txt = write(dir.path(), "x.csv", "a,b");
        let broken = write(dir.path(), "broken.json", "{");
        let loader = RecordingLoader::default();

        let result = loader.load(&txt);
        assert!(matches!(result, Err(IngestionError::UnsupportedFormat { .. })));
        assert!(loader.load(&broken).is_err());
        assert_eq!(loader.metrics().snapshot().recordings_failed, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RecordingLoader::default().load(std::path::Path::new("/nonexistent/x.json"));
        assert!(matches!(result, Err(IngestionError::Read { .. })));
    }
}
