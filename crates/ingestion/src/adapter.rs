//! 记录文件适配器 trait

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// 适配器读出的原始记录
///
/// 通道名仍是记录仪原始名称，缺失样本为 `None`。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecording {
    /// 记录名（缺省时使用文件名）
    #[serde(default)]
    pub name: Option<String>,

    /// 主时间轴 (s)
    #[serde(default)]
    pub time: Option<Vec<f64>>,

    /// 采样率 (Hz)，仅用于合成时间轴
    #[serde(default)]
    pub sample_rate_hz: Option<f64>,

    /// 原始通道
    #[serde(default)]
    pub channels: BTreeMap<String, Vec<Option<f64>>>,
}

/// 记录文件适配器 trait
///
/// 为每种文件格式实现此 trait，负责：
/// 1. 声明支持的扩展名
/// 2. 将文件解析为 `RawRecording`
pub trait RecordingAdapter: Send + Sync {
    /// 格式名称
    fn format(&self) -> &'static str;

    /// 支持的扩展名（小写，不含点）
    fn extensions(&self) -> &'static [&'static str];

    /// 读取并解析一个文件
    fn read(&self, path: &Path) -> Result<RawRecording>;

    /// 是否支持该文件
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| self.extensions().contains(&e.as_str()))
    }
}
