//! Ingestion 错误类型

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 文件读取失败
    #[error("failed to read {path}: {source}")]
    Read {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 记录解析失败
    #[error("failed to parse recording {path}: {message}")]
    ParseFailed {
        /// 文件路径
        path: PathBuf,
        /// 错误消息
        message: String,
    },

    /// 没有适配器支持该扩展名
    #[error("no recording adapter for {path}")]
    UnsupportedFormat {
        /// 文件路径
        path: PathBuf,
    },

    /// 记录不含任何样本
    #[error("recording {name} has no samples")]
    Empty {
        /// 记录名
        name: String,
    },

    /// 数据约束违反
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl IngestionError {
    pub fn parse_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
