//! # KPI Engine
//!
//! 事件窗口 KPI 计算引擎。
//!
//! 负责：
//! - 类型化 KPI 表（按 schema 分配、按行写入、一次性取整）
//! - 按车速插值的标定阈值
//! - AEB 干预起止定位
//! - AEB / FCW 计算器流水线（距离、油门、转向、横向加速度、横摆角速度、
//!   制动模式、延迟、制动冲击度、FCW 预警 TTC）
//!
//! ## 使用示例
//!
//! ```ignore
//! use kpi_engine::KpiEngine;
//! use contracts::{AnalysisConfig, EventKind};
//!
//! let engine = KpiEngine::new(&AnalysisConfig::default())?;
//! let table = engine.compute_table(EventKind::Aeb, &windows)?;
//! for idx in table.rows_sorted_by("vehSpd") {
//!     println!("{:?}", table.row(idx));
//! }
//! ```

pub mod calculators;
mod engine;
mod intervention;
mod table;
mod thresholds;

pub use calculators::{BrakeJerk, EventContext, KpiCalculator, RowWriter};
pub use engine::{KpiEngine, RowStatus};
pub use intervention::{
    find_intervention_end, find_intervention_start, InterventionEnd, InterventionStart,
};
pub use table::{KpiRow, KpiTable};
pub use thresholds::Thresholds;
