//! Batch orchestration module.

mod export;
mod runner;
mod stats;

pub use export::export_table;
pub use runner::{BatchConfig, BatchRunner};
pub use stats::BatchStats;
