//! # Contracts
//!
//! Frozen interface contracts, defining the data structures and traits shared
//! by every stage of the KPI extraction pipeline.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every recording carries its own time vector (seconds, f64, strictly increasing)
//! - Sampling is not assumed to be uniform
//! - Event boundaries and windows are expressed in the recording's time base

mod analysis_config;
mod calibration;
pub mod channels;
mod error;
mod event;
mod kpi_schema;
mod params;
mod recording;
mod sink;

pub use analysis_config::*;
pub use calibration::*;
pub use error::*;
pub use event::*;
pub use kpi_schema::*;
pub use params::*;
pub use recording::{ChannelStore, Recording};
pub use sink::WindowSink;
