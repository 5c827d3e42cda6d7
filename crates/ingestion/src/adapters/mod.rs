//! Recording adapters

pub mod common;
mod json;

pub use json::JsonRecordingAdapter;
