//! CLI command handlers

pub mod commands;

pub use commands::{export, inspect, preview, watch, JobOptions};
