//! Draftsheet API Server module
//!
//! HTTP REST API over the same load → generate → export pipeline as the CLI.
//! Run with `draftsheet-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
