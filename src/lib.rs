//! Draftsheet - spreadsheet rows to email drafts
//!
//! Loads the first sheet of a workbook, maps columns to the `to`, `subject`
//! and `body` roles, resolves `{{ placeholder }}` templates per row, and
//! exports the resulting drafts as JSON or CSV.
//!
//! # Pipeline
//!
//! raw grid → row records → drafts → serialized output
//!
//! Each stage is a pure function of its inputs; [`session::Session`] holds
//! the state between stages for the CLI and the API server.
//!
//! # Example
//!
//! ```no_run
//! use draftsheet::session::Session;
//! use draftsheet::types::{RoleMapping, Templates};
//! use draftsheet::writer::ExportFormat;
//! use std::path::Path;
//!
//! let mut session = Session::new();
//! session.load_file(Path::new("contacts.xlsx"))?;
//!
//! let mapping = RoleMapping::new("Email", "Name", "Notes");
//! let templates = Templates::new(Some("Hello {{ Name }}".to_string()), None);
//! session.generate(&mapping, &templates)?;
//!
//! println!("{}", session.status());
//! println!("{}", session.export(ExportFormat::Csv)?);
//! # Ok::<(), draftsheet::error::DraftError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod session;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{DraftError, DraftResult};
pub use types::{CellValue, Draft, Grid, Role, RoleMapping, RowRecord, Sheet, Templates};
