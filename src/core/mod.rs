//! Core pipeline: grid projection, template resolution, draft generation

pub mod generator;
pub mod projector;
pub mod template;

pub use generator::{generate, DraftGenerator};
pub use projector::{project, Table};
pub use template::{resolve, template_warnings, TemplateResolver};
