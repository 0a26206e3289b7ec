//! Job file parsing - YAML description of a role mapping and templates

use crate::error::DraftResult;
use crate::types::{RoleMapping, Templates};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Mapping and templates for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default)]
    pub mapping: RoleMapping,
    #[serde(default)]
    pub templates: Templates,
}

/// Individual values that take precedence over a job file
#[derive(Debug, Clone, Default)]
pub struct JobOverrides {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub subject_template: Option<String>,
    pub body_template: Option<String>,
}

impl JobConfig {
    pub fn new(mapping: RoleMapping, templates: Templates) -> Self {
        Self { mapping, templates }
    }

    /// Apply overrides; set fields replace the job file's values
    pub fn with_overrides(mut self, overrides: JobOverrides) -> Self {
        if let Some(to) = overrides.to {
            self.mapping.to = to;
        }
        if let Some(subject) = overrides.subject {
            self.mapping.subject = subject;
        }
        if let Some(body) = overrides.body {
            self.mapping.body = body;
        }
        if overrides.subject_template.is_some() {
            self.templates.subject = overrides.subject_template;
        }
        if overrides.body_template.is_some() {
            self.templates.body = overrides.body_template;
        }
        self
    }
}

/// Parse a job file from YAML text
pub fn parse_job_str(content: &str) -> DraftResult<JobConfig> {
    if content.trim().is_empty() {
        return Ok(JobConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Read and parse a job file
pub fn parse_job(path: &Path) -> DraftResult<JobConfig> {
    let content = fs::read_to_string(path)?;
    parse_job_str(&content)
}
