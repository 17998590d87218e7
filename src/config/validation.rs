//! Configuration validation
//!
//! Semantic validation of a resolved [`GameConfig`]. Validation collects
//! ALL issues instead of stopping at the first one, so a catalog author
//! sees every problem in one pass.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::defaults::MAX_PLAYERS;
use crate::config::schema::{Catalog, GameConfig};
use crate::error::{Severity, ValidationIssue};

/// Discussion periods longer than this are flagged.
const LONG_DISCUSSION: Duration = Duration::from_secs(3600);

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &GameConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_discussion(config.discussion);
        self.validate_catalog(&config.catalog);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_discussion(&mut self, discussion: Duration) {
        if discussion.subsec_nanos() != 0 {
            self.add_warning(
                "discussion",
                "discussion length is counted in whole seconds; the fraction is dropped",
            );
        }
        if discussion > LONG_DISCUSSION {
            self.add_warning("discussion", "discussion is unusually long (> 1h)");
        }
    }

    fn validate_catalog(&mut self, catalog: &Catalog) {
        if catalog.themes.is_empty() {
            self.add_error("catalog.themes", "theme list is empty");
        }
        if catalog.contexts.is_empty() {
            self.add_error("catalog.contexts", "context list is empty");
        } else if catalog.contexts.len() < MAX_PLAYERS {
            self.add_warning(
                "catalog.contexts",
                &format!(
                    "only {} contexts; tables larger than that cannot start",
                    catalog.contexts.len()
                ),
            );
        }

        self.check_entries(
            "catalog.themes",
            catalog
                .themes
                .iter()
                .map(|t| (t.id.as_str(), t.label())),
        );
        self.check_entries(
            "catalog.contexts",
            catalog
                .contexts
                .iter()
                .map(|c| (c.id.as_str(), c.label())),
        );

        for (i, prompt) in catalog.prompts.iter().enumerate() {
            if prompt.trim().is_empty() {
                self.add_warning(&format!("catalog.prompts[{i}]"), "prompt is blank");
            }
        }
    }

    /// Ids must be non-blank and unique; duplicate labels only warn.
    fn check_entries<'a>(&mut self, base: &str, entries: impl Iterator<Item = (&'a str, &'a str)>) {
        let mut ids = HashSet::new();
        let mut labels = HashSet::new();

        for (i, (id, label)) in entries.enumerate() {
            let path = format!("{base}[{i}]");
            if id.trim().is_empty() {
                self.add_error(&format!("{path}.id"), "id is required and cannot be blank");
                continue;
            }
            if !ids.insert(id) {
                self.add_error(&format!("{path}.id"), &format!("duplicate id '{id}'"));
            }
            if !labels.insert(label) {
                self.add_warning(&format!("{path}.label"), &format!("duplicate label '{label}'"));
            }
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
