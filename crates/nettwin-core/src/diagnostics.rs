//! Diagnostics collected by the integrity validator.
//!
//! Validation does not stop at the first problem: every issue found in a
//! network is recorded with a severity, a category, and optionally the element
//! it concerns, so a planner sees the full picture in one pass.
//!
//! ```
//! use nettwin_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("structure", "network has no loads");
//! diag.add_error_with_entity("physical", "nominal voltage must be positive", "Bus North");
//! assert!(diag.has_errors());
//! assert_eq!(diag.warning_count(), 1);
//! ```

use serde::Serialize;

/// Severity level for a diagnostic issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but analysis may proceed
    Warning,
    /// Model is not fit for analysis
    Error,
}

/// A single issue found while validating a network.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping key, e.g. "physical", "reference", "topology"
    pub category: String,
    pub message: String,
    /// Element the issue concerns, e.g. "Bus North", "Line A-B"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        Ok(())
    }
}

/// Collection of issues for one validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let errors = self.error_count();
        match (warnings, errors) {
            (0, 0) => "no issues".to_string(),
            (w, 0) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (0, e) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (w, e) => format!(
                "{} error{}, {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_severity() {
        let mut diag = Diagnostics::new();
        diag.add_warning("structure", "network has no loads");
        diag.add_error("physical", "line reactance must be positive");
        diag.add_error_with_entity("reference", "from-bus does not exist", "Line A-B");

        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.error_count(), 2);
        assert!(diag.has_errors());
        assert!(diag.has_warnings());
        assert_eq!(diag.errors().count(), 2);
    }

    #[test]
    fn display_includes_entity() {
        let issue = DiagnosticIssue::new(Severity::Error, "physical", "voltage must be positive")
            .with_entity("Bus South");
        let rendered = issue.to_string();
        assert!(rendered.contains("error:physical"));
        assert!(rendered.contains("(Bus South)"));
    }

    #[test]
    fn summary_pluralizes() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "no issues");
        diag.add_error("physical", "x");
        assert_eq!(diag.summary(), "1 error");
        diag.add_warning("structure", "y");
        diag.add_warning("structure", "z");
        assert_eq!(diag.summary(), "1 error, 2 warnings");
    }

    #[test]
    fn serializes_for_json_consumers() {
        let mut diag = Diagnostics::new();
        diag.add_error_with_entity("physical", "nominal voltage must be positive", "Bus North");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["issues"][0]["severity"], "error");
        assert_eq!(json["issues"][0]["entity"], "Bus North");
    }

    #[test]
    fn merge_concatenates_issues() {
        let mut a = Diagnostics::new();
        a.add_warning("structure", "first");
        let mut b = Diagnostics::new();
        b.add_error("physical", "second");
        a.merge(b);
        assert_eq!(a.issues.len(), 2);
    }
}
