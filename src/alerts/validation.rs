//! Filter validation
//!
//! Pure rule evaluation over a panel's current filter values. Blocking
//! diagnostics suppress the query; the message list is append-only and only the
//! UI dismisses entries.

use serde::{Deserialize, Serialize};

use super::filters::{FilterSpecification, FilterValues};

/// Field name for errors not tied to one input.
pub const GLOBAL_FIELD: &str = "__all__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageScope {
    Global,
    Field(String),
}

/// A dismissable diagnostic shown above a broker panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub scope: MessageScope,
    pub text: String,
}

impl ValidationMessage {
    /// Blocking error not tied to one field.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            scope: MessageScope::Global,
            text: text.into(),
        }
    }

    /// Blocking error on one field, rendered `"{field}: {message}"`.
    pub fn field_error(field: &str, message: &str) -> Self {
        Self {
            severity: Severity::Error,
            scope: MessageScope::Field(field.to_string()),
            text: format!("{}: {}", field, message),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            scope: MessageScope::Global,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            scope: MessageScope::Global,
            text: text.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// The three inputs making up a cone search, and how to report a partial one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConeRule {
    pub ra: &'static str,
    pub dec: &'static str,
    pub radius: &'static str,
    pub message: ValidationMessage,
}

/// Outcome of reading the cone inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConeSearch {
    /// None of the three inputs populated.
    Absent,
    /// All three populated, joined as `"ra,dec,radius"`.
    Complete(String),
    /// One or two populated.
    Partial,
}

impl ConeRule {
    pub fn read(&self, values: &FilterValues) -> ConeSearch {
        let parts: Vec<Option<String>> = [self.ra, self.dec, self.radius]
            .iter()
            .map(|id| values.text(id))
            .collect();
        let populated = parts.iter().filter(|p| p.is_some()).count();
        match populated {
            0 => ConeSearch::Absent,
            3 => ConeSearch::Complete(parts.into_iter().flatten().collect::<Vec<_>>().join(",")),
            _ => ConeSearch::Partial,
        }
    }

    /// The combined query value, `None` unless all three are populated.
    pub fn parameter(&self, values: &FilterValues) -> Option<String> {
        match self.read(values) {
            ConeSearch::Complete(cone) => Some(cone),
            _ => None,
        }
    }
}

/// Run the standard rules: schema coercion, then the cone rule.
pub fn check_filters(
    spec: &FilterSpecification,
    values: &FilterValues,
    cone: Option<&ConeRule>,
) -> Vec<ValidationMessage> {
    let mut messages: Vec<ValidationMessage> = spec
        .coerce(values)
        .iter()
        .map(|e| ValidationMessage::field_error(&e.field, &e.message))
        .collect();

    if let Some(rule) = cone {
        if rule.read(values) == ConeSearch::Partial {
            messages.push(rule.message.clone());
        }
    }
    messages
}

/// True when any message in the slice blocks a query.
pub fn has_blocking(messages: &[ValidationMessage]) -> bool {
    messages.iter().any(ValidationMessage::is_blocking)
}
