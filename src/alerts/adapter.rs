//! BrokerAdapter trait and column declarations
//!
//! The core abstraction for pluggable alert brokers. Each adapter declares its
//! filter inputs and result columns, validates filter values, performs the
//! broker query, flattens payloads into table rows and maps payloads into the
//! host's target schema.
//!
//! # Implementation Notes
//!
//! - `flatten_alert` must be total: a missing optional field becomes a null
//!   cell, never an error, and every declared column is always present.
//! - `execute_query` is the only method allowed to do network I/O. It is never
//!   called when the trigger gate or validation rejects a request.
//! - Pages arrive 0-indexed from the table; brokers expect 1-indexed pages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filters::{FilterSpecification, FilterValues};
use super::row::{DisplayRow, RawAlert};
use super::targets::{Target, TargetCreator, TargetDraft};
use super::validation::{check_filters, ConeRule, ValidationMessage};
use crate::error::{QueryError, TargetError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Datetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    Markdown,
}

/// One declared table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Presentation>,
}

impl ResultColumn {
    pub fn text(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            column_type: ColumnType::Text,
            presentation: None,
        }
    }

    /// Text column rendered as a markdown link.
    pub fn markdown(id: &str, name: &str) -> Self {
        Self {
            presentation: Some(Presentation::Markdown),
            ..Self::text(id, name)
        }
    }

    pub fn datetime(id: &str, name: &str) -> Self {
        Self {
            column_type: ColumnType::Datetime,
            ..Self::text(id, name)
        }
    }
}

/// Ordered column declaration for a broker's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultColumnSpecification {
    columns: Vec<ResultColumn>,
}

impl ResultColumnSpecification {
    pub fn new(columns: Vec<ResultColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.id.as_str())
    }
}

/// Trait for pluggable alert broker adapters
#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    /// Display name; registry key and UI element id suffix (e.g. "MARS").
    fn name(&self) -> &str;

    /// Filter widgets. Defaults to the pagination inputs only.
    fn filter_inputs(&self) -> FilterSpecification {
        FilterSpecification::pagination_only()
    }

    fn result_columns(&self) -> ResultColumnSpecification;

    /// Cone-search inputs, for adapters that support one.
    fn cone_rule(&self) -> Option<ConeRule> {
        None
    }

    /// Domain diagnostics for the current values. Defaults to input coercion
    /// plus the all-or-nothing cone rule.
    fn validate_filters(&self, values: &FilterValues) -> Vec<ValidationMessage> {
        check_filters(&self.filter_inputs(), values, self.cone_rule().as_ref())
    }

    /// Map one payload to exactly one row.
    fn flatten_alert(&self, alert: &RawAlert) -> DisplayRow;

    /// Order-preserving batch flatten.
    fn flatten(&self, alerts: &[RawAlert]) -> Vec<DisplayRow> {
        alerts.iter().map(|a| self.flatten_alert(a)).collect()
    }

    /// Query the broker for the page described by `values`.
    async fn execute_query(&self, values: &FilterValues) -> Result<Vec<RawAlert>, QueryError>;

    /// Map a payload into the host's generic target fields.
    fn target_draft(&self, alert: &RawAlert) -> Result<TargetDraft, TargetError>;

    /// Persist a target for `alert` through the host.
    async fn to_target(
        &self,
        alert: &RawAlert,
        host: &dyn TargetCreator,
    ) -> Result<Target, TargetError> {
        if alert.is_null() {
            return Err(TargetError::EmptyPayload);
        }
        let draft = self.target_draft(alert)?.with_extra("broker", self.name());
        host.create_target(draft).await
    }
}

/// Look up a dotted path (`candidate.ra`) in a payload; JSON null counts as
/// absent.
pub fn field<'a>(alert: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = alert;
    for key in path.split('.') {
        current = current.get(key)?;
    }
    (!current.is_null()).then_some(current)
}

pub fn field_f64(alert: &Value, path: &str) -> Option<f64> {
    field(alert, path).and_then(Value::as_f64)
}

/// Required coordinate for target creation.
pub fn required_f64(alert: &Value, path: &'static str) -> Result<f64, TargetError> {
    field_f64(alert, path).ok_or(TargetError::MissingField { field: path })
}

/// Required non-empty name for target creation; numbers are stringified.
pub fn required_text(alert: &Value, path: &'static str) -> Result<String, TargetError> {
    match field(alert, path) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(TargetError::MissingField { field: path }),
    }
}

/// Pull the alert list out of a broker response body.
pub fn extract_results(
    broker: &str,
    mut body: Value,
    key: &str,
) -> Result<Vec<RawAlert>, QueryError> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Err(QueryError::malformed(
            broker,
            format!("response has no '{}' list", key),
        )),
        Some(_) => Err(QueryError::malformed(
            broker,
            format!("'{}' is not a list", key),
        )),
    }
}
