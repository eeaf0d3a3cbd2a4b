//! Flat table rows produced by the flattening step

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Broker payload exactly as returned by the remote service.
pub type RawAlert = Value;

/// Reserved row key holding the broker payload.
pub const ALERT_KEY: &str = "alert";

/// A single primitive table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Cell {
    /// Flatten any JSON value into a cell; containers are stringified so a
    /// row can never hold nested data.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Integer(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Cell from an optional JSON lookup; a missing field is null.
    pub fn from_opt(value: Option<&Value>) -> Self {
        value.map(Cell::from_json).unwrap_or(Cell::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<Option<String>> for Cell {
    fn from(s: Option<String>) -> Self {
        s.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

/// One table row: flat cells keyed by column id plus the broker payload
/// under [`ALERT_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    #[serde(default)]
    alert: RawAlert,
    #[serde(flatten)]
    cells: BTreeMap<String, Cell>,
}

impl DisplayRow {
    pub fn new(alert: RawAlert) -> Self {
        Self {
            alert,
            cells: BTreeMap::new(),
        }
    }

    /// Builder-style cell insert.
    pub fn with(mut self, column: &str, cell: impl Into<Cell>) -> Self {
        self.cells.insert(column.to_string(), cell.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// The payload embedded for target creation.
    pub fn alert(&self) -> &RawAlert {
        &self.alert
    }

    /// Column ids present in this row (without the reserved key).
    pub fn column_ids(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Every key of the serialized row, reserved key included.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.column_ids().collect();
        keys.push(ALERT_KEY);
        keys
    }
}
