//! Filter input declarations and the values submitted for them
//!
//! Each adapter declares its inputs once; the binding controller wires exactly
//! these ids (plus the two pagination ids) to the adapter's query cycle.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved input: 0-indexed page shown in the result table.
pub const PAGE_CURRENT: &str = "page_current";
/// Reserved input: rows per page.
pub const PAGE_SIZE: &str = "page_size";
/// Rows per page when neither the UI nor the config says otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Widget kind of a filter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Text,
    Number,
    Choice,
    DateRange,
    /// Button whose click counter is the query trigger token.
    Trigger,
    /// Reserved table pagination property.
    Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One declared filter widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInput {
    pub id: String,
    pub kind: InputKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub default: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
}

impl FilterInput {
    fn new(id: &str, kind: InputKind, label: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: label.to_string(),
            placeholder: None,
            default: Value::Null,
            options: Vec::new(),
        }
    }

    pub fn text(id: &str, placeholder: &str) -> Self {
        Self::new(id, InputKind::Text, placeholder).with_placeholder(placeholder)
    }

    pub fn number(id: &str, placeholder: &str) -> Self {
        Self::new(id, InputKind::Number, placeholder).with_placeholder(placeholder)
    }

    pub fn choice(id: &str, label: &str, options: Vec<ChoiceOption>) -> Self {
        let mut input = Self::new(id, InputKind::Choice, label);
        input.options = options;
        input
    }

    pub fn date_range(id: &str, label: &str) -> Self {
        Self::new(id, InputKind::DateRange, label)
    }

    pub fn trigger(id: &str, label: &str) -> Self {
        let mut input = Self::new(id, InputKind::Trigger, label);
        input.default = Value::from(0);
        input
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// A coercion failure on one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered filter declaration. Always ends with the two pagination inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpecification {
    inputs: Vec<FilterInput>,
}

impl FilterSpecification {
    pub fn new(mut inputs: Vec<FilterInput>) -> Self {
        for (id, label) in [(PAGE_CURRENT, "Page"), (PAGE_SIZE, "Page Size")] {
            if !inputs.iter().any(|i| i.id == id) {
                inputs.push(FilterInput::new(id, InputKind::Pagination, label));
            }
        }
        Self { inputs }
    }

    /// Only the reserved pagination inputs.
    pub fn pagination_only() -> Self {
        Self::new(Vec::new())
    }

    pub fn inputs(&self) -> &[FilterInput] {
        &self.inputs
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&FilterInput> {
        self.inputs.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The button input whose counter triggers queries, if any.
    pub fn trigger_input(&self) -> Option<&FilterInput> {
        self.inputs.iter().find(|i| i.kind == InputKind::Trigger)
    }

    /// Schema check of submitted values: one error per offending field.
    pub fn coerce(&self, values: &FilterValues) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for input in &self.inputs {
            let result = match input.kind {
                InputKind::Number => values.number(&input.id).map(|_| ()),
                InputKind::DateRange => values.date_range(&input.id).map(|_| ()),
                InputKind::Choice => match values.text(&input.id) {
                    Some(v) if !input.options.iter().any(|o| o.value == v) => Err(format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        v
                    )),
                    _ => Ok(()),
                },
                _ => Ok(()),
            };
            if let Err(message) = result {
                errors.push(FieldError {
                    field: input.id.clone(),
                    message,
                });
            }
        }
        errors
    }
}

/// Inclusive date window from a date-range picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Current values of a broker panel's inputs, as sent by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterValues {
    #[serde(default)]
    pub page_current: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: impl Into<Value>) -> Self {
        self.values.insert(id.to_string(), value.into());
        self
    }

    pub fn with_page(mut self, page_current: u32, page_size: Option<u32>) -> Self {
        self.page_current = page_current;
        self.page_size = page_size;
        self
    }

    pub fn raw(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Trimmed text value; empty strings count as absent.
    pub fn text(&self, id: &str) -> Option<String> {
        match self.values.get(id)? {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn is_populated(&self, id: &str) -> bool {
        self.text(id).is_some()
    }

    pub fn number(&self, id: &str) -> Result<Option<f64>, String> {
        match self.values.get(id) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Some)
                .ok_or_else(|| "Enter a number.".to_string()),
            Some(_) => Err("Enter a number.".to_string()),
        }
    }

    /// Date range from `{"start_date": .., "end_date": ..}`; either side may be
    /// null. Timestamps are cut to their date part.
    pub fn date_range(&self, id: &str) -> Result<DateRange, String> {
        let Some(value) = self.values.get(id) else {
            return Ok(DateRange::default());
        };
        match value {
            Value::Null => Ok(DateRange::default()),
            Value::Object(map) => Ok(DateRange {
                start: parse_date(map.get("start_date"))?,
                end: parse_date(map.get("end_date"))?,
            }),
            _ => Err("Enter a valid date.".to_string()),
        }
    }

    /// Requested page size, or `default` when unset or zero.
    pub fn page_size_or(&self, default: u32) -> u32 {
        match self.page_size {
            Some(size) if size > 0 => size,
            _ => default,
        }
    }
}

fn parse_date(value: Option<&Value>) -> Result<Option<NaiveDate>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| "Enter a valid date.".to_string())
        }
        Some(_) => Err("Enter a valid date.".to_string()),
    }
}
