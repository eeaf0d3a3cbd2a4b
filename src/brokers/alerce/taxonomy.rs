//! ALeRCE classifier taxonomy and precedence

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alerts::adapter::field;

/// Which classification wins when an object carries both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierPrecedence {
    /// Light-curve class when it has a probability, else the stamp class.
    #[default]
    PreferLightCurve,
    /// Stamp class when it has a probability, else the light-curve class.
    PreferStamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    LightCurve,
    Stamp,
}

impl ClassifierKind {
    /// Display label for the classifier column.
    pub fn label(&self) -> &'static str {
        match self {
            ClassifierKind::LightCurve => "Light Curve",
            ClassifierKind::Stamp => "Stamp",
        }
    }

    /// Payload field holding the class; the probability is under `p{field}`.
    pub fn class_field(&self) -> &'static str {
        match self {
            ClassifierKind::LightCurve => "classrf",
            ClassifierKind::Stamp => "classearly",
        }
    }

    pub fn probability_field(&self) -> &'static str {
        match self {
            ClassifierKind::LightCurve => "pclassrf",
            ClassifierKind::Stamp => "pclassearly",
        }
    }

    /// Kind of a named classifier, e.g. `stamp_classifier` or `lc_classifier`.
    pub fn from_classifier_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("stamp") {
            ClassifierKind::Stamp
        } else {
            ClassifierKind::LightCurve
        }
    }

    fn other(&self) -> Self {
        match self {
            ClassifierKind::LightCurve => ClassifierKind::Stamp,
            ClassifierKind::Stamp => ClassifierKind::LightCurve,
        }
    }
}

impl ClassifierPrecedence {
    /// Classifier used for `alert`: the preferred kind if its probability is
    /// present and non-zero, otherwise the other one.
    pub fn select(&self, alert: &Value) -> ClassifierKind {
        let preferred = match self {
            ClassifierPrecedence::PreferLightCurve => ClassifierKind::LightCurve,
            ClassifierPrecedence::PreferStamp => ClassifierKind::Stamp,
        };
        let has_probability = field(alert, preferred.probability_field())
            .and_then(Value::as_f64)
            .is_some_and(|p| p != 0.0);
        if has_probability {
            preferred
        } else {
            preferred.other()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: i64,
    pub name: String,
}

/// Numeric class id → class name, per classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassTaxonomy {
    pub late: Vec<ClassEntry>,
    pub early: Vec<ClassEntry>,
}

const LATE_CLASSES: &[&str] = &[
    "SNIa",
    "SNIbc",
    "SNII",
    "SLSN",
    "QSO",
    "AGN",
    "Blazar",
    "CV/Nova",
    "YSO",
    "LPV",
    "E",
    "DSCT",
    "RRL",
    "CEP",
    "Periodic-Other",
];

const EARLY_CLASSES: &[&str] = &["SN", "AGN", "VS", "asteroid", "bogus"];

fn numbered(names: &[&str]) -> Vec<ClassEntry> {
    names
        .iter()
        .zip(0..)
        .map(|(name, id)| ClassEntry {
            id,
            name: name.to_string(),
        })
        .collect()
}

impl Default for ClassTaxonomy {
    fn default() -> Self {
        Self {
            late: numbered(LATE_CLASSES),
            early: numbered(EARLY_CLASSES),
        }
    }
}

impl ClassTaxonomy {
    pub fn classes(&self, kind: ClassifierKind) -> &[ClassEntry] {
        match kind {
            ClassifierKind::LightCurve => &self.late,
            ClassifierKind::Stamp => &self.early,
        }
    }

    /// Class name for a payload value. Names pass through; numeric ids are
    /// looked up, unknown ids resolve to an empty name.
    pub fn resolve(&self, kind: ClassifierKind, value: Option<&Value>) -> String {
        match value {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|id| self.classes(kind).iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}
