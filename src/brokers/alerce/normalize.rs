//! Flattening of ALeRCE object payloads
//!
//! Two payload shapes are accepted:
//! - per-classifier fields (`classrf`/`pclassrf`, `classearly`/`pclassearly`),
//!   resolved with the configured precedence and taxonomy;
//! - a single pre-selected classification (`class`, `classifier`,
//!   `probability`), taken as is.

use serde_json::Value;

use super::taxonomy::{ClassTaxonomy, ClassifierKind, ClassifierPrecedence};
use crate::alerts::adapter::field;
use crate::alerts::format::{
    coordinate_cell, json_text, markdown_link, mjd_to_datetime, truncate_number, AngleFormat,
};
use crate::alerts::row::{Cell, DisplayRow, RawAlert};

pub(super) const COL_OID: &str = "oid";
pub(super) const COL_MEANRA: &str = "meanra";
pub(super) const COL_MEANDEC: &str = "meandec";
pub(super) const COL_DISCOVERY_DATE: &str = "discovery_date";
pub(super) const COL_CLASS: &str = "class";
pub(super) const COL_CLASSIFIER: &str = "classifier";
pub(super) const COL_PROBABILITY: &str = "probability";

/// Classification chosen for display.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Classification {
    pub class_name: String,
    pub kind: ClassifierKind,
    pub probability: Cell,
}

pub(super) fn object_url(web_url: &str, oid: &str) -> String {
    format!("{}/object/{}", web_url, oid)
}

pub(super) fn classify(
    alert: &RawAlert,
    precedence: ClassifierPrecedence,
    taxonomy: &ClassTaxonomy,
) -> Classification {
    if let Some(classifier) = field(alert, "classifier") {
        return Classification {
            class_name: field(alert, "class").map(json_text).unwrap_or_default(),
            kind: ClassifierKind::from_classifier_name(&json_text(classifier)),
            probability: probability_cell(field(alert, "probability")),
        };
    }

    let kind = precedence.select(alert);
    Classification {
        class_name: taxonomy.resolve(kind, field(alert, kind.class_field())),
        kind,
        probability: probability_cell(field(alert, kind.probability_field())),
    }
}

fn probability_cell(value: Option<&Value>) -> Cell {
    value.map(truncate_number).unwrap_or(Cell::Null)
}

pub(super) fn flatten_alert(
    web_url: &str,
    precedence: ClassifierPrecedence,
    taxonomy: &ClassTaxonomy,
    alert: &RawAlert,
) -> DisplayRow {
    let oid = match field(alert, "oid") {
        Some(oid) => {
            let oid = json_text(oid);
            Cell::Text(markdown_link(&oid, &object_url(web_url, &oid)))
        }
        None => Cell::Null,
    };
    let discovery = field(alert, "firstmjd")
        .and_then(Value::as_f64)
        .and_then(mjd_to_datetime)
        .map(Cell::DateTime)
        .unwrap_or(Cell::Null);
    let classification = classify(alert, precedence, taxonomy);

    DisplayRow::new(alert.clone())
        .with(COL_OID, oid)
        .with(COL_MEANRA, coordinate_cell(field(alert, "meanra"), AngleFormat::Hms))
        .with(COL_MEANDEC, coordinate_cell(field(alert, "meandec"), AngleFormat::Dms))
        .with(COL_DISCOVERY_DATE, discovery)
        .with(COL_CLASS, classification.class_name)
        .with(COL_CLASSIFIER, classification.kind.label())
        .with(COL_PROBABILITY, classification.probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn flatten(alert: &RawAlert, precedence: ClassifierPrecedence) -> DisplayRow {
        flatten_alert(
            "https://alerce.online",
            precedence,
            &ClassTaxonomy::default(),
            alert,
        )
    }

    #[test]
    fn test_light_curve_class_wins() {
        let alert = json!({
            "oid": "ZTF20acnvtxy",
            "meanra": 60,
            "meandec": 120,
            "firstmjd": 59196.441261574075,
            "lastmjd": 59200.0,
            "classrf": 0,
            "pclassrf": 0.98765,
            "classearly": 1,
            "pclassearly": 0.5
        });
        let row = flatten(&alert, ClassifierPrecedence::PreferLightCurve);

        assert_eq!(
            row.get(COL_OID),
            Some(&Cell::Text(
                "[ZTF20acnvtxy](https://alerce.online/object/ZTF20acnvtxy)".into()
            ))
        );
        assert_eq!(row.get(COL_MEANRA), Some(&Cell::Text("04:00:0.000".into())));
        assert_eq!(row.get(COL_MEANDEC), Some(&Cell::Text("+120:00:0.000".into())));
        assert_eq!(row.get(COL_CLASS), Some(&Cell::Text("SNIa".into())));
        assert_eq!(row.get(COL_CLASSIFIER), Some(&Cell::Text("Light Curve".into())));
        assert_eq!(row.get(COL_PROBABILITY), Some(&Cell::Text("0.9877".into())));
        let expected = NaiveDate::from_ymd_opt(2020, 12, 13)
            .and_then(|d| d.and_hms_opt(10, 35, 25))
            .unwrap();
        assert_eq!(row.get(COL_DISCOVERY_DATE), Some(&Cell::DateTime(expected)));
        assert!(row.get("lastmjd").is_none());
    }

    #[test]
    fn test_stamp_fallback_and_configured_precedence() {
        let alert = json!({
            "oid": "ZTF20aaa",
            "classrf": 0,
            "pclassrf": 0.6,
            "classearly": 0,
            "pclassearly": 0.54321
        });
        let row = flatten(&alert, ClassifierPrecedence::PreferStamp);
        assert_eq!(row.get(COL_CLASS), Some(&Cell::Text("SN".into())));
        assert_eq!(row.get(COL_CLASSIFIER), Some(&Cell::Text("Stamp".into())));
        assert_eq!(row.get(COL_PROBABILITY), Some(&Cell::Text("0.5432".into())));

        let no_late = json!({"oid": "ZTF20bbb", "classrf": null, "pclassrf": null, "classearly": 0, "pclassearly": 0.8});
        let row = flatten(&no_late, ClassifierPrecedence::PreferLightCurve);
        assert_eq!(row.get(COL_CLASSIFIER), Some(&Cell::Text("Stamp".into())));
    }

    #[test]
    fn test_preselected_classification_shape() {
        let alert = json!({
            "oid": "ZTF20ccc",
            "class": "SN",
            "classifier": "stamp_classifier",
            "probability": 0.54321
        });
        let row = flatten(&alert, ClassifierPrecedence::PreferLightCurve);
        assert_eq!(row.get(COL_CLASS), Some(&Cell::Text("SN".into())));
        assert_eq!(row.get(COL_CLASSIFIER), Some(&Cell::Text("Stamp".into())));
        assert_eq!(row.get(COL_PROBABILITY), Some(&Cell::Text("0.5432".into())));
    }

    #[test]
    fn test_missing_fields_are_null() {
        let row = flatten(&json!({}), ClassifierPrecedence::PreferLightCurve);
        for col in [COL_OID, COL_MEANRA, COL_MEANDEC, COL_DISCOVERY_DATE, COL_PROBABILITY] {
            assert_eq!(row.get(col), Some(&Cell::Null), "{}", col);
        }
        assert_eq!(row.get(COL_CLASS), Some(&Cell::Text(String::new())));
    }
}
