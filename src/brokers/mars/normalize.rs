//! Flattening of MARS payloads
//!
//! MARS returns one ZTF candidate per alert; the photometry lives under
//! `candidate`.

use crate::alerts::adapter::field;
use crate::alerts::format::{coordinate_cell, json_text, markdown_link, truncate_number, AngleFormat};
use crate::alerts::row::{Cell, DisplayRow, RawAlert};
use serde_json::Value;

pub(super) const COL_OBJECT_ID: &str = "objectId";
pub(super) const COL_RA: &str = "ra";
pub(super) const COL_DEC: &str = "dec";
pub(super) const COL_MAGPSF: &str = "magpsf";
pub(super) const COL_RB: &str = "rb";

/// Object page on the MARS site.
pub(super) fn object_url(base_url: &str, lco_id: &Value) -> String {
    format!("{}/{}/", base_url, json_text(lco_id))
}

pub(super) fn flatten_alert(base_url: &str, alert: &RawAlert) -> DisplayRow {
    let object_id = match (field(alert, "objectId"), field(alert, "lco_id")) {
        (Some(name), Some(lco_id)) => {
            Cell::Text(markdown_link(&json_text(name), &object_url(base_url, lco_id)))
        }
        (Some(name), None) => Cell::Text(json_text(name)),
        (None, _) => Cell::Null,
    };

    DisplayRow::new(alert.clone())
        .with(COL_OBJECT_ID, object_id)
        .with(COL_RA, coordinate_cell(field(alert, "candidate.ra"), AngleFormat::Hms))
        .with(COL_DEC, coordinate_cell(field(alert, "candidate.dec"), AngleFormat::Dms))
        .with(COL_MAGPSF, number_cell(alert, "candidate.magpsf"))
        .with(COL_RB, number_cell(alert, "candidate.rb"))
}

fn number_cell(alert: &RawAlert, path: &str) -> Cell {
    field(alert, path).map(truncate_number).unwrap_or(Cell::Null)
}
