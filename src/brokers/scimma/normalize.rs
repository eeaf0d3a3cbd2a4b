//! Flattening of Skip alert payloads

use super::GRACE_DB_URL;
use crate::alerts::adapter::field;
use crate::alerts::format::{coordinate_cell, json_text, markdown_link, AngleFormat};
use crate::alerts::row::{Cell, DisplayRow, RawAlert};

pub(super) const COL_ALERT_IDENTIFIER: &str = "alert_identifier";
pub(super) const COL_COUNTERPART_IDENTIFIER: &str = "counterpart_identifier";
pub(super) const COL_RA: &str = "ra";
pub(super) const COL_DEC: &str = "dec";
pub(super) const COL_RANK: &str = "rank";
pub(super) const COL_COMMENTS: &str = "comments";

/// GraceDB superevent page for an LVC trigger.
pub(super) fn superevent_url(event_trig_num: &str) -> String {
    format!("{}/superevents/{}/view/", GRACE_DB_URL, event_trig_num)
}

/// Sexagesimal string from the payload, or converted from decimal degrees.
fn coordinate(alert: &RawAlert, sexagesimal: &str, degrees: &str, format: AngleFormat) -> Cell {
    match field(alert, sexagesimal) {
        Some(value) => Cell::from_json(value),
        None => coordinate_cell(field(alert, degrees), format),
    }
}

pub(super) fn flatten_alert(alert: &RawAlert) -> DisplayRow {
    let identifier = match (
        field(alert, "alert_identifier"),
        field(alert, "message.event_trig_num"),
    ) {
        (Some(id), Some(event)) => Cell::Text(markdown_link(
            &json_text(id),
            &superevent_url(&json_text(event)),
        )),
        (Some(id), None) => Cell::Text(json_text(id)),
        (None, _) => Cell::Null,
    };

    DisplayRow::new(alert.clone())
        .with(COL_ALERT_IDENTIFIER, identifier)
        .with(
            COL_COUNTERPART_IDENTIFIER,
            Cell::from_opt(field(alert, "extracted_fields.counterpart_identifier")),
        )
        .with(
            COL_RA,
            coordinate(alert, "right_ascension_sexagesimal", "right_ascension", AngleFormat::Hms),
        )
        .with(
            COL_DEC,
            coordinate(alert, "declination_sexagesimal", "declination", AngleFormat::Dms),
        )
        .with(COL_RANK, Cell::from_opt(field(alert, "message.rank")))
        .with(
            COL_COMMENTS,
            Cell::from_opt(field(alert, "extracted_fields.comment_warnings")),
        )
}
