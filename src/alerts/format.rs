//! Display formatting shared by the broker adapters
//!
//! Pure helpers: fixed-precision numbers, sexagesimal angles, MJD dates and
//! markdown links for the result tables.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;

use super::row::Cell;

/// Number of decimal places used for magnitudes, probabilities and scores.
pub const DISPLAY_PRECISION: usize = 4;

/// Angle notation for [`deg_to_sexagesimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleFormat {
    /// Hours:minutes:seconds, used for right ascension.
    Hms,
    /// Signed degrees:arcminutes:arcseconds, used for declination.
    Dms,
}

/// Render a number with four decimal places.
///
/// Non-numeric values are passed through untouched, nulls stay null.
pub fn truncate_number(value: &Value) -> Cell {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => Cell::Text(format!("{:.*}", DISPLAY_PRECISION, f)),
            None => Cell::Text(n.to_string()),
        },
        Value::Null => Cell::Null,
        other => Cell::from_json(other),
    }
}

/// Convert decimal degrees to sexagesimal notation.
///
/// `60` as [`AngleFormat::Hms`] gives `04:00:0.000`, `120` as
/// [`AngleFormat::Dms`] gives `+120:00:0.000`. Seconds are not zero padded.
pub fn deg_to_sexagesimal(degrees: f64, format: AngleFormat) -> String {
    const MS_PER_UNIT: f64 = 3_600_000.0;

    match format {
        AngleFormat::Hms => {
            let hours = degrees.rem_euclid(360.0) / 15.0;
            let millis = (hours * MS_PER_UNIT).round() as i64;
            let (h, m, s) = split_millis(millis);
            format!("{:02}:{:02}:{:.3}", h % 24, m, s)
        }
        AngleFormat::Dms => {
            let sign = if degrees < 0.0 { '-' } else { '+' };
            let millis = (degrees.abs() * MS_PER_UNIT).round() as i64;
            let (d, m, s) = split_millis(millis);
            format!("{}{:02}:{:02}:{:.3}", sign, d, m, s)
        }
    }
}

fn split_millis(millis: i64) -> (i64, i64, f64) {
    let whole = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let seconds = (millis % 60_000) as f64 / 1000.0;
    (whole, minutes, seconds)
}

/// Sexagesimal cell for an optional coordinate; absent or non-numeric → null.
pub fn coordinate_cell(value: Option<&Value>, format: AngleFormat) -> Cell {
    match value.and_then(Value::as_f64) {
        Some(deg) => Cell::Text(deg_to_sexagesimal(deg, format)),
        None => Cell::Null,
    }
}

fn mjd_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1858, 11, 17)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert a Modified Julian Date to a UTC timestamp, rounded to the second.
pub fn mjd_to_datetime(mjd: f64) -> Option<NaiveDateTime> {
    if !mjd.is_finite() {
        return None;
    }
    let seconds = (mjd * 86_400.0).round();
    if seconds.abs() > 1.0e12 {
        return None;
    }
    let delta = TimeDelta::try_seconds(seconds as i64)?;
    mjd_epoch().checked_add_signed(delta)
}

/// Convert a calendar date (midnight UTC) to a Modified Julian Date.
pub fn date_to_mjd(date: NaiveDate) -> f64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    (midnight - mjd_epoch()).num_seconds() as f64 / 86_400.0
}

/// `[text](url)` for markdown-presented columns.
pub fn markdown_link(text: &str, url: &str) -> String {
    format!("[{}]({})", text, url)
}

/// Render a JSON scalar as link text without surrounding quotes.
pub fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
