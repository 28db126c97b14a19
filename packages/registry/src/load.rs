//! CSV decoding for the two snapshot tables.
//!
//! Headers must match the column names of the loader's tables. Empty
//! numeric cells become `None` in `current_totals` and `0.0` in
//! `monthly_timeline`. Rows without any identity column are skipped.

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ee_status_registry_models::{RatioField, ScopedTotal, TimelineRow};
use serde::Deserialize;

use crate::RegistryError;
use crate::paths::{CURRENT_TOTALS_FILE, MONTHLY_TIMELINE_FILE};

/// Parses a `date` cell. Accepts `YYYY-MM-DD` and full timestamps
/// (`T` or space separator, optional fractional seconds and UTC offset),
/// keeping only the calendar date.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

/// Reads the `current_totals` table.
///
/// # Errors
///
/// Returns [`RegistryError::Csv`] if a row cannot be decoded, e.g. a
/// non-numeric capacity value or a missing identity column, and
/// [`RegistryError::Parse`] if a measure is `NaN` or infinite.
pub fn read_current_totals<R: Read>(reader: R) -> Result<Vec<ScopedTotal>, RegistryError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    while reader.read_record(&mut record)? {
        let row: ScopedTotal = record.deserialize(Some(&headers))?;
        if row.municipality.is_empty() && row.county.is_empty() && row.state.is_empty() {
            log::debug!("Skipping current_totals row without identity columns");
            continue;
        }

        if let Some(field) = RatioField::all()
            .into_iter()
            .find(|field| row.measure(*field).is_some_and(|v| !v.is_finite()))
        {
            return Err(RegistryError::Parse {
                file: CURRENT_TOTALS_FILE.to_string(),
                line: line_of(&record),
                message: format!("{field} must be a finite number"),
            });
        }

        rows.push(row);
    }

    Ok(rows)
}

#[derive(Deserialize)]
struct RawTimelineRow {
    date: String,
    municipality_key: String,
    municipality: String,
    county: String,
    state: String,
    #[serde(default)]
    pv_net_nominal_capacity: Option<f64>,
    #[serde(default)]
    wind_net_nominal_capacity: Option<f64>,
    #[serde(default)]
    biomass_net_nominal_capacity: Option<f64>,
    #[serde(default)]
    hydro_net_nominal_capacity: Option<f64>,
}

/// Reads the `monthly_timeline` table.
///
/// # Errors
///
/// Returns [`RegistryError::Csv`] if a row cannot be decoded and
/// [`RegistryError::Parse`] if a `date` cell is not a date or a capacity
/// is `NaN` or infinite.
pub fn read_monthly_timeline<R: Read>(reader: R) -> Result<Vec<TimelineRow>, RegistryError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    while reader.read_record(&mut record)? {
        let raw: RawTimelineRow = record.deserialize(Some(&headers))?;

        if raw.municipality.is_empty() && raw.county.is_empty() && raw.state.is_empty() {
            log::debug!("Skipping monthly_timeline row without identity columns");
            continue;
        }

        let parse_error = |message: String| RegistryError::Parse {
            file: MONTHLY_TIMELINE_FILE.to_string(),
            line: line_of(&record),
            message,
        };

        let date = parse_date(&raw.date).ok_or_else(|| {
            parse_error(format!("invalid date '{}', expected YYYY-MM-DD", raw.date))
        })?;

        let capacities = [
            raw.pv_net_nominal_capacity,
            raw.wind_net_nominal_capacity,
            raw.biomass_net_nominal_capacity,
            raw.hydro_net_nominal_capacity,
        ]
        .map(|value| value.unwrap_or(0.0));
        if capacities.iter().any(|v| !v.is_finite()) {
            return Err(parse_error("capacity must be a finite number".to_string()));
        }

        rows.push(TimelineRow {
            date,
            municipality_key: raw.municipality_key,
            municipality: raw.municipality,
            county: raw.county,
            state: raw.state,
            pv_net_nominal_capacity: capacities[0],
            wind_net_nominal_capacity: capacities[1],
            biomass_net_nominal_capacity: capacities[2],
            hydro_net_nominal_capacity: capacities[3],
        });
    }

    Ok(rows)
}
