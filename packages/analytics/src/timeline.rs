//! Cumulative capacity timelines.

use std::collections::BTreeMap;

use ee_status_analytics_models::{TimelinePoint, TimelineResult};
use ee_status_registry::Snapshot;
use ee_status_registry_models::{ScopeFilter, TimelineRow};

use crate::{AnalyticsError, describe_filter, qualify_county};

/// Running totals of installed capacity for the rows matching `filter`,
/// one point per distinct date in ascending order.
pub(crate) fn cumulative(rows: &[TimelineRow], filter: &ScopeFilter) -> Vec<TimelinePoint> {
    let mut per_date: BTreeMap<chrono::NaiveDate, [f64; 4]> = BTreeMap::new();

    for row in rows.iter().filter(|row| filter.matches(*row)) {
        let sums = per_date.entry(row.date).or_insert([0.0; 4]);
        sums[0] += row.pv_net_nominal_capacity;
        sums[1] += row.wind_net_nominal_capacity;
        sums[2] += row.biomass_net_nominal_capacity;
        sums[3] += row.hydro_net_nominal_capacity;
    }

    let mut running = [0.0; 4];
    per_date
        .into_iter()
        .map(|(date, sums)| {
            for (total, added) in running.iter_mut().zip(sums) {
                *total += added;
            }
            TimelinePoint {
                date,
                pv: running[0],
                wind: running[1],
                biomass: running[2],
                hydro: running[3],
            }
        })
        .collect()
}

/// Cumulative installed capacity per energy source for the area addressed
/// by `filter`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if the filter names an
/// unknown state or a county name shared by several states.
pub fn timeline(snapshot: &Snapshot, filter: &ScopeFilter) -> Result<TimelineResult, AnalyticsError> {
    let filter = qualify_county(snapshot.monthly_timeline(), filter.clone().validate()?)?;
    let points = cumulative(snapshot.monthly_timeline(), &filter);

    log::debug!("timeline: {} points for {filter:?}", points.len());

    let description = match (points.first(), points.last()) {
        (Some(first), Some(last)) => format!(
            "Cumulative capacity in {} from {} to {}",
            describe_filter(&filter),
            first.date,
            last.date
        ),
        _ => format!("No timeline data for {}", describe_filter(&filter)),
    };

    Ok(TimelineResult {
        points,
        description,
    })
}
