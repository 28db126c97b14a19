#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scope ranking and ratio engine over MaStR capacity snapshots.
//!
//! Each public function answers one question the dashboard asks: how an
//! area compares to its siblings ([`ranking`]), how capacity grew over time
//! ([`timeline`]), and which area a free-text query refers to
//! ([`search`]). All functions are pure reads of a [`Snapshot`].
//!
//! [`Snapshot`]: ee_status_registry::Snapshot

pub mod ranking;
pub mod search;
pub mod timeline;

use ee_status_analytics_models::{Ratio, TieBreak};
use ee_status_registry_models::{
    COUNTRY_NAME, InvalidStateError, RatioField, ScopeFilter, ScopeLevel, Scoped,
};
use thiserror::Error;

pub use ranking::{rank_within_scope, rankings, ratio_and_rank, scope_average, totals};
pub use search::search;
pub use timeline::timeline;

/// Errors that can occur during analytics operations.
///
/// Only invalid inputs produce errors; conditions inside the data (empty
/// denominators, unranked entities, empty search results) are reported in
/// the results.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A parameter failed validation.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what went wrong.
        message: String,
    },

    /// The filter did not match any municipality.
    #[error("{description}")]
    EntityNotFound {
        /// Description of the missing entity.
        description: String,
    },
}

impl From<InvalidStateError> for AnalyticsError {
    fn from(e: InvalidStateError) -> Self {
        Self::InvalidParameter {
            message: e.to_string(),
        }
    }
}

fn parse_field(name: &str, role: &str) -> Result<RatioField, AnalyticsError> {
    name.trim()
        .parse()
        .map_err(|_| AnalyticsError::InvalidParameter {
            message: format!(
                "unknown {role} '{name}', expected one of: {}",
                RatioField::all()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
}

/// Parses ratio field names arriving from query parameters.
///
/// Missing or blank names fall back to the fields of [`Ratio::default`].
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if a name is not a
/// [`RatioField`].
pub fn parse_ratio(
    numerator: Option<&str>,
    denominator: Option<&str>,
) -> Result<Ratio, AnalyticsError> {
    let default = Ratio::default();
    let field = |value: Option<&str>, role: &str, fallback: RatioField| {
        value
            .filter(|v| !v.trim().is_empty())
            .map_or(Ok(fallback), |v| parse_field(v, role))
    };

    Ok(Ratio::new(
        field(numerator, "numerator", default.numerator)?,
        field(denominator, "denominator", default.denominator)?,
    ))
}

/// Parses a tie-break name, defaulting to [`TieBreak::InputOrder`].
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] for unknown names.
pub fn parse_tie_break(value: Option<&str>) -> Result<TieBreak, AnalyticsError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(TieBreak::default()),
        Some(v) => v.parse().map_err(|_| AnalyticsError::InvalidParameter {
            message: format!("unknown tie break '{v}', expected input_order or name"),
        }),
    }
}

/// Pins a county given without a state to the one state it lies in, so the
/// filter addresses a single county.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if counties of that name
/// exist in more than one state.
fn qualify_county<'a, R: Scoped + 'a>(
    rows: impl IntoIterator<Item = &'a R>,
    filter: ScopeFilter,
) -> Result<ScopeFilter, AnalyticsError> {
    let Some(county) = filter.county.as_deref().filter(|_| filter.state.is_none()) else {
        return Ok(filter);
    };

    let mut states: Vec<&str> = Vec::new();
    for state in rows
        .into_iter()
        .filter(|row| filter.matches(*row))
        .filter_map(|row| row.name_at(ScopeLevel::State))
    {
        if !states.contains(&state) {
            states.push(state);
        }
    }

    match states.as_slice() {
        [] => Ok(filter),
        [state] => Ok(ScopeFilter {
            state: Some((*state).to_string()),
            ..filter
        }),
        _ => Err(AnalyticsError::InvalidParameter {
            message: format!(
                "county '{county}' exists in several states ({}), add state",
                states.join(", ")
            ),
        }),
    }
}

/// Describes the area a filter addresses, for result descriptions.
#[allow(clippy::option_if_let_else)]
fn describe_filter(filter: &ScopeFilter) -> String {
    if let Some(municipality) = &filter.municipality {
        format!("municipality {municipality}")
    } else if let Some(key) = &filter.municipality_key {
        format!("municipality key {key}")
    } else if let Some(county) = &filter.county {
        if let Some(state) = &filter.state {
            format!("county {county}, {state}")
        } else {
            format!("county {county}")
        }
    } else if let Some(state) = &filter.state {
        format!("state {state}")
    } else {
        COUNTRY_NAME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ratio_defaults_missing_fields() {
        assert_eq!(parse_ratio(None, None).unwrap(), Ratio::default());
        assert_eq!(
            parse_ratio(Some("pv_net_nominal_capacity"), Some("  ")).unwrap(),
            Ratio::new(RatioField::PvNetNominalCapacity, RatioField::Population)
        );
    }

    #[test]
    fn parse_ratio_rejects_unknown_field() {
        let err = parse_ratio(Some("nnc_per_capita"), None).unwrap_err();
        match err {
            AnalyticsError::InvalidParameter { message } => {
                assert!(message.contains("numerator"));
                assert!(message.contains("total_net_nominal_capacity"));
            }
            AnalyticsError::EntityNotFound { .. } => panic!("wrong error"),
        }
    }

    #[test]
    fn parse_tie_break_values() {
        assert_eq!(parse_tie_break(None).unwrap(), TieBreak::InputOrder);
        assert_eq!(parse_tie_break(Some("name")).unwrap(), TieBreak::Name);
        assert!(parse_tie_break(Some("random")).is_err());
    }

    #[test]
    fn describes_filters() {
        assert_eq!(describe_filter(&ScopeFilter::default()), COUNTRY_NAME);
        let filter = ScopeFilter {
            county: Some("Alpha".to_string()),
            state: Some("Bayern".to_string()),
            ..ScopeFilter::default()
        };
        assert_eq!(describe_filter(&filter), "county Alpha, Bayern");
    }
}
