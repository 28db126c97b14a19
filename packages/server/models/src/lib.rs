#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the ee-status server.
//!
//! Engine results from `ee_status_analytics_models` are returned as-is;
//! this crate only holds the query-string shapes and the envelopes that
//! exist purely for HTTP.

use ee_status_analytics_models::SearchResult;
use ee_status_registry_models::ScopeFilter;
use serde::{Deserialize, Serialize};

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of `current_totals` rows loaded.
    pub municipalities: usize,
    /// Number of `monthly_timeline` rows loaded.
    pub timeline_rows: usize,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Query parameters for the totals endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsQueryParams {
    /// Official municipality key.
    pub municipality_key: Option<String>,
    /// Municipality name.
    pub municipality: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// State name.
    pub state: Option<String>,
    /// Numerator column, defaults to `total_net_nominal_capacity`.
    pub numerator: Option<String>,
    /// Denominator column, defaults to `population`.
    pub denominator: Option<String>,
    /// `input_order` (default) or `name`.
    pub tie_break: Option<String>,
}

impl TotalsQueryParams {
    /// The scope filter named by the query.
    #[must_use]
    pub fn filter(&self) -> ScopeFilter {
        ScopeFilter {
            municipality_key: self.municipality_key.clone(),
            municipality: self.municipality.clone(),
            county: self.county.clone(),
            state: self.state.clone(),
        }
    }
}

/// Query parameters for the rankings endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsQueryParams {
    /// County whose municipalities are ranked.
    pub county: Option<String>,
    /// State whose counties are ranked (or that qualifies `county`).
    pub state: Option<String>,
    /// Numerator column.
    pub numerator: Option<String>,
    /// Denominator column.
    pub denominator: Option<String>,
    /// `input_order` (default) or `name`.
    pub tie_break: Option<String>,
}

impl RankingsQueryParams {
    /// The scope filter named by the query.
    #[must_use]
    pub fn filter(&self) -> ScopeFilter {
        ScopeFilter {
            county: self.county.clone(),
            state: self.state.clone(),
            ..ScopeFilter::default()
        }
    }
}

/// Query parameters for the timeline endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQueryParams {
    /// Official municipality key.
    pub municipality_key: Option<String>,
    /// Municipality name.
    pub municipality: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// State name.
    pub state: Option<String>,
}

impl From<TimelineQueryParams> for ScopeFilter {
    fn from(params: TimelineQueryParams) -> Self {
        Self {
            municipality_key: params.municipality_key,
            municipality: params.municipality,
            county: params.county,
            state: params.state,
        }
    }
}

/// Query parameters for both search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQueryParams {
    /// Free-text query.
    #[serde(default)]
    pub q: String,
}

/// Response of `GET /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// The engine's search result.
    #[serde(flatten)]
    pub result: SearchResult,
    /// Totals URL of the single area the query resolved to.
    pub redirect: Option<String>,
}

impl From<SearchResult> for SearchResponse {
    fn from(result: SearchResult) -> Self {
        let redirect = result.outcome.target().map(totals_url);
        Self { result, redirect }
    }
}

/// Path of the totals endpoint for `filter`.
#[must_use]
pub fn totals_url(filter: &ScopeFilter) -> String {
    if filter.is_empty() {
        "/api/totals".to_string()
    } else {
        format!("/api/totals?{}", filter.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ee_status_analytics_models::SearchOutcome;

    #[test]
    fn totals_url_encodes_filter() {
        let filter = ScopeFilter {
            county: Some("Landkreis Fürth".to_string()),
            state: Some("Bayern".to_string()),
            ..ScopeFilter::default()
        };
        assert_eq!(
            totals_url(&filter),
            "/api/totals?county=Landkreis%20F%C3%BCrth&state=Bayern"
        );
        assert_eq!(totals_url(&ScopeFilter::default()), "/api/totals");
    }

    #[test]
    fn search_response_carries_redirect() {
        let target = ScopeFilter {
            municipality_key: Some("09001".to_string()),
            ..ScopeFilter::default()
        };
        let response = SearchResponse::from(SearchResult {
            query: "aburg".to_string(),
            outcome: SearchOutcome::Municipality {
                name: "Aburg".to_string(),
                target,
            },
            description: "Municipality Aburg".to_string(),
        });
        assert_eq!(
            response.redirect.as_deref(),
            Some("/api/totals?municipalityKey=09001")
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["query"], "aburg");
        assert_eq!(json["outcome"]["kind"], "municipality");
    }

    #[test]
    fn no_redirect_without_single_target() {
        let response = SearchResponse::from(SearchResult {
            query: "x".to_string(),
            outcome: SearchOutcome::NoResults,
            description: String::new(),
        });
        assert_eq!(response.redirect, None);
    }
}
