#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parameter and result types for the scope ranking and ratio engine.
//!
//! Every operation of `ee_status_analytics` takes one of the `*Params`
//! types and returns the matching `*Result`. All types serialize to
//! camelCase JSON so they can be handed to API clients unchanged.

use chrono::NaiveDate;
use ee_status_registry_models::{RatioField, ScopeFilter, ScopeLevel};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A ratio of two `current_totals` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratio {
    /// Column summed on top.
    pub numerator: RatioField,
    /// Column summed below; rows where it is null or not positive are
    /// excluded from rankings.
    pub denominator: RatioField,
}

impl Ratio {
    /// Creates a ratio of `numerator` over `denominator`.
    #[must_use]
    pub const fn new(numerator: RatioField, denominator: RatioField) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Unit of the ratio, e.g. `"kW/inhabitants"`.
    #[must_use]
    pub fn unit(self) -> String {
        format!("{}/{}", self.numerator.unit(), self.denominator.unit())
    }
}

impl Default for Ratio {
    /// Installed capacity per inhabitant.
    fn default() -> Self {
        Self::new(RatioField::TotalNetNominalCapacity, RatioField::Population)
    }
}

/// How groups with identical scores are ordered.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which groups first appear in the snapshot.
    #[default]
    InputOrder,
    /// Order tied groups by name, ascending.
    Name,
}

/// Position of an entity in a ranking, or why it has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "position")]
pub enum Rank {
    /// 1-based position in the ranking.
    Ranked(u32),
    /// The entity was ranked against its own scope (or a narrower one).
    NotApplicable,
    /// The entity's group did not survive the denominator filter.
    NotRanked,
}

/// Outcome of ranking one entity within an enclosing scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRank {
    /// The entity's position.
    pub rank: Rank,
    /// Number of groups in the ranking.
    pub total: usize,
    /// Score of the top-ranked group (0 for an empty ranking).
    pub max_score: f64,
}

impl ScopeRank {
    /// The result for a ranking that was not computed.
    #[must_use]
    pub const fn not_applicable() -> Self {
        Self {
            rank: Rank::NotApplicable,
            total: 0,
            max_score: 0.0,
        }
    }
}

/// Average and rank of an entity at one level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    /// Level this summary describes.
    pub scope: ScopeLevel,
    /// Name of the entity's area at this level (e.g. the county name).
    pub scope_name: String,
    /// Label for display, e.g. `"County Alpha"`.
    pub display_name: String,
    /// Ratio of the summed columns over the whole area.
    pub average: f64,
    /// Rank of the area among its siblings in the next enclosing level.
    pub rank: Rank,
    /// Number of siblings ranked.
    pub total: usize,
    /// Best score among the siblings.
    pub max_score: f64,
    /// Unit of `average` and `max_score`.
    pub unit: String,
}

/// Parameters for the totals overview of one entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsParams {
    /// Which entity to describe; empty means the whole country.
    pub filter: ScopeFilter,
    /// Ratio to average and rank by.
    pub ratio: Ratio,
    /// Tie-break for the rankings.
    pub tie_break: TieBreak,
}

/// Totals overview of one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsResult {
    /// Level of the described entity.
    pub realm_type: ScopeLevel,
    /// One summary per level, from `realm_type` out to the country.
    pub summaries: Vec<ScopeSummary>,
    /// Largest `average` among `summaries`.
    pub max_average: f64,
    /// Cumulative capacity timeline of the entity.
    pub timeline: Vec<TimelinePoint>,
}

/// Parameters for a ranking table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsParams {
    /// `county` ranks its municipalities, `state` its counties, and an
    /// empty filter ranks the states.
    pub filter: ScopeFilter,
    /// Ratio to rank by.
    pub ratio: Ratio,
    /// Tie-break for equal scores.
    pub tie_break: TieBreak,
}

/// One line of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based position.
    pub rank: u32,
    /// Name of the ranked area.
    pub name: String,
    /// Sum of the numerator column over the area.
    pub numerator_sum: f64,
    /// Sum of the denominator column over the area.
    pub denominator_sum: f64,
    /// `numerator_sum / denominator_sum`.
    pub score: f64,
}

/// A ranking table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingsResult {
    /// Level bounding the competitor pool.
    pub realm_type: ScopeLevel,
    /// Level of the ranked areas.
    pub ranked_level: ScopeLevel,
    /// Name of the bounding area.
    pub scope_name: String,
    /// Unit of the scores.
    pub unit: String,
    /// Ranked areas, best first.
    pub entries: Vec<RankingEntry>,
    /// Description of the ranking.
    pub description: String,
}

/// Cumulative installed capacity per energy source at a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// First day of the month.
    pub date: NaiveDate,
    /// Cumulative PV capacity (kW).
    pub pv: f64,
    /// Cumulative wind capacity (kW).
    pub wind: f64,
    /// Cumulative biomass capacity (kW).
    pub biomass: f64,
    /// Cumulative hydro capacity (kW).
    pub hydro: f64,
}

/// Result of a timeline query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResult {
    /// Points in ascending date order.
    pub points: Vec<TimelinePoint>,
    /// Description of the covered area.
    pub description: String,
}

/// Parameters for free-text search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Text to look for in municipality names and keys, postal codes,
    /// county names, and state names.
    pub query: String,
}

/// A municipality listed in an ambiguous search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// Official municipality key.
    pub municipality_key: String,
    /// Municipality name.
    pub municipality: String,
    /// County name.
    pub county: String,
    /// State name.
    pub state: String,
    /// Filter addressing this municipality.
    pub target: ScopeFilter,
}

/// Classification of a search result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SearchOutcome {
    /// Nothing matched.
    NoResults,
    /// Exactly one municipality matched.
    Municipality {
        /// Municipality name.
        name: String,
        /// Filter addressing it.
        target: ScopeFilter,
    },
    /// The matches are exactly the municipalities of one county.
    County {
        /// County name.
        name: String,
        /// Filter addressing it.
        target: ScopeFilter,
    },
    /// The matches are exactly the municipalities of one state.
    State {
        /// State name.
        name: String,
        /// Filter addressing it.
        target: ScopeFilter,
    },
    /// Several municipalities matched without forming a county or state.
    Ambiguous {
        /// The matches, sorted by municipality name and key.
        matches: Vec<SearchMatch>,
    },
}

impl SearchOutcome {
    /// The filter to redirect to, if the outcome names a single area.
    #[must_use]
    pub const fn target(&self) -> Option<&ScopeFilter> {
        match self {
            Self::Municipality { target, .. }
            | Self::County { target, .. }
            | Self::State { target, .. } => Some(target),
            Self::NoResults | Self::Ambiguous { .. } => None,
        }
    }
}

/// Result of free-text search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The trimmed query.
    pub query: String,
    /// Classification of the matches.
    pub outcome: SearchOutcome,
    /// Description of the outcome.
    pub description: String,
}
