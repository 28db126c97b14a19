#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row types and scope vocabulary for MaStR capacity snapshots.
//!
//! A snapshot consists of two tables produced by an external loader:
//! `current_totals` (one [`ScopedTotal`] per municipality) and
//! `monthly_timeline` (capacity added per municipality per month, see
//! [`TimelineRow`]). Both are addressed through the administrative
//! hierarchy municipality → county → state → country ([`ScopeLevel`]).

pub mod states;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub use states::{COUNTRY_NAME, STATES};

/// Administrative nesting level, ordered from most to least specific.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScopeLevel {
    /// A single municipality (Gemeinde).
    Municipality,
    /// A county (Landkreis or kreisfreie Stadt).
    County,
    /// A state (Bundesland).
    State,
    /// The whole country.
    Country,
}

impl ScopeLevel {
    /// Returns the next enclosing level, or `None` for [`Self::Country`].
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Municipality => Some(Self::County),
            Self::County => Some(Self::State),
            Self::State => Some(Self::Country),
            Self::Country => None,
        }
    }

    /// Human-readable label for this level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Municipality => "Municipality",
            Self::County => "County",
            Self::State => "State",
            Self::Country => "Country",
        }
    }

    /// Returns this level and every enclosing level up to and including
    /// [`Self::Country`], most specific first.
    #[must_use]
    pub fn outward(self) -> Vec<Self> {
        Self::iter().filter(|level| *level >= self).collect()
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Municipality, Self::County, Self::State, Self::Country]
    }
}

/// A numeric column of `current_totals` that may serve as numerator or
/// denominator of a ratio.
///
/// Only these columns may be aggregated; names arriving from query
/// parameters are parsed into this enum before any computation runs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RatioField {
    /// Installed solar (PV) capacity in kW.
    PvNetNominalCapacity,
    /// Installed wind capacity in kW.
    WindNetNominalCapacity,
    /// Installed biomass capacity in kW.
    BiomassNetNominalCapacity,
    /// Installed hydro capacity in kW.
    HydroNetNominalCapacity,
    /// Sum of all generation capacity in kW.
    TotalNetNominalCapacity,
    /// Installed battery storage capacity in kW.
    StorageNetNominalCapacity,
    /// Number of inhabitants.
    Population,
    /// Land area in km².
    Area,
}

impl RatioField {
    /// Unit of the column's values.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::PvNetNominalCapacity
            | Self::WindNetNominalCapacity
            | Self::BiomassNetNominalCapacity
            | Self::HydroNetNominalCapacity
            | Self::TotalNetNominalCapacity
            | Self::StorageNetNominalCapacity => "kW",
            Self::Population => "inhabitants",
            Self::Area => "km²",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Anything that sits at a position in the administrative hierarchy.
pub trait Scoped {
    /// Official municipality key (Amtlicher Gemeindeschlüssel).
    fn municipality_key(&self) -> &str;

    /// Name of the enclosing area at `level`.
    ///
    /// Returns `None` for [`ScopeLevel::Country`], which has a single
    /// implicit member.
    fn name_at(&self, level: ScopeLevel) -> Option<&str>;
}

/// One row of the `current_totals` table: cumulative installed capacity
/// and context figures for a single municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedTotal {
    /// Official municipality key.
    pub municipality_key: String,
    /// Municipality name.
    pub municipality: String,
    /// County name.
    pub county: String,
    /// State name.
    pub state: String,
    /// Postal code(s); several codes are separated by spaces or commas.
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Installed PV capacity (kW).
    #[serde(default)]
    pub pv_net_nominal_capacity: Option<f64>,
    /// Installed wind capacity (kW).
    #[serde(default)]
    pub wind_net_nominal_capacity: Option<f64>,
    /// Installed biomass capacity (kW).
    #[serde(default)]
    pub biomass_net_nominal_capacity: Option<f64>,
    /// Installed hydro capacity (kW).
    #[serde(default)]
    pub hydro_net_nominal_capacity: Option<f64>,
    /// Installed generation capacity over all sources (kW).
    #[serde(default)]
    pub total_net_nominal_capacity: Option<f64>,
    /// Installed storage capacity (kW).
    #[serde(default)]
    pub storage_net_nominal_capacity: Option<f64>,
    /// Number of inhabitants.
    #[serde(default)]
    pub population: Option<f64>,
    /// Land area (km²).
    #[serde(default)]
    pub area: Option<f64>,
}

impl ScopedTotal {
    /// Reads the value of `field` from this row.
    #[must_use]
    pub const fn measure(&self, field: RatioField) -> Option<f64> {
        match field {
            RatioField::PvNetNominalCapacity => self.pv_net_nominal_capacity,
            RatioField::WindNetNominalCapacity => self.wind_net_nominal_capacity,
            RatioField::BiomassNetNominalCapacity => self.biomass_net_nominal_capacity,
            RatioField::HydroNetNominalCapacity => self.hydro_net_nominal_capacity,
            RatioField::TotalNetNominalCapacity => self.total_net_nominal_capacity,
            RatioField::StorageNetNominalCapacity => self.storage_net_nominal_capacity,
            RatioField::Population => self.population,
            RatioField::Area => self.area,
        }
    }

    /// Iterates over the individual postal codes of this municipality.
    pub fn postal_codes(&self) -> impl Iterator<Item = &str> {
        self.postal_code
            .as_deref()
            .unwrap_or_default()
            .split([',', ' ', ';'])
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

impl Scoped for ScopedTotal {
    fn municipality_key(&self) -> &str {
        &self.municipality_key
    }

    fn name_at(&self, level: ScopeLevel) -> Option<&str> {
        match level {
            ScopeLevel::Municipality => Some(&self.municipality),
            ScopeLevel::County => Some(&self.county),
            ScopeLevel::State => Some(&self.state),
            ScopeLevel::Country => None,
        }
    }
}

/// One row of the `monthly_timeline` table: capacity commissioned in a
/// municipality during the month starting at `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// First day of the month.
    pub date: NaiveDate,
    /// Official municipality key.
    pub municipality_key: String,
    /// Municipality name.
    pub municipality: String,
    /// County name.
    pub county: String,
    /// State name.
    pub state: String,
    /// PV capacity added (kW).
    pub pv_net_nominal_capacity: f64,
    /// Wind capacity added (kW).
    pub wind_net_nominal_capacity: f64,
    /// Biomass capacity added (kW).
    pub biomass_net_nominal_capacity: f64,
    /// Hydro capacity added (kW).
    pub hydro_net_nominal_capacity: f64,
}

impl Scoped for TimelineRow {
    fn municipality_key(&self) -> &str {
        &self.municipality_key
    }

    fn name_at(&self, level: ScopeLevel) -> Option<&str> {
        match level {
            ScopeLevel::Municipality => Some(&self.municipality),
            ScopeLevel::County => Some(&self.county),
            ScopeLevel::State => Some(&self.state),
            ScopeLevel::Country => None,
        }
    }
}

/// Equality filter over the identity columns of either table.
///
/// Blank values are treated as absent. Use [`ScopeFilter::validate`] on
/// anything that arrived from outside the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeFilter {
    /// Official municipality key.
    pub municipality_key: Option<String>,
    /// Municipality name.
    pub municipality: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// State name; must be one of [`STATES`].
    pub state: Option<String>,
}

impl ScopeFilter {
    /// Creates a filter addressing the area that `row` belongs to at
    /// `level`.
    ///
    /// Municipalities are addressed by key, counties by county and state,
    /// states by name. The country level yields an empty filter.
    #[must_use]
    pub fn addressing(row: &impl Scoped, level: ScopeLevel) -> Self {
        let name = |level| row.name_at(level).map(ToString::to_string);
        match level {
            ScopeLevel::Municipality => Self {
                municipality_key: Some(row.municipality_key().to_string()),
                ..Self::default()
            },
            ScopeLevel::County => Self {
                county: name(ScopeLevel::County),
                state: name(ScopeLevel::State),
                ..Self::default()
            },
            ScopeLevel::State => Self {
                state: name(ScopeLevel::State),
                ..Self::default()
            },
            ScopeLevel::Country => Self::default(),
        }
    }

    /// Trims all values, drops blank ones, and checks the state against
    /// [`STATES`] (case-insensitively, normalizing to the canonical
    /// spelling).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateError`] if a non-blank state is not a known
    /// German state.
    pub fn validate(self) -> Result<Self, InvalidStateError> {
        let clean = |value: Option<String>| -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let state = match clean(self.state) {
            Some(state) => Some(
                states::canonical_state(&state)
                    .ok_or(InvalidStateError { value: state })?
                    .to_string(),
            ),
            None => None,
        };

        Ok(Self {
            municipality_key: clean(self.municipality_key),
            municipality: clean(self.municipality),
            county: clean(self.county),
            state,
        })
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.municipality_key.is_none()
            && self.municipality.is_none()
            && self.county.is_none()
            && self.state.is_none()
    }

    /// The most specific level this filter addresses.
    #[must_use]
    pub const fn realm_type(&self) -> ScopeLevel {
        if self.municipality.is_some() || self.municipality_key.is_some() {
            ScopeLevel::Municipality
        } else if self.county.is_some() {
            ScopeLevel::County
        } else if self.state.is_some() {
            ScopeLevel::State
        } else {
            ScopeLevel::Country
        }
    }

    /// Returns `true` if every set field equals the corresponding column
    /// of `row`.
    #[must_use]
    pub fn matches(&self, row: &impl Scoped) -> bool {
        let eq = |wanted: Option<&String>, actual: Option<&str>| -> bool {
            wanted.is_none_or(|w| Some(w.as_str()) == actual)
        };

        eq(
            self.municipality_key.as_ref(),
            Some(row.municipality_key()),
        ) && eq(
            self.municipality.as_ref(),
            row.name_at(ScopeLevel::Municipality),
        ) && eq(self.county.as_ref(), row.name_at(ScopeLevel::County))
            && eq(self.state.as_ref(), row.name_at(ScopeLevel::State))
    }

    /// Encodes the set fields as a URL query string (without the leading
    /// `?`), using the same camelCase names the API accepts.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        [
            ("municipalityKey", &self.municipality_key),
            ("municipality", &self.municipality),
            ("county", &self.county),
            ("state", &self.state),
        ]
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(|v| format!("{key}={}", encode_query_value(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}

/// Percent-encodes a query value, leaving unreserved ASCII as-is.
fn encode_query_value(value: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Error returned when a filter names a state that is not in [`STATES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStateError {
    /// The state value that was provided.
    pub value: String,
}

impl std::fmt::Display for InvalidStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown state '{}'", self.value)
    }
}

impl std::error::Error for InvalidStateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    fn row(key: &str, municipality: &str, county: &str, state: &str) -> ScopedTotal {
        ScopedTotal {
            municipality_key: key.to_string(),
            municipality: municipality.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            postal_code: None,
            pv_net_nominal_capacity: None,
            wind_net_nominal_capacity: None,
            biomass_net_nominal_capacity: None,
            hydro_net_nominal_capacity: None,
            total_net_nominal_capacity: Some(12.5),
            storage_net_nominal_capacity: None,
            population: Some(100.0),
            area: None,
        }
    }

    #[test]
    fn scope_levels_are_ordered_by_containment() {
        assert!(ScopeLevel::Municipality < ScopeLevel::County);
        assert!(ScopeLevel::County < ScopeLevel::State);
        assert!(ScopeLevel::State < ScopeLevel::Country);
    }

    #[test]
    fn outward_walks_to_country() {
        assert_eq!(
            ScopeLevel::County.outward(),
            vec![ScopeLevel::County, ScopeLevel::State, ScopeLevel::Country]
        );
        assert_eq!(ScopeLevel::Country.outward(), vec![ScopeLevel::Country]);
        assert_eq!(ScopeLevel::Municipality.outward().len(), 4);
    }

    #[test]
    fn parent_chain() {
        assert_eq!(ScopeLevel::Municipality.parent(), Some(ScopeLevel::County));
        assert_eq!(ScopeLevel::State.parent(), Some(ScopeLevel::Country));
        assert_eq!(ScopeLevel::Country.parent(), None);
    }

    #[test]
    fn ratio_field_parses_snake_case() {
        assert_eq!(
            RatioField::from_str("total_net_nominal_capacity"),
            Ok(RatioField::TotalNetNominalCapacity)
        );
        assert_eq!(RatioField::from_str("population"), Ok(RatioField::Population));
        assert!(RatioField::from_str("population; DROP TABLE").is_err());
        assert_eq!(RatioField::Area.to_string(), "area");
    }

    #[test]
    fn ratio_field_reads_measure() {
        let r = row("1", "A", "B", "Bayern");
        assert_eq!(r.measure(RatioField::TotalNetNominalCapacity), Some(12.5));
        assert_eq!(r.measure(RatioField::Population), Some(100.0));
        assert_eq!(r.measure(RatioField::Area), None);
    }

    #[test]
    fn postal_codes_split_on_separators() {
        let mut r = row("1", "A", "B", "Bayern");
        r.postal_code = Some("80331, 80333 80335".to_string());
        assert_eq!(r.postal_codes().collect::<Vec<_>>(), ["80331", "80333", "80335"]);

        r.postal_code = None;
        assert_eq!(r.postal_codes().count(), 0);
    }

    #[test]
    fn realm_type_follows_most_specific_field() {
        let mut filter = ScopeFilter::default();
        assert_eq!(filter.realm_type(), ScopeLevel::Country);
        filter.state = Some("Bayern".to_string());
        assert_eq!(filter.realm_type(), ScopeLevel::State);
        filter.county = Some("Alpha".to_string());
        assert_eq!(filter.realm_type(), ScopeLevel::County);
        filter.municipality_key = Some("091620000000".to_string());
        assert_eq!(filter.realm_type(), ScopeLevel::Municipality);
    }

    #[test]
    fn validate_drops_blank_and_canonicalizes_state() {
        let filter = ScopeFilter {
            municipality_key: Some("   ".to_string()),
            municipality: Some(" Alpha Town ".to_string()),
            county: None,
            state: Some("bayern".to_string()),
        }
        .validate()
        .unwrap();

        assert_eq!(filter.municipality_key, None);
        assert_eq!(filter.municipality.as_deref(), Some("Alpha Town"));
        assert_eq!(filter.state.as_deref(), Some("Bayern"));
    }

    #[test]
    fn validate_rejects_unknown_state() {
        let err = ScopeFilter {
            state: Some("Texas".to_string()),
            ..ScopeFilter::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.value, "Texas");
    }

    #[test]
    fn filter_matches_on_all_set_fields() {
        let r = row("1", "Alpha Town", "Alpha", "Bayern");
        let filter = ScopeFilter {
            county: Some("Alpha".to_string()),
            state: Some("Bayern".to_string()),
            ..ScopeFilter::default()
        };
        assert!(filter.matches(&r));
        assert!(ScopeFilter::default().matches(&r));

        let other_state = ScopeFilter {
            county: Some("Alpha".to_string()),
            state: Some("Hessen".to_string()),
            ..ScopeFilter::default()
        };
        assert!(!other_state.matches(&r));
    }

    #[test]
    fn addressing_builds_filter_per_level() {
        let r = row("0916", "Alpha Town", "Alpha", "Bayern");

        let municipality = ScopeFilter::addressing(&r, ScopeLevel::Municipality);
        assert_eq!(municipality.municipality_key.as_deref(), Some("0916"));
        assert_eq!(municipality.realm_type(), ScopeLevel::Municipality);

        let county = ScopeFilter::addressing(&r, ScopeLevel::County);
        assert_eq!(county.county.as_deref(), Some("Alpha"));
        assert_eq!(county.state.as_deref(), Some("Bayern"));
        assert_eq!(county.realm_type(), ScopeLevel::County);

        assert!(ScopeFilter::addressing(&r, ScopeLevel::Country).is_empty());
    }

    #[test]
    fn query_string_encodes_values() {
        let filter = ScopeFilter {
            county: Some("Landkreis München".to_string()),
            state: Some("Bayern".to_string()),
            ..ScopeFilter::default()
        };
        assert_eq!(
            filter.to_query_string(),
            "county=Landkreis%20M%C3%BCnchen&state=Bayern"
        );
        assert_eq!(ScopeFilter::default().to_query_string(), "");
    }

    #[test]
    fn filter_deserializes_camel_case() {
        let filter: ScopeFilter =
            serde_json::from_str(r#"{"municipalityKey":"0916","state":"Bayern"}"#).unwrap();
        assert_eq!(filter.municipality_key.as_deref(), Some("0916"));
        assert_eq!(filter.state.as_deref(), Some("Bayern"));
        assert_eq!(filter.county, None);
    }
}
