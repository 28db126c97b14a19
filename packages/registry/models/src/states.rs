//! German state (Bundesland) utilities.
//!
//! The registry assigns every unit to one of the 16 states, or to the
//! offshore exclusive economic zone for wind parks in the North and Baltic
//! seas. Query parameters naming a state are validated against this list.

/// Every state value that can appear in the registry's `state` column.
pub const STATES: &[&str] = &[
    "Baden-Württemberg",
    "Bayern",
    "Berlin",
    "Brandenburg",
    "Bremen",
    "Hamburg",
    "Hessen",
    "Mecklenburg-Vorpommern",
    "Niedersachsen",
    "Nordrhein-Westfalen",
    "Rheinland-Pfalz",
    "Saarland",
    "Sachsen",
    "Sachsen-Anhalt",
    "Schleswig-Holstein",
    "Thüringen",
    EXCLUSIVE_ECONOMIC_ZONE,
];

/// Pseudo-state used for offshore units outside any state's territory.
pub const EXCLUSIVE_ECONOMIC_ZONE: &str = "Ausschließliche Wirtschaftszone";

/// Display name of the country scope.
pub const COUNTRY_NAME: &str = "Deutschland";

/// Looks up the canonical spelling of a state name, ignoring case.
///
/// Returns `None` for unrecognized names.
#[must_use]
pub fn canonical_state(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    STATES.iter().copied().find(|s| s.to_lowercase() == lower)
}
