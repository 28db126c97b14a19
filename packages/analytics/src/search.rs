//! Free-text search over municipality, county, and state names.

use ee_status_analytics_models::{SearchMatch, SearchOutcome, SearchParams, SearchResult};
use ee_status_registry::Snapshot;
use ee_status_registry_models::{ScopeFilter, ScopeLevel, Scoped, ScopedTotal};

fn matches_query(row: &ScopedTotal, needle: &str) -> bool {
    let hit = |value: &str| value.to_lowercase().contains(needle);

    hit(&row.municipality)
        || hit(&row.municipality_key)
        || row.postal_codes().any(hit)
        || hit(&row.county)
        || hit(&row.state)
}

/// All rows share the same value at `level` (and every level above it).
fn share_area(rows: &[&ScopedTotal], level: ScopeLevel) -> bool {
    rows.split_first().is_some_and(|(first, rest)| {
        rest.iter().all(|row| {
            level
                .outward()
                .into_iter()
                .all(|l| row.name_at(l) == first.name_at(l))
        })
    })
}

fn area_size(snapshot: &Snapshot, filter: &ScopeFilter) -> usize {
    snapshot
        .current_totals()
        .iter()
        .filter(|row| filter.matches(*row))
        .count()
}

fn classify(snapshot: &Snapshot, needle: &str, rows: &[&ScopedTotal]) -> SearchOutcome {
    let Some(first) = rows.first() else {
        return SearchOutcome::NoResults;
    };

    if rows.len() == 1 {
        return SearchOutcome::Municipality {
            name: first.municipality.clone(),
            target: ScopeFilter::addressing(*first, ScopeLevel::Municipality),
        };
    }

    if share_area(rows, ScopeLevel::State) && first.state.to_lowercase().contains(needle) {
        let target = ScopeFilter::addressing(*first, ScopeLevel::State);
        if area_size(snapshot, &target) == rows.len() {
            return SearchOutcome::State {
                name: first.state.clone(),
                target,
            };
        }
    }

    if share_area(rows, ScopeLevel::County) {
        let target = ScopeFilter::addressing(*first, ScopeLevel::County);
        if area_size(snapshot, &target) == rows.len() {
            return SearchOutcome::County {
                name: first.county.clone(),
                target,
            };
        }
    }

    let mut matches: Vec<SearchMatch> = rows
        .iter()
        .map(|row| SearchMatch {
            municipality_key: row.municipality_key.clone(),
            municipality: row.municipality.clone(),
            county: row.county.clone(),
            state: row.state.clone(),
            target: ScopeFilter::addressing(*row, ScopeLevel::Municipality),
        })
        .collect();
    matches.sort_by(|a, b| {
        a.municipality
            .cmp(&b.municipality)
            .then_with(|| a.municipality_key.cmp(&b.municipality_key))
    });

    SearchOutcome::Ambiguous { matches }
}

/// Resolves a free-text query to a municipality, county, or state, or
/// lists the candidates when the matches do not form one area.
///
/// Matching is a case-insensitive substring test against the
/// municipality name and key, the postal codes, the county, and the state.
#[must_use]
pub fn search(snapshot: &Snapshot, params: &SearchParams) -> SearchResult {
    let query = params.query.trim().to_string();
    let needle = query.to_lowercase();

    let rows: Vec<&ScopedTotal> = if needle.is_empty() {
        Vec::new()
    } else {
        snapshot
            .current_totals()
            .iter()
            .filter(|row| matches_query(row, &needle))
            .collect()
    };

    log::debug!("search: '{query}' matched {} municipalities", rows.len());

    let outcome = classify(snapshot, &needle, &rows);
    let description = match &outcome {
        SearchOutcome::NoResults => format!("No results for '{query}'"),
        SearchOutcome::Municipality { name, .. } => format!("Municipality {name}"),
        SearchOutcome::County { name, .. } => format!("County {name}"),
        SearchOutcome::State { name, .. } => format!("State {name}"),
        SearchOutcome::Ambiguous { matches } => {
            format!("{} municipalities match '{query}'", matches.len())
        }
    };

    SearchResult {
        query,
        outcome,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, municipality: &str, county: &str, state: &str, postal: &str) -> ScopedTotal {
        ScopedTotal {
            municipality_key: key.to_string(),
            municipality: municipality.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            postal_code: Some(postal.to_string()),
            pv_net_nominal_capacity: None,
            wind_net_nominal_capacity: None,
            biomass_net_nominal_capacity: None,
            hydro_net_nominal_capacity: None,
            total_net_nominal_capacity: Some(1.0),
            storage_net_nominal_capacity: None,
            population: Some(1.0),
            area: None,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                row("09001", "Aburg", "Alpha", "Bayern", "80001"),
                row("09002", "Adorf", "Alpha", "Bayern", "80002"),
                row("09003", "Astadt", "Alpha", "Bayern", "80003"),
                row("09004", "Bdorf", "Beta", "Bayern", "81000"),
                row("06001", "Gdorf", "Gamma", "Hessen", "60001 60002"),
                row("06002", "Gstadt", "Gamma", "Hessen", "60003"),
            ],
            Vec::new(),
        )
    }

    fn find(query: &str) -> SearchOutcome {
        search(
            &snapshot(),
            &SearchParams {
                query: query.to_string(),
            },
        )
        .outcome
    }

    #[test]
    fn empty_query_has_no_results() {
        assert_eq!(find("   "), SearchOutcome::NoResults);
        assert_eq!(find("nowhere"), SearchOutcome::NoResults);
    }

    #[test]
    fn single_match_is_municipality() {
        match find("aburg") {
            SearchOutcome::Municipality { name, target } => {
                assert_eq!(name, "Aburg");
                assert_eq!(target.municipality_key.as_deref(), Some("09001"));
            }
            other => panic!("expected municipality, got {other:?}"),
        }
    }

    #[test]
    fn matches_postal_codes() {
        match find("60002") {
            SearchOutcome::Municipality { name, .. } => assert_eq!(name, "Gdorf"),
            other => panic!("expected municipality, got {other:?}"),
        }
    }

    #[test]
    fn whole_county_is_county() {
        match find("Alpha") {
            SearchOutcome::County { name, target } => {
                assert_eq!(name, "Alpha");
                assert_eq!(target.county.as_deref(), Some("Alpha"));
                assert_eq!(target.state.as_deref(), Some("Bayern"));
            }
            other => panic!("expected county, got {other:?}"),
        }
    }

    #[test]
    fn whole_state_is_state() {
        match find("hessen") {
            SearchOutcome::State { name, target } => {
                assert_eq!(name, "Hessen");
                assert_eq!(target.state.as_deref(), Some("Hessen"));
                assert_eq!(target.county, None);
            }
            other => panic!("expected state, got {other:?}"),
        }
    }

    #[test]
    fn whole_county_without_state_name_is_county() {
        // Covers all of Hessen, but "gamma" is not part of the state name.
        assert!(matches!(find("gamma"), SearchOutcome::County { .. }));
    }

    #[test]
    fn partial_matches_are_ambiguous_and_sorted() {
        match find("dorf") {
            SearchOutcome::Ambiguous { matches } => {
                let names: Vec<&str> = matches.iter().map(|m| m.municipality.as_str()).collect();
                assert_eq!(names, ["Adorf", "Bdorf", "Gdorf"]);
                assert_eq!(matches[2].target.municipality_key.as_deref(), Some("06001"));
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn trims_query_and_describes_outcome() {
        let result = search(
            &snapshot(),
            &SearchParams {
                query: "  Alpha ".to_string(),
            },
        );
        assert_eq!(result.query, "Alpha");
        assert_eq!(result.description, "County Alpha");
    }
}
