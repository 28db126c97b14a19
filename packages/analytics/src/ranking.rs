//! Per-scope averages and rankings of ratio scores.
//!
//! An area's score is the ratio of two summed `current_totals` columns over
//! all municipalities in the area. Rankings compare sibling areas inside an
//! enclosing scope, e.g. the counties of one state.

use std::collections::BTreeMap;

use ee_status_analytics_models::{
    Rank, RankingEntry, RankingsParams, RankingsResult, Ratio, ScopeRank, ScopeSummary,
    TieBreak, TotalsParams, TotalsResult,
};
use ee_status_registry::Snapshot;
use ee_status_registry_models::{COUNTRY_NAME, ScopeFilter, ScopeLevel, Scoped, ScopedTotal};

use crate::{AnalyticsError, describe_filter, qualify_county, timeline};

/// Identifies an area at some level: its names from that level up to the
/// state. Levels below the area's own level are `None`, so for example two
/// counties called "Neustadt" in different states stay separate.
type AreaKey<'a> = [Option<&'a str>; 3];

const KEYED_LEVELS: [ScopeLevel; 3] = [
    ScopeLevel::Municipality,
    ScopeLevel::County,
    ScopeLevel::State,
];

fn area_key(row: &impl Scoped, level: ScopeLevel) -> AreaKey<'_> {
    KEYED_LEVELS.map(|l| if l >= level { row.name_at(l) } else { None })
}

/// Returns `true` if `row` lies in the same area as `entity` at `level`.
fn same_area(row: &impl Scoped, entity: &impl Scoped, level: ScopeLevel) -> bool {
    area_key(row, level) == area_key(entity, level)
}

fn scope_name(entity: &impl Scoped, level: ScopeLevel) -> String {
    entity.name_at(level).unwrap_or(COUNTRY_NAME).to_string()
}

fn display_name(entity: &impl Scoped, level: ScopeLevel) -> String {
    match level {
        ScopeLevel::Country => COUNTRY_NAME.to_string(),
        _ => format!("{} {}", level.label(), scope_name(entity, level)),
    }
}

/// Accumulated sums for one area of a ranking.
#[derive(Debug)]
struct ScoredArea<'a> {
    key: AreaKey<'a>,
    name: &'a str,
    numerator: f64,
    denominator: f64,
    score: f64,
}

/// Groups the rows accepted by `in_pool` into areas at `level`, scores
/// them, and sorts them best first.
///
/// Rows whose denominator is null or not positive are skipped. Groups are
/// collected in order of first appearance, so a stable sort on the score
/// alone yields [`TieBreak::InputOrder`].
fn rank_areas<'a>(
    rows: &'a [ScopedTotal],
    ratio: Ratio,
    level: ScopeLevel,
    tie_break: TieBreak,
    in_pool: impl Fn(&ScopedTotal) -> bool,
) -> Vec<ScoredArea<'a>> {
    let mut index: BTreeMap<AreaKey<'a>, usize> = BTreeMap::new();
    let mut areas: Vec<ScoredArea<'a>> = Vec::new();

    for row in rows.iter().filter(|&row| in_pool(row)) {
        let Some(denominator) = row.measure(ratio.denominator).filter(|d| *d > 0.0) else {
            continue;
        };
        let numerator = row.measure(ratio.numerator).unwrap_or(0.0);

        let key = area_key(row, level);
        let idx = *index.entry(key).or_insert_with(|| {
            areas.push(ScoredArea {
                key,
                name: row.name_at(level).unwrap_or(COUNTRY_NAME),
                numerator: 0.0,
                denominator: 0.0,
                score: 0.0,
            });
            areas.len() - 1
        });

        let area = &mut areas[idx];
        area.numerator += numerator;
        area.denominator += denominator;
    }

    for area in &mut areas {
        area.score = if area.denominator > 0.0 {
            area.numerator / area.denominator
        } else {
            0.0
        };
    }

    areas.sort_by(|a, b| {
        let by_score = b.score.total_cmp(&a.score);
        match tie_break {
            TieBreak::InputOrder => by_score,
            TieBreak::Name => by_score.then_with(|| a.name.cmp(b.name)),
        }
    });

    areas
}

fn position(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Ratio of the summed columns over every row in `entity`'s area at
/// `scope` (the whole snapshot for [`ScopeLevel::Country`]).
///
/// Null cells count as zero. Returns `0.0` when the denominator sums to
/// zero.
#[must_use]
pub fn scope_average(
    snapshot: &Snapshot,
    ratio: Ratio,
    scope: ScopeLevel,
    entity: &impl Scoped,
) -> f64 {
    let (numerator, denominator) = snapshot
        .current_totals()
        .iter()
        .filter(|row| same_area(*row, entity, scope))
        .fold((0.0, 0.0), |(num, den), row| {
            (
                num + row.measure(ratio.numerator).unwrap_or(0.0),
                den + row.measure(ratio.denominator).unwrap_or(0.0),
            )
        });

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Ranks `entity`'s area at `realm_type` among all areas of that level
/// inside `entity`'s area at `enclosing_scope`.
///
/// Returns [`Rank::NotApplicable`] without computing anything when
/// `realm_type` is not strictly narrower than `enclosing_scope`, and
/// [`Rank::NotRanked`] when the entity's area was dropped by the
/// denominator filter.
#[must_use]
pub fn rank_within_scope(
    snapshot: &Snapshot,
    ratio: Ratio,
    realm_type: ScopeLevel,
    enclosing_scope: ScopeLevel,
    entity: &impl Scoped,
    tie_break: TieBreak,
) -> ScopeRank {
    if realm_type >= enclosing_scope {
        return ScopeRank::not_applicable();
    }

    let areas = rank_areas(
        snapshot.current_totals(),
        ratio,
        realm_type,
        tie_break,
        |row| same_area(row, entity, enclosing_scope),
    );

    let own_key = area_key(entity, realm_type);
    let rank = areas
        .iter()
        .position(|area| area.key == own_key)
        .map_or(Rank::NotRanked, |idx| Rank::Ranked(position(idx)));

    ScopeRank {
        rank,
        total: areas.len(),
        max_score: areas.first().map_or(0.0, |area| area.score),
    }
}

/// Summarizes `entity` at `realm_type` and every enclosing level up to the
/// country: the level's average and the rank of the entity's area among
/// its siblings in the next enclosing level.
#[must_use]
pub fn ratio_and_rank(
    snapshot: &Snapshot,
    ratio: Ratio,
    realm_type: ScopeLevel,
    entity: &impl Scoped,
    tie_break: TieBreak,
) -> Vec<ScopeSummary> {
    let unit = ratio.unit();

    realm_type
        .outward()
        .into_iter()
        .map(|level| {
            let rank = level.parent().map_or_else(ScopeRank::not_applicable, |parent| {
                rank_within_scope(snapshot, ratio, level, parent, entity, tie_break)
            });

            ScopeSummary {
                scope: level,
                scope_name: scope_name(entity, level),
                display_name: display_name(entity, level),
                average: scope_average(snapshot, ratio, level, entity),
                rank: rank.rank,
                total: rank.total,
                max_score: rank.max_score,
                unit: unit.clone(),
            }
        })
        .collect()
}

/// Builds the totals overview for the entity addressed by the filter.
///
/// The first snapshot row matching the filter stands in for the entity.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if the filter names an
/// unknown state or a county name shared by several states, and
/// [`AnalyticsError::EntityNotFound`] if no row matches.
pub fn totals(snapshot: &Snapshot, params: &TotalsParams) -> Result<TotalsResult, AnalyticsError> {
    let filter = qualify_county(snapshot.current_totals(), params.filter.clone().validate()?)?;
    let realm_type = filter.realm_type();

    log::debug!(
        "totals: realm_type={realm_type} ratio={}/{}",
        params.ratio.numerator,
        params.ratio.denominator
    );

    let entity = snapshot
        .current_totals()
        .iter()
        .find(|row| filter.matches(*row))
        .ok_or_else(|| AnalyticsError::EntityNotFound {
            description: format!("No data for {}", describe_filter(&filter)),
        })?;

    let summaries = ratio_and_rank(snapshot, params.ratio, realm_type, entity, params.tie_break);
    let max_average = summaries
        .iter()
        .map(|summary| summary.average)
        .fold(0.0, f64::max);

    Ok(TotalsResult {
        realm_type,
        summaries,
        max_average,
        timeline: timeline::cumulative(snapshot.monthly_timeline(), &filter),
    })
}

/// Builds a ranking table: the municipalities of a county, the counties of
/// a state, or the states of the country, depending on which filter fields
/// are set.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if the filter names an
/// unknown state or a county name shared by several states.
pub fn rankings(
    snapshot: &Snapshot,
    params: &RankingsParams,
) -> Result<RankingsResult, AnalyticsError> {
    let filter = qualify_county(snapshot.current_totals(), params.filter.clone().validate()?)?;

    let (realm_type, ranked_level, scope_name) = match (&filter.county, &filter.state) {
        (Some(county), _) => (ScopeLevel::County, ScopeLevel::Municipality, county.clone()),
        (None, Some(state)) => (ScopeLevel::State, ScopeLevel::County, state.clone()),
        (None, None) => (ScopeLevel::Country, ScopeLevel::State, COUNTRY_NAME.to_string()),
    };

    let pool = ScopeFilter {
        county: filter.county.clone(),
        state: filter.state.clone(),
        ..ScopeFilter::default()
    };

    log::debug!("rankings: {ranked_level} within {realm_type} {scope_name}");

    let areas = rank_areas(
        snapshot.current_totals(),
        params.ratio,
        ranked_level,
        params.tie_break,
        |row| pool.matches(row),
    );

    let entries: Vec<RankingEntry> = areas
        .into_iter()
        .enumerate()
        .map(|(idx, area)| RankingEntry {
            rank: position(idx),
            name: area.name.to_string(),
            numerator_sum: area.numerator,
            denominator_sum: area.denominator,
            score: area.score,
        })
        .collect();

    let description = format!(
        "{} {ranked_level} areas in {} ranked by {} per {}",
        entries.len(),
        describe_filter(&pool),
        params.ratio.numerator,
        params.ratio.denominator
    );

    Ok(RankingsResult {
        realm_type,
        ranked_level,
        scope_name,
        unit: params.ratio.unit(),
        entries,
        description,
    })
}
