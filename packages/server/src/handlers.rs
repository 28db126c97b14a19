//! HTTP handler functions for the ee-status API.

use actix_web::{HttpResponse, http::header, web};
use ee_status_analytics::{AnalyticsError, parse_ratio, parse_tie_break};
use ee_status_analytics_models::{RankingsParams, SearchParams, TotalsParams};
use ee_status_registry_models::{STATES, ScopeFilter};
use ee_status_server_models::{
    ApiError, ApiHealth, RankingsQueryParams, SearchQueryParams, SearchResponse,
    TimelineQueryParams, TotalsQueryParams,
};

use crate::AppState;

fn error_response(e: &AnalyticsError) -> HttpResponse {
    match e {
        AnalyticsError::InvalidParameter { .. } => {
            log::warn!("Rejected request: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        AnalyticsError::EntityNotFound { .. } => {
            log::warn!("Entity not found: {e}");
            HttpResponse::NotFound().json(ApiError::new(e.to_string()))
        }
    }
}

fn search_response(state: &AppState, query: String) -> SearchResponse {
    ee_status_analytics::search(&state.snapshot, &SearchParams { query }).into()
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        municipalities: state.snapshot.current_totals().len(),
        timeline_rows: state.snapshot.monthly_timeline().len(),
    })
}

/// `GET /api/states`
///
/// Returns the state names accepted by the `state` filter.
pub async fn states() -> HttpResponse {
    HttpResponse::Ok().json(STATES)
}

/// `GET /api/totals`
///
/// Averages and ranks of the addressed entity at every level from its own
/// out to the country.
pub async fn totals(
    state: web::Data<AppState>,
    params: web::Query<TotalsQueryParams>,
) -> HttpResponse {
    let parsed = parse_ratio(params.numerator.as_deref(), params.denominator.as_deref())
        .and_then(|ratio| Ok((ratio, parse_tie_break(params.tie_break.as_deref())?)));
    let (ratio, tie_break) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    let params = TotalsParams {
        filter: params.filter(),
        ratio,
        tie_break,
    };

    match ee_status_analytics::totals(&state.snapshot, &params) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/rankings`
///
/// Ranks the municipalities of a county, the counties of a state, or the
/// states.
pub async fn rankings(
    state: web::Data<AppState>,
    params: web::Query<RankingsQueryParams>,
) -> HttpResponse {
    let parsed = parse_ratio(params.numerator.as_deref(), params.denominator.as_deref())
        .and_then(|ratio| Ok((ratio, parse_tie_break(params.tie_break.as_deref())?)));
    let (ratio, tie_break) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return error_response(&e),
    };

    let params = RankingsParams {
        filter: params.filter(),
        ratio,
        tie_break,
    };

    match ee_status_analytics::rankings(&state.snapshot, &params) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/timeline`
pub async fn timeline(
    state: web::Data<AppState>,
    params: web::Query<TimelineQueryParams>,
) -> HttpResponse {
    let filter = ScopeFilter::from(params.into_inner());

    match ee_status_analytics::timeline(&state.snapshot, &filter) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/search`
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    HttpResponse::Ok().json(search_response(&state, params.into_inner().q))
}

/// `GET /search`
///
/// Redirects to the totals of the area the query resolved to, or returns
/// the search result when there is no single area.
pub async fn search_redirect(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    let response = search_response(&state, params.into_inner().q);

    match &response.redirect {
        Some(location) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, location.as_str()))
            .finish(),
        None => HttpResponse::Ok().json(response),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use ee_status_registry::Snapshot;
    use ee_status_registry_models::ScopedTotal;
    use serde_json::Value;

    use super::header;
    use crate::{AppState, configure};

    fn row(key: &str, municipality: &str, county: &str, state: &str, capacity: f64) -> ScopedTotal {
        ScopedTotal {
            municipality_key: key.to_string(),
            municipality: municipality.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            postal_code: None,
            pv_net_nominal_capacity: Some(capacity / 2.0),
            wind_net_nominal_capacity: None,
            biomass_net_nominal_capacity: None,
            hydro_net_nominal_capacity: None,
            total_net_nominal_capacity: Some(capacity),
            storage_net_nominal_capacity: None,
            population: Some(10.0),
            area: Some(1.0),
        }
    }

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState {
            snapshot: Arc::new(Snapshot::new(
                vec![
                    row("09001", "Aburg", "Alpha", "Bayern", 100.0),
                    row("09002", "Adorf", "Alpha", "Bayern", 50.0),
                    row("09003", "Bstadt", "Beta", "Bayern", 20.0),
                    row("06001", "Gdorf", "Gamma", "Hessen", 80.0),
                ],
                Vec::new(),
            )),
        })
    }

    macro_rules! app {
        () => {
            test::init_service(App::new().app_data(state()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn health_reports_row_counts() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["municipalities"], 4);
        assert_eq!(body["timelineRows"], 0);
    }

    #[actix_web::test]
    async fn states_lists_all_states() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/states").to_request();
        let body: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 17);
        assert!(body.iter().any(|s| s == "Bayern"));
    }

    #[actix_web::test]
    async fn totals_for_municipality() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/totals?municipalityKey=09001")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["realmType"], "municipality");

        let summaries = body["summaries"].as_array().unwrap();
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[0]["average"], 10.0);
        assert_eq!(summaries[0]["rank"]["status"], "ranked");
        assert_eq!(summaries[0]["rank"]["position"], 1);
        assert_eq!(summaries[3]["rank"]["status"], "not_applicable");
    }

    #[actix_web::test]
    async fn totals_rejects_unknown_field() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/totals?numerator=sunshine")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("sunshine"));
    }

    #[actix_web::test]
    async fn totals_rejects_unknown_state() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/totals?state=Atlantis")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn totals_for_missing_entity_is_not_found() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/totals?county=Nowhere")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn rankings_of_state_rank_counties() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/rankings?state=Bayern&numerator=pv_net_nominal_capacity")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rankedLevel"], "county");

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "Alpha");
        assert_eq!(entries[0]["score"], 3.75);
        assert_eq!(entries[1]["name"], "Beta");
    }

    #[actix_web::test]
    async fn rankings_rejects_unknown_tie_break() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/rankings?tieBreak=coin_flip")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn timeline_is_empty_without_rows() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/timeline?state=Hessen")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["points"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn api_search_returns_redirect_url() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/search?q=Alpha")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"]["kind"], "county");
        assert_eq!(body["redirect"], "/api/totals?county=Alpha&state=Bayern");
    }

    #[actix_web::test]
    async fn search_redirects_to_single_area() {
        let app = app!();
        let req = test::TestRequest::get().uri("/search?q=gdorf").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/api/totals?municipalityKey=06001"
        );
    }

    #[actix_web::test]
    async fn search_without_single_area_returns_json() {
        let app = app!();
        let req = test::TestRequest::get().uri("/search?q=dorf").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["outcome"]["kind"], "ambiguous");
        assert_eq!(body["redirect"], Value::Null);
    }
}
