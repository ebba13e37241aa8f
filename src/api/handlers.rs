//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::warn;

use super::AppState;
use super::types::{ComputeQuery, ErrorResponse, SummaryResponse, TurbineQuery};
use crate::project::ProjectDocument;
use crate::report::{TurbineYield, YieldReport};
use crate::runner::run_project;

fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message }))
}

/// Returns fleet totals and the engine configuration.
///
/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse::new(&state.config, &state.report))
}

/// Returns per-turbine results, optionally filtered by wake loss.
///
/// `GET /turbines` → 200 + `Vec<TurbineYield>` JSON
/// `GET /turbines?min_loss_pct=2&max_loss_pct=8` → filtered (inclusive)
/// `GET /turbines?min_loss_pct=8&max_loss_pct=2` → 400 + `ErrorResponse`
pub async fn get_turbines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TurbineQuery>,
) -> impl IntoResponse {
    let min = query.min_loss_pct.unwrap_or(f64::NEG_INFINITY);
    let max = query.max_loss_pct.unwrap_or(f64::INFINITY);

    if min > max {
        return Err(error(
            StatusCode::BAD_REQUEST,
            format!("`min_loss_pct` ({min}) must be <= `max_loss_pct` ({max})"),
        ));
    }

    let turbines: Vec<TurbineYield> = state
        .report
        .turbines
        .iter()
        .filter(|t| t.wake_loss_pct >= min && t.wake_loss_pct <= max)
        .cloned()
        .collect();

    Ok(Json(turbines))
}

/// Computes a posted project document with the server's configuration.
///
/// `POST /compute` → 200 + `YieldReport` JSON
/// `POST /compute` with an unusable project → 422 + `ErrorResponse`
pub async fn post_compute(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ComputeQuery>,
    Json(doc): Json<ProjectDocument>,
) -> Result<Json<YieldReport>, (StatusCode, Json<ErrorResponse>)> {
    let config = state.config.clone();
    let outcome =
        tokio::task::spawn_blocking(move || run_project(&doc, &config, query.assign_ground_areas))
            .await;

    match outcome {
        Ok(Ok(run)) => Ok(Json(run.report)),
        Ok(Err(e)) => {
            warn!(error = %e, "compute request rejected");
            Err(error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(e) => Err(error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("computation failed: {e}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::EngineConfig;
    use crate::demo::demo_project;

    fn make_test_state() -> Arc<AppState> {
        let turbines = [0.0, 2.5, 5.0, 7.5, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &loss)| TurbineYield {
                id: format!("t{i}"),
                name: format!("T{i}"),
                available: true,
                power_without_wake_kw: 1000.0,
                power_with_wake_kw: 1000.0 * (1.0 - loss / 100.0),
                wake_loss_pct: loss,
                annual_energy_mwh: 8.76 * 1000.0 * (1.0 - loss / 100.0),
            })
            .collect();
        Arc::new(AppState {
            config: EngineConfig::reference(),
            report: YieldReport {
                turbines,
                total_without_wake_kw: 5000.0,
                total_with_wake_kw: 4750.0,
                wake_loss_pct: 5.0,
                annual_energy_without_wake_mwh: 43_800.0,
                annual_energy_with_wake_mwh: 41_610.0,
                failed_turbines: 0,
            },
        })
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn summary_returns_200() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/summary")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json.get("config").is_some());
        assert_eq!(json["turbine_count"], 5);
        assert_eq!(json["wake_loss_pct"], 5.0);
    }

    #[tokio::test]
    async fn turbines_returns_all() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/turbines")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn turbines_loss_range_query() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/turbines?min_loss_pct=2&max_loss_pct=7.5")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let ids: Vec<&str> = json
            .as_array()
            .map(|a| a.iter().filter_map(|t| t["id"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn turbines_invalid_range_returns_400() {
        let app = router(make_test_state());

        let req = Request::builder()
            .uri("/turbines?min_loss_pct=9&max_loss_pct=1")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn compute_runs_posted_project() {
        let app = router(make_test_state());
        let payload = serde_json::to_vec(&demo_project(5)).unwrap();

        let req = Request::builder()
            .method("POST")
            .uri("/compute?assign_ground_areas=true")
            .header("content-type", "application/json")
            .body(Body::from(payload))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["turbines"].as_array().map(Vec::len), Some(12));
        assert!(json["total_with_wake_kw"].as_f64() < json["total_without_wake_kw"].as_f64());
    }

    #[tokio::test]
    async fn compute_without_wind_returns_422() {
        let app = router(make_test_state());
        let mut doc = demo_project(5);
        doc.masts.clear();
        let payload = serde_json::to_vec(&doc).unwrap();

        let req = Request::builder()
            .method("POST")
            .uri("/compute")
            .header("content-type", "application/json")
            .body(Body::from(payload))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().is_some_and(|e| e.contains("windrose")));
    }
}
