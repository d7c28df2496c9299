//! REST handlers for the attribution engine's HTTP surface.

use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use b2b_attribution_core::CombineWeights;
use b2b_attribution_engine::{
    AttributionFacade, ChannelInsightsResult, ModelInfo, Outcome, QueryFilter, ResultWriter,
    Storage,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Shared application state for REST handlers. Generic over the storage
/// and result-writer collaborators so the binary can wire in-memory
/// implementations while this crate stays collaborator-agnostic.
pub struct AppState<S: Storage, W: ResultWriter> {
    pub facade: Arc<AttributionFacade<S, W>>,
    pub start_time: Instant,
}

impl<S: Storage, W: ResultWriter> Clone for AppState<S, W> {
    fn clone(&self) -> Self {
        Self {
            facade: self.facade.clone(),
            start_time: self.start_time,
        }
    }
}

/// `{status, data, message}` envelope shared by every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: "ok".to_string(),
        }
    }

    fn cancelled() -> Self {
        Self {
            status: "cancelled",
            data: None,
            message: "request cancelled".to_string(),
        }
    }
}

/// Calendar-date filter shared by the three query operations. Dates are
/// inclusive: `date_from` resolves to midnight UTC, `date_to` to the last
/// instant of that day.
#[derive(Debug, Deserialize)]
pub struct AttributionQuery {
    pub account_ids: Option<Vec<String>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AttributionQuery {
    fn into_filter(self) -> QueryFilter {
        QueryFilter {
            account_ids: self.account_ids.map(|ids| ids.into_iter().collect::<HashSet<_>>()),
            from: self.date_from.map(|d| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap())),
            to: self
                .date_to
                .map(|d| Utc.from_utc_datetime(&d.and_hms_milli_opt(23, 59, 59, 999).unwrap())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    #[serde(flatten)]
    pub query: AttributionQuery,
    pub attribution_weights: Option<CombineWeights>,
}

/// `POST /attribution/b2b/calculate`
pub async fn calculate<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
    Json(req): Json<CalculateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = req.query.into_filter();
    let outcome = state
        .facade
        .calculate(filter, req.attribution_weights, CancellationToken::new())
        .await?;

    Ok(match outcome {
        Outcome::Completed(result) => Json(ApiResponse::ok(result)),
        Outcome::Cancelled => Json(ApiResponse::cancelled()),
    })
}

/// `POST /attribution/b2b/channel-insights`
pub async fn channel_insights<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
    Json(query): Json<AttributionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter();
    let outcome = state
        .facade
        .channel_insights(filter, CancellationToken::new())
        .await?;

    Ok(match outcome {
        Outcome::Completed(result) => Json(ApiResponse::ok(result)),
        Outcome::Cancelled => Json(ApiResponse::<ChannelInsightsResult>::cancelled()),
    })
}

/// `POST /attribution/b2b/alignment-report`
pub async fn alignment_report<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
    Json(query): Json<AttributionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter();
    let outcome = state
        .facade
        .alignment_report(filter, CancellationToken::new())
        .await?;

    Ok(match outcome {
        Outcome::Completed(result) => Json(ApiResponse::ok(result)),
        Outcome::Cancelled => {
            Json(ApiResponse::<b2b_attribution_engine::AlignmentReport>::cancelled())
        }
    })
}

/// `GET /attribution/b2b/touchpoint-types`
pub async fn touchpoint_types<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
) -> Json<ApiResponse<ModelInfo>> {
    Json(ApiResponse::ok(state.facade.model_introspection()))
}

/// `GET /attribution/b2b/model-info`
pub async fn model_info<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
) -> Json<ApiResponse<ModelInfo>> {
    Json(ApiResponse::ok(state.facade.model_introspection()))
}

#[derive(Debug, Deserialize)]
pub struct LegacyQuery {
    pub model_name: Option<String>,
    pub account_ids: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// `POST /attribution/calculate?model_name=...` — routes every requested
/// model name to the B2B calculate path, per the documented legacy
/// behavior (spec §6, DESIGN.md).
pub async fn legacy_calculate<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
    Query(query): Query<LegacyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::warn!(
        model_name = query.model_name.as_deref().unwrap_or("unspecified"),
        "legacy /attribution/calculate endpoint hit, routing to B2B attribution regardless of model_name"
    );

    let filter = QueryFilter {
        account_ids: query
            .account_ids
            .map(|ids| ids.split(',').map(|s| s.to_string()).collect()),
        from: query
            .date_from
            .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap())),
        to: query
            .date_to
            .map(|d| Utc.from_utc_datetime(&d.and_hms_milli_opt(23, 59, 59, 999).unwrap())),
    };

    let outcome = state
        .facade
        .calculate(filter, None, CancellationToken::new())
        .await?;

    Ok(match outcome {
        Outcome::Completed(result) => Json(ApiResponse::ok(result)),
        Outcome::Cancelled => Json(ApiResponse::cancelled()),
    })
}

/// `GET /health` — health check endpoint.
pub async fn health_check<S: Storage + 'static, W: ResultWriter + 'static>(
    State(state): State<AppState<S, W>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// `GET /ready` — readiness probe.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// `GET /live` — liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}
