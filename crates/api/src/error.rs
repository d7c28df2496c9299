//! Maps the engine's error taxonomy onto HTTP status codes, per the
//! propagation policy in spec §7: validation errors become 400,
//! data-fetch and internal failures become 500. Writer failures never
//! reach here — the facade swallows and logs them.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use b2b_attribution_core::AttributionError;
use serde::Serialize;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

pub struct ApiError(AttributionError);

impl From<AttributionError> for ApiError {
    fn from(err: AttributionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AttributionError::Validation(_) => StatusCode::BAD_REQUEST,
            AttributionError::DataFetch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AttributionError::Writer(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AttributionError::Cancelled => StatusCode::OK,
            AttributionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed with internal error");
        }

        let body = ErrorBody {
            status: "error",
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
