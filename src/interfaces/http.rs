//! HTTP API for the prediction service.
//!
//! Routes:
//! - `POST /predict` - multi-step forecast
//! - `GET /health` - liveness probe
//! - `GET /model` - loaded model description
//! - `GET /metrics` - prometheus text format (when enabled)

use crate::application::context::ModelInfo;
use crate::application::prediction_service::{
    PredictionRequest, PredictionResult, PredictionService,
};
use crate::domain::errors::{ErrorKind, ForecastError};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<PredictionService>,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    code: &'static str,
}

/// Error response carrying a status code and a machine-readable code
pub struct ApiError(ForecastError);

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match (&err, err.kind()) {
            (ForecastError::Timeout { .. }, _) => StatusCode::GATEWAY_TIMEOUT,
            (_, ErrorKind::Client) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Internal details stay in the logs
        let detail = match err.kind() {
            ErrorKind::Client => err.to_string(),
            ErrorKind::Internal => match &err {
                ForecastError::Timeout { .. } => err.to_string(),
                _ => "Prediction failed due to an internal error".to_string(),
            },
        };
        let body = ErrorBody {
            detail,
            code: err.code(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: ApiState, metrics_enabled: bool) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/model", get(model_info))
        .route("/predict", post(predict));
    if metrics_enabled {
        router = router.route("/metrics", get(metrics));
    }
    router.with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn model_info(State(state): State<ApiState>) -> Json<ModelInfo> {
    Json(state.service.context().info())
}

async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.service.metrics().render(),
    )
}

async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        state.service.metrics().inc_predictions("invalid_input");
        ForecastError::invalid_input(rejection.body_text())
    })?;

    let result = state
        .service
        .clone()
        .predict_async(request, state.request_timeout)
        .await?;
    Ok(Json(result))
}
