use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use pricecast::application::context::ForecastContext;
use pricecast::application::prediction_service::PredictionService;
use pricecast::domain::errors::ForecastError;
use pricecast::domain::metadata::ModelMetadata;
use pricecast::domain::ports::ForecastModel;
use pricecast::domain::scaler::MinMaxScaler;
use pricecast::infrastructure::observability::Metrics;
use pricecast::interfaces::http::{ApiState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct MidpointModel;

impl ForecastModel for MidpointModel {
    fn look_back(&self) -> usize {
        3
    }

    fn infer(&self, _window: &[f64]) -> Result<f64, ForecastError> {
        Ok(0.5)
    }

    fn name(&self) -> &str {
        "midpoint"
    }

    fn version(&self) -> &str {
        "test"
    }
}

struct BrokenModel;

impl ForecastModel for BrokenModel {
    fn look_back(&self) -> usize {
        3
    }

    fn infer(&self, _window: &[f64]) -> Result<f64, ForecastError> {
        Err(ForecastError::inference("tensor backend unavailable"))
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn version(&self) -> &str {
        "test"
    }
}

struct SlowModel;

impl ForecastModel for SlowModel {
    fn look_back(&self) -> usize {
        3
    }

    fn infer(&self, _window: &[f64]) -> Result<f64, ForecastError> {
        std::thread::sleep(Duration::from_millis(200));
        Ok(0.5)
    }

    fn name(&self) -> &str {
        "slow"
    }

    fn version(&self) -> &str {
        "test"
    }
}

fn app_with(model: Arc<dyn ForecastModel>, request_timeout: Option<Duration>) -> Router {
    let scaler = MinMaxScaler::fit(&[100.0, 200.0]).unwrap();
    let mut metadata = ModelMetadata::new(3).with_metric("RMSE", 4.2);
    metadata.stock_symbol = Some("AAPL".to_string());
    let context = ForecastContext::new(model, scaler, metadata).unwrap();
    let service = PredictionService::new(Arc::new(context), Metrics::new().unwrap())
        .with_max_future_steps(Some(100));

    router(
        ApiState {
            service: Arc::new(service),
            request_timeout,
        },
        true,
    )
}

fn app() -> Router {
    app_with(Arc::new(MidpointModel), Some(Duration::from_secs(5)))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = send(app, Method::POST, "/predict", Some(body.to_string())).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, bytes) = send(app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_predict_success() {
    let (status, body) = post_json(
        app(),
        json!({"historical_prices": [100.0, 150.0, 200.0], "future_steps": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    for p in predictions {
        assert!((p.as_f64().unwrap() - 150.0).abs() < 1e-9);
    }
    assert!(body["processing_time"].as_f64().unwrap() >= 0.0);
    assert_eq!(body["model_metrics"], json!({"RMSE": 4.2}));
}

#[tokio::test]
async fn test_predict_defaults_to_one_step() {
    let (status, body) = post_json(app(), json!({"historical_prices": [110, 120, 130, 140]})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_insufficient_history_is_client_error() {
    let (status, body) = post_json(app(), json!({"historical_prices": [100.0, 150.0]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "insufficient_history");
    assert!(body["detail"].as_str().unwrap().contains('3'));
}

#[tokio::test]
async fn test_invalid_future_steps_is_client_error() {
    for steps in [0, -3, 101] {
        let (status, body) = post_json(
            app(),
            json!({"historical_prices": [100.0, 150.0, 200.0], "future_steps": steps}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_input");
    }
}

#[tokio::test]
async fn test_malformed_payload_is_invalid_input() {
    let (status, body) = post_json(app(), json!({"historical_prices": ["a", "b", "c"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");

    let (status, body) = post_json(app(), json!({"future_steps": 2})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn test_model_failure_is_generic_server_error() {
    let app = app_with(Arc::new(BrokenModel), None);
    let (status, body) = post_json(app, json!({"historical_prices": [100.0, 150.0, 200.0]})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal_error");
    assert!(!body["detail"].as_str().unwrap().contains("tensor backend"));
}

#[tokio::test]
async fn test_slow_prediction_times_out() {
    let app = app_with(Arc::new(SlowModel), Some(Duration::from_millis(50)));
    let (status, body) = post_json(
        app,
        json!({"historical_prices": [100.0, 150.0, 200.0], "future_steps": 5}),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "timeout");
}

#[tokio::test]
async fn test_timed_out_request_counts_only_as_timeout() {
    let app = app_with(Arc::new(SlowModel), Some(Duration::from_millis(50)));
    let (status, _) = post_json(
        app.clone(),
        json!({"historical_prices": [100.0, 150.0, 200.0], "future_steps": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);

    // The blocking run stops after its current step
    tokio::time::sleep(Duration::from_millis(500)).await;

    let (_, bytes) = send(app, Method::GET, "/metrics", None).await;
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("pricecast_predictions_total{outcome=\"timeout\"} 1"));
    assert!(!text.contains("outcome=\"success\""));
    assert!(text.contains("pricecast_prediction_latency_seconds_count 0"));
}

#[tokio::test]
async fn test_model_endpoint_describes_loaded_model() {
    let (status, bytes) = send(app(), Method::GET, "/model", None).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["look_back"], 3);
    assert_eq!(body["stock_symbol"], "AAPL");
    assert_eq!(body["model_name"], "midpoint");
}

#[tokio::test]
async fn test_metrics_endpoint_counts_outcomes() {
    let app = app();
    post_json(app.clone(), json!({"historical_prices": [100.0, 150.0, 200.0]})).await;
    post_json(app.clone(), json!({"historical_prices": [100.0]})).await;

    let (status, bytes) = send(app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("pricecast_predictions_total{outcome=\"success\"} 1"));
    assert!(text.contains("pricecast_predictions_total{outcome=\"insufficient_history\"} 1"));
    assert!(text.contains("pricecast_model_look_back 3"));
}
