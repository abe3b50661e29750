use axum::{
    Router,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use restaurant_recommender::{
    DatasetInfo, RecommendError, RecommendationApp, RecommenderConfig,
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::models::{CitiesResponse, RecommendationRequest, RecommendationResponse};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

const CORRELATION_ID_HEADER: &str = "x-correlation-id";

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

fn bad_gateway_error(message: &str) -> ApiError {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": message })))
}

/// Validation problems are the caller's fault, gateway failures are upstream,
/// everything else is ours.
fn error_response(error: &RecommendError) -> ApiError {
    let message = error.to_string();
    match error {
        RecommendError::Validation(_) => bad_request_error(&message),
        RecommendError::Gateway { .. } => bad_gateway_error(&message),
        RecommendError::MissingCredential
        | RecommendError::Dataset(_)
        | RecommendError::Config(_) => internal_error(&message),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub app: RecommendationApp,
}

/// Load the dataset and gateway described by `config` and build the router.
pub fn create_app(config: &RecommenderConfig) -> restaurant_recommender::Result<Router> {
    let app = RecommendationApp::from_config(config)?;
    Ok(build_router(AppState { app }))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/cities", get(get_cities))
        .route("/api/stats", get(get_stats))
        .route("/api/recommendations", post(get_recommendations))
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(correlation_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Runs each request in a span tagged with a fresh correlation id, which is
/// also echoed back as `x-correlation-id`.
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request
            .headers_mut()
            .insert(CORRELATION_ID_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Zomato AI Restaurant Recommender",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Filters restaurants by city, budget and diet, then asks an LLM for recommendations",
        "endpoints": {
            "GET /health": "Health check",
            "GET /api/cities": "Cities present in the dataset",
            "GET /api/stats": "Dataset overview",
            "POST /api/recommendations": "Recommend restaurants for {city, price, diet}"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Zomato AI Restaurant Recommender is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_cities(State(state): State<AppState>) -> Json<CitiesResponse> {
    Json(CitiesResponse {
        cities: state.app.get_available_cities(),
    })
}

async fn get_stats(State(state): State<AppState>) -> Json<DatasetInfo> {
    Json(state.app.get_dataset_info())
}

async fn get_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> ApiResult<RecommendationResponse> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected recommendation request body");
        bad_request_error(&rejection.body_text())
    })?;

    let price = match &request.price {
        Some(price) => price
            .amount()
            .ok_or_else(|| bad_request_error("Budget must be a whole number of rupees"))?,
        None => 0,
    };

    info!(city = %request.city, price, diet = %request.diet, "Recommendation request");

    let outcome = state
        .app
        .recommend(&request.city, price, &request.diet)
        .await
        .map_err(|e| {
            if e.is_validation() {
                warn!(error = %e, "Invalid recommendation request");
            } else {
                error!(error = %e, "Recommendation failed");
            }
            error_response(&e)
        })?;

    Ok(Json(RecommendationResponse::from(outcome)))
}
