use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, Request},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    classifier::RiskPredictor,
    config::Config,
    error::ReportError,
    generation::MistralClient,
    models::{ResponsePayload, SymptomInput},
    pipeline::ReportPipeline,
};

const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
}

impl AppState {
    pub fn new(pipeline: ReportPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Load the classifier, wire the generation client and build the router.
///
/// Fails if the classifier artifact cannot be loaded.
pub fn create_app(config: &Config) -> anyhow::Result<Router> {
    let predictor = RiskPredictor::load(&config.model_path)?;
    let generator = MistralClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.generation.clone(),
    );
    info!(
        model = %generator.settings().model,
        "Generation API configured at {}", config.api_url
    );

    let pipeline = ReportPipeline::new(predictor, Arc::new(generator));
    Ok(build_router(
        AppState::new(pipeline),
        &config.allowed_origins,
    ))
}

pub fn build_router(app_state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/heart-risk", post(heart_risk))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(app_state)
}

/// Explicit origin allow-list with credentials. Credentials rule out the `*`
/// wildcard, so methods and headers are mirrored from the request instead.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Tag each request with a correlation ID, echoed back in the response.
async fn correlation_id_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Heart Risk Assessment API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/heart-risk": "Predict heart risk and generate an explanatory report",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn heart_risk(
    State(state): State<AppState>,
    payload: Result<Json<SymptomInput>, JsonRejection>,
) -> Result<Json<ResponsePayload>, ReportError> {
    let Json(input) = payload.map_err(|rejection| {
        warn!("Rejected heart risk request body: {}", rejection.body_text());
        ReportError::InvalidInput(rejection.body_text())
    })?;

    match state.pipeline.run(&input).await {
        Ok(payload) => Ok(Json(payload)),
        Err(e) => {
            error!("Heart risk assessment failed: {}", e);
            Err(e)
        }
    }
}
