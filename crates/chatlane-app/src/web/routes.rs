use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use chatlane_llm_api::OpenRouterClient;

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<OpenRouterClient>,
}

impl AppState {
    pub fn new(client: OpenRouterClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Create router with the relay route
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/chat",
            post(relay_chat).options(preflight).fallback(method_not_allowed),
        )
        .layer(cors)
        .with_state(state)
}

/// POST /api/chat - forward the body upstream with the server-held key
async fn relay_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let mut payload: Value = serde_json::from_slice(&body)?;
    let Some(fields) = payload.as_object_mut() else {
        return Err(AppError::BadRequest("request body must be a JSON object".into()));
    };
    fields
        .entry("model")
        .or_insert_with(|| json!(state.client.config().model));

    let referer = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    let (status, upstream) = state
        .client
        .forward(&payload, referer)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    log::info!("Relayed chat request, upstream status {}", status);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(upstream)).into_response())
}

/// OPTIONS /api/chat
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// Error type for relay failures
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Upstream(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => {
                log::error!("Relay failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
