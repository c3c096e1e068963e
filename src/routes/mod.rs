use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::CredentialCache;
use crate::signature;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub app_id: Arc<str>,
    pub access_token: CredentialCache,
    pub jsapi_ticket: CredentialCache,
}

/// Health check routes
pub fn health_routes() -> Router {
    Router::new().route("/ping", get(ping_handler))
}

/// Credential routes
pub fn credential_routes(state: AppState) -> Router {
    Router::new()
        .route("/access_token", get(access_token_handler))
        .route("/jsapi_ticket", get(jsapi_ticket_handler))
        .route("/jssdk_config", get(jssdk_config_handler))
        .with_state(state)
}

/// GET /ping - Health check
///
/// Always 200 with an empty body, whatever state the caches are in.
async fn ping_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /access_token - Current access token
///
/// Empty until the first successful refresh.
async fn access_token_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "t": state.access_token.get().await }))
}

/// GET /jsapi_ticket - Current jsapi ticket
async fn jsapi_ticket_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "t": state.jsapi_ticket.get().await }))
}

#[derive(Debug, Deserialize)]
pub struct JssdkConfigQuery {
    #[serde(default)]
    pub url: String,
}

/// GET /jssdk_config?url=... - Signed wx.config parameters for a page
///
/// Signs with whatever ticket is cached, including an empty one.
async fn jssdk_config_handler(
    State(state): State<AppState>,
    Query(query): Query<JssdkConfigQuery>,
) -> Json<Value> {
    let ticket = state.jsapi_ticket.get().await;
    let nonce_str = signature::nonce_str(signature::NONCE_LEN);
    let timestamp = Utc::now().timestamp();
    let signature = signature::sign(&ticket, &nonce_str, &timestamp.to_string(), &query.url);

    tracing::debug!(url = %query.url, "Signed jssdk config");

    Json(json!({
        "error": "ok",
        "msg": "get jssdk config success",
        "config": {
            "appId": &*state.app_id,
            "nonceStr": nonce_str,
            "signature": signature,
            "timestamp": timestamp,
        }
    }))
}
