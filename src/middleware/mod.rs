// Access logging and panic recovery middleware

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;

/// Paths too noisy to log on every hit
const UNLOGGED_PATHS: &[&str] = &["/ping"];

/// Access log middleware
///
/// Emits one line per request with a short request id, status, and latency.
/// Health checks are skipped.
pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if UNLOGGED_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        "[{}] {} {} -> {} ({:.1}ms)",
        request_id,
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    response
}

/// Turn handler panics into 500 responses instead of dropped connections
pub fn recover_layer() -> CatchPanicLayer<tower_http::catch_panic::DefaultResponseForPanic> {
    CatchPanicLayer::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn panic_handler() -> &'static str {
        panic!("handler blew up")
    }

    fn create_test_app() -> Router {
        Router::new()
            .route("/ok", get(ok_handler))
            .route("/ping", get(ok_handler))
            .route("/panic", get(panic_handler))
            .layer(axum::middleware::from_fn(access_log_middleware))
            .layer(recover_layer())
    }

    #[tokio::test]
    async fn test_access_log_passes_response_through() {
        let app = create_test_app();

        let request = Request::builder().uri("/ok").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_access_log_skips_ping_without_altering_it() {
        let app = create_test_app();

        let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_server_error() {
        let app = create_test_app();

        let request = Request::builder().uri("/panic").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
