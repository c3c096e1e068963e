use anyhow::{Context, Result};

use wxtoken::{auth, config, http_client, middleware, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = config::Config::load()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    config.validate()?;
    let addr = config.listen_addr()?;

    tracing::info!("🚀 wxtoken {} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!("Provider: {} (appid: {})", config.api_base, config.app_id);

    let http_client = http_client::WeixinHttpClient::new(
        &config.api_base,
        config.http_connect_timeout,
        config.http_request_timeout,
    )?;

    // Start the refresh loops; caches fill in the background
    let manager = auth::CredentialManager::spawn(
        auth::AccessTokenFetcher::new(
            http_client.clone(),
            config.app_id.clone(),
            config.app_secret.clone(),
        ),
        auth::JsapiTicketFetcher::new(http_client),
        config.retry_interval,
    );
    tracing::info!("✅ Credential refresh started");

    let app_state = routes::AppState {
        app_id: config.app_id.as_str().into(),
        access_token: manager.access_token(),
        jsapi_ticket: manager.jsapi_ticket(),
    };

    let app = build_app(app_state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    manager.shutdown().await;
    tracing::info!("👋 Server shutdown complete");

    Ok(())
}

/// Build the application with all routes and middleware
fn build_app(state: routes::AppState) -> axum::Router {
    use axum::Router;

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::credential_routes(state))
        // Access log inside, panic recovery outermost
        .layer(axum::middleware::from_fn(middleware::access_log_middleware))
        .layer(middleware::recover_layer())
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
