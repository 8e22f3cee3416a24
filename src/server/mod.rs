use crate::config::Config;
use crate::library::Library;
use anyhow::{Context, Result};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

mod error;
pub mod routes_videos;

pub use error::AppError;
pub use routes_videos::parse_entry_id;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub library: Arc<Library>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(library: Arc<Library>, config: Config) -> Self {
        Self {
            library,
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", routes_videos::video_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Bind the configured address.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let listener = bind(&ctx.config).await?;
    serve(listener, ctx).await
}

/// Serve on an already bound listener until a shutdown signal arrives.
pub async fn serve(listener: TcpListener, ctx: AppContext) -> Result<()> {
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
