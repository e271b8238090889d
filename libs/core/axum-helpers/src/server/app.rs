use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use axum::Router;
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};

/// Wrap the application routes with request tracing and a JSON 404 fallback.
///
/// Routes are merged at the root as given. Domain routers apply their own
/// state before being passed in.
///
/// # Example
/// ```ignore
/// let apis = Router::new().nest("/products", product_routes);
/// let router = create_router(apis);
/// ```
pub fn create_router(apis: Router) -> Router {
    Router::new()
        .merge(apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Serve with graceful shutdown, then run `cleanup` bounded by
/// `server_config.shutdown_timeout`.
///
/// In-flight requests finish before `cleanup` starts, so it is safe to close
/// connection pools there.
///
/// # Example
/// ```ignore
/// create_production_app(router, &config, async move {
///     db.close().await.ok();
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::new();
    let signal_handle = coordinator.clone();
    let drain_handle = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let signal_task = tokio::spawn(async move { signal_handle.wait_for_signal().await });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { drain_handle.wait_for_shutdown().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // The server can also stop on its own error; make sure the listener task goes away.
    coordinator.shutdown();
    signal_task.abort();

    let shutdown_timeout = server_config.shutdown_timeout;
    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
