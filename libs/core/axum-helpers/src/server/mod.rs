//! Server infrastructure module.
//!
//! This module provides:
//! - Router assembly with request tracing and a JSON 404 fallback
//! - Graceful shutdown on SIGINT/SIGTERM
//! - Bounded cleanup of resources once the server has drained
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//!
//! let router = create_router(Router::new().nest("/products", product_routes));
//! create_production_app(router, &ServerConfig::default(), async move {
//!     db.close().await.ok();
//! })
//! .await?;
//! ```

pub mod app;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
