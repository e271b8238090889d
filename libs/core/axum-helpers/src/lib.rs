//! # Axum Helpers
//!
//! Shared HTTP plumbing for Axum services.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly, graceful shutdown, bounded cleanup
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Integer id path and JSON body extractors
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = create_router(Router::new()); // Add your routes
//!     create_production_app(router, &ServerConfig::default(), async {}).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{IdPath, JsonBody};
pub use server::{ShutdownCoordinator, create_production_app, create_router, shutdown_signal};
