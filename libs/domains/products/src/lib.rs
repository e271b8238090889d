//! Products Domain
//!
//! CRUD over a single product resource with a per-id read cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │   Service   │ ──▶ │    Cache    │  ← id → ProductDto
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product entity, ProductDto
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::{
//!     cache::{CacheConfig, MokaProductCache},
//!     handlers,
//!     repository::InMemoryProductRepository,
//!     service::ProductService,
//! };
//!
//! let cache = MokaProductCache::new(&CacheConfig::default());
//! let service = ProductService::new(InMemoryProductRepository::new(), Arc::new(cache));
//!
//! // Mount under /products
//! let router = axum::Router::new().nest("/products", handlers::router(service));
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use cache::{CacheConfig, MokaProductCache, ProductCache};
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{Product, ProductDto};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
