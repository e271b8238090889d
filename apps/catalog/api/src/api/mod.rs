use axum::Router;
use domain_products::{ProductRepository, ProductService};

pub mod products;

/// Creates the application routes.
///
/// Returns a stateless Router (sub-routers have their state applied);
/// `axum_helpers::create_router` adds the fallback and tracing layers.
pub fn routes<R: ProductRepository + 'static>(products: ProductService<R>) -> Router {
    Router::new().nest(products::PATH, products::router(products))
}
