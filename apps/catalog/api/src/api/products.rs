use axum::Router;
use domain_products::{ProductRepository, ProductService, handlers};

pub const PATH: &str = "/products";

pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    handlers::router(service)
}
