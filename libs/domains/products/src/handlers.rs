use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{ErrorResponse, IdPath, JsonBody};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::models::ProductDto;
use crate::repository::ProductRepository;
use crate::service::ProductService;

const TAG: &str = "products";

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, create_product, get_product, update_product, delete_product),
    components(schemas(ProductDto, ErrorResponse)),
    tags(
        (name = TAG, description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router; mount it under `/products`
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All products ordered by id", body = Vec<ProductDto>),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<ProductDto>>> {
    let products = service.list_all().await?;
    Ok(Json(products))
}

/// Create a product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = ProductDto,
    responses(
        (status = 201, description = "Product created", body = ProductDto),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 415, description = "Missing JSON content type", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    JsonBody(input): JsonBody<ProductDto>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 400, description = "Non-integer id", body = ErrorResponse),
        (status = 404, description = "Product not found, empty body"),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductDto>> {
    let product = service
        .get_by_id(id)
        .await?
        .ok_or(ProductError::NotFound(id))?;
    Ok(Json(product))
}

/// Replace every non-id field of a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = ProductDto,
    responses(
        (status = 200, description = "Product updated", body = ProductDto),
        (status = 400, description = "Non-integer id or malformed body", body = ErrorResponse),
        (status = 404, description = "Product not found, empty body"),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    JsonBody(input): JsonBody<ProductDto>,
) -> ProductResult<Json<ProductDto>> {
    let product = service.update(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Non-integer id", body = ErrorResponse),
        (status = 404, description = "Product not found, empty body"),
        (status = 500, description = "Persistence failure", body = ErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
