use utoipa::OpenApi;

/// Aggregated API documentation for the catalog service
#[derive(OpenApi)]
#[openapi(
    info(title = "Product Catalog API"),
    nest(
        (path = crate::api::products::PATH, api = domain_products::ApiDoc)
    )
)]
pub struct ApiDoc;
