use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persisted product.
///
/// `id` is `None` only before the first save; the repository assigns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

impl Product {
    /// Overwrite every field except `id`.
    pub fn apply_update(&mut self, input: ProductDto) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.quantity = input.quantity;
    }
}

/// Wire representation used for request and response bodies.
///
/// Every field is optional; omitted fields are stored and returned as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDto {
    #[schema(example = 1)]
    pub id: Option<i64>,
    #[schema(example = "Test Product")]
    pub name: Option<String>,
    #[schema(example = "Test Description")]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>, example = 100.0)]
    pub price: Option<Decimal>,
    #[schema(example = 10)]
    pub quantity: Option<i32>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
        }
    }
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            price: dto.price,
            quantity: dto.quantity,
        }
    }
}
