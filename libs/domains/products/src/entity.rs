use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::Product;

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))", nullable)]
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
        }
    }
}

// A missing id is left NotSet so Postgres assigns it from the sequence.
impl From<Product> for ActiveModel {
    fn from(product: Product) -> Self {
        ActiveModel {
            id: product.id.map_or(NotSet, Set),
            name: Set(product.name),
            description: Set(product.description),
            price: Set(product.price),
            quantity: Set(product.quantity),
        }
    }
}
