use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::Product,
    repository::ProductRepository,
};

// Rows inserted with an explicit id bypass the serial sequence; move it past them.
const SYNC_ID_SEQUENCE: &str = "SELECT setval(pg_get_serial_sequence('products', 'id'), \
     GREATEST((SELECT MAX(id) FROM products), 1))";

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn save(&self, product: Product) -> ProductResult<Product> {
        let Some(id) = product.id else {
            let active_model: entity::ActiveModel = product.into();
            let model = active_model.insert(&self.db).await?;
            tracing::info!(product_id = model.id, "Created product");
            return Ok(model.into());
        };

        let exists = entity::Entity::find_by_id(id).one(&self.db).await?.is_some();
        let active_model: entity::ActiveModel = product.into();

        let model = if exists {
            // The row can be deleted between the lookup and the update.
            let model = active_model.update(&self.db).await.map_err(|err| match err {
                DbErr::RecordNotUpdated => ProductError::NotFound(id),
                other => other.into(),
            })?;
            tracing::info!(product_id = id, "Updated product");
            model
        } else {
            let model = active_model.insert(&self.db).await?;
            self.db.execute_unprepared(SYNC_ID_SEQUENCE).await?;
            tracing::info!(product_id = id, "Created product with explicit id");
            model
        };

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, product: Product) -> ProductResult<bool> {
        let Some(id) = product.id else {
            return Ok(false);
        };

        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
