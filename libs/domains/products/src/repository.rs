use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert or overwrite a product.
    ///
    /// A product without `id` gets the next id; one with an `id` replaces the
    /// stored row or is inserted under that id.
    async fn save(&self, product: Product) -> ProductResult<Product>;

    /// Get a product by ID
    async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>>;

    /// All products ordered by id ascending
    async fn find_all(&self) -> ProductResult<Vec<Product>>;

    /// Delete a stored product, returning whether a row was removed.
    ///
    /// A product that was never saved (no `id`) removes nothing.
    async fn delete(&self, product: Product) -> ProductResult<bool>;
}

#[derive(Debug)]
struct Store {
    products: BTreeMap<i64, Product>,
    /// `None` once an id of `i64::MAX` has been stored.
    next_id: Option<i64>,
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                products: BTreeMap::new(),
                next_id: Some(1),
            })),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, mut product: Product) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        let id = match product.id {
            Some(id) => id,
            None => store
                .next_id
                .ok_or_else(|| ProductError::Persistence("product id space exhausted".into()))?,
        };
        // Keep generated ids clear of explicitly inserted ones.
        store.next_id = match (store.next_id, id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };

        product.id = Some(id);
        store.products.insert(id, product.clone());

        tracing::debug!(product_id = id, "Saved product");
        Ok(product)
    }

    async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().cloned().collect())
    }

    async fn delete(&self, product: Product) -> ProductResult<bool> {
        let Some(id) = product.id else {
            return Ok(false);
        };

        let mut store = self.store.write().await;
        Ok(store.products.remove(&id).is_some())
    }
}
