use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use crate::cache::ProductCache;
use crate::error::{ProductError, ProductResult};
use crate::models::ProductDto;
use crate::repository::ProductRepository;

const LOCK_STRIPES: usize = 64;

/// Service layer for Product use cases
///
/// Every path that reads or writes the store and then touches the cache for
/// an id holds that id's stripe lock, so a cache fill can never land after a
/// newer write-through or invalidation for the same id.
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    cache: Arc<dyn ProductCache>,
    evict_all_on_delete: bool,
    locks: Arc<[Mutex<()>]>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, cache: Arc<dyn ProductCache>) -> Self {
        Self {
            repository: Arc::new(repository),
            cache,
            evict_all_on_delete: false,
            locks: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    async fn lock_id(&self, id: i64) -> MutexGuard<'_, ()> {
        let stripe = id.rem_euclid(self.locks.len() as i64) as usize;
        self.locks[stripe].lock().await
    }

    /// Clear the whole cache on delete instead of only the deleted id.
    pub fn with_evict_all_on_delete(mut self, evict_all: bool) -> Self {
        self.evict_all_on_delete = evict_all;
        self
    }

    /// Persist a new product and write it through to the cache
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ProductDto) -> ProductResult<ProductDto> {
        // An explicit id may overwrite a row a reader is filling from.
        let _guard = match input.id {
            Some(id) => Some(self.lock_id(id).await),
            None => None,
        };

        let saved: ProductDto = self.repository.save(input.into()).await?.into();

        if let Some(id) = saved.id {
            self.cache.put(id, saved.clone()).await;
        }

        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> ProductResult<Vec<ProductDto>> {
        let products = self.repository.find_all().await?;
        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Look a product up, serving from the cache when possible.
    ///
    /// Absent products are not cached.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> ProductResult<Option<ProductDto>> {
        if let Some(cached) = self.cache.get(id).await {
            return Ok(Some(cached));
        }

        let _guard = self.lock_id(id).await;
        // Another reader may have filled the entry while we waited.
        if let Some(cached) = self.cache.get(id).await {
            return Ok(Some(cached));
        }

        let Some(product) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        let dto: ProductDto = product.into();
        self.cache.put(id, dto.clone()).await;
        Ok(Some(dto))
    }

    /// Overwrite every non-id field of an existing product
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: ProductDto) -> ProductResult<ProductDto> {
        let _guard = self.lock_id(id).await;
        let mut product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        product.apply_update(input);

        let saved: ProductDto = self.repository.save(product).await?.into();
        self.cache.put(id, saved.clone()).await;
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ProductResult<()> {
        let _guard = self.lock_id(id).await;
        let product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        // Another process sharing the store can win between the lookup and here.
        if !self.repository.delete(product).await? {
            return Err(ProductError::NotFound(id));
        }

        if self.evict_all_on_delete {
            self.cache.invalidate_all().await;
        } else {
            self.cache.invalidate(id).await;
        }

        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, MokaProductCache};
    use crate::models::Product;
    use crate::repository::{InMemoryProductRepository, MockProductRepository};
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    /// Wraps the in-memory store and parks the first `find_by_id` after it
    /// has read the row, until the test releases it.
    struct PausingRepository {
        inner: InMemoryProductRepository,
        armed: std::sync::atomic::AtomicBool,
        paused: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    impl PausingRepository {
        fn new(inner: InMemoryProductRepository) -> Self {
            Self {
                inner,
                armed: std::sync::atomic::AtomicBool::new(true),
                paused: Arc::new(tokio::sync::Notify::new()),
                release: Arc::new(tokio::sync::Notify::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ProductRepository for PausingRepository {
        async fn save(&self, product: Product) -> ProductResult<Product> {
            self.inner.save(product).await
        }

        async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
            let found = self.inner.find_by_id(id).await;
            if self.armed.swap(false, std::sync::atomic::Ordering::SeqCst) {
                self.paused.notify_one();
                self.release.notified().await;
            }
            found
        }

        async fn find_all(&self) -> ProductResult<Vec<Product>> {
            self.inner.find_all().await
        }

        async fn delete(&self, product: Product) -> ProductResult<bool> {
            self.inner.delete(product).await
        }
    }

    fn cache() -> Arc<dyn ProductCache> {
        Arc::new(MokaProductCache::new(&CacheConfig::default()))
    }

    fn stored(id: i64) -> Product {
        Product {
            id: Some(id),
            name: Some("Test Product".to_string()),
            description: Some("Test Description".to_string()),
            price: Some(Decimal::new(10000, 2)),
            quantity: Some(10),
        }
    }

    fn input() -> ProductDto {
        ProductDto {
            id: None,
            ..ProductDto::from(stored(0))
        }
    }

    #[tokio::test]
    async fn test_create_then_get_is_served_from_cache() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_save()
            .times(1)
            .returning(|p| Ok(Product { id: Some(1), ..p }));
        // The write-through entry must satisfy the lookup.
        mock_repo.expect_find_by_id().never();

        let service = ProductService::new(mock_repo, cache());
        let created = service.create(input()).await.unwrap();
        assert_eq!(created.id, Some(1));

        let fetched = service.get_by_id(1).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_get_by_id_populates_cache_on_miss() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(1))
            .times(1)
            .returning(|id| Ok(Some(stored(id))));

        let service = ProductService::new(mock_repo, cache());

        let first = service.get_by_id(1).await.unwrap();
        let second = service.get_by_id(1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.unwrap().name.as_deref(), Some("Test Product"));
    }

    #[tokio::test]
    async fn test_get_by_id_absent_is_not_cached() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(999))
            .times(2)
            .returning(|_| Ok(None));

        let service = ProductService::new(mock_repo, cache());

        assert_eq!(service.get_by_id(999).await.unwrap(), None);
        assert_eq!(service.get_by_id(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_propagates_persistence_error() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_save()
            .returning(|_| Err(ProductError::Persistence("disk full".to_string())));

        let service = ProductService::new(mock_repo, cache());
        let result = service.create(input()).await;

        assert!(matches!(result, Err(ProductError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_list_all_propagates_persistence_error() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_find_all()
            .returning(|| Err(ProductError::Persistence("timeout".to_string())));

        let service = ProductService::new(mock_repo, cache());
        assert!(matches!(
            service.list_all().await,
            Err(ProductError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let service = ProductService::new(InMemoryProductRepository::new(), cache());
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_save().never();

        let service = ProductService::new(mock_repo, cache());
        let result = service.update(5, input()).await;

        assert!(matches!(result, Err(ProductError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_update_overwrites_fields_and_keeps_id() {
        let service = ProductService::new(InMemoryProductRepository::new(), cache());
        let created = service.create(input()).await.unwrap();
        let id = created.id.unwrap();

        // Prime the cache so the update has something stale to replace.
        service.get_by_id(id).await.unwrap();

        let updated = service
            .update(
                id,
                ProductDto {
                    id: Some(12345),
                    price: Some(Decimal::new(5000, 2)),
                    ..created.clone()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.price, Some(Decimal::new(5000, 2)));

        let fetched = service.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(service.get_by_id(12345).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = ProductService::new(mock_repo, cache());
        assert!(matches!(
            service.delete(42).await,
            Err(ProductError::NotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_delete_invalidates_cached_entry() {
        let service = ProductService::new(InMemoryProductRepository::new(), cache());
        let id = service.create(input()).await.unwrap().id.unwrap();
        assert!(service.get_by_id(id).await.unwrap().is_some());

        service.delete(id).await.unwrap();

        assert_eq!(service.get_by_id(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_keeps_other_entries_by_default() {
        let shared = cache();
        let service = ProductService::new(InMemoryProductRepository::new(), shared.clone());
        let first = service.create(input()).await.unwrap().id.unwrap();
        let second = service.create(input()).await.unwrap().id.unwrap();

        service.delete(first).await.unwrap();

        assert!(shared.get(first).await.is_none());
        assert!(shared.get(second).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_can_evict_everything() {
        let shared = cache();
        let service = ProductService::new(InMemoryProductRepository::new(), shared.clone())
            .with_evict_all_on_delete(true);
        let first = service.create(input()).await.unwrap().id.unwrap();
        let second = service.create(input()).await.unwrap().id.unwrap();

        service.delete(first).await.unwrap();

        assert!(shared.get(second).await.is_none());
        assert!(service.get_by_id(second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_during_cache_fill_leaves_no_stale_entry() {
        let store = InMemoryProductRepository::new();
        store.save(stored(1)).await.unwrap();

        let repo = PausingRepository::new(store);
        let (paused, release) = (repo.paused.clone(), repo.release.clone());
        let service = Arc::new(ProductService::new(repo, cache()));

        let reader = tokio::spawn({
            let service = service.clone();
            async move { service.get_by_id(1).await }
        });
        paused.notified().await;

        let deleter = tokio::spawn({
            let service = service.clone();
            async move { service.delete(1).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        release.notify_one();

        reader.await.unwrap().unwrap();
        deleter.await.unwrap().unwrap();

        assert_eq!(service.get_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_racing_delete_does_not_resurrect() {
        let store = InMemoryProductRepository::new();
        store.save(stored(1)).await.unwrap();

        let repo = PausingRepository::new(store.clone());
        let (paused, release) = (repo.paused.clone(), repo.release.clone());
        let service = Arc::new(ProductService::new(repo, cache()));

        let updater = tokio::spawn({
            let service = service.clone();
            async move { service.update(1, ProductDto::from(stored(1))).await }
        });
        paused.notified().await;

        let deleter = tokio::spawn({
            let service = service.clone();
            async move { service.delete(1).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        release.notify_one();

        updater.await.unwrap().unwrap();
        deleter.await.unwrap().unwrap();

        assert_eq!(store.find_by_id(1).await.unwrap(), None);
        assert_eq!(service.get_by_id(1).await.unwrap(), None);
    }
}
