//! Per-id read cache for products.
//!
//! The service owns its cache through [`ProductCache`], so each service
//! instance (and each test) gets an isolated one.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_flag, env_parse};
use moka::future::Cache;
use std::time::Duration;

use crate::models::ProductDto;

#[async_trait]
pub trait ProductCache: Send + Sync {
    async fn get(&self, id: i64) -> Option<ProductDto>;

    async fn put(&self, id: i64, product: ProductDto);

    async fn invalidate(&self, id: i64);

    async fn invalidate_all(&self);
}

/// Cache sizing and invalidation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub max_capacity: u64,
    /// `None` keeps entries until evicted by capacity or invalidation
    pub ttl: Option<Duration>,
    /// Clear the whole cache on every delete instead of only the deleted id
    pub evict_all_on_delete: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: None,
            evict_all_on_delete: false,
        }
    }
}

impl FromEnv for CacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let ttl_secs: u64 = env_parse("PRODUCT_CACHE_TTL_SECS", 0)?;

        Ok(Self {
            max_capacity: env_parse("PRODUCT_CACHE_CAPACITY", 10_000)?,
            ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            evict_all_on_delete: env_flag("PRODUCT_CACHE_EVICT_ALL_ON_DELETE", false)?,
        })
    }
}

/// [`ProductCache`] backed by an in-process moka cache.
#[derive(Clone)]
pub struct MokaProductCache {
    inner: Cache<i64, ProductDto>,
}

impl MokaProductCache {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_capacity);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            inner: builder.build(),
        }
    }
}

#[async_trait]
impl ProductCache for MokaProductCache {
    async fn get(&self, id: i64) -> Option<ProductDto> {
        let hit = self.inner.get(&id).await;
        tracing::debug!(product_id = id, hit = hit.is_some(), "Product cache lookup");
        hit
    }

    async fn put(&self, id: i64, product: ProductDto) {
        self.inner.insert(id, product).await;
    }

    async fn invalidate(&self, id: i64) {
        self.inner.invalidate(&id).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(id: i64) -> ProductDto {
        ProductDto {
            id: Some(id),
            name: Some(format!("product-{}", id)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MokaProductCache::new(&CacheConfig::default());
        assert_eq!(cache.get(1).await, None);

        cache.put(1, dto(1)).await;
        assert_eq!(cache.get(1).await, Some(dto(1)));
    }

    #[tokio::test]
    async fn test_invalidate_single_entry() {
        let cache = MokaProductCache::new(&CacheConfig::default());
        cache.put(1, dto(1)).await;
        cache.put(2, dto(2)).await;

        cache.invalidate(1).await;

        assert_eq!(cache.get(1).await, None);
        assert_eq!(cache.get(2).await, Some(dto(2)));
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = MokaProductCache::new(&CacheConfig::default());
        cache.put(1, dto(1)).await;
        cache.put(2, dto(2)).await;

        cache.invalidate_all().await;

        assert_eq!(cache.get(1).await, None);
        assert_eq!(cache.get(2).await, None);
    }

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars_unset(
            [
                "PRODUCT_CACHE_CAPACITY",
                "PRODUCT_CACHE_TTL_SECS",
                "PRODUCT_CACHE_EVICT_ALL_ON_DELETE",
            ],
            || {
                let config = CacheConfig::from_env().unwrap();
                assert_eq!(config, CacheConfig::default());
            },
        );
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("PRODUCT_CACHE_CAPACITY", Some("50")),
                ("PRODUCT_CACHE_TTL_SECS", Some("30")),
                ("PRODUCT_CACHE_EVICT_ALL_ON_DELETE", Some("true")),
            ],
            || {
                let config = CacheConfig::from_env().unwrap();
                assert_eq!(config.max_capacity, 50);
                assert_eq!(config.ttl, Some(Duration::from_secs(30)));
                assert!(config.evict_all_on_delete);
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_capacity() {
        temp_env::with_var("PRODUCT_CACHE_CAPACITY", Some("lots"), || {
            assert!(matches!(
                CacheConfig::from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }
}
