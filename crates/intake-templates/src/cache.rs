//! Template source cache using moka
//!
//! Templates never change while the process runs, so a loaded source is
//! kept until evicted by capacity or TTL.

use crate::catalog::TemplateCatalog;
use crate::error::TemplateResult;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogCacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Catalog wrapper caching loaded sources by id
///
/// Failed loads are not cached.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn TemplateCatalog>,
    cache: Cache<String, Arc<str>>,
}

impl std::fmt::Debug for CachedCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCatalog")
            .field("inner", &self.inner.name())
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl CachedCatalog {
    /// Create cache with max capacity
    #[must_use]
    pub fn new(inner: Arc<dyn TemplateCatalog>, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[must_use]
    pub fn with_ttl(inner: Arc<dyn TemplateCatalog>, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Invalidate one template
    #[inline]
    pub async fn invalidate(&self, id: &str) {
        self.cache.invalidate(id).await;
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CatalogCacheStats {
        CatalogCacheStats {
            entry_count: self.cache.entry_count(),
        }
    }
}

#[async_trait::async_trait]
impl TemplateCatalog for CachedCatalog {
    async fn load(&self, id: &str) -> TemplateResult<Arc<str>> {
        if let Some(cached) = self.cache.get(id).await {
            return Ok(cached);
        }

        let source = self.inner.load(id).await?;
        self.cache.insert(id.to_string(), Arc::clone(&source)).await;
        Ok(source)
    }

    fn name(&self) -> &'static str {
        "cached"
    }
}
