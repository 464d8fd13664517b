//! Cache that stores nothing

use async_trait::async_trait;
use bytes::Bytes;

use crate::engine::traits::MetricCache;
use crate::error::CacheResult;

/// Cache backend that always misses, forcing every metric to be recomputed
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

#[async_trait]
impl MetricCache for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Bytes>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> CacheResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "null"
    }
}
