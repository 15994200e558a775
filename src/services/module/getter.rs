use async_trait::async_trait;
use std::sync::Arc;

use crate::services::cache::CacheClient;
use crate::services::module::types::{
    CacheKeys, ModuleError, ModuleGetter, ModuleRecord, ModuleResult,
};

/// Cache-only reader. Records become visible here once the setter has seeded
/// them.
#[derive(Clone)]
pub struct ModuleGetterLib<C: CacheClient> {
    cache: Arc<C>,
    keys: CacheKeys,
}

impl<C: CacheClient> ModuleGetterLib<C> {
    pub fn new(cache: Arc<C>, keys: CacheKeys) -> Self {
        Self { cache, keys }
    }
}

#[async_trait]
impl<C: CacheClient> ModuleGetter for ModuleGetterLib<C> {
    async fn get_by_rand_id(&self, rand_id: &str) -> ModuleResult<ModuleRecord> {
        let key = self.keys.rand_id(rand_id);
        let raw = self
            .cache
            .get_string(&key)
            .await?
            .ok_or(ModuleError::NotFound)?;

        let record = serde_json::from_str(&raw)?;
        Ok(record)
    }
}
