//! In-process cache used by unit tests. TTLs are recorded, never enforced.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::services::cache::client::{CacheClient, CacheResult};

#[derive(Clone, Default)]
pub struct MemoryCache {
    strings: Arc<Mutex<HashMap<String, String>>>,
    lists: Arc<Mutex<HashMap<String, Vec<String>>>>,
    ttls: Arc<Mutex<HashMap<String, Duration>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.strings.lock().unwrap().get(key).cloned()
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        self.lists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.ttls.lock().unwrap().get(key).copied()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.strings
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn insert_list(&self, key: &str, values: &[&str]) {
        self.lists.lock().unwrap().insert(
            key.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.string(key))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.insert(key, value);
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn del_many(&self, keys: &[String]) -> CacheResult<u64> {
        let mut strings = self.strings.lock().unwrap();
        let mut lists = self.lists.lock().unwrap();
        let mut removed = 0;
        for key in keys {
            if strings.remove(key).is_some() || lists.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn list_replace_tail(
        &self,
        key: &str,
        retained: u64,
        values: &[String],
        ttl: Duration,
    ) -> CacheResult<u64> {
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(key.to_string()).or_default();
        list.truncate(retained as usize);
        list.extend(values.iter().cloned());
        let len = list.len() as u64;
        if len == 0 {
            lists.remove(key);
        }
        self.ttls.lock().unwrap().insert(key.to_string(), ttl);
        Ok(len)
    }
}
