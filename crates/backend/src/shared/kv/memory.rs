use super::ProgressStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory progress store for tests
#[derive(Default)]
pub struct MemoryProgressStore {
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>> {
        let hashes = self.hashes.read().unwrap_or_else(|e| e.into_inner());
        Ok(hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()> {
        let mut hashes = self.hashes.write().unwrap_or_else(|e| e.into_inner());
        hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }
}
