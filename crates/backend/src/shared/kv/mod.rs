//! Key-value progress store.
//!
//! Progress counters live in a hash per run name, with values stored as
//! text. The redis implementation is the production store; the in-memory
//! one backs unit tests.

pub mod memory;
pub mod redis_store;

pub use memory::MemoryProgressStore;
pub use redis_store::RedisProgressStore;

#[async_trait::async_trait]
pub trait ProgressStore: Send + Sync {
    async fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>>;
    async fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()>;
}
