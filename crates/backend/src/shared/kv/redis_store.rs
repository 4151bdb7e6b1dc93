use super::ProgressStore;
use redis::AsyncCommands;

/// Redis-backed progress store. A multiplexed connection is opened per
/// call site; the client itself is cheap to clone and connects lazily.
pub struct RedisProgressStore {
    client: redis::Client,
}

impl RedisProgressStore {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ProgressStore for RedisProgressStore {
    async fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.hget(key, field).await?;
        Ok(value)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }
}
