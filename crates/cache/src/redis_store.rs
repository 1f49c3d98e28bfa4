// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed [`KvStore`] over a multiplexed connection manager.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use oz_catalog::CacheConfig;

use crate::store::{CacheError, KvStore};

/// Production store speaking the Redis wire protocol.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect using the cache section of the selected provisioner.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let p = &config.parameters;
        let url = match &p.password {
            Some(password) => {
                format!("redis://:{}@{}:{}/{}", password, p.host, p.port, p.db)
            }
            None => format!("redis://{}:{}/{}", p.host, p.port, p.db),
        };
        let client = redis::Client::open(url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn try_lock(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let reply: redis::Value = redis::cmd("SET")
            .arg(key)
            .arg("locked")
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;
        Ok(!matches!(reply, redis::Value::Nil))
    }

    async fn unlock(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let deleted: i64 = conn.del(key).await?;
        if deleted == 0 {
            return Err(CacheError::Lock {
                key: key.to_string(),
                reason: "lock expired before release".to_string(),
            });
        }
        Ok(())
    }

    async fn rpush(&self, key: &str, values: &[String]) -> Result<(), CacheError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(key, values).await?;
        Ok(())
    }

    async fn lrange(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.lrange(key, 0, -1).await?)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(key, ttl.as_secs() as i64).await?;
        Ok(())
    }
}
