//! Redis-backed secondary cache tier. Eviction is a configured `expiration`
//! duration applied at write time via `SET ... EX`.

use alloy_primitives::{keccak256, Bytes};
use async_trait::async_trait;
use eigenda_proxy_types::{BackendType, ProxyError};
use redis::AsyncCommands;

use crate::Backend;

pub struct RedisBackend {
    client: redis::Client,
    eviction_seconds: u64,
}

impl RedisBackend {
    pub fn new(client: redis::Client, eviction_seconds: u64) -> Self {
        Self { client, eviction_seconds }
    }

    fn object_key(key: &[u8]) -> String {
        hex::encode(key)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, ProxyError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ProxyError::Transient(e.to_string()))
    }
}

#[async_trait]
impl Backend for RedisBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Redis
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), ProxyError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set_ex(Self::object_key(key), value.to_vec(), self.eviction_seconds)
            .await
            .map_err(|e| ProxyError::Transient(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Bytes, ProxyError> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn
            .get(Self::object_key(key))
            .await
            .map_err(|e| ProxyError::Transient(e.to_string()))?;
        value.map(Bytes::from).ok_or(ProxyError::NotFound)
    }

    async fn verify(&self, key: &[u8], value: &Bytes) -> Result<(), ProxyError> {
        if keccak256(value).as_slice() == key {
            Ok(())
        } else {
            Err(ProxyError::BadRequest("redis value does not match keccak256(key)".into()))
        }
    }
}
