//! KV-on-chain secondary: best-effort archival backed by `rocksdb` for
//! durable storage, fronted by a TTL'd concurrent cache so repeat reads
//! during a single GET's cache-tier sweep don't round-trip to disk.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::{keccak256, Bytes};
use async_trait::async_trait;
use dashmap::DashMap;
use eigenda_proxy_types::{BackendType, ProxyError};
use rocksdb::DB;

use crate::Backend;

pub struct KvBackend {
    db: Arc<DB>,
    cache: DashMap<Vec<u8>, (Bytes, Instant)>,
    cache_ttl: Duration,
}

impl KvBackend {
    pub fn open(path: &str, cache_ttl: Duration) -> Result<Self, ProxyError> {
        let db = DB::open_default(path).map_err(|e| ProxyError::Internal(e.to_string()))?;
        Ok(Self {
            db: Arc::new(db),
            cache: DashMap::new(),
            cache_ttl,
        })
    }

    fn cache_get(&self, key: &[u8]) -> Option<Bytes> {
        let entry = self.cache.get(key)?;
        let (value, inserted_at) = entry.value();
        if inserted_at.elapsed() < self.cache_ttl {
            Some(value.clone())
        } else {
            drop(entry);
            self.cache.remove(key);
            None
        }
    }
}

#[async_trait]
impl Backend for KvBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Kv
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), ProxyError> {
        let db = self.db.clone();
        let key_owned = key.to_vec();
        let value_owned = value.clone();
        tokio::task::spawn_blocking(move || db.put(&key_owned, &value_owned))
            .await
            .map_err(|e| ProxyError::Internal(e.to_string()))?
            .map_err(|e| ProxyError::Transient(e.to_string()))?;
        self.cache.insert(key.to_vec(), (value, Instant::now()));
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Bytes, ProxyError> {
        if let Some(value) = self.cache_get(key) {
            return Ok(value);
        }
        let db = self.db.clone();
        let key_owned = key.to_vec();
        let value = tokio::task::spawn_blocking(move || db.get(&key_owned))
            .await
            .map_err(|e| ProxyError::Internal(e.to_string()))?
            .map_err(|e| ProxyError::Transient(e.to_string()))?
            .ok_or(ProxyError::NotFound)?;
        let value = Bytes::from(value);
        self.cache.insert(key.to_vec(), (value.clone(), Instant::now()));
        Ok(value)
    }

    async fn verify(&self, key: &[u8], value: &Bytes) -> Result<(), ProxyError> {
        if keccak256(value).as_slice() == key {
            Ok(())
        } else {
            Err(ProxyError::BadRequest("kv value does not match keccak256(key)".into()))
        }
    }
}
