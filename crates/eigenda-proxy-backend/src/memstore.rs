//! In-memory backend with TTL eviction. Doubles as a primary (for local
//! development/tests, bypassing the real disperser and chain verification)
//! and as a `Backend` any other component can address directly.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use alloy_primitives::{keccak256, Bytes};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use eigenda_proxy_types::{BackendType, ProxyError};

use crate::{Backend, PrimaryBackend};

/// Knobs reachable via the admin endpoint. Swapped atomically so every
/// in-flight request reads a consistent snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MemstoreRuntimeConfig {
    pub blob_expiration: Duration,
    pub put_latency: Duration,
    pub get_latency: Duration,
}

impl Default for MemstoreRuntimeConfig {
    fn default() -> Self {
        Self {
            blob_expiration: Duration::from_secs(25 * 60 * 60),
            put_latency: Duration::ZERO,
            get_latency: Duration::ZERO,
        }
    }
}

struct Entry {
    value: Bytes,
    inserted_at: Instant,
}

pub struct MemstoreBackend {
    store: RwLock<HashMap<Vec<u8>, Entry>>,
    config: ArcSwap<MemstoreRuntimeConfig>,
}

impl Default for MemstoreBackend {
    fn default() -> Self {
        Self::new(MemstoreRuntimeConfig::default())
    }
}

impl MemstoreBackend {
    pub fn new(config: MemstoreRuntimeConfig) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn update_config(&self, config: MemstoreRuntimeConfig) {
        self.config.store(std::sync::Arc::new(config));
    }

    /// Drops every entry older than `blobExpiration`. Run on every `Get` and
    /// may additionally be driven by a periodic timer.
    pub fn evict_expired(&self) {
        let expiration = self.config.load().blob_expiration;
        let now = Instant::now();
        self.store
            .write()
            .expect("memstore lock poisoned")
            .retain(|_, entry| now.duration_since(entry.inserted_at) < expiration);
    }

    fn insert(&self, key: Vec<u8>, value: Bytes) {
        self.store.write().expect("memstore lock poisoned").insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn lookup(&self, key: &[u8]) -> Option<Bytes> {
        self.evict_expired();
        self.store
            .read()
            .expect("memstore lock poisoned")
            .get(key)
            .map(|e| e.value.clone())
    }
}

#[async_trait]
impl Backend for MemstoreBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Memstore
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), ProxyError> {
        let latency = self.config.load().put_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.insert(key.to_vec(), value);
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Bytes, ProxyError> {
        let latency = self.config.load().get_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.lookup(key).ok_or(ProxyError::NotFound)
    }

    async fn verify(&self, key: &[u8], value: &Bytes) -> Result<(), ProxyError> {
        if keccak256(value).as_slice() == key {
            Ok(())
        } else {
            Err(ProxyError::BadRequest("memstore key does not match keccak256(value)".into()))
        }
    }
}

/// Primary-role wrapper: the "cert" is just the keccak256 digest of the
/// blob, and verification is the same digest equality check -- there is no
/// on-chain state backing a memstore blob.
#[async_trait]
impl PrimaryBackend for MemstoreBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Memstore
    }

    async fn disperse(&self, blob: &[u8]) -> Result<Vec<u8>, ProxyError> {
        let key = keccak256(blob);
        Backend::put(self, key.as_slice(), Bytes::copy_from_slice(blob)).await?;
        Ok(key.to_vec())
    }

    async fn get(&self, cert_bytes: &[u8]) -> Result<Vec<u8>, ProxyError> {
        Backend::get(self, cert_bytes).await.map(|b| b.to_vec())
    }

    async fn verify(&self, cert_bytes: &[u8], blob: &[u8]) -> Result<(), ProxyError> {
        Backend::verify(self, cert_bytes, &Bytes::copy_from_slice(blob)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemstoreBackend::default();
        let cert = PrimaryBackend::disperse(&store, b"hello").await.unwrap();
        let blob = PrimaryBackend::get(&store, &cert).await.unwrap();
        assert_eq!(blob, b"hello");
    }

    #[tokio::test]
    async fn verify_rejects_wrong_key() {
        let store = MemstoreBackend::default();
        let err = Backend::verify(&store, &[0u8; 32], &Bytes::from_static(b"hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }

    #[tokio::test]
    async fn expired_entries_are_evicted() {
        let store = MemstoreBackend::new(MemstoreRuntimeConfig {
            blob_expiration: Duration::from_millis(1),
            ..MemstoreRuntimeConfig::default()
        });
        let cert = PrimaryBackend::disperse(&store, b"short lived").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let err = PrimaryBackend::get(&store, &cert).await.unwrap_err();
        assert!(matches!(err, ProxyError::NotFound));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemstoreBackend::default();
        let err = Backend::get(&store, b"nope").await.unwrap_err();
        assert!(matches!(err, ProxyError::NotFound));
    }
}
