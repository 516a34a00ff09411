//! Fans PUT writes out to cache-tier secondaries and walks cache then
//! primary then fallback tiers on GET. Grounded on the sequential-try
//! `DataSource` pattern used for blob retrieval against multiple da-layer
//! sources, generalized here to an explicit cache/fallback split.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{keccak256, Bytes};
use eigenda_proxy_backend::{Backend, PrimaryBackend};
use eigenda_proxy_types::{BackendType, ProxyError};

use crate::config::SecondaryRouterConfig;
use crate::workers::WorkerPool;

pub struct SecondaryRouter<P> {
    primary: Arc<P>,
    secondaries: HashMap<BackendType, Arc<dyn Backend>>,
    cache_targets: Vec<BackendType>,
    fallback_targets: Vec<BackendType>,
    workers: WorkerPool,
}

impl<P: PrimaryBackend> SecondaryRouter<P> {
    pub fn new(
        primary: Arc<P>,
        secondaries: HashMap<BackendType, Arc<dyn Backend>>,
        config: SecondaryRouterConfig,
    ) -> Result<Self, ProxyError> {
        config.validate()?;
        let workers = WorkerPool::new(config.concurrent_write_threads, config.write_queue_bound);
        Ok(Self {
            primary,
            secondaries,
            cache_targets: config.cache_targets,
            fallback_targets: config.fallback_targets,
            workers,
        })
    }

    /// Disperses to the primary, then best-effort fans the confirmed cert
    /// out to every cache-tier secondary. Fan-out writes are detached from
    /// this call's caller: a client disconnect after `put` returns does not
    /// cancel them, and a cache write failure never fails the request.
    pub async fn put(&self, blob: Bytes) -> Result<Vec<u8>, ProxyError> {
        let cert_bytes = self.primary.disperse(&blob).await?;
        let key = keccak256(&cert_bytes).to_vec();
        for target in &self.cache_targets {
            if let Some(backend) = self.secondaries.get(target) {
                self.workers.enqueue(backend.clone(), key.clone(), blob.clone()).await;
            }
        }
        Ok(cert_bytes)
    }

    /// Cache tiers in configured order, then the primary, then fallback
    /// tiers in configured order. Returns the primary's error if every tier
    /// misses -- it carries the most diagnostic information of the three.
    pub async fn get(&self, cert_bytes: &[u8]) -> Result<Bytes, ProxyError> {
        let key = keccak256(cert_bytes).to_vec();

        if let Some(hit) = self.try_tiers(&self.cache_targets, &key, cert_bytes).await {
            return Ok(hit);
        }

        match self.primary.get(cert_bytes).await {
            Ok(value) => Ok(value),
            Err(primary_err) if matches!(primary_err, ProxyError::NotFound | ProxyError::Transient(_)) => {
                match self.try_tiers(&self.fallback_targets, &key, cert_bytes).await {
                    Some(hit) => Ok(hit),
                    None => Err(primary_err),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Probes the primary and every configured secondary. Returns the first
    /// failure encountered; does not short-circuit cache vs. fallback roles.
    pub async fn health_check(&self) -> Result<(), ProxyError> {
        self.primary.health_check().await?;
        for target in self.cache_targets.iter().chain(self.fallback_targets.iter()) {
            if let Some(backend) = self.secondaries.get(target) {
                backend.health_check().await?;
            }
        }
        Ok(())
    }

    /// Integrity gate on a cache/fallback hit is the *primary's* `verify`,
    /// not the secondary's -- a secondary only promises to give back
    /// whatever bytes it was handed, so the cert it was stored under must be
    /// checked against the primary's own commitment scheme before the value
    /// is trusted.
    async fn try_tiers(&self, targets: &[BackendType], key: &[u8], cert_bytes: &[u8]) -> Option<Bytes> {
        for target in targets {
            let backend = self.secondaries.get(target)?;
            let value = match backend.get(key).await {
                Ok(value) => value,
                Err(_) => continue,
            };
            if self.primary.verify(cert_bytes, &value).await.is_ok() {
                return Some(value);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticPrimary {
        disperse_result: Vec<u8>,
        get_result: Mutex<Option<Result<Bytes, ProxyError>>>,
    }

    #[async_trait]
    impl PrimaryBackend for StaticPrimary {
        fn backend_type(&self) -> BackendType {
            BackendType::Memstore
        }
        async fn disperse(&self, _blob: &[u8]) -> Result<Vec<u8>, ProxyError> {
            Ok(self.disperse_result.clone())
        }
        async fn get(&self, _cert_bytes: &[u8]) -> Result<Vec<u8>, ProxyError> {
            match self.get_result.lock().unwrap().take() {
                Some(Ok(bytes)) => Ok(bytes.to_vec()),
                Some(Err(e)) => Err(e),
                None => Err(ProxyError::NotFound),
            }
        }
        async fn verify(&self, _cert_bytes: &[u8], _blob: &[u8]) -> Result<(), ProxyError> {
            Ok(())
        }
    }

    struct InMemoryBackend {
        backend_type: BackendType,
        store: Mutex<HashMap<Vec<u8>, Bytes>>,
    }

    #[async_trait]
    impl Backend for InMemoryBackend {
        fn backend_type(&self) -> BackendType {
            self.backend_type
        }
        async fn put(&self, key: &[u8], value: Bytes) -> Result<(), ProxyError> {
            self.store.lock().unwrap().insert(key.to_vec(), value);
            Ok(())
        }
        async fn get(&self, key: &[u8]) -> Result<Bytes, ProxyError> {
            self.store.lock().unwrap().get(key).cloned().ok_or(ProxyError::NotFound)
        }
        async fn verify(&self, key: &[u8], value: &Bytes) -> Result<(), ProxyError> {
            if keccak256(value).as_slice() == key {
                Ok(())
            } else {
                Err(ProxyError::BadRequest("mismatch".into()))
            }
        }
    }

    fn secondaries(entries: Vec<(BackendType, Arc<InMemoryBackend>)>) -> HashMap<BackendType, Arc<dyn Backend>> {
        entries.into_iter().map(|(t, b)| (t, b as Arc<dyn Backend>)).collect()
    }

    #[tokio::test]
    async fn put_fans_out_to_cache_targets() {
        let redis = Arc::new(InMemoryBackend { backend_type: BackendType::Redis, store: Mutex::new(HashMap::new()) });
        let secondaries = secondaries(vec![(BackendType::Redis, redis.clone())]);
        let primary = Arc::new(StaticPrimary { disperse_result: vec![1, 2, 3], get_result: Mutex::new(None) });
        let config = SecondaryRouterConfig {
            cache_targets: vec![BackendType::Redis],
            fallback_targets: vec![],
            concurrent_write_threads: 0,
            write_queue_bound: 0,
        };
        let router = SecondaryRouter::new(primary, secondaries, config).unwrap();
        let cert = router.put(Bytes::from_static(b"blob")).await.unwrap();
        assert_eq!(cert, vec![1, 2, 3]);
        let key = keccak256(&cert).to_vec();
        assert_eq!(redis.store.lock().unwrap().get(&key).unwrap(), &Bytes::from_static(b"blob"));
    }

    #[tokio::test]
    async fn get_prefers_cache_hit_over_primary() {
        let redis = Arc::new(InMemoryBackend { backend_type: BackendType::Redis, store: Mutex::new(HashMap::new()) });
        let cert_bytes = vec![7u8; 4];
        let key = keccak256(&cert_bytes).to_vec();
        redis.store.lock().unwrap().insert(key, Bytes::from_static(b"cached"));
        let secondaries = secondaries(vec![(BackendType::Redis, redis)]);
        let primary = Arc::new(StaticPrimary {
            disperse_result: vec![],
            get_result: Mutex::new(Some(Err(ProxyError::Internal("should not be reached".into())))),
        });
        let config = SecondaryRouterConfig {
            cache_targets: vec![BackendType::Redis],
            fallback_targets: vec![],
            concurrent_write_threads: 0,
            write_queue_bound: 0,
        };
        let router = SecondaryRouter::new(primary, secondaries, config).unwrap();
        let value = router.get(&cert_bytes).await.unwrap();
        assert_eq!(value, Bytes::from_static(b"cached"));
    }

    #[tokio::test]
    async fn get_falls_back_on_primary_not_found() {
        let s3 = Arc::new(InMemoryBackend { backend_type: BackendType::S3, store: Mutex::new(HashMap::new()) });
        let cert_bytes = vec![9u8; 4];
        let key = keccak256(&cert_bytes).to_vec();
        s3.store.lock().unwrap().insert(key, Bytes::from_static(b"archived"));
        let secondaries = secondaries(vec![(BackendType::S3, s3)]);
        let primary = Arc::new(StaticPrimary {
            disperse_result: vec![],
            get_result: Mutex::new(Some(Err(ProxyError::NotFound))),
        });
        let config = SecondaryRouterConfig {
            cache_targets: vec![],
            fallback_targets: vec![BackendType::S3],
            concurrent_write_threads: 0,
            write_queue_bound: 0,
        };
        let router = SecondaryRouter::new(primary, secondaries, config).unwrap();
        let value = router.get(&cert_bytes).await.unwrap();
        assert_eq!(value, Bytes::from_static(b"archived"));
    }

    #[tokio::test]
    async fn get_surfaces_primary_error_when_nothing_else_hits() {
        let secondaries = HashMap::new();
        let primary = Arc::new(StaticPrimary {
            disperse_result: vec![],
            get_result: Mutex::new(Some(Err(ProxyError::NotFound))),
        });
        let config = SecondaryRouterConfig {
            cache_targets: vec![],
            fallback_targets: vec![],
            concurrent_write_threads: 0,
            write_queue_bound: 0,
        };
        let router = SecondaryRouter::new(primary, secondaries, config).unwrap();
        let err = router.get(&[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, ProxyError::NotFound));
    }
}
