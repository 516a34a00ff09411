//! Top-level orchestrator: wraps a `SecondaryRouter` with commitment-envelope
//! framing so callers move blobs in and out by envelope bytes alone.

use eigenda_proxy_backend::PrimaryBackend;
use eigenda_proxy_codec::{decode, encode, ErrInvalidCommitment};
use eigenda_proxy_router::SecondaryRouter;
use eigenda_proxy_types::{Blob, CertEncoding, CommitmentMode, CommitmentVersion, DecodedEnvelope, ProxyError};

#[derive(Debug, Clone)]
pub struct StorageManagerConfig {
    pub mode: CommitmentMode,
    pub version: CommitmentVersion,
    pub encoding: CertEncoding,
    /// Upper bound on PUT size, in bytes. Constrained by the trusted-setup
    /// SRS (see `eigenda_proxy_types::max_blob_bytes`).
    pub max_blob_bytes: u64,
}

/// `Put`/`Get`/`HealthCheck` against a single configured primary version.
/// The active version and commitment mode are fixed at construction --
/// switching versions means standing up a new `StorageManager`.
pub struct StorageManager<P> {
    router: SecondaryRouter<P>,
    config: StorageManagerConfig,
}

impl<P: PrimaryBackend> StorageManager<P> {
    pub fn new(router: SecondaryRouter<P>, config: StorageManagerConfig) -> Self {
        Self { router, config }
    }

    /// Disperses `blob` to the primary, fans it out to cache-tier
    /// secondaries, and returns the framed commitment envelope. Rejects an
    /// oversize blob before the primary is ever contacted.
    pub async fn put(&self, blob: Blob) -> Result<Vec<u8>, ProxyError> {
        if blob.len() as u64 > self.config.max_blob_bytes {
            return Err(ProxyError::BadRequest(format!(
                "blob of {} bytes is larger than max {} bytes",
                blob.len(),
                self.config.max_blob_bytes
            )));
        }
        let cert_bytes = self.router.put(blob).await?;
        Ok(encode(self.config.mode, self.config.version, self.config.encoding, &cert_bytes))
    }

    /// Unframes `envelope`, then resolves the underlying blob through the
    /// cache/primary/fallback chain.
    pub async fn get(&self, envelope: &[u8]) -> Result<Blob, ProxyError> {
        let cert_bytes = self.unframe(envelope)?;
        self.router.get(&cert_bytes).await
    }

    pub async fn health_check(&self) -> Result<(), ProxyError> {
        self.router.health_check().await
    }

    fn unframe(&self, envelope: &[u8]) -> Result<Vec<u8>, ProxyError> {
        match decode(self.config.mode, envelope).map_err(map_commitment_err)? {
            DecodedEnvelope::Cert { payload, .. } => Ok(payload),
            DecodedEnvelope::KeccakKey { key } => Ok(key.to_vec()),
        }
    }
}

fn map_commitment_err(e: ErrInvalidCommitment) -> ProxyError {
    ProxyError::BadRequest(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;
    use eigenda_proxy_backend::MemstoreBackend;
    use eigenda_proxy_router::SecondaryRouterConfig;
    use eigenda_proxy_types::BackendType;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn manager(mode: CommitmentMode) -> StorageManager<MemstoreBackend> {
        let primary = Arc::new(MemstoreBackend::default());
        let router = SecondaryRouter::new(
            primary,
            HashMap::new(),
            SecondaryRouterConfig {
                cache_targets: vec![],
                fallback_targets: vec![],
                concurrent_write_threads: 0,
                write_queue_bound: 0,
            },
        )
        .unwrap();
        StorageManager::new(
            router,
            StorageManagerConfig {
                mode,
                version: CommitmentVersion::V0,
                encoding: CertEncoding::Rlp,
                max_blob_bytes: 1024,
            },
        )
    }

    #[tokio::test]
    async fn standard_put_get_round_trips() {
        let manager = manager(CommitmentMode::Standard);
        let envelope = manager.put(Bytes::from_static(b"hello world")).await.unwrap();
        let blob = manager.get(&envelope).await.unwrap();
        assert_eq!(blob, Bytes::from_static(b"hello world"));
    }

    #[tokio::test]
    async fn optimism_keccak_put_get_round_trips() {
        let manager = manager(CommitmentMode::OptimismKeccak);
        let envelope = manager.put(Bytes::from_static(b"op blob")).await.unwrap();
        assert_eq!(envelope.len(), 33);
        let blob = manager.get(&envelope).await.unwrap();
        assert_eq!(blob, Bytes::from_static(b"op blob"));
    }

    #[tokio::test]
    async fn malformed_envelope_is_bad_request() {
        let manager = manager(CommitmentMode::Standard);
        let err = manager.get(&[9u8, 1, 2]).await.unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }

    #[tokio::test]
    async fn oversize_blob_is_rejected_before_dispersing() {
        let manager = manager(CommitmentMode::Standard);
        let blob = Bytes::from(vec![0u8; 2048]);
        let err = manager.put(blob).await.unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest(_)));
    }
}
