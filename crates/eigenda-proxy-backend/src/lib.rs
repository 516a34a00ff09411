//! Backend capability traits and concrete implementations: two primaries'
//! worth of disperser wiring, one in-memory test double, and three secondary
//! cache/fallback drivers.

pub mod disperser;
pub mod kv;
pub mod memstore;
pub mod redis_backend;
pub mod s3;

pub use disperser::{CertDecoder, DisperserClient, DisperserError, EigenDABackend, LocalVerifier, RetryPolicy};
pub use kv::KvBackend;
pub use memstore::{MemstoreBackend, MemstoreRuntimeConfig};
pub use redis_backend::RedisBackend;
pub use s3::S3Backend;

use alloy_primitives::Bytes;
use async_trait::async_trait;
use eigenda_proxy_types::{BackendType, ProxyError};

/// Secondary-backend capability: keyed put/get/verify against an
/// externally-addressed store. `key` is a canonical digest of the cert, not
/// derived from the backend itself.
#[async_trait]
pub trait Backend: Send + Sync {
    fn backend_type(&self) -> BackendType;
    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), ProxyError>;
    async fn get(&self, key: &[u8]) -> Result<Bytes, ProxyError>;
    /// Integrity check against the key, e.g. `keccak256(value) == key`.
    async fn verify(&self, key: &[u8], value: &Bytes) -> Result<(), ProxyError>;
    /// Cheap reachability probe. Default no-op for backends with nothing
    /// worth pinging separately from a real put/get.
    async fn health_check(&self) -> Result<(), ProxyError> {
        Ok(())
    }
}

/// Primary-backend capability: blobs go in, opaque serialized cert bytes
/// come out. The cert's internal shape (RLP/ABI, V0/V1/V2) is a concern of
/// the verifier crate, not this trait -- `disperse`/`get` only move bytes.
#[async_trait]
pub trait PrimaryBackend: Send + Sync {
    fn backend_type(&self) -> BackendType;
    async fn disperse(&self, blob: &[u8]) -> Result<Vec<u8>, ProxyError>;
    async fn get(&self, cert_bytes: &[u8]) -> Result<Vec<u8>, ProxyError>;
    async fn verify(&self, cert_bytes: &[u8], blob: &[u8]) -> Result<(), ProxyError>;
    async fn health_check(&self) -> Result<(), ProxyError> {
        Ok(())
    }
}
