//! Primary wrapper that translates `(blob) <-> (cert)` against a remote
//! disperser and a per-version `CertVerifier`. The wire client for the
//! disperser itself is an external collaborator represented here only as a
//! trait -- concrete gRPC/HTTP plumbing lives outside this crate's scope.

use std::time::Duration;

use async_trait::async_trait;
use eigenda_proxy_types::{BackendType, Certificate, ProxyError};

use crate::PrimaryBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisperseStatus {
    Processing,
    Confirmed,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum DisperserError {
    #[error("transient disperser error: {0}")]
    Transient(String),
    #[error("disperser rejected the blob: {0}")]
    Rejected(String),
    #[error("disperser throttled the request")]
    Throttled,
    #[error("status query timed out")]
    Timeout,
}

impl DisperserError {
    fn is_retryable(&self) -> bool {
        matches!(self, DisperserError::Transient(_))
    }
}

/// The remote disperser's wire surface, reduced to what `EigenDABackend`
/// needs: submit a blob, poll its status, and retrieve a confirmed blob by
/// its serialized cert bytes.
#[async_trait]
pub trait DisperserClient: Send + Sync {
    async fn disperse_blob(&self, blob: &[u8]) -> Result<Vec<u8>, DisperserError>;
    async fn poll_status(&self, request_id: &[u8]) -> Result<DisperseStatus, DisperserError>;
    /// Once confirmed, builds the final serialized cert for `request_id`.
    async fn finalize_cert(&self, request_id: &[u8]) -> Result<Vec<u8>, DisperserError>;
    async fn retrieve_blob(&self, cert_bytes: &[u8]) -> Result<Vec<u8>, DisperserError>;
}

#[async_trait]
pub trait CertDecoder: Send + Sync {
    fn decode(&self, cert_bytes: &[u8]) -> Result<Certificate, ProxyError>;
}

#[async_trait]
pub trait LocalVerifier: Send + Sync {
    async fn verify(&self, cert: &Certificate, blob: &[u8]) -> Result<(), ProxyError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub status_poll_interval: Duration,
    pub status_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            status_poll_interval: Duration::from_secs(1),
            status_timeout: Duration::from_secs(60),
        }
    }
}

async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut f: F) -> Result<T, DisperserError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, DisperserError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempt + 1 < policy.max_attempts => {
                tokio::time::sleep(policy.base_delay * 2u32.pow(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn map_disperser_error(e: DisperserError) -> ProxyError {
    match e {
        DisperserError::Transient(msg) => ProxyError::Transient(msg),
        DisperserError::Rejected(msg) => ProxyError::BadRequest(msg),
        DisperserError::Throttled => ProxyError::Throttled,
        DisperserError::Timeout => ProxyError::Transient("status query timed out".into()),
    }
}

/// Primary EigenDA wrapper, parameterized over the disperser wire client, the
/// cert decoder for this version's wire format, and the local verifier.
pub struct EigenDABackend<D, C, V> {
    backend_type: BackendType,
    disperser: D,
    decoder: C,
    verifier: V,
    retry: RetryPolicy,
}

impl<D, C, V> EigenDABackend<D, C, V> {
    pub fn new(backend_type: BackendType, disperser: D, decoder: C, verifier: V, retry: RetryPolicy) -> Self {
        Self { backend_type, disperser, decoder, verifier, retry }
    }
}

#[async_trait]
impl<D, C, V> PrimaryBackend for EigenDABackend<D, C, V>
where
    D: DisperserClient,
    C: CertDecoder,
    V: LocalVerifier,
{
    fn backend_type(&self) -> BackendType {
        self.backend_type
    }

    async fn disperse(&self, blob: &[u8]) -> Result<Vec<u8>, ProxyError> {
        let request_id = with_retry(&self.retry, || self.disperser.disperse_blob(blob))
            .await
            .map_err(map_disperser_error)?;

        let deadline = tokio::time::Instant::now() + self.retry.status_timeout;
        loop {
            let status = with_retry(&self.retry, || self.disperser.poll_status(&request_id))
                .await
                .map_err(map_disperser_error)?;
            match status {
                DisperseStatus::Confirmed => break,
                DisperseStatus::Failed => {
                    return Err(ProxyError::BadRequest("disperser reported failed dispersal".into()))
                }
                DisperseStatus::Processing => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(ProxyError::Transient("status query timed out".into()));
                    }
                    tokio::time::sleep(self.retry.status_poll_interval).await;
                }
            }
        }

        let cert_bytes = with_retry(&self.retry, || self.disperser.finalize_cert(&request_id))
            .await
            .map_err(map_disperser_error)?;

        // A cert returned to a client always passes verification at issue
        // time -- fetch the blob back and verify before handing out the cert.
        let cert = self.decoder.decode(&cert_bytes)?;
        let fetched = with_retry(&self.retry, || self.disperser.retrieve_blob(&cert_bytes))
            .await
            .map_err(map_disperser_error)?;
        self.verifier.verify(&cert, &fetched).await?;

        Ok(cert_bytes)
    }

    async fn get(&self, cert_bytes: &[u8]) -> Result<Vec<u8>, ProxyError> {
        with_retry(&self.retry, || self.disperser.retrieve_blob(cert_bytes))
            .await
            .map_err(map_disperser_error)
    }

    async fn verify(&self, cert_bytes: &[u8], blob: &[u8]) -> Result<(), ProxyError> {
        let cert = self.decoder.decode(cert_bytes)?;
        self.verifier.verify(&cert, blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct FlakyDisperser {
        fail_first_n_disperses: AtomicU32,
        statuses: Mutex<Vec<DisperseStatus>>,
    }

    #[async_trait]
    impl DisperserClient for FlakyDisperser {
        async fn disperse_blob(&self, _blob: &[u8]) -> Result<Vec<u8>, DisperserError> {
            if self.fail_first_n_disperses.load(Ordering::SeqCst) > 0 {
                self.fail_first_n_disperses.fetch_sub(1, Ordering::SeqCst);
                return Err(DisperserError::Transient("temporarily unavailable".into()));
            }
            Ok(vec![1, 2, 3])
        }

        async fn poll_status(&self, _request_id: &[u8]) -> Result<DisperseStatus, DisperserError> {
            let mut statuses = self.statuses.lock().unwrap();
            Ok(statuses.pop().unwrap_or(DisperseStatus::Confirmed))
        }

        async fn finalize_cert(&self, _request_id: &[u8]) -> Result<Vec<u8>, DisperserError> {
            Ok(vec![9, 9, 9])
        }

        async fn retrieve_blob(&self, _cert_bytes: &[u8]) -> Result<Vec<u8>, DisperserError> {
            Ok(b"the blob".to_vec())
        }
    }

    struct AlwaysV0 {}
    impl CertDecoder for AlwaysV0 {
        fn decode(&self, _cert_bytes: &[u8]) -> Result<Certificate, ProxyError> {
            Err(ProxyError::Internal("not exercised by this test".into()))
        }
    }

    struct AcceptAll {}
    #[async_trait]
    impl LocalVerifier for AcceptAll {
        async fn verify(&self, _cert: &Certificate, _blob: &[u8]) -> Result<(), ProxyError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn transient_disperse_failure_is_retried() {
        let disperser = FlakyDisperser {
            fail_first_n_disperses: AtomicU32::new(2),
            statuses: Mutex::new(vec![]),
        };
        let backend = EigenDABackend::new(
            BackendType::EigenDAV2,
            disperser,
            AlwaysV0 {},
            AcceptAll {},
            RetryPolicy { max_attempts: 5, base_delay: Duration::from_millis(1), ..RetryPolicy::default() },
        );
        // finalize_cert decodes via AlwaysV0, which always errors -- so we
        // only assert the retry loop gets past disperse_blob without being
        // short-circuited by the first two transient failures.
        let err = backend.disperse(b"hi").await.unwrap_err();
        assert!(matches!(err, ProxyError::Internal(_)));
    }

    #[tokio::test]
    async fn exhausting_retries_surfaces_transient_error() {
        let disperser = FlakyDisperser {
            fail_first_n_disperses: AtomicU32::new(10),
            statuses: Mutex::new(vec![]),
        };
        let backend = EigenDABackend::new(
            BackendType::EigenDAV1,
            disperser,
            AlwaysV0 {},
            AcceptAll {},
            RetryPolicy { max_attempts: 3, base_delay: Duration::from_millis(1), ..RetryPolicy::default() },
        );
        let err = backend.disperse(b"hi").await.unwrap_err();
        assert!(matches!(err, ProxyError::Transient(_)));
    }
}
