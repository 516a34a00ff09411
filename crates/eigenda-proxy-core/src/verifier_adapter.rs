//! Bridges the verify crate's explicit-`l1_tip` `CertVerifier` to the
//! ambient `LocalVerifier` shape `EigenDABackend` expects.

use async_trait::async_trait;
use eigenda_proxy_backend::LocalVerifier;
use eigenda_proxy_types::{Certificate, ProxyError};
use eigenda_proxy_verify::CertVerifier;

use crate::l1_tip::L1TipProvider;

pub struct LiveVerifier<V, T> {
    verifier: V,
    tip: T,
}

impl<V, T> LiveVerifier<V, T> {
    pub fn new(verifier: V, tip: T) -> Self {
        Self { verifier, tip }
    }
}

#[async_trait]
impl<V, T> LocalVerifier for LiveVerifier<V, T>
where
    V: CertVerifier,
    T: L1TipProvider,
{
    async fn verify(&self, cert: &Certificate, blob: &[u8]) -> Result<(), ProxyError> {
        let l1_tip = self.tip.l1_tip().await?;
        self.verifier.verify(cert, blob, l1_tip).await
    }
}
