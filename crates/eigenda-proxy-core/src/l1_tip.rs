//! Supplies the current L1 block height to the V1/V2 recency check. Kept
//! separate from the narrow on-chain verifier interface in the verify crate
//! since fetching the tip is an ordinary RPC call, not a contract read.

use alloy_provider::Provider;
use async_trait::async_trait;
use eigenda_proxy_types::ProxyError;

#[async_trait]
pub trait L1TipProvider: Send + Sync {
    async fn l1_tip(&self) -> Result<u64, ProxyError>;
}

#[async_trait]
impl<P> L1TipProvider for P
where
    P: Provider + Send + Sync,
{
    async fn l1_tip(&self) -> Result<u64, ProxyError> {
        self.get_block_number()
            .await
            .map_err(|e| ProxyError::Transient(e.to_string()))
    }
}
