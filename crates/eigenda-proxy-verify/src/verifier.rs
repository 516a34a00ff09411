//! Per-version certificate verification: KZG commitment equality, Merkle
//! inclusion, and the on-chain batch-metadata / cert-verifier cross-check.

use alloy_primitives::{keccak256, Bytes};
use alloy_rlp::{Encodable, RlpEncodable};
use async_trait::async_trait;
use eigenda_proxy_types::cert::{BatchHeaderV0, CertV0, CertV1, CertV2};
use eigenda_proxy_types::{Certificate, DerivationErrorBody, ProxyError};

use crate::chain::{ChainClient, ConfirmationDepth};
use crate::kzg::{self, KzgConfig};
use crate::merkle;

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Blocks to wait past the included block before reading
    /// `batchIdToBatchMetadataHash`. Negative values are aliased to
    /// "wait for finality" at the config layer before reaching here.
    pub confirmation_depth: ConfirmationDepth,
    /// V1/V2 recency bound, in L1 blocks, on `tip - referenceBlockNumber`.
    pub rbn_recency_window: u64,
    pub kzg: KzgConfig,
}

#[async_trait]
pub trait CertVerifier: Send + Sync {
    /// Verifies `cert` against `blob`. `l1_tip` is the caller-supplied
    /// current L1 block height, used only by the V1/V2 recency check.
    async fn verify(&self, cert: &Certificate, blob: &[u8], l1_tip: u64) -> Result<(), ProxyError>;
}

#[derive(RlpEncodable)]
struct BatchMetadataPreimage {
    batch_header: BatchHeaderV0,
    signatory_record_hash: Bytes,
    confirmation_block_number: u32,
}

pub struct V0Verifier<C> {
    chain: C,
    cfg: VerifierConfig,
}

impl<C: ChainClient> V0Verifier<C> {
    pub fn new(chain: C, cfg: VerifierConfig) -> Self {
        Self { chain, cfg }
    }
}

#[async_trait]
impl<C: ChainClient> CertVerifier for V0Verifier<C> {
    async fn verify(&self, cert: &Certificate, blob: &[u8], _l1_tip: u64) -> Result<(), ProxyError> {
        let Certificate::V0(cert) = cert else {
            return Err(ProxyError::Internal("V0Verifier given a non-V0 cert".into()));
        };
        verify_v0(&self.chain, &self.cfg, cert, blob).await
    }
}

async fn verify_v0<C: ChainClient>(
    chain: &C,
    cfg: &VerifierConfig,
    cert: &CertV0,
    blob: &[u8],
) -> Result<(), ProxyError> {
    let proof = &cert.blob_verification_proof;
    let metadata = &proof.batch_metadata;

    let preimage = BatchMetadataPreimage {
        batch_header: metadata.batch_header.clone(),
        signatory_record_hash: metadata.signatory_record_hash.clone(),
        confirmation_block_number: metadata.confirmation_block_number,
    };
    let mut buf = Vec::new();
    preimage.encode(&mut buf);
    let computed = keccak256(&buf);

    let onchain = chain
        .batch_id_to_batch_metadata_hash(proof.batch_id, cfg.confirmation_depth)
        .await
        .map_err(|e| ProxyError::Transient(e.to_string()))?;

    if onchain != computed {
        return Err(ProxyError::BatchHashMismatch {
            onchain: onchain.to_string(),
            computed: computed.to_string(),
        });
    }

    let mut leaf_bytes = Vec::new();
    cert.blob_header.encode(&mut leaf_bytes);
    let leaf = *keccak256(&leaf_bytes);
    let root: [u8; 32] = metadata
        .batch_header
        .batch_root
        .as_ref()
        .try_into()
        .map_err(|_| ProxyError::Internal("batch root is not 32 bytes".into()))?;

    if !merkle::verify_inclusion(leaf, proof.blob_index, &proof.inclusion_proof, root) {
        return Err(ProxyError::CertInvalid(DerivationErrorBody {
            status_code: 1,
            msg: "merkle inclusion proof failed".into(),
        }));
    }

    let commitment = &cert.blob_header.commitment;
    let claimed = (
        alloy_primitives::U256::from_be_bytes(commitment.x),
        alloy_primitives::U256::from_be_bytes(commitment.y),
    );
    let matches = kzg::commitment_matches_blob(blob, claimed, &cfg.kzg)
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    if !matches {
        return Err(ProxyError::CertInvalid(DerivationErrorBody {
            status_code: 2,
            msg: "kzg commitment does not match blob".into(),
        }));
    }

    Ok(())
}

pub struct V1V2Verifier<C> {
    chain: C,
    cfg: VerifierConfig,
}

impl<C: ChainClient> V1V2Verifier<C> {
    pub fn new(chain: C, cfg: VerifierConfig) -> Self {
        Self { chain, cfg }
    }
}

#[async_trait]
impl<C: ChainClient> CertVerifier for V1V2Verifier<C> {
    async fn verify(&self, cert: &Certificate, blob: &[u8], l1_tip: u64) -> Result<(), ProxyError> {
        match cert {
            Certificate::V1(c) => verify_v1_v2(&self.chain, &self.cfg, c.clone().into(), blob, l1_tip).await,
            Certificate::V2(c) => verify_v1_v2(&self.chain, &self.cfg, c.clone().into(), blob, l1_tip).await,
            Certificate::V0(_) => Err(ProxyError::Internal("V1V2Verifier given a V0 cert".into())),
        }
    }
}

/// V1 and V2 carry an identical cert body; only the commitment envelope's
/// version byte tells them apart. Normalize to one shape before verifying.
struct NormalizedV2 {
    batch_header: eigenda_proxy_types::cert::BatchHeaderV2,
    blob_inclusion_info: eigenda_proxy_types::cert::BlobInclusionInfo,
    nonsigner_stake_and_signature: eigenda_proxy_types::cert::NonSignerStakesAndSignature,
}

impl From<CertV1> for NormalizedV2 {
    fn from(c: CertV1) -> Self {
        NormalizedV2 {
            batch_header: c.batch_header,
            blob_inclusion_info: c.blob_inclusion_info,
            nonsigner_stake_and_signature: c.nonsigner_stake_and_signature,
        }
    }
}

impl From<CertV2> for NormalizedV2 {
    fn from(c: CertV2) -> Self {
        NormalizedV2 {
            batch_header: c.batch_header,
            blob_inclusion_info: c.blob_inclusion_info,
            nonsigner_stake_and_signature: c.nonsigner_stake_and_signature,
        }
    }
}

async fn verify_v1_v2<C: ChainClient>(
    chain: &C,
    cfg: &VerifierConfig,
    cert: NormalizedV2,
    blob: &[u8],
    l1_tip: u64,
) -> Result<(), ProxyError> {
    let commitment = &cert
        .blob_inclusion_info
        .blob_certificate
        .blob_header
        .commitment
        .commitment;
    let matches = kzg::commitment_matches_blob(blob, (commitment.x, commitment.y), &cfg.kzg)
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    if !matches {
        return Err(ProxyError::CertInvalid(DerivationErrorBody {
            status_code: 2,
            msg: "kzg commitment does not match blob".into(),
        }));
    }

    let mut leaf_bytes = Vec::new();
    cert.blob_inclusion_info
        .blob_certificate
        .blob_header
        .encode(&mut leaf_bytes);
    let leaf = *keccak256(&leaf_bytes);

    if !merkle::verify_inclusion(
        leaf,
        cert.blob_inclusion_info.blob_index,
        &cert.blob_inclusion_info.inclusion_proof,
        cert.batch_header.batch_root,
    ) {
        return Err(ProxyError::CertInvalid(DerivationErrorBody {
            status_code: 1,
            msg: "merkle inclusion proof failed".into(),
        }));
    }

    let rbn = cert.batch_header.reference_block_number as u64;
    if !rbn_within_recency(rbn, l1_tip, cfg.rbn_recency_window) {
        return Err(ProxyError::RbnRecency {
            msg: format!(
                "reference block {rbn} outside recency window {} of l1 tip {l1_tip}",
                cfg.rbn_recency_window
            ),
        });
    }

    let batch_header: crate::chain::SolBatchHeaderV2 = cert.batch_header.into();
    let blob_inclusion_info: crate::chain::SolBlobInclusionInfo = cert.blob_inclusion_info.into();
    let nonsigner: crate::chain::SolNonSignerStakesAndSignature =
        cert.nonsigner_stake_and_signature.into();

    let status = chain
        .verify_cert_v2(batch_header, blob_inclusion_info, nonsigner)
        .await
        .map_err(|e| ProxyError::Transient(e.to_string()))?;

    if status != 0 {
        return Err(ProxyError::CertInvalid(DerivationErrorBody {
            status_code: status as i32,
            msg: format!("on-chain cert verifier returned status {status}"),
        }));
    }

    Ok(())
}

/// `tip - RBN > window` fails the check. A cert from the future (`RBN > tip`)
/// is never stale, so saturating subtraction is the correct direction here.
fn rbn_within_recency(rbn: u64, l1_tip: u64, window: u64) -> bool {
    l1_tip.saturating_sub(rbn) <= window
}
