//! Certificate data model.
//!
//! `CertV0` mirrors the EigenDA-V1-protocol receipt (Merkle batch root +
//! confirmation block number). `CertV1`/`CertV2` mirror the EigenDA-V2-protocol
//! receipt (reference block number, non-signer stakes). `CertV2` and `CertV1`
//! share a wire shape; callers distinguish them only through the commitment
//! envelope's version byte, never through the cert bytes themselves.

use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_rlp::{Encodable, RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

/// A point on the BN254 G1 curve.
#[derive(Debug, Clone, Copy, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct G1Point {
    pub x: U256,
    pub y: U256,
}

/// A point on the BN254 G2 curve.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct G2Point {
    pub x: Vec<U256>,
    pub y: Vec<U256>,
}

/// KZG commitment plus the length proof carried in a blob header.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobCommitment {
    pub commitment: G1Point,
    pub length_commitment: G2Point,
    pub length_proof: G2Point,
    pub length: u32,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobHeaderV2 {
    pub version: u16,
    pub quorum_numbers: Bytes,
    pub commitment: BlobCommitment,
    pub payment_header_hash: [u8; 32],
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobCertificate {
    pub blob_header: BlobHeaderV2,
    pub signature: Bytes,
    pub relay_keys: Vec<u32>,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInclusionInfo {
    pub blob_certificate: BlobCertificate,
    pub blob_index: u32,
    pub inclusion_proof: Bytes,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeaderV2 {
    pub batch_root: [u8; 32],
    pub reference_block_number: u32,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonSignerStakesAndSignature {
    pub non_signer_quorum_bitmap_indices: Vec<u32>,
    pub non_signer_pubkeys: Vec<G1Point>,
    pub quorum_apks: Vec<G1Point>,
    pub apk_g2: G2Point,
    pub sigma: G1Point,
    pub quorum_apk_indices: Vec<u32>,
    pub total_stake_indices: Vec<u32>,
    pub non_signer_stake_indices: Vec<Vec<u32>>,
}

/// EigenDA-V2-protocol certificate, commitment version V1.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Serialize, Deserialize)]
pub struct CertV1 {
    pub blob_inclusion_info: BlobInclusionInfo,
    pub batch_header: BatchHeaderV2,
    pub nonsigner_stake_and_signature: NonSignerStakesAndSignature,
    pub signed_quorum_numbers: Bytes,
}

/// EigenDA-V2-protocol certificate, commitment version V2 (adds the encoding
/// byte at the envelope level; the cert body is otherwise identical to V1).
#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Serialize, Deserialize)]
pub struct CertV2 {
    pub batch_header: BatchHeaderV2,
    pub blob_inclusion_info: BlobInclusionInfo,
    pub nonsigner_stake_and_signature: NonSignerStakesAndSignature,
    pub signed_quorum_numbers: Bytes,
}

impl CertV1 {
    pub fn reference_block_number(&self) -> u64 {
        self.batch_header.reference_block_number as u64
    }
}

impl CertV2 {
    pub fn reference_block_number(&self) -> u64 {
        self.batch_header.reference_block_number as u64
    }
}

// --- EigenDA-V1-protocol certificate (commitment version V0) ---

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct G1CommitmentV0 {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobQuorumParam {
    pub quorum_number: u32,
    pub adversary_threshold_percentage: u32,
    pub confirmation_threshold_percentage: u32,
    pub chunk_length: u32,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobHeaderV0 {
    pub commitment: G1CommitmentV0,
    pub data_length: u32,
    pub blob_quorum_params: Vec<BlobQuorumParam>,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeaderV0 {
    pub batch_root: Bytes,
    pub quorum_numbers: Bytes,
    pub quorum_signed_percentages: Bytes,
    pub reference_block_number: u32,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadataV0 {
    pub batch_header: BatchHeaderV0,
    pub signatory_record_hash: Bytes,
    pub fee: Bytes,
    pub confirmation_block_number: u32,
    pub batch_header_hash: Bytes,
}

#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobVerificationProofV0 {
    pub batch_id: u32,
    pub blob_index: u32,
    pub batch_metadata: BatchMetadataV0,
    pub inclusion_proof: Bytes,
    pub quorum_indexes: Bytes,
}

/// EigenDA-V1-protocol certificate, commitment version V0.
#[derive(Debug, Clone, RlpEncodable, RlpDecodable, PartialEq, Serialize, Deserialize)]
pub struct CertV0 {
    pub blob_header: BlobHeaderV0,
    pub blob_verification_proof: BlobVerificationProofV0,
}

impl CertV0 {
    pub fn batch_id(&self) -> u32 {
        self.blob_verification_proof.batch_id
    }

    pub fn confirmation_block_number(&self) -> u32 {
        self.blob_verification_proof
            .batch_metadata
            .confirmation_block_number
    }
}

/// The version-tagged sum type every certificate is modeled as. `Verify`
/// dispatches on this tag rather than on open-ended polymorphism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Certificate {
    V0(CertV0),
    V1(CertV1),
    V2(CertV2),
}

impl Certificate {
    /// Canonical fingerprint used as the cache-tier key. Never derived from
    /// the blob contents, only from the serialized cert.
    pub fn to_digest(&self) -> B256 {
        let mut buf = Vec::new();
        match self {
            Certificate::V0(c) => c.encode(&mut buf),
            Certificate::V1(c) => c.encode(&mut buf),
            Certificate::V2(c) => c.encode(&mut buf),
        }
        keccak256(&buf)
    }

    pub fn reference_block_number(&self) -> Option<u64> {
        match self {
            Certificate::V0(_) => None,
            Certificate::V1(c) => Some(c.reference_block_number()),
            Certificate::V2(c) => Some(c.reference_block_number()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_v1() -> CertV1 {
        CertV1 {
            blob_inclusion_info: BlobInclusionInfo {
                blob_certificate: BlobCertificate {
                    blob_header: BlobHeaderV2 {
                        version: 0,
                        quorum_numbers: Bytes::from_static(&[0, 1]),
                        commitment: BlobCommitment {
                            commitment: G1Point { x: U256::from(1), y: U256::from(2) },
                            length_commitment: G2Point { x: vec![U256::ZERO; 2], y: vec![U256::ZERO; 2] },
                            length_proof: G2Point { x: vec![U256::ZERO; 2], y: vec![U256::ZERO; 2] },
                            length: 4,
                        },
                        payment_header_hash: [0u8; 32],
                    },
                    signature: Bytes::new(),
                    relay_keys: vec![0],
                },
                blob_index: 3,
                inclusion_proof: Bytes::new(),
            },
            batch_header: BatchHeaderV2 { batch_root: [1u8; 32], reference_block_number: 42 },
            nonsigner_stake_and_signature: NonSignerStakesAndSignature {
                non_signer_quorum_bitmap_indices: vec![],
                non_signer_pubkeys: vec![],
                quorum_apks: vec![],
                apk_g2: G2Point { x: vec![U256::ZERO; 2], y: vec![U256::ZERO; 2] },
                sigma: G1Point { x: U256::ZERO, y: U256::ZERO },
                quorum_apk_indices: vec![],
                total_stake_indices: vec![],
                non_signer_stake_indices: vec![],
            },
            signed_quorum_numbers: Bytes::from_static(&[0]),
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let cert = Certificate::V1(sample_v1());
        assert_eq!(cert.to_digest(), cert.to_digest());
    }

    #[test]
    fn rbn_present_only_on_v1_v2() {
        assert_eq!(Certificate::V1(sample_v1()).reference_block_number(), Some(42));
    }
}
