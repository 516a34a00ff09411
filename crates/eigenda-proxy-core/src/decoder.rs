//! Decodes the raw cert bytes a primary hands back into the version-tagged
//! `Certificate` sum type the verify crate operates on.

use alloy_rlp::Decodable;
use eigenda_proxy_backend::CertDecoder;
use eigenda_proxy_types::cert::{CertV0, CertV1, CertV2};
use eigenda_proxy_types::{Certificate, CommitmentVersion, ProxyError};

pub struct RlpCertDecoder {
    pub version: CommitmentVersion,
}

impl CertDecoder for RlpCertDecoder {
    fn decode(&self, cert_bytes: &[u8]) -> Result<Certificate, ProxyError> {
        let mut buf = cert_bytes;
        let cert = match self.version {
            CommitmentVersion::V0 => {
                Certificate::V0(CertV0::decode(&mut buf).map_err(rlp_err)?)
            }
            CommitmentVersion::V1 => {
                Certificate::V1(CertV1::decode(&mut buf).map_err(rlp_err)?)
            }
            CommitmentVersion::V2 => {
                Certificate::V2(CertV2::decode(&mut buf).map_err(rlp_err)?)
            }
        };
        if !buf.is_empty() {
            return Err(ProxyError::BadRequest("trailing bytes after cert RLP".into()));
        }
        Ok(cert)
    }
}

fn rlp_err(e: alloy_rlp::Error) -> ProxyError {
    ProxyError::BadRequest(format!("malformed cert RLP: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::Encodable;

    #[test]
    fn rejects_trailing_garbage() {
        let cert = CertV0 {
            blob_header: eigenda_proxy_types::cert::BlobHeaderV0 {
                commitment: eigenda_proxy_types::cert::G1CommitmentV0 { x: [0u8; 32], y: [0u8; 32] },
                data_length: 0,
                blob_quorum_params: vec![],
            },
            blob_verification_proof: eigenda_proxy_types::cert::BlobVerificationProofV0 {
                batch_id: 0,
                blob_index: 0,
                batch_metadata: eigenda_proxy_types::cert::BatchMetadataV0 {
                    batch_header: eigenda_proxy_types::cert::BatchHeaderV0 {
                        batch_root: Default::default(),
                        quorum_numbers: Default::default(),
                        quorum_signed_percentages: Default::default(),
                        reference_block_number: 0,
                    },
                    signatory_record_hash: Default::default(),
                    fee: Default::default(),
                    confirmation_block_number: 0,
                    batch_header_hash: Default::default(),
                },
                inclusion_proof: Default::default(),
                quorum_indexes: Default::default(),
            },
        };
        let mut buf = Vec::new();
        cert.encode(&mut buf);
        buf.push(0xff);
        let decoder = RlpCertDecoder { version: CommitmentVersion::V0 };
        assert!(decoder.decode(&buf).is_err());
    }
}
