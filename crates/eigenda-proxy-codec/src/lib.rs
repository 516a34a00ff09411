//! Bidirectional framing of the commitment envelope:
//! `mode x version x encoding x payload`.
//!
//! | Mode | Byte layout |
//! |---|---|
//! | Standard | `version . [encoding?] . payload` |
//! | OptimismGeneric | `altDA(0x01) . daSvc(0x00) . version . [encoding?] . payload` |
//! | OptimismKeccak | `keccak(0x00) . keccak256(blob)` |

use alloy_primitives::keccak256;
use eigenda_proxy_types::{CertEncoding, CommitmentMode, CommitmentVersion, DecodedEnvelope};
use thiserror::Error;

/// Optimism alt-DA commitment-type byte: 0 selects keccak mode, 1 selects a
/// DA-service-backed commitment (Standard/OptimismGeneric here).
const OPTIMISM_COMMITMENT_TYPE_KECCAK: u8 = 0x00;
const OPTIMISM_COMMITMENT_TYPE_DA_SERVICE: u8 = 0x01;
/// `daSvc` byte identifying EigenDA among alt-DA providers.
const OPTIMISM_DA_LAYER_EIGENDA: u8 = 0x00;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrInvalidCommitment {
    #[error("envelope shorter than the minimum length for its claimed prefix")]
    TooShort,
    #[error("unknown commitment mode byte {0:#04x}")]
    UnknownMode(u8),
    #[error("unknown commitment version byte {0:#04x}")]
    UnknownVersion(u8),
    #[error("version >= V2 requires an encoding byte, none present")]
    MissingEncoding,
    #[error("unknown encoding byte {0:#04x}")]
    UnknownEncoding(u8),
    #[error("optimism_keccak256 payload must be exactly 32 bytes, got {0}")]
    BadKeccakPayloadLength(usize),
}

/// Encodes a serialized cert (or, for keccak mode, the raw blob) into the
/// on-wire commitment envelope. Pure function of its inputs.
pub fn encode(
    mode: CommitmentMode,
    version: CommitmentVersion,
    encoding: CertEncoding,
    payload: &[u8],
) -> Vec<u8> {
    match mode {
        CommitmentMode::OptimismKeccak => {
            let digest = keccak256(payload);
            let mut out = Vec::with_capacity(33);
            out.push(OPTIMISM_COMMITMENT_TYPE_KECCAK);
            out.extend_from_slice(digest.as_slice());
            out
        }
        CommitmentMode::Standard | CommitmentMode::OptimismGeneric => {
            let mut out = Vec::with_capacity(payload.len() + 4);
            if mode == CommitmentMode::OptimismGeneric {
                out.push(OPTIMISM_COMMITMENT_TYPE_DA_SERVICE);
                out.push(OPTIMISM_DA_LAYER_EIGENDA);
            }
            out.push(version as u8);
            if version.requires_encoding_byte() {
                out.push(encoding as u8);
            }
            out.extend_from_slice(payload);
            out
        }
    }
}

/// Decodes an on-wire commitment envelope, validating the prefix framing.
pub fn decode(mode: CommitmentMode, envelope: &[u8]) -> Result<DecodedEnvelope, ErrInvalidCommitment> {
    match mode {
        CommitmentMode::OptimismKeccak => {
            if envelope.len() != 33 {
                return Err(ErrInvalidCommitment::TooShort);
            }
            if envelope[0] != OPTIMISM_COMMITMENT_TYPE_KECCAK {
                return Err(ErrInvalidCommitment::UnknownMode(envelope[0]));
            }
            let rest = &envelope[1..];
            if rest.len() != 32 {
                return Err(ErrInvalidCommitment::BadKeccakPayloadLength(rest.len()));
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(rest);
            Ok(DecodedEnvelope::KeccakKey { key })
        }
        CommitmentMode::Standard => decode_cert_framed(mode, envelope),
        CommitmentMode::OptimismGeneric => {
            if envelope.len() < 2 {
                return Err(ErrInvalidCommitment::TooShort);
            }
            if envelope[0] != OPTIMISM_COMMITMENT_TYPE_DA_SERVICE {
                return Err(ErrInvalidCommitment::UnknownMode(envelope[0]));
            }
            if envelope[1] != OPTIMISM_DA_LAYER_EIGENDA {
                return Err(ErrInvalidCommitment::UnknownMode(envelope[1]));
            }
            decode_cert_framed(mode, &envelope[2..])
        }
    }
}

fn decode_cert_framed(
    mode: CommitmentMode,
    stripped: &[u8],
) -> Result<DecodedEnvelope, ErrInvalidCommitment> {
    if stripped.is_empty() {
        return Err(ErrInvalidCommitment::TooShort);
    }
    let version = CommitmentVersion::try_from(stripped[0])
        .map_err(ErrInvalidCommitment::UnknownVersion)?;

    let mut offset = 1;
    let encoding = if version.requires_encoding_byte() {
        let byte = *stripped.get(offset).ok_or(ErrInvalidCommitment::MissingEncoding)?;
        offset += 1;
        CertEncoding::try_from(byte).map_err(ErrInvalidCommitment::UnknownEncoding)?
    } else {
        CertEncoding::Rlp
    };

    Ok(DecodedEnvelope::Cert {
        mode,
        version,
        encoding,
        payload: stripped[offset..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_v0_roundtrip() {
        let payload = vec![1, 2, 3, 4, 5];
        let env = encode(CommitmentMode::Standard, CommitmentVersion::V0, CertEncoding::Rlp, &payload);
        assert_eq!(env[0], 0);
        let decoded = decode(CommitmentMode::Standard, &env).unwrap();
        assert_eq!(
            decoded,
            DecodedEnvelope::Cert {
                mode: CommitmentMode::Standard,
                version: CommitmentVersion::V0,
                encoding: CertEncoding::Rlp,
                payload,
            }
        );
    }

    #[test]
    fn v2_carries_encoding_byte() {
        let payload = vec![9, 9, 9];
        let env = encode(CommitmentMode::Standard, CommitmentVersion::V2, CertEncoding::Abi, &payload);
        assert_eq!(env.len(), payload.len() + 2);
        let decoded = decode(CommitmentMode::Standard, &env).unwrap();
        assert_eq!(
            decoded,
            DecodedEnvelope::Cert {
                mode: CommitmentMode::Standard,
                version: CommitmentVersion::V2,
                encoding: CertEncoding::Abi,
                payload,
            }
        );
    }

    #[test]
    fn v2_missing_encoding_byte_rejected() {
        let env = vec![2u8]; // version byte only, no encoding, no payload
        let err = decode(CommitmentMode::Standard, &env).unwrap_err();
        assert_eq!(err, ErrInvalidCommitment::MissingEncoding);
    }

    #[test]
    fn optimism_generic_strips_framing_bytes_in_order() {
        let payload = vec![7, 7];
        let env = encode(CommitmentMode::OptimismGeneric, CommitmentVersion::V1, CertEncoding::Rlp, &payload);
        assert_eq!(&env[0..2], &[0x01, 0x00]);
        let decoded = decode(CommitmentMode::OptimismGeneric, &env).unwrap();
        assert_eq!(
            decoded,
            DecodedEnvelope::Cert {
                mode: CommitmentMode::OptimismGeneric,
                version: CommitmentVersion::V1,
                encoding: CertEncoding::Rlp,
                payload,
            }
        );
    }

    #[test]
    fn optimism_generic_rejects_wrong_da_layer_byte() {
        let mut env = encode(CommitmentMode::OptimismGeneric, CommitmentVersion::V1, CertEncoding::Rlp, &[1]);
        env[1] = 0x05;
        let err = decode(CommitmentMode::OptimismGeneric, &env).unwrap_err();
        assert_eq!(err, ErrInvalidCommitment::UnknownMode(0x05));
    }

    #[test]
    fn keccak_mode_recomputes_digest() {
        let blob = b"I am a blob and I only live for 14 days on EigenDA";
        let env = encode(CommitmentMode::OptimismKeccak, CommitmentVersion::V0, CertEncoding::Rlp, blob);
        assert_eq!(env.len(), 33);
        let decoded = decode(CommitmentMode::OptimismKeccak, &env).unwrap();
        let DecodedEnvelope::KeccakKey { key } = decoded else {
            panic!("expected KeccakKey");
        };
        assert_eq!(key, *keccak256(blob));
    }

    #[test]
    fn keccak_mode_rejects_wrong_length() {
        let err = decode(CommitmentMode::OptimismKeccak, &[0u8; 10]).unwrap_err();
        assert_eq!(err, ErrInvalidCommitment::TooShort);
    }

    #[test]
    fn unknown_version_rejected() {
        let env = vec![9u8, 1, 2, 3];
        let err = decode(CommitmentMode::Standard, &env).unwrap_err();
        assert_eq!(err, ErrInvalidCommitment::UnknownVersion(9));
    }
}
