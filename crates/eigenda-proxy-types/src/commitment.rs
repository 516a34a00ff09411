//! On-wire shapes for the commitment envelope described in the data model:
//! `mode x version x encoding x payload`.

use serde::{Deserialize, Serialize};

/// Blob payload. An empty blob is legal.
pub type Blob = alloy_primitives::Bytes;

/// Certificate version tag. Carried as the first byte after the mode framing
/// (and, for `OptimismGeneric`, after the two `altDA`/`daSvc` bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentVersion {
    V0 = 0,
    V1 = 1,
    V2 = 2,
}

impl CommitmentVersion {
    pub fn requires_encoding_byte(self) -> bool {
        matches!(self, CommitmentVersion::V2)
    }
}

impl TryFrom<u8> for CommitmentVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommitmentVersion::V0),
            1 => Ok(CommitmentVersion::V1),
            2 => Ok(CommitmentVersion::V2),
            other => Err(other),
        }
    }
}

/// Secondary discriminator for the serialized cert payload, meaningful only
/// for `version >= V2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertEncoding {
    Rlp = 0,
    Abi = 1,
}

impl TryFrom<u8> for CertEncoding {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CertEncoding::Rlp),
            1 => Ok(CertEncoding::Abi),
            other => Err(other),
        }
    }
}

/// Outer byte framing interop target (Arbitrum-nitro standard vs. Optimism
/// alt-DA generic/keccak modes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentMode {
    Standard,
    OptimismGeneric,
    OptimismKeccak,
}

impl CommitmentMode {
    pub fn as_query_value(self) -> &'static str {
        match self {
            CommitmentMode::Standard => "standard",
            CommitmentMode::OptimismGeneric => "optimism_generic",
            CommitmentMode::OptimismKeccak => "optimism_keccak256",
        }
    }
}

impl std::str::FromStr for CommitmentMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(CommitmentMode::Standard),
            "optimism_generic" => Ok(CommitmentMode::OptimismGeneric),
            "optimism_keccak256" => Ok(CommitmentMode::OptimismKeccak),
            _ => Err(()),
        }
    }
}

/// A decoded commitment envelope, i.e. the output of `CommitmentCodec::decode`.
/// `OptimismKeccak` envelopes never carry a version byte, so they decode to a
/// distinct variant rather than forcing a fake version on the cert path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEnvelope {
    Cert {
        mode: CommitmentMode,
        version: CommitmentVersion,
        /// Always present for `version >= V2`, defaults to RLP otherwise.
        encoding: CertEncoding,
        payload: Vec<u8>,
    },
    KeccakKey {
        key: [u8; 32],
    },
}
