//! Shared data model for the data-availability proxy: blobs, versioned
//! certificates, the commitment envelope, backend tags, and the error
//! taxonomy every other crate in the workspace builds on.

pub mod backend;
pub mod cert;
pub mod commitment;
pub mod error;

pub use backend::BackendType;
pub use cert::{CertV0, CertV1, CertV2, Certificate};
pub use commitment::{Blob, CertEncoding, CommitmentMode, CommitmentVersion, DecodedEnvelope};
pub use error::{DerivationErrorBody, ProxyError};

/// Upper bound on blob size, derived from the trusted-setup SRS size and the
/// coding ratio: `maxBytes = SRS_POINTS * BYTES_PER_SYMBOL / MAX_CODING_RATIO`.
pub fn max_blob_bytes(srs_points: u64, bytes_per_symbol: u64, max_coding_rate: u64) -> u64 {
    srs_points * bytes_per_symbol / max_coding_rate
}

/// Number of G1/G2 SRS points that must be loaded to cover a blob of
/// `max_blob_bytes`: one field element per 32 bytes.
pub fn srs_number_to_load(max_blob_bytes: u64) -> u64 {
    max_blob_bytes / 32
}
