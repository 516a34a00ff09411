//! KZG commitment equality check: recompute the blob's commitment from the
//! loaded SRS prefix and compare against the commitment carried in the cert.
//! There is no opening proof in the certificate formats this proxy handles,
//! so equality of the recomputed commitment is the whole check.

use alloy_primitives::U256;
use ark_bn254::Fq;
use ark_ff::{BigInteger, PrimeField};
use rust_kzg_bn254_primitives::blob::Blob;
use rust_kzg_bn254_prover::kzg::KZG;
use rust_kzg_bn254_prover::srs::SRS;

#[derive(Debug, thiserror::Error)]
pub enum KzgVerifyError {
    #[error("failed to load SRS from {path}: {source}")]
    SrsLoad {
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("blob rejected by kzg library: {0}")]
    InvalidBlob(String),
    #[error("failed to commit blob polynomial: {0}")]
    Commit(String),
}

/// Trusted-setup parameters. `points_to_load` is `SRSNumberToLoad =
/// maxBlobBytes/32`.
#[derive(Debug, Clone)]
pub struct KzgConfig {
    pub srs_path: String,
    pub srs_order: u32,
    pub points_to_load: u32,
}

/// Recomputes the commitment for `blob_bytes` and compares it against
/// `claimed` (the cert's `(x, y)` commitment coordinates).
pub fn commitment_matches_blob(
    blob_bytes: &[u8],
    claimed: (U256, U256),
    cfg: &KzgConfig,
) -> Result<bool, KzgVerifyError> {
    let srs = SRS::new(&cfg.srs_path, cfg.srs_order, cfg.points_to_load).map_err(|e| {
        KzgVerifyError::SrsLoad {
            path: cfg.srs_path.clone(),
            source: anyhow::anyhow!(e.to_string()),
        }
    })?;

    let mut kzg = KZG::new();
    let blob = Blob::new(blob_bytes).map_err(|e| KzgVerifyError::InvalidBlob(e.to_string()))?;
    let poly = blob.to_polynomial_eval_form();
    kzg.calculate_and_store_roots_of_unity(blob_bytes.len() as u64)
        .map_err(|e| KzgVerifyError::Commit(e.to_string()))?;
    let commitment = kzg
        .commit_eval_form(&poly, &srs)
        .map_err(|e| KzgVerifyError::Commit(e.to_string()))?;

    let x = fq_to_u256(commitment.x);
    let y = fq_to_u256(commitment.y);
    Ok(x == claimed.0 && y == claimed.1)
}

fn fq_to_u256(f: Fq) -> U256 {
    let be = f.into_bigint().to_bytes_be();
    let mut padded = [0u8; 32];
    padded[32 - be.len()..].copy_from_slice(&be);
    U256::from_be_bytes(padded)
}
