//! Error taxonomy shared by every core component. Each variant keeps its kind
//! across wrapping so the HTTP layer (external to this crate) can map it to a
//! status code without inspecting error text.

use serde::{Deserialize, Serialize};

/// The JSON body returned on a 418 cert-verification failure.
/// `StatusCode` is positive for on-chain verifier codes, `-1` for an RBN
/// recency failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationErrorBody {
    #[serde(rename = "StatusCode")]
    pub status_code: i32,
    #[serde(rename = "Msg")]
    pub msg: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Oversize blob, malformed envelope, duplicate routing config.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// KZG mismatch, Merkle mismatch, on-chain verifier non-OK. Never retried
    /// -- it is a correctness signal, not a transient condition.
    #[error("certificate invalid: status={} msg={}", .0.status_code, .0.msg)]
    CertInvalid(DerivationErrorBody),

    /// V2 reference block number fell outside the recency window.
    #[error("reference block number outside recency window: {msg}")]
    RbnRecency { msg: String },

    /// On-chain batch metadata hash did not match the recomputed hash
    /// (typically an L1 reorg).
    #[error("batch metadata hash mismatch: onchain={onchain} computed={computed}")]
    BatchHashMismatch { onchain: String, computed: String },

    /// No hit in any cache, primary, or fallback tier.
    #[error("not found")]
    NotFound,

    /// Disperser rate-limit.
    #[error("throttled")]
    Throttled,

    /// Primary RPC down or timed out; signal to the caller to retry/failover.
    #[error("transient: {0}")]
    Transient(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Wire class per the error taxonomy; the HTTP layer uses this to choose
    /// a status code without re-deriving it from the error text.
    pub fn http_status(&self) -> u16 {
        match self {
            ProxyError::BadRequest(_) => 400,
            ProxyError::CertInvalid(_) | ProxyError::RbnRecency { .. } | ProxyError::BatchHashMismatch { .. } => 418,
            ProxyError::NotFound => 404,
            ProxyError::Throttled => 429,
            ProxyError::Transient(_) => 503,
            ProxyError::Internal(_) => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ProxyError::Transient(_) | ProxyError::Throttled)
    }

    /// The `{StatusCode, Msg}` body for a 418 response. `None` for every
    /// other error class.
    pub fn derivation_body(&self) -> Option<DerivationErrorBody> {
        match self {
            ProxyError::CertInvalid(body) => Some(body.clone()),
            ProxyError::RbnRecency { msg } => Some(DerivationErrorBody {
                status_code: -1,
                msg: msg.clone(),
            }),
            ProxyError::BatchHashMismatch { onchain, computed } => Some(DerivationErrorBody {
                status_code: -1,
                msg: format!("batch metadata hash mismatch: onchain={onchain} computed={computed}"),
            }),
            _ => None,
        }
    }
}
