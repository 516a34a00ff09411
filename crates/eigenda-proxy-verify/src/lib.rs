//! Per-primary-version certificate verification: KZG commitment equality,
//! Merkle inclusion against a batch root, and an on-chain cross-check of the
//! batch metadata hash (V0) or the cert verifier contract (V1/V2).

pub mod chain;
pub mod kzg;
pub mod merkle;
pub mod verifier;

pub use chain::{AlloyChainClient, ChainClient, ChainError, ConfirmationDepth};
pub use kzg::KzgConfig;
pub use verifier::{CertVerifier, V0Verifier, V1V2Verifier, VerifierConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_depth_negative_aliases_to_finality() {
        assert_eq!(ConfirmationDepth::from_config(-1), ConfirmationDepth::Finality);
        assert_eq!(ConfirmationDepth::from_config(5), ConfirmationDepth::Blocks(5));
    }

    #[test]
    fn confirmation_depth_zero_is_not_finality() {
        assert_eq!(ConfirmationDepth::from_config(0), ConfirmationDepth::Blocks(0));
    }
}
