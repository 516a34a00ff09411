//! Wires the codec, verify, backend, and router crates together behind a
//! single `StorageManager` entry point.

mod decoder;
mod l1_tip;
mod storage_manager;
mod verifier_adapter;

pub use decoder::RlpCertDecoder;
pub use l1_tip::L1TipProvider;
pub use storage_manager::{StorageManager, StorageManagerConfig};
pub use verifier_adapter::LiveVerifier;
