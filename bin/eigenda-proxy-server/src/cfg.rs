//! CLI configuration, mirrored 1:1 onto environment variables so the same
//! binary runs unmodified under a container orchestrator.

use clap::{Parser, ValueEnum};
use eigenda_proxy_types::{BackendType, CertEncoding, CommitmentMode, CommitmentVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrimaryKind {
    Memstore,
    EigenDaV1,
    EigenDaV2,
}

impl PrimaryKind {
    pub fn commitment_version(self) -> CommitmentVersion {
        match self {
            PrimaryKind::Memstore => CommitmentVersion::V0,
            PrimaryKind::EigenDaV1 => CommitmentVersion::V1,
            PrimaryKind::EigenDaV2 => CommitmentVersion::V2,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "eigenda-proxy-server", about = "HTTP-fronted data-availability proxy for EigenDA")]
pub struct Config {
    #[arg(long, env = "EIGENDA_PROXY_ADDR", default_value = "0.0.0.0:3100")]
    pub addr: String,

    #[arg(long, env = "EIGENDA_PROXY_METRICS_ADDR", default_value = "0.0.0.0:9100")]
    pub metrics_addr: String,

    #[arg(long, value_enum, env = "EIGENDA_PROXY_PRIMARY", default_value = "memstore")]
    pub primary: PrimaryKind,

    #[arg(long, env = "EIGENDA_PROXY_COMMITMENT_MODE", default_value = "standard")]
    pub commitment_mode: String,

    /// L1 RPC URL, required when the active primary is `eigenda-v1`/`eigenda-v2`
    /// (used for on-chain cert verification and the RBN recency tip).
    #[arg(long, env = "EIGENDA_PROXY_L1_RPC_URL")]
    pub l1_rpc_url: Option<String>,

    #[arg(long, env = "EIGENDA_PROXY_CONFIRMATION_DEPTH", default_value_t = 6)]
    pub confirmation_depth: i64,

    #[arg(long, env = "EIGENDA_PROXY_RBN_RECENCY_WINDOW", default_value_t = 100)]
    pub rbn_recency_window: u64,

    #[arg(long, env = "EIGENDA_PROXY_KZG_SRS_PATH", default_value = "")]
    pub kzg_srs_path: String,
    #[arg(long, env = "EIGENDA_PROXY_KZG_SRS_ORDER", default_value_t = 268_435_456)]
    pub kzg_srs_order: u32,
    #[arg(long, env = "EIGENDA_PROXY_KZG_POINTS_TO_LOAD", default_value_t = 131_072)]
    pub kzg_points_to_load: u32,

    /// Upper bound on PUT size, in bytes. Defaults to the bound implied by
    /// `--kzg-points-to-load` when unset.
    #[arg(long, env = "EIGENDA_PROXY_MAX_BLOB_LENGTH")]
    pub max_blob_length: Option<u64>,

    #[arg(long, env = "EIGENDA_PROXY_CACHE_TARGETS", value_delimiter = ',')]
    pub cache_targets: Vec<String>,
    #[arg(long, env = "EIGENDA_PROXY_FALLBACK_TARGETS", value_delimiter = ',')]
    pub fallback_targets: Vec<String>,
    #[arg(long, env = "EIGENDA_PROXY_CONCURRENT_WRITE_THREADS", default_value_t = 0)]
    pub concurrent_write_threads: usize,
    #[arg(long, env = "EIGENDA_PROXY_WRITE_QUEUE_BOUND", default_value_t = 64)]
    pub write_queue_bound: usize,

    #[arg(long, env = "EIGENDA_PROXY_S3_BUCKET")]
    pub s3_bucket: Option<String>,
    #[arg(long, env = "EIGENDA_PROXY_REDIS_URL")]
    pub redis_url: Option<String>,
    #[arg(long, env = "EIGENDA_PROXY_REDIS_EVICTION_SECONDS", default_value_t = 3600)]
    pub redis_eviction_seconds: u64,
    #[arg(long, env = "EIGENDA_PROXY_ROCKSDB_PATH")]
    pub rocksdb_path: Option<String>,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn commitment_mode(&self) -> CommitmentMode {
        self.commitment_mode.parse().unwrap_or(CommitmentMode::Standard)
    }

    pub fn cert_encoding(&self) -> CertEncoding {
        CertEncoding::Rlp
    }

    /// `--max-blob-length` when set, else the bound implied by the loaded
    /// SRS prefix (`SRS_POINTS * BYTES_PER_SYMBOL / MAX_CODING_RATIO`).
    pub fn max_blob_bytes(&self) -> u64 {
        const BYTES_PER_SYMBOL: u64 = 32;
        const MAX_CODING_RATIO: u64 = 8;
        self.max_blob_length
            .unwrap_or_else(|| eigenda_proxy_types::max_blob_bytes(self.kzg_points_to_load as u64, BYTES_PER_SYMBOL, MAX_CODING_RATIO))
    }

    pub fn cache_target_types(&self) -> Result<Vec<BackendType>, String> {
        self.cache_targets.iter().map(|s| parse_backend_type(s)).collect()
    }

    pub fn fallback_target_types(&self) -> Result<Vec<BackendType>, String> {
        self.fallback_targets.iter().map(|s| parse_backend_type(s)).collect()
    }
}

fn parse_backend_type(s: &str) -> Result<BackendType, String> {
    match s.trim() {
        "s3" => Ok(BackendType::S3),
        "redis" => Ok(BackendType::Redis),
        "kv" => Ok(BackendType::Kv),
        other => Err(format!("unknown secondary backend target {other:?}")),
    }
}
