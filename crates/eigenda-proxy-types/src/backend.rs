use serde::{Deserialize, Serialize};

/// Tag identifying a concrete backend implementation. Primary vs. secondary
/// is a role attached to the backend instance, not a type distinction -- two
/// backends of the same variant can theoretically coexist under different
/// roles, though the reference wiring keeps one primary per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendType {
    EigenDAV1,
    EigenDAV2,
    Memstore,
    S3,
    Redis,
    Kv,
}

impl BackendType {
    pub fn is_primary(self) -> bool {
        matches!(self, BackendType::EigenDAV1 | BackendType::EigenDAV2 | BackendType::Memstore)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendType::EigenDAV1 => "eigenda_v1",
            BackendType::EigenDAV2 => "eigenda_v2",
            BackendType::Memstore => "memstore",
            BackendType::S3 => "s3",
            BackendType::Redis => "redis",
            BackendType::Kv => "kv",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
