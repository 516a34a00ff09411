use std::collections::HashSet;

use eigenda_proxy_types::{BackendType, ProxyError};

/// Ordered cache and fallback tiers plus the write fan-out pool sizing. A
/// backend may appear in at most one of the two lists; duplicates within a
/// single list are also rejected. Both checks run once at startup.
#[derive(Debug, Clone)]
pub struct SecondaryRouterConfig {
    pub cache_targets: Vec<BackendType>,
    pub fallback_targets: Vec<BackendType>,
    /// `0` means every cache write runs synchronously on the PUT path.
    pub concurrent_write_threads: usize,
    pub write_queue_bound: usize,
}

impl SecondaryRouterConfig {
    pub fn validate(&self) -> Result<(), ProxyError> {
        let mut seen = HashSet::new();
        for target in self.cache_targets.iter().chain(self.fallback_targets.iter()) {
            if !seen.insert(*target) {
                return Err(ProxyError::BadRequest(format!(
                    "backend {target} appears more than once across cacheTargets/fallbackTargets"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_targets_validate() {
        let cfg = SecondaryRouterConfig {
            cache_targets: vec![BackendType::Redis, BackendType::Kv],
            fallback_targets: vec![BackendType::S3],
            concurrent_write_threads: 1,
            write_queue_bound: 8,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn duplicate_within_a_list_is_rejected() {
        let cfg = SecondaryRouterConfig {
            cache_targets: vec![BackendType::Redis, BackendType::Redis],
            fallback_targets: vec![],
            concurrent_write_threads: 0,
            write_queue_bound: 0,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overlap_between_cache_and_fallback_is_rejected() {
        let cfg = SecondaryRouterConfig {
            cache_targets: vec![BackendType::S3],
            fallback_targets: vec![BackendType::S3],
            concurrent_write_threads: 0,
            write_queue_bound: 0,
        };
        assert!(cfg.validate().is_err());
    }
}
