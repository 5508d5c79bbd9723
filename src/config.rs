//! Configuration options.
//!
//! The framework itself needs no network or CLI configuration — the host
//! owns flows, protocol registration, and how bytes arrive. The one knob
//! that is intrinsic to this crate is how the per-thread [`crate::pool`]
//! result-element pool is sized, mirroring how `retina-core::config` keeps
//! `MempoolConfig` as a small, independently loadable struct even though the
//! rest of `RuntimeConfig` is owned by the host application.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Loads a configuration file from `path`.
///
/// # Panics
///
/// Panics if the file cannot be read or does not parse as valid TOML, the
/// same fail-fast behavior as `retina-core::config::load_config` — a
/// malformed configuration file is a deployment error the operator should
/// see immediately, not a recoverable condition.
pub fn load_config<P: AsRef<Path>>(path: P) -> PoolConfig {
    let config_str = fs::read_to_string(path).expect("ERROR: config file read failed");
    toml::from_str(&config_str).expect("Invalid config file")
}

/// Returns the default pool configuration.
///
/// For demonstration and test purposes. A production host will typically
/// size the pool from expected concurrent in-flight fields per worker
/// thread.
pub fn default_config() -> PoolConfig {
    PoolConfig::default()
}

/// Per-thread [`crate::pool::ElementPool`] sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Number of elements preallocated when a thread's pool is first used.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Number of additional elements allocated at once when the pool is
    /// exhausted, rather than one at a time.
    #[serde(default = "default_prealloc_batch")]
    pub prealloc_batch: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            capacity: default_capacity(),
            prealloc_batch: default_prealloc_batch(),
        }
    }
}

fn default_capacity() -> usize {
    100
}

fn default_prealloc_batch() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_nonzero() {
        let cfg = default_config();
        assert_eq!(cfg.capacity, 100);
        assert_eq!(cfg.prealloc_batch, 10);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg: PoolConfig = toml::from_str("capacity = 50").unwrap();
        assert_eq!(cfg.capacity, 50);
        assert_eq!(cfg.prealloc_batch, 10);
    }
}
