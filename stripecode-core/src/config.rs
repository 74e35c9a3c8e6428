//! Erasure coding configuration
//!
//! `(k, m)` shard counts plus the work-distribution hint. Validated once at
//! construction; engines built from a valid config cannot fail on shard
//! count bounds later.

use serde::{Deserialize, Serialize};

use crate::error::{ErasureError, Result};
use crate::matrix::MAX_TOTAL_SHARDS;
use crate::{DATA_SHARDS, PARITY_SHARDS};

/// Work-distribution hint for the encode/verify/reconstruct kernels.
///
/// Byte offsets and parity rows are fully independent, so the degree of
/// parallelism never affects the output bytes; this only trades thread
/// overhead against throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parallelism {
    /// Parallelize when shards are large enough to pay for the threads.
    #[default]
    Auto,
    /// Always run single-threaded.
    Sequential,
    /// Always spread parity rows across the rayon pool.
    Parallel,
}

/// Shard size at which `Parallelism::Auto` switches to the rayon path.
pub(crate) const AUTO_PARALLEL_THRESHOLD: usize = 64 * 1024;

impl Parallelism {
    /// Whether the kernels should use the parallel path for this shard size.
    pub(crate) fn should_parallelize(self, shard_size: usize) -> bool {
        match self {
            Parallelism::Auto => shard_size >= AUTO_PARALLEL_THRESHOLD,
            Parallelism::Sequential => false,
            Parallelism::Parallel => true,
        }
    }
}

/// Erasure coding configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureConfig {
    /// Number of data shards (k)
    pub data_shards: usize,
    /// Number of parity shards (m)
    pub parity_shards: usize,
    /// Work-distribution hint
    pub parallelism: Parallelism,
}

impl Default for ErasureConfig {
    fn default() -> Self {
        Self {
            data_shards: DATA_SHARDS,
            parity_shards: PARITY_SHARDS,
            parallelism: Parallelism::default(),
        }
    }
}

impl ErasureConfig {
    /// Create a new erasure config.
    ///
    /// Requires `data_shards >= 1`, `parity_shards >= 1`, and
    /// `data_shards + parity_shards <= 256` (the GF(256) index space).
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        if data_shards == 0 {
            return Err(ErasureError::Configuration(
                "data_shards must be > 0".to_string(),
            ));
        }
        if parity_shards == 0 {
            return Err(ErasureError::Configuration(
                "parity_shards must be > 0".to_string(),
            ));
        }
        if data_shards + parity_shards > MAX_TOTAL_SHARDS {
            return Err(ErasureError::Configuration(format!(
                "total shards must be <= {MAX_TOTAL_SHARDS}, got {}",
                data_shards + parity_shards
            )));
        }
        Ok(Self {
            data_shards,
            parity_shards,
            parallelism: Parallelism::default(),
        })
    }

    /// Set the work-distribution hint.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Read shard counts from `ERASURE_DATA_SHARDS` / `ERASURE_PARITY_SHARDS`,
    /// falling back to the compile-time defaults for anything unset or
    /// unparseable.
    pub fn from_env() -> Result<Self> {
        let data = std::env::var("ERASURE_DATA_SHARDS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DATA_SHARDS);
        let parity = std::env::var("ERASURE_PARITY_SHARDS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(PARITY_SHARDS);
        Self::new(data, parity)
    }

    /// Total number of shards
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Maximum number of lost shards that can be tolerated
    pub fn max_failures(&self) -> usize {
        self.parity_shards
    }

    /// Storage overhead ratio (parity/data)
    pub fn overhead_ratio(&self) -> f64 {
        self.parity_shards as f64 / self.data_shards as f64
    }
}
