//! Erasure coding engine
//!
//! [`Erasure`] ties the pipeline together: split → encode parity on the way
//! in; verify → reconstruct → re-verify → join on the way out. Encode and
//! decode are all-or-nothing: any failure propagates with no partial shard
//! output.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::config::ErasureConfig;
use crate::encoder;
use crate::error::{ErasureError, Result};
use crate::matrix::EncodingMatrix;
use crate::shard::{self, ShardData};
use crate::{decoder, DATA_SHARDS, PARITY_SHARDS};

/// Reed-Solomon erasure coding engine.
///
/// Immutable after construction; the encoding matrix is shared from a
/// process-wide cache, so cloning engines or using one from many threads
/// is cheap and safe.
#[derive(Debug, Clone)]
pub struct Erasure {
    config: ErasureConfig,
    matrix: Arc<EncodingMatrix>,
}

impl Erasure {
    /// Create an engine with `data_shards` data and `parity_shards` parity
    /// shards.
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        Self::with_config(ErasureConfig::new(data_shards, parity_shards)?)
    }

    /// Create an engine from a full configuration.
    pub fn with_config(config: ErasureConfig) -> Result<Self> {
        let matrix = EncodingMatrix::for_params(config.data_shards, config.parity_shards)?;
        Ok(Self { config, matrix })
    }

    /// Get the erasure configuration
    pub fn config(&self) -> &ErasureConfig {
        &self.config
    }

    /// Encode a buffer into `k + m` shards.
    ///
    /// Data shards come first (indices `0..k`, a verbatim copy of the
    /// padded input), then parity shards (indices `k..k+m`). The only
    /// failure is [`ErasureError::EmptyInput`].
    pub fn encode(&self, data: &[u8]) -> Result<Vec<ShardData>> {
        let data_shards = shard::split(data, self.config.data_shards)?;
        let inputs: Vec<&[u8]> = data_shards.iter().map(Vec::as_slice).collect();
        let parity = encoder::encode_parity(&self.matrix, &inputs, self.config.parallelism);

        debug!(
            len = data.len(),
            shard_size = data_shards[0].len(),
            data_shards = self.config.data_shards,
            parity_shards = self.config.parity_shards,
            "encoded buffer"
        );

        let result = data_shards
            .into_iter()
            .chain(parity)
            .enumerate()
            .map(|(i, bytes)| {
                let is_parity = i >= self.config.data_shards;
                ShardData::new(i as u8, Bytes::from(bytes), is_parity)
            })
            .collect();

        Ok(result)
    }

    /// Check that the parity shards match the data shards.
    ///
    /// Returns `Ok(false)` for any inconsistency (wrong shard count,
    /// uneven sizes, or parity mismatch); none of those are errors here.
    pub fn verify(&self, shards: &[ShardData]) -> Result<bool> {
        if shards.len() != self.config.total_shards() {
            return Ok(false);
        }
        let expected_size = shards.first().map(ShardData::size).unwrap_or(0);
        if !shards.iter().all(|s| s.size() == expected_size) {
            return Ok(false);
        }

        let k = self.config.data_shards;
        let data: Vec<&[u8]> = shards[..k].iter().map(|s| s.data.as_ref()).collect();
        let parity: Vec<&[u8]> = shards[k..].iter().map(|s| s.data.as_ref()).collect();
        Ok(encoder::verify(
            &self.matrix,
            &data,
            &parity,
            self.config.parallelism,
        ))
    }

    /// Decode shards back into the original buffer.
    ///
    /// `shards` must hold all `k + m` slots in index order, with missing
    /// shards explicitly `None`. `original_size` must equal the length of
    /// the buffer passed to [`Erasure::encode`].
    ///
    /// Parity is verified first; on mismatch (or any missing slot) the
    /// engine reconstructs and verifies again. A second-pass mismatch means
    /// the shard set is corrupted beyond the declared fault model and fails
    /// with [`ErasureError::FailedDecode`].
    pub fn decode(&self, shards: &[Option<ShardData>], original_size: usize) -> Result<Bytes> {
        let total = self.config.total_shards();
        if shards.len() != total {
            return Err(ErasureError::ShardCountMismatch {
                expected: total,
                actual: shards.len(),
            });
        }

        let missing = shards.iter().filter(|s| s.is_none()).count();
        if missing > self.config.max_failures() {
            return Err(ErasureError::TooManyShardsMissing {
                missing,
                max: self.config.max_failures(),
            });
        }

        // All present shards must agree on the shard size.
        let shard_size = match shards.iter().find_map(|s| s.as_ref().map(ShardData::size)) {
            Some(size) => size,
            None => {
                return Err(ErasureError::TooManyShardsMissing {
                    missing,
                    max: self.config.max_failures(),
                })
            }
        };
        for present in shards.iter().flatten() {
            if present.size() != shard_size {
                return Err(ErasureError::ShardSizeMismatch {
                    expected: shard_size,
                    actual: present.size(),
                });
            }
        }

        let mut slots: Vec<Option<Vec<u8>>> = shards
            .iter()
            .map(|opt| opt.as_ref().map(|s| s.data.to_vec()))
            .collect();

        if !self.slots_verified(&slots) {
            decoder::reconstruct(&self.matrix, &mut slots, self.config.parallelism)?;
            if !self.slots_verified(&slots) {
                return Err(ErasureError::FailedDecode);
            }
        }

        shard::join(&slots[..self.config.data_shards], original_size)
    }

    /// Verify a slot array: every slot present and parity matching.
    fn slots_verified(&self, slots: &[Option<Vec<u8>>]) -> bool {
        if slots.iter().any(Option::is_none) {
            return false;
        }
        let k = self.config.data_shards;
        let data: Vec<&[u8]> = slots[..k]
            .iter()
            .map(|s| s.as_deref().unwrap_or_default())
            .collect();
        let parity: Vec<&[u8]> = slots[k..]
            .iter()
            .map(|s| s.as_deref().unwrap_or_default())
            .collect();
        encoder::verify(&self.matrix, &data, &parity, self.config.parallelism)
    }
}

impl Default for Erasure {
    fn default() -> Self {
        Self::with_config(ErasureConfig::default())
            .expect("Default erasure config should always work")
    }
}

/// Convenience function to encode data with the default configuration
pub fn encode(data: &[u8]) -> Result<Vec<ShardData>> {
    Erasure::new(DATA_SHARDS, PARITY_SHARDS)?.encode(data)
}

/// Convenience function to decode shards with the default configuration
pub fn decode(shards: &[Option<ShardData>], original_size: usize) -> Result<Bytes> {
    Erasure::new(DATA_SHARDS, PARITY_SHARDS)?.decode(shards, original_size)
}
