//! Shard types and the buffer splitter/joiner
//!
//! `split` partitions an input buffer into `k` equal-length data shards,
//! zero-padding the tail; `join` reverses it given the original length.
//! Missing shards are always an explicit `None` slot, never a zero-length
//! sentinel.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ErasureError, Result};

/// A single shard of erasure-coded data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardData {
    /// Shard index (0 to total_shards-1)
    pub index: u8,
    /// Shard data
    pub data: Bytes,
    /// Whether this is a parity shard
    pub is_parity: bool,
}

impl ShardData {
    /// Create a new shard
    pub fn new(index: u8, data: Bytes, is_parity: bool) -> Self {
        Self {
            index,
            data,
            is_parity,
        }
    }

    /// Get shard size
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Shard size for a buffer of `data_size` bytes over `data_shards` shards.
pub fn shard_size_for(data_size: usize, data_shards: usize) -> usize {
    data_size.div_ceil(data_shards)
}

/// Split a buffer into `data_shards` equal-length slices of
/// `ceil(len / data_shards)` bytes, zero-padding the final slice.
pub fn split(data: &[u8], data_shards: usize) -> Result<Vec<Vec<u8>>> {
    if data.is_empty() {
        return Err(ErasureError::EmptyInput);
    }

    let shard_size = shard_size_for(data.len(), data_shards);
    let padded_size = shard_size * data_shards;
    let mut padded = data.to_vec();
    padded.resize(padded_size, 0);

    Ok(padded.chunks(shard_size).map(|c| c.to_vec()).collect())
}

/// Concatenate data shard slots in index order and truncate to
/// `original_size` bytes.
///
/// Fails with [`ErasureError::LengthMismatch`] if a slot is empty or if
/// `original_size` exceeds the concatenated length.
pub fn join(data_shards: &[Option<Vec<u8>>], original_size: usize) -> Result<Bytes> {
    let mut joined = Vec::with_capacity(original_size);
    for slot in data_shards {
        match slot {
            Some(shard) => joined.extend_from_slice(shard),
            None => {
                return Err(ErasureError::LengthMismatch {
                    requested: original_size,
                    available: joined.len(),
                })
            }
        }
    }

    if original_size > joined.len() {
        return Err(ErasureError::LengthMismatch {
            requested: original_size,
            available: joined.len(),
        });
    }

    joined.truncate(original_size);
    Ok(Bytes::from(joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact_fit() {
        let shards = split(&[1, 2, 3, 4, 5, 6], 3).unwrap();
        assert_eq!(shards, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_split_pads_tail() {
        let shards = split(&[1, 2, 3, 4, 5], 3).unwrap();
        assert_eq!(shards, vec![vec![1, 2], vec![3, 4], vec![5, 0]]);
    }

    #[test]
    fn test_split_more_shards_than_bytes() {
        // 9 bytes over 10 shards: 1-byte shards, the last one padding.
        let shards = split(b"test data", 10).unwrap();
        assert_eq!(shards.len(), 10);
        assert!(shards.iter().all(|s| s.len() == 1));
        assert_eq!(shards[9], vec![0]);
    }

    #[test]
    fn test_split_empty_input() {
        assert_eq!(split(&[], 4), Err(ErasureError::EmptyInput));
    }

    #[test]
    fn test_join_truncates_padding() {
        let data = b"hello world".to_vec();
        let shards: Vec<Option<Vec<u8>>> =
            split(&data, 4).unwrap().into_iter().map(Some).collect();
        let joined = join(&shards, data.len()).unwrap();
        assert_eq!(joined.as_ref(), data.as_slice());
    }

    #[test]
    fn test_join_length_too_large() {
        let shards = vec![Some(vec![1, 2]), Some(vec![3, 4])];
        let result = join(&shards, 5);
        assert_eq!(
            result,
            Err(ErasureError::LengthMismatch {
                requested: 5,
                available: 4
            })
        );
    }

    #[test]
    fn test_join_missing_slot() {
        let shards = vec![Some(vec![1, 2]), None];
        assert!(matches!(
            join(&shards, 3),
            Err(ErasureError::LengthMismatch { .. })
        ));
    }
}
