//! Shard reconstruction
//!
//! Recovers missing shards from any `k` survivors. The rows of the
//! encoding matrix belonging to the surviving shards form an invertible
//! `k x k` system (MDS property); multiplying its inverse by the survivor
//! bytes yields the original data shards, after which missing parity is
//! re-derived with the ordinary encoder.

use rayon::prelude::*;
use tracing::debug;

use crate::config::Parallelism;
use crate::encoder;
use crate::error::{ErasureError, Result};
use crate::matrix::EncodingMatrix;

/// Fill in every `None` slot of `shards` in place.
///
/// `shards` must hold `k + m` slots of equal-length present shards.
/// Fails with [`ErasureError::TooManyShardsMissing`] when fewer than `k`
/// slots are present.
pub(crate) fn reconstruct(
    matrix: &EncodingMatrix,
    shards: &mut [Option<Vec<u8>>],
    parallelism: Parallelism,
) -> Result<()> {
    let data_shards = matrix.data_shards();
    let total = matrix.total_shards();
    debug_assert_eq!(shards.len(), total);

    let present: Vec<usize> = (0..total).filter(|&i| shards[i].is_some()).collect();
    if present.len() < data_shards {
        return Err(ErasureError::TooManyShardsMissing {
            missing: total - present.len(),
            max: matrix.parity_shards(),
        });
    }

    let shard_size = shards[present[0]]
        .as_ref()
        .map(Vec::len)
        .unwrap_or_default();

    debug!(
        missing = total - present.len(),
        data_shards, shard_size, "reconstructing shards"
    );

    let missing_data: Vec<usize> = (0..data_shards).filter(|&i| shards[i].is_none()).collect();

    if !missing_data.is_empty() {
        // Any k surviving rows of the encoding matrix give a solvable
        // system; take the first k.
        let rows = &present[..data_shards];
        let decode_matrix = matrix.decode_matrix(rows)?;

        let survivors: Vec<&[u8]> = rows
            .iter()
            .map(|&i| shards[i].as_deref().unwrap_or_default())
            .collect();

        let recovered: Vec<(usize, Vec<u8>)> = if parallelism.should_parallelize(shard_size) {
            missing_data
                .par_iter()
                .map(|&d| (d, encoder::combine(decode_matrix.row(d), &survivors, shard_size)))
                .collect()
        } else {
            missing_data
                .iter()
                .map(|&d| (d, encoder::combine(decode_matrix.row(d), &survivors, shard_size)))
                .collect()
        };

        for (d, shard) in recovered {
            shards[d] = Some(shard);
        }
    }

    // All data shards are present now; re-derive any missing parity.
    let missing_parity: Vec<usize> = (data_shards..total)
        .filter(|&i| shards[i].is_none())
        .collect();

    if !missing_parity.is_empty() {
        let data: Vec<&[u8]> = shards[..data_shards]
            .iter()
            .map(|s| s.as_deref().unwrap_or_default())
            .collect();

        let recovered: Vec<(usize, Vec<u8>)> = if parallelism.should_parallelize(shard_size) {
            missing_parity
                .par_iter()
                .map(|&p| {
                    (
                        p,
                        encoder::combine(matrix.parity_row(p - data_shards), &data, shard_size),
                    )
                })
                .collect()
        } else {
            missing_parity
                .iter()
                .map(|&p| {
                    (
                        p,
                        encoder::combine(matrix.parity_row(p - data_shards), &data, shard_size),
                    )
                })
                .collect()
        };

        for (p, shard) in recovered {
            shards[p] = Some(shard);
        }
    }

    Ok(())
}
