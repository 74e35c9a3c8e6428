//! Parity generation and verification kernels
//!
//! The encoder applies the parity rows of the encoding matrix to the data
//! shards: `parity[p][o] = XOR over i of mul(data[i][o], row[p][i])` for
//! every byte offset `o`. Offsets and parity rows are independent, so the
//! parallel path splits work across parity rows on the rayon pool; the
//! output is bit-identical either way.

use rayon::prelude::*;

use crate::config::Parallelism;
use crate::gf::GaloisField;
use crate::matrix::EncodingMatrix;

/// `out[o] ^= mul(coef, input[o])` for every offset, with fast paths for
/// the 0 and 1 coefficients.
#[inline]
fn mul_slice_xor(gf: GaloisField, coef: u8, input: &[u8], out: &mut [u8]) {
    debug_assert_eq!(input.len(), out.len());
    match coef {
        0 => {}
        1 => {
            for (o, &i) in out.iter_mut().zip(input) {
                *o ^= i;
            }
        }
        _ => {
            for (o, &i) in out.iter_mut().zip(input) {
                *o ^= gf.mul(coef, i);
            }
        }
    }
}

/// Dot product of a coefficient row with a set of equal-length input
/// shards, per byte offset. The workhorse of both encoding (parity rows x
/// data shards) and reconstruction (inverse rows x surviving shards).
pub(crate) fn combine(coefficients: &[u8], inputs: &[&[u8]], shard_size: usize) -> Vec<u8> {
    debug_assert_eq!(coefficients.len(), inputs.len());
    let gf = GaloisField;
    let mut out = vec![0u8; shard_size];
    for (&coef, input) in coefficients.iter().zip(inputs) {
        mul_slice_xor(gf, coef, input, &mut out);
    }
    out
}

/// Compute all `m` parity shards from `k` data shards.
pub(crate) fn encode_parity(
    matrix: &EncodingMatrix,
    data: &[&[u8]],
    parallelism: Parallelism,
) -> Vec<Vec<u8>> {
    debug_assert_eq!(data.len(), matrix.data_shards());
    let shard_size = data.first().map_or(0, |s| s.len());

    if parallelism.should_parallelize(shard_size) {
        (0..matrix.parity_shards())
            .into_par_iter()
            .map(|p| combine(matrix.parity_row(p), data, shard_size))
            .collect()
    } else {
        (0..matrix.parity_shards())
            .map(|p| combine(matrix.parity_row(p), data, shard_size))
            .collect()
    }
}

/// Recompute parity from the data shards and compare byte-for-byte against
/// the supplied parity shards.
///
/// A mismatch is an expected, recoverable condition (it triggers
/// reconstruction), so this returns a plain `bool`.
pub(crate) fn verify(
    matrix: &EncodingMatrix,
    data: &[&[u8]],
    parity: &[&[u8]],
    parallelism: Parallelism,
) -> bool {
    let expected = encode_parity(matrix, data, parallelism);
    expected
        .iter()
        .zip(parity)
        .all(|(computed, supplied)| computed.as_slice() == *supplied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_shards(k: usize, shard_size: usize) -> Vec<Vec<u8>> {
        (0..k)
            .map(|i| (0..shard_size).map(|o| (i * 31 + o * 7) as u8).collect())
            .collect()
    }

    fn as_refs(shards: &[Vec<u8>]) -> Vec<&[u8]> {
        shards.iter().map(Vec::as_slice).collect()
    }

    #[test]
    fn test_mul_slice_xor_paths() {
        let gf = GaloisField;
        let input = [1u8, 2, 3, 250];

        let mut out = [0xffu8; 4];
        mul_slice_xor(gf, 0, &input, &mut out);
        assert_eq!(out, [0xff; 4]);

        let mut out = [0u8; 4];
        mul_slice_xor(gf, 1, &input, &mut out);
        assert_eq!(out, input);

        let mut out = [0u8; 4];
        mul_slice_xor(gf, 5, &input, &mut out);
        for (o, &i) in out.iter().zip(&input) {
            assert_eq!(*o, gf.mul(5, i));
        }
    }

    #[test]
    fn test_encode_parity_shape() {
        let matrix = EncodingMatrix::for_params(4, 2).unwrap();
        let data = data_shards(4, 16);
        let parity = encode_parity(&matrix, &as_refs(&data), Parallelism::Sequential);
        assert_eq!(parity.len(), 2);
        assert!(parity.iter().all(|p| p.len() == 16));
    }

    #[test]
    fn test_sequential_parallel_identical() {
        let matrix = EncodingMatrix::for_params(8, 3).unwrap();
        let data = data_shards(8, 4096);
        let seq = encode_parity(&matrix, &as_refs(&data), Parallelism::Sequential);
        let par = encode_parity(&matrix, &as_refs(&data), Parallelism::Parallel);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_verify_accepts_own_parity() {
        let matrix = EncodingMatrix::for_params(5, 2).unwrap();
        let data = data_shards(5, 64);
        let parity = encode_parity(&matrix, &as_refs(&data), Parallelism::Sequential);
        assert!(verify(
            &matrix,
            &as_refs(&data),
            &as_refs(&parity),
            Parallelism::Sequential
        ));
    }

    #[test]
    fn test_verify_detects_corruption() {
        let matrix = EncodingMatrix::for_params(5, 2).unwrap();
        let data = data_shards(5, 64);
        let mut parity = encode_parity(&matrix, &as_refs(&data), Parallelism::Sequential);
        parity[1][10] ^= 0xff;
        assert!(!verify(
            &matrix,
            &as_refs(&data),
            &as_refs(&parity),
            Parallelism::Sequential
        ));
    }

    #[test]
    fn test_verify_detects_corrupt_data_shard() {
        let matrix = EncodingMatrix::for_params(5, 2).unwrap();
        let mut data = data_shards(5, 64);
        let parity = encode_parity(&matrix, &as_refs(&data), Parallelism::Sequential);
        data[0][0] ^= 1;
        assert!(!verify(
            &matrix,
            &as_refs(&data),
            &as_refs(&parity),
            Parallelism::Sequential
        ));
    }
}
