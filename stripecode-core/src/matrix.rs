//! Matrix algebra over GF(256)
//!
//! Provides the dense byte matrix used by the coder:
//! - Vandermonde construction and row reduction into a systematic
//!   `(k+m) x k` encoding matrix (top `k` rows are the identity, so data
//!   shards pass through unmodified)
//! - Gauss-Jordan inversion with row-swap pivoting, used to build decode
//!   matrices from surviving shard rows
//! - a process-wide cache of encoding matrices keyed by `(k, m)`
//!
//! A Vandermonde matrix built from distinct field elements has the MDS
//! property: every square submatrix is invertible. The elementary row
//! operations that systematize it preserve invertibility of every k-row
//! subset, so any `k` surviving shards always yield a solvable system.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{ErasureError, Result};
use crate::gf::GaloisField;

/// Maximum total shard count. Rows of the Vandermonde matrix need distinct
/// field elements and GF(256) only has 256 of them.
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Dense row-major matrix over GF(256).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
    gf: GaloisField,
}

impl Matrix {
    /// Create a zeroed `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0u8; rows * cols],
            gf: GaloisField,
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::new(n, n);
        for i in 0..n {
            matrix.set(i, i, 1);
        }
        matrix
    }

    /// Create a `rows x cols` Vandermonde matrix from the distinct nonzero
    /// field elements `1..=rows`: entry `(r, c)` is `(r+1)^c`.
    pub fn vandermonde(rows: usize, cols: usize) -> Self {
        let mut matrix = Self::new(rows, cols);
        for r in 0..rows {
            let element = (r + 1) as u8;
            for c in 0..cols {
                matrix.set(r, c, matrix.gf.exp(element, c));
            }
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow a full row as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            let tmp = self.get(a, col);
            self.set(a, col, self.get(b, col));
            self.set(b, col, tmp);
        }
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.cols, other.rows);
        let mut product = Matrix::new(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut acc = 0u8;
                for i in 0..self.cols {
                    acc ^= self.gf.mul(self.get(r, i), other.get(i, c));
                }
                product.set(r, c, acc);
            }
        }
        product
    }

    /// Copy out the rectangular region `[rmin, rmax) x [cmin, cmax)`.
    pub fn sub_matrix(&self, rmin: usize, cmin: usize, rmax: usize, cmax: usize) -> Matrix {
        let mut sub = Matrix::new(rmax - rmin, cmax - cmin);
        for r in rmin..rmax {
            for c in cmin..cmax {
                sub.set(r - rmin, c - cmin, self.get(r, c));
            }
        }
        sub
    }

    /// Build a square matrix from the listed rows of `self`, restricted to
    /// the first `cols` columns.
    pub fn select_rows(&self, rows: &[usize], cols: usize) -> Matrix {
        let mut selected = Matrix::new(rows.len(), cols);
        for (r, &src) in rows.iter().enumerate() {
            for c in 0..cols {
                selected.set(r, c, self.get(src, c));
            }
        }
        selected
    }

    pub fn is_identity(&self) -> bool {
        if self.rows != self.cols {
            return false;
        }
        for r in 0..self.rows {
            for c in 0..self.cols {
                let expected = u8::from(r == c);
                if self.get(r, c) != expected {
                    return false;
                }
            }
        }
        true
    }

    /// Invert a square matrix by Gauss-Jordan elimination on `[self | I]`,
    /// swapping rows whenever the pivot position holds a zero.
    ///
    /// Returns [`ErasureError::SingularMatrix`] if some column has no
    /// nonzero pivot. For submatrices drawn from a correctly constructed
    /// encoding matrix this is unreachable; hitting it means the matrix
    /// construction itself is defective.
    pub fn invert(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(ErasureError::SingularMatrix);
        }
        let n = self.rows;
        let gf = self.gf;

        // Augmented [self | I].
        let mut work = Matrix::new(n, 2 * n);
        for r in 0..n {
            for c in 0..n {
                work.set(r, c, self.get(r, c));
            }
            work.set(r, n + r, 1);
        }

        for col in 0..n {
            let pivot_row = (col..n)
                .find(|&r| work.get(r, col) != 0)
                .ok_or(ErasureError::SingularMatrix)?;
            work.swap_rows(col, pivot_row);

            // Scale the pivot row so the pivot becomes 1.
            let pivot_inv = gf.inv(work.get(col, col))?;
            for c in 0..2 * n {
                work.set(col, c, gf.mul(pivot_inv, work.get(col, c)));
            }

            // Eliminate the column from every other row.
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work.get(r, col);
                if factor == 0 {
                    continue;
                }
                for c in 0..2 * n {
                    let delta = gf.mul(factor, work.get(col, c));
                    work.set(r, c, work.get(r, c) ^ delta);
                }
            }
        }

        Ok(work.sub_matrix(0, n, n, 2 * n))
    }
}

/// Immutable systematic encoding matrix for a `(k, m)` configuration.
///
/// `(k+m) x k` over GF(256): rows `[0, k)` are the identity (data shards
/// pass through), rows `[k, k+m)` hold the parity coefficients. Built once
/// per `(k, m)`, cached process-wide, and shared via `Arc` — safe for
/// unsynchronized concurrent reads.
#[derive(Debug)]
pub struct EncodingMatrix {
    data_shards: usize,
    parity_shards: usize,
    matrix: Matrix,
}

static MATRIX_CACHE: Lazy<RwLock<HashMap<(usize, usize), Arc<EncodingMatrix>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

impl EncodingMatrix {
    /// Fetch (or build and cache) the encoding matrix for `(k, m)`.
    pub fn for_params(data_shards: usize, parity_shards: usize) -> Result<Arc<EncodingMatrix>> {
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

        let key = (data_shards, parity_shards);
        if let Some(cached) = MATRIX_CACHE.read().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let built = Arc::new(Self::build(data_shards, parity_shards)?);
        let mut cache = MATRIX_CACHE.write();
        // Another thread may have built it in the meantime; keep theirs.
        Ok(Arc::clone(
            cache.entry(key).or_insert(built),
        ))
    }

    /// Build the systematic matrix: a `(k+m) x k` Vandermonde matrix
    /// multiplied by the inverse of its own top `k x k` block, which row
    /// reduces the top block to the identity.
    fn build(data_shards: usize, parity_shards: usize) -> Result<EncodingMatrix> {
        let total = data_shards + parity_shards;
        let vandermonde = Matrix::vandermonde(total, data_shards);
        let top = vandermonde.sub_matrix(0, 0, data_shards, data_shards);
        let matrix = vandermonde.multiply(&top.invert()?);

        debug_assert!(matrix
            .sub_matrix(0, 0, data_shards, data_shards)
            .is_identity());

        Ok(EncodingMatrix {
            data_shards,
            parity_shards,
            matrix,
        })
    }

    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Coefficient row for shard `index` in `[0, k+m)`.
    #[inline]
    pub fn row(&self, index: usize) -> &[u8] {
        self.matrix.row(index)
    }

    /// Coefficient row for parity shard `p` in `[0, m)`.
    #[inline]
    pub fn parity_row(&self, p: usize) -> &[u8] {
        self.matrix.row(self.data_shards + p)
    }

    /// Square decode matrix from the rows of `k` surviving shards.
    pub fn decode_matrix(&self, present_rows: &[usize]) -> Result<Matrix> {
        debug_assert_eq!(present_rows.len(), self.data_shards);
        self.matrix
            .select_rows(present_rows, self.data_shards)
            .invert()
    }
}
