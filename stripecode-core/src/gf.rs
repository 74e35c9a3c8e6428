//! GF(256) field arithmetic
//!
//! All shard math happens in the Galois field GF(2^8) under the primitive
//! polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11d) with generator 2. Addition
//! and subtraction are XOR; multiplication and division go through
//! precomputed logarithm/antilogarithm tables so every per-byte operation
//! is a couple of lookups.
//!
//! The tables are built at compile time into process-wide statics and shared
//! read-only by every engine instance.

use crate::error::{ErasureError, Result};

/// Primitive polynomial for GF(2^8): x^8 + x^4 + x^3 + x^2 + 1
const PRIMITIVE_POLY: u16 = 0x11d;

/// Antilog (exponential) table. Doubled to 512 entries so that
/// `EXP_TABLE[log a + log b]` never needs a modulo.
static EXP_TABLE: [u8; 512] = generate_exp_table();

/// Log table. `LOG_TABLE[0]` is unused; zero has no logarithm.
static LOG_TABLE: [u8; 256] = generate_log_table();

const fn generate_exp_table() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut x = 1u16;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        table[i + 255] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    // Index 510 is only reachable from log values summing past 509 which
    // cannot happen, but keep the tail consistent with the wraparound.
    table[510] = table[0];
    table[511] = table[1];
    table
}

const fn generate_log_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut x = 1u16;
    let mut i = 0;
    while i < 255 {
        table[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    table
}

/// Handle to GF(256) arithmetic.
///
/// Zero-sized: the tables are process-wide statics. Holding a `GaloisField`
/// value rather than calling free functions keeps the field a swappable,
/// testable seam for the matrix and encoder code built on top of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaloisField;

impl GaloisField {
    /// Field addition (XOR).
    #[inline]
    pub fn add(self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Field subtraction. Identical to addition in GF(2^8).
    #[inline]
    pub fn sub(self, a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Field multiplication via log/antilog lookup.
    #[inline]
    pub fn mul(self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_sum = LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize;
        EXP_TABLE[log_sum]
    }

    /// Multiplicative inverse. Zero has no inverse.
    #[inline]
    pub fn inv(self, a: u8) -> Result<u8> {
        if a == 0 {
            return Err(ErasureError::DivisionByZero);
        }
        Ok(EXP_TABLE[255 - LOG_TABLE[a as usize] as usize])
    }

    /// Field division: `a / b`. Fails if `b` is zero.
    #[inline]
    pub fn div(self, a: u8, b: u8) -> Result<u8> {
        if b == 0 {
            return Err(ErasureError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }
        let log_diff =
            255 + LOG_TABLE[a as usize] as usize - LOG_TABLE[b as usize] as usize;
        Ok(EXP_TABLE[log_diff])
    }

    /// Raise `a` to the power `n`.
    pub fn exp(self, a: u8, n: usize) -> u8 {
        if n == 0 {
            return 1;
        }
        if a == 0 {
            return 0;
        }
        let log_product = LOG_TABLE[a as usize] as usize * n;
        EXP_TABLE[log_product % 255]
    }
}
