//! StripeCode Core Library
//!
//! Systematic Reed-Solomon erasure coding over GF(256). This crate
//! provides:
//! - An [`Erasure`] engine: split a buffer into `k` data shards, derive `m`
//!   parity shards, and reconstruct the buffer from any `k` survivors
//! - From-scratch GF(256) field arithmetic with compile-time log/antilog
//!   tables
//! - Systematic Vandermonde encoding matrices with the MDS guarantee,
//!   cached per `(k, m)`
//! - Common types and error handling
//!
//! Shard persistence and transport are the caller's responsibility; the
//! caller must preserve shard index, length, and present/missing status
//! across whatever boundary it uses.

pub mod config;
mod decoder;
mod encoder;
pub mod engine;
pub mod error;
pub mod gf;
pub mod matrix;
pub mod shard;

pub use config::{ErasureConfig, Parallelism};
pub use engine::{decode, encode, Erasure};
pub use error::{ErasureError, Result};
pub use gf::GaloisField;
pub use matrix::{EncodingMatrix, Matrix, MAX_TOTAL_SHARDS};
pub use shard::ShardData;

/// Default erasure coding configuration
/// - 10 data shards: minimum required to reconstruct
/// - 4 parity shards: can tolerate 4 lost shards
/// - 14 total shards
///
/// Override at runtime via ERASURE_DATA_SHARDS / ERASURE_PARITY_SHARDS env
/// vars (see [`ErasureConfig::from_env`]).
pub const DATA_SHARDS: usize = 10;
pub const PARITY_SHARDS: usize = 4;
pub const TOTAL_SHARDS: usize = DATA_SHARDS + PARITY_SHARDS;
