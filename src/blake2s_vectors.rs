// SPDX-License-Identifier: CC0-1.0

//! Shape contract for the Blake2s known-answer-test fixture.
//!
//! The fixture itself, 256 reference digests consumed by a Blake2s
//! implementation's self-test, ships with that implementation, not here.
//! This module pins down the only thing the rest of the system may assume
//! about it: exactly 256 rows of exactly 32 bytes, immutable constant data
//! for the lifetime of the process.

/// Number of known-answer rows, one per message length 0 through 255.
pub const KAT_LENGTH: usize = 256;

/// Blake2s digest size in bytes.
pub const OUT_BYTES: usize = 32;

/// A complete known-answer table.
///
/// Declaring a table with this alias makes the 256 x 32 shape a type-level
/// fact; a `const` of this type has no initialization order or teardown
/// concerns.
pub type Blake2sKatTable = [[u8; OUT_BYTES]; KAT_LENGTH];

const _: () = assert!(core::mem::size_of::<Blake2sKatTable>() == KAT_LENGTH * OUT_BYTES);
