// SPDX-License-Identifier: CC0-1.0

//! Constant-time cryptographic building blocks for Diffie-Hellman based
//! protocols: X25519 scalar multiplication over Curve25519 from RFC7748
//! and the Poly1305 one-time message authentication code from RFC7539.
//!
//! Both primitives are pure functions over fixed-size buffers. They hold no
//! global state, perform no I/O, and are safe to call from any number of
//! threads as long as each streaming [`Poly1305`] context is owned by one
//! caller at a time.
//!
//! Key hygiene is the caller's job: a Poly1305 key authenticates exactly one
//! message, and X25519 peer points are never validated here (see
//! [`curve25519::scalarmult`] for the non-rejection policy).
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod blake2s_vectors;
pub mod curve25519;
pub mod poly1305;

use core::fmt;

pub use self::curve25519::{PrivateKey, PublicKey, SharedSecret};
pub use self::poly1305::Poly1305;

/// Errors validating caller-supplied buffers against the fixed sizes these
/// primitives require.
///
/// Only the slice-accepting constructors can fail. Operations on the typed
/// 32-byte inputs always produce a deterministic result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Slice length does not match the size the operation requires.
    InvalidSliceLength {
        /// Required length in bytes.
        expected: usize,
        /// Length of the slice the caller supplied.
        received: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSliceLength { expected, received } =>
                write!(f, "expected a {}-byte slice, received {} bytes", expected, received),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidSliceLength { .. } => None,
        }
    }
}
