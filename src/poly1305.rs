// SPDX-License-Identifier: CC0-1.0

//! Poly1305 one-time message authenticator from RFC7539.
//!
//! Arithmetic follows the radix-2^26 layout of the
//! ["Donna"](https://github.com/floodyberry/poly1305-donna/blob/master/poly1305-donna-32.h)
//! implementation in C: the 130-bit accumulator and the clamped multiplier
//! each live in five 26-bit limbs so every product fits a u64 and carries
//! can be propagated lazily.
//!
//! The key is one-time: authenticating two different messages under the same
//! 32-byte key forfeits all security. Nothing here detects reuse.

/// Mask for a 26-bit limb.
const LIMB_MASK: u32 = 0x03ffffff;
/// Width of a limb in bits.
const LIMB_BITS: u32 = 26;
/// Messages are authenticated 16 bytes at a time.
const BLOCK_SIZE: usize = 16;

/// Poly1305 authenticator takes a 32-byte one-time key and a message and
/// produces a 16-byte tag.
///
/// The streaming interface may be fed the message across any number of
/// [`input`](Self::input) calls at arbitrary split points; the tag depends
/// only on the concatenated bytes. Trailing partial blocks are buffered, so
/// whether a block is the message's final block is decided once, at
/// [`tag`](Self::tag) time, never from an individual call's length.
pub struct Poly1305 {
    /// Clamped multiplier half of the key.
    r: Multiplier,
    /// Pad half of the key, added once at finalization.
    s: [u32; 4],
    /// Running accumulator.
    acc: Accumulator,
    /// Bytes of a not-yet-complete block.
    buffer: [u8; BLOCK_SIZE],
    /// Number of meaningful bytes in `buffer`, always below 16.
    buffered: usize,
}

impl Poly1305 {
    /// Initializes the authenticator with a 32-byte one-time secret key.
    pub const fn new(key: [u8; 32]) -> Self {
        Poly1305 {
            r: Multiplier::clamped(&key),
            s: [
                u32::from_le_bytes([key[16], key[17], key[18], key[19]]),
                u32::from_le_bytes([key[20], key[21], key[22], key[23]]),
                u32::from_le_bytes([key[24], key[25], key[26], key[27]]),
                u32::from_le_bytes([key[28], key[29], key[30], key[31]]),
            ],
            acc: Accumulator::ZERO,
            buffer: [0; BLOCK_SIZE],
            buffered: 0,
        }
    }

    /// Feeds message bytes into the authenticator.
    ///
    /// May be called any number of times, with slices of any length
    /// including zero. An empty slice leaves the state untouched.
    pub fn input(&mut self, message: &[u8]) {
        let mut message = message;

        // Top up a previously buffered partial block first.
        if self.buffered > 0 {
            let take = (BLOCK_SIZE - self.buffered).min(message.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&message[..take]);
            self.buffered += take;
            message = &message[take..];

            if self.buffered < BLOCK_SIZE {
                return;
            }
            let block = self.buffer;
            self.absorb(&block);
            self.buffered = 0;
        }

        let mut chunks = message.chunks_exact(BLOCK_SIZE);
        for chunk in &mut chunks {
            self.absorb(chunk);
        }

        let rest = chunks.remainder();
        if !rest.is_empty() {
            self.buffer[..rest.len()].copy_from_slice(rest);
            self.buffered = rest.len();
        }
    }

    /// Generates the authentication tag, consuming the context.
    pub fn tag(mut self) -> [u8; 16] {
        // The true final block of the message, if short, is the one place
        // the terminal encoding (0x01 after the data instead of bit 128)
        // is applied.
        if self.buffered > 0 {
            self.acc.add(&Block::padded(&self.buffer[..self.buffered]));
            self.acc.mul_reduce(&self.r);
        }

        let a = self.acc.freeze();

        // tag = (h + s) mod 2^128
        let mut out = [0u8; 16];
        let mut word: u64 = 0;
        for i in 0..4 {
            word = (word >> 32) + a[i] as u64 + self.s[i] as u64;
            out[i * 4..(i + 1) * 4].copy_from_slice(&(word as u32).to_le_bytes());
        }
        out
    }

    /// Folds one complete 16-byte block into the accumulator.
    fn absorb(&mut self, block: &[u8]) {
        self.acc.add(&Block::padded(block));
        self.acc.mul_reduce(&self.r);
    }
}

/// Computes the tag for a whole message in one call.
///
/// Equivalent to [`Poly1305::new`] followed by one [`Poly1305::input`] of the
/// full message and [`Poly1305::tag`]. The `crypto_onetimeauth` operation.
pub fn authenticate(key: [u8; 32], message: &[u8]) -> [u8; 16] {
    let mut mac = Poly1305::new(key);
    mac.input(message);
    mac.tag()
}

/// The clamped `r` half of the key in five 26-bit limbs.
///
/// Immutable for the lifetime of a context.
struct Multiplier([u32; 5]);

impl Multiplier {
    /// Loads and clamps the first half of the key.
    ///
    /// RFC7539 clamping: bytes 3, 7, 11 and 15 keep only their low four
    /// bits, bytes 4, 8 and 12 drop their low two bits. The masks below
    /// apply that rule before the bits are split into limbs.
    const fn clamped(key: &[u8; 32]) -> Self {
        let w0 = u32::from_le_bytes([key[0], key[1], key[2], key[3] & 0x0f]);
        let w1 = u32::from_le_bytes([key[4] & 0xfc, key[5], key[6], key[7] & 0x0f]);
        let w2 = u32::from_le_bytes([key[8] & 0xfc, key[9], key[10], key[11] & 0x0f]);
        let w3 = u32::from_le_bytes([key[12] & 0xfc, key[13], key[14], key[15] & 0x0f]);

        Multiplier([
            w0 & LIMB_MASK,
            ((w0 >> 26) | (w1 << 6)) & LIMB_MASK,
            ((w1 >> 20) | (w2 << 12)) & LIMB_MASK,
            ((w2 >> 14) | (w3 << 18)) & LIMB_MASK,
            w3 >> 8,
        ])
    }
}

/// One message block encoded as a 130-bit value in five 26-bit limbs.
struct Block([u32; 5]);

impl Block {
    /// Encodes up to 16 message bytes with the RFC7539 padding rule.
    ///
    /// A 0x01 byte is appended directly after the data, zeros fill the rest.
    /// For a complete 16-byte block the appended byte lands on bit 128, the
    /// block-boundary marker; for the message's short final block it lands
    /// at bit 8·len, which is what makes trailing zeros of the message
    /// distinguishable from padding.
    fn padded(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= BLOCK_SIZE);
        let mut buf = [0u8; 17];
        buf[..bytes.len()].copy_from_slice(bytes);
        buf[bytes.len()] = 0x01;

        let m0 = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let m1 = u32::from_le_bytes([buf[3], buf[4], buf[5], buf[6]]);
        let m2 = u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]);
        let m3 = u32::from_le_bytes([buf[9], buf[10], buf[11], buf[12]]);
        let m4 = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);

        Block([
            m0 & LIMB_MASK,
            (m1 >> 2) & LIMB_MASK,
            (m2 >> 4) & LIMB_MASK,
            (m3 >> 6) & LIMB_MASK,
            (m4 >> 8) | ((buf[16] as u32) << 24),
        ])
    }
}

/// The 130-bit running accumulator `h` in five 26-bit limbs.
///
/// Limbs are kept partially reduced: below 2^26 plus a small carry after a
/// multiply, below 2^27 after a block has been added. All bounds stay far
/// from u32/u64 overflow, which the width analysis in the Donna sources
/// pins down.
#[derive(Clone, Copy)]
struct Accumulator([u32; 5]);

impl Accumulator {
    const ZERO: Self = Accumulator([0; 5]);

    /// h += block. No reduction; limb sums stay below 2^27.
    fn add(&mut self, block: &Block) {
        for (h, m) in self.0.iter_mut().zip(block.0.iter()) {
            *h += m;
        }
    }

    /// h = (h * r) mod 2^130 - 5.
    ///
    /// Schoolbook multiplication where limbs that overshoot 2^130 wrap
    /// around multiplied by 5, since 2^130 ≡ 5 (mod 2^130 - 5).
    fn mul_reduce(&mut self, r: &Multiplier) {
        let (h0, h1, h2, h3, h4) = (
            self.0[0] as u64,
            self.0[1] as u64,
            self.0[2] as u64,
            self.0[3] as u64,
            self.0[4] as u64,
        );
        let (r0, r1, r2, r3, r4) = (
            r.0[0] as u64,
            r.0[1] as u64,
            r.0[2] as u64,
            r.0[3] as u64,
            r.0[4] as u64,
        );
        let (x1, x2, x3, x4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

        let d0 = h0 * r0 + h1 * x4 + h2 * x3 + h3 * x2 + h4 * x1;
        let d1 = h0 * r1 + h1 * r0 + h2 * x4 + h3 * x3 + h4 * x2;
        let d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * x4 + h4 * x3;
        let d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * x4;
        let d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        let c = d0 >> LIMB_BITS;
        let d1 = d1 + c;
        let c = d1 >> LIMB_BITS;
        let d2 = d2 + c;
        let c = d2 >> LIMB_BITS;
        let d3 = d3 + c;
        let c = d3 >> LIMB_BITS;
        let d4 = d4 + c;
        let c = d4 >> LIMB_BITS;

        let mut h0 = (d0 as u32) & LIMB_MASK;
        let mut h1 = (d1 as u32) & LIMB_MASK;
        h0 += (c as u32) * 5;
        h1 += h0 >> LIMB_BITS;
        h0 &= LIMB_MASK;

        self.0 = [
            h0,
            h1,
            (d2 as u32) & LIMB_MASK,
            (d3 as u32) & LIMB_MASK,
            (d4 as u32) & LIMB_MASK,
        ];
    }

    /// Fully reduces modulo 2^130 - 5 and packs the canonical value into
    /// four 32-bit words.
    ///
    /// The final subtraction is selected by mask, not branch: both h and
    /// h - (2^130 - 5) are computed and the sign of the latter picks one.
    fn freeze(self) -> [u32; 4] {
        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.0;

        // Propagate carries so every limb holds 26 bits.
        let c = h1 >> LIMB_BITS;
        h1 &= LIMB_MASK;
        h2 += c;
        let c = h2 >> LIMB_BITS;
        h2 &= LIMB_MASK;
        h3 += c;
        let c = h3 >> LIMB_BITS;
        h3 &= LIMB_MASK;
        h4 += c;
        let c = h4 >> LIMB_BITS;
        h4 &= LIMB_MASK;
        h0 += c * 5;
        let c = h0 >> LIMB_BITS;
        h0 &= LIMB_MASK;
        h1 += c;

        // g = h + 5 - 2^130, valid exactly when h >= 2^130 - 5.
        let mut g0 = h0 + 5;
        let c = g0 >> LIMB_BITS;
        g0 &= LIMB_MASK;
        let mut g1 = h1 + c;
        let c = g1 >> LIMB_BITS;
        g1 &= LIMB_MASK;
        let mut g2 = h2 + c;
        let c = g2 >> LIMB_BITS;
        g2 &= LIMB_MASK;
        let mut g3 = h3 + c;
        let c = g3 >> LIMB_BITS;
        g3 &= LIMB_MASK;
        let g4 = h4.wrapping_add(c).wrapping_sub(1 << LIMB_BITS);

        // All ones when g did not underflow, i.e. when g is the answer.
        let mask = (g4 >> 31).wrapping_sub(1);
        h0 = (g0 & mask) | (h0 & !mask);
        h1 = (g1 & mask) | (h1 & !mask);
        h2 = (g2 & mask) | (h2 & !mask);
        h3 = (g3 & mask) | (h3 & !mask);
        h4 = (g4 & mask) | (h4 & !mask);

        [
            h0 | (h1 << 26),
            (h1 >> 6) | (h2 << 20),
            (h2 >> 12) | (h3 << 14),
            (h3 >> 18) | (h4 << 8),
        ]
    }
}

#[cfg(test)]
#[cfg(feature = "alloc")]
mod tests {
    use alloc::vec::Vec;

    use hex::prelude::*;

    use super::*;

    fn rfc7539_key() -> [u8; 32] {
        Vec::from_hex("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b")
            .unwrap()
            .as_slice()
            .try_into()
            .unwrap()
    }

    #[test]
    fn rfc7539_vector() {
        let mut poly = Poly1305::new(rfc7539_key());
        poly.input(b"Cryptographic Forum Research Group");
        assert_eq!("a8061dc1305136c6c22b8baf0c0127a9", poly.tag().to_lower_hex_string());
    }

    #[test]
    fn one_shot_matches_streaming() {
        let message = b"Cryptographic Forum Research Group";
        let mut poly = Poly1305::new(rfc7539_key());
        poly.input(message);
        assert_eq!(authenticate(rfc7539_key(), message), poly.tag());
    }

    #[test]
    fn chunking_invariance() {
        let message: Vec<u8> = (0u8..67).map(|i| i.wrapping_mul(37)).collect();
        let expected = authenticate(rfc7539_key(), &message);

        // Byte at a time.
        let mut poly = Poly1305::new(rfc7539_key());
        for byte in &message {
            poly.input(core::slice::from_ref(byte));
        }
        assert_eq!(expected, poly.tag());

        // Every split point.
        for split in 0..=message.len() {
            let mut poly = Poly1305::new(rfc7539_key());
            poly.input(&message[..split]);
            poly.input(&message[split..]);
            assert_eq!(expected, poly.tag(), "split at {}", split);
        }
    }

    #[test]
    fn sixteen_then_one_matches_seventeen() {
        let message: Vec<u8> = (0u8..17).collect();
        let expected = authenticate(rfc7539_key(), &message);

        let mut poly = Poly1305::new(rfc7539_key());
        poly.input(&message[..16]);
        poly.input(&message[16..]);
        assert_eq!(expected, poly.tag());
    }

    #[test]
    fn empty_input_is_a_noop() {
        let message = b"some bytes that do not align to the block size";
        let expected = authenticate(rfc7539_key(), message);

        let mut poly = Poly1305::new(rfc7539_key());
        poly.input(&[]);
        poly.input(&message[..20]);
        poly.input(&[]);
        poly.input(&message[20..]);
        poly.input(&[]);
        assert_eq!(expected, poly.tag());
    }

    #[test]
    fn exact_block_needs_no_padding() {
        // A 16-byte message and the same message zero-extended must not
        // collide; the terminal marker sits at bit 128 vs bit 136.
        let block = [0xabu8; 16];
        let mut extended = [0u8; 17];
        extended[..16].copy_from_slice(&block);

        assert_ne!(authenticate(rfc7539_key(), &block), authenticate(rfc7539_key(), &extended));
    }

    #[test]
    fn zero_r_tag_is_the_pad() {
        // With r clamped to zero the polynomial vanishes and the tag is s.
        let mut key = [0u8; 32];
        key[16..].copy_from_slice(&Vec::from_hex("36e5f6b5c5e06070f0efca96227a863e").unwrap());

        let tag = authenticate(key, b"Any submission to the IETF is considered a contribution");
        assert_eq!("36e5f6b5c5e06070f0efca96227a863e", tag.to_lower_hex_string());
    }

    #[test]
    fn freeze_reduces_canonically() {
        // 2^130 - 5 is congruent to zero.
        let acc = Accumulator([0x3fffffb, LIMB_MASK, LIMB_MASK, LIMB_MASK, LIMB_MASK]);
        assert_eq!([0u32; 4], acc.freeze());

        // 2^130 - 4 reduces to one.
        let acc = Accumulator([0x3fffffc, LIMB_MASK, LIMB_MASK, LIMB_MASK, LIMB_MASK]);
        assert_eq!([1, 0, 0, 0], acc.freeze());

        // Values below the modulus pass through.
        let acc = Accumulator([5, 0, 0, 0, 0]);
        assert_eq!([5, 0, 0, 0], acc.freeze());
    }

    #[test]
    fn accumulator_multiply_by_one() {
        // r = 1 turns each step into plain addition of blocks mod 2^130 - 5.
        let r = Multiplier([1, 0, 0, 0, 0]);
        let mut acc = Accumulator([7, 1, 0, 0, 0]);
        acc.mul_reduce(&r);
        assert_eq!([7, 1, 0, 0, 0], acc.0);
    }
}
