// SPDX-License-Identifier: CC0-1.0

//! X25519 Diffie-Hellman scalar multiplication over Curve25519 from RFC7748.
//!
//! Field arithmetic over GF(2^255 - 19) uses five 51-bit limbs with u128
//! intermediate products; the scalar multiplication is the RFC7748
//! Montgomery ladder.
//!
//! Constant time is a contract here, not a style choice: the ladder always
//! runs its 255 iterations and every scalar-dependent decision is a masked
//! select. A data-dependent branch in this module is a bug even when the
//! output stays correct.

/// Mask for a 51-bit limb.
const LIMB_MASK: u64 = (1 << 51) - 1;
/// Ladder constant (A - 2) / 4 for the curve's A = 486662.
const A24: u64 = 121665;
/// The generator's u-coordinate is 9.
const BASE_POINT: [u8; 32] = [
    9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0,
];

/// A 32-byte X25519 private key.
///
/// Any 32 bytes are a valid private key; the scalar is clamped into the
/// prime-order subgroup range on every use. The type implements neither
/// `Debug` nor `Display`, keeping the raw bytes out of log output.
#[derive(Clone, Copy)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Constructs a private key from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self { PrivateKey(bytes) }

    /// Constructs a private key from a 32-byte slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, crate::Error> {
        Ok(PrivateKey(copy_32(slice)?))
    }

    /// Returns the clamped form of the key.
    ///
    /// Clamping clears the three low bits of byte 0 and the top bit of
    /// byte 31, and sets bit 6 of byte 31. The transform is idempotent.
    pub const fn clamped(&self) -> PrivateKey {
        let mut k = self.0;
        k[0] &= 248;
        k[31] &= 127;
        k[31] |= 64;
        PrivateKey(k)
    }

    /// Returns a reference to the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }
}

/// A 32-byte X25519 public key, the u-coordinate of a curve point.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Constructs a public key from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self { PublicKey(bytes) }

    /// Constructs a public key from a 32-byte slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, crate::Error> {
        Ok(PublicKey(copy_32(slice)?))
    }

    /// Returns a reference to the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    /// Returns the raw key bytes.
    pub fn to_bytes(self) -> [u8; 32] { self.0 }
}

/// A 32-byte Diffie-Hellman shared secret.
///
/// Feed this through a key derivation function before using it as key
/// material; the raw u-coordinate is not uniformly distributed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Returns a reference to the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    /// Returns the raw secret bytes.
    pub fn to_bytes(self) -> [u8; 32] { self.0 }
}

/// Computes the public key for a private key: `k * BasePoint`.
///
/// The `crypto_scalarmult_base` operation.
pub fn scalarmult_base(private_key: &PrivateKey) -> PublicKey {
    let u = FieldElement::from_bytes(&BASE_POINT);
    PublicKey(ladder(&private_key.clamped().0, &u))
}

/// Computes the shared secret `k * peer_point` from our private key and the
/// peer's public key.
///
/// The `crypto_scalarmult` operation. Degenerate peer points (the small
/// order points, including zero) are deliberately not rejected: the ladder
/// produces its deterministic 32-byte result for every input, and screening
/// for contributory behavior is the caller's policy. The top bit of the
/// peer's u-coordinate is ignored per RFC7748.
pub fn scalarmult(private_key: &PrivateKey, peer: &PublicKey) -> SharedSecret {
    let u = FieldElement::from_bytes(&peer.0);
    SharedSecret(ladder(&private_key.clamped().0, &u))
}

fn copy_32(slice: &[u8]) -> Result<[u8; 32], crate::Error> {
    slice.try_into().map_err(|_| crate::Error::InvalidSliceLength {
        expected: 32,
        received: slice.len(),
    })
}

/// The RFC7748 Montgomery ladder.
///
/// The scalar must already be clamped. Exactly 255 iterations run for every
/// scalar, each performing the same field operations; the swap between the
/// (x2, z2) and (x3, z3) tracks is a branchless masked select driven by the
/// XOR of consecutive scalar bits.
fn ladder(scalar: &[u8; 32], u: &FieldElement) -> [u8; 32] {
    let x1 = *u;
    let mut x2 = FieldElement::ONE;
    let mut z2 = FieldElement::ZERO;
    let mut x3 = x1;
    let mut z3 = FieldElement::ONE;
    let mut swap: u64 = 0;

    for t in (0..255).rev() {
        let bit = ((scalar[t / 8] >> (t % 8)) & 1) as u64;
        swap ^= bit;
        FieldElement::conditional_swap(&mut x2, &mut x3, swap);
        FieldElement::conditional_swap(&mut z2, &mut z3, swap);
        swap = bit;

        // One combined differential double-and-add step, RFC7748 section 5.
        let a = x2.add(&z2);
        let aa = a.square();
        let b = x2.sub(&z2);
        let bb = b.square();
        let e = aa.sub(&bb);
        let c = x3.add(&z3);
        let d = x3.sub(&z3);
        let da = d.mul(&a);
        let cb = c.mul(&b);
        x3 = da.add(&cb).square();
        z3 = x1.mul(&da.sub(&cb).square());
        x2 = aa.mul(&bb);
        z2 = e.mul(&aa.add(&e.mul_small(A24)));
    }

    FieldElement::conditional_swap(&mut x2, &mut x3, swap);
    FieldElement::conditional_swap(&mut z2, &mut z3, swap);

    // Projective to affine: x2 / z2. A degenerate point can leave z2 = 0,
    // in which case the inverse is 0 and so is the result.
    x2.mul(&z2.invert()).to_bytes()
}

/// An element of GF(2^255 - 19) in five 51-bit limbs, little endian.
///
/// Limbs are partially reduced: multiplication outputs stay a hair above
/// 2^51, additions and subtractions run lazy and are absorbed by the next
/// multiplication. All sums stay well inside u64 and all products inside
/// u128.
#[derive(Clone, Copy)]
struct FieldElement([u64; 5]);

impl FieldElement {
    const ZERO: Self = FieldElement([0; 5]);
    const ONE: Self = FieldElement([1, 0, 0, 0, 0]);

    /// Interprets 32 little-endian bytes as a field element.
    ///
    /// Bit 255 is dropped, per the RFC7748 decoding of u-coordinates.
    fn from_bytes(bytes: &[u8; 32]) -> Self {
        FieldElement([
            load8(&bytes[0..8]) & LIMB_MASK,
            (load8(&bytes[6..14]) >> 3) & LIMB_MASK,
            (load8(&bytes[12..20]) >> 6) & LIMB_MASK,
            (load8(&bytes[19..27]) >> 1) & LIMB_MASK,
            (load8(&bytes[24..32]) >> 12) & LIMB_MASK,
        ])
    }

    /// Encodes the fully reduced canonical value as 32 little-endian bytes.
    fn to_bytes(self) -> [u8; 32] {
        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.0;

        // q = 1 exactly when the value is >= p, computed by rippling the
        // +19 overflow through every limb.
        let mut q = (h0 + 19) >> 51;
        q = (h1 + q) >> 51;
        q = (h2 + q) >> 51;
        q = (h3 + q) >> 51;
        q = (h4 + q) >> 51;

        // Adding 19q then masking to 255 bits subtracts qp.
        h0 += 19 * q;
        let c = h0 >> 51;
        h0 &= LIMB_MASK;
        h1 += c;
        let c = h1 >> 51;
        h1 &= LIMB_MASK;
        h2 += c;
        let c = h2 >> 51;
        h2 &= LIMB_MASK;
        h3 += c;
        let c = h3 >> 51;
        h3 &= LIMB_MASK;
        h4 += c;
        h4 &= LIMB_MASK;

        let words = [
            h0 | (h1 << 51),
            (h1 >> 13) | (h2 << 38),
            (h2 >> 26) | (h3 << 25),
            (h3 >> 39) | (h4 << 12),
        ];
        let mut bytes = [0u8; 32];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Limbwise sum, left unreduced for the next multiplication.
    fn add(&self, rhs: &FieldElement) -> FieldElement {
        let mut out = [0u64; 5];
        for i in 0..5 {
            out[i] = self.0[i] + rhs.0[i];
        }
        FieldElement(out)
    }

    /// Limbwise difference, biased by 2p to keep limbs non-negative.
    fn sub(&self, rhs: &FieldElement) -> FieldElement {
        // 2p in radix 2^51.
        const TWO_P: [u64; 5] =
            [0xfffffffffffda, 0xffffffffffffe, 0xffffffffffffe, 0xffffffffffffe, 0xffffffffffffe];
        let mut out = [0u64; 5];
        for i in 0..5 {
            out[i] = self.0[i] + TWO_P[i] - rhs.0[i];
        }
        FieldElement(out)
    }

    /// Field multiplication with reduction.
    ///
    /// 2^255 ≡ 19 (mod p), so limb products that land above limb 4 fold back
    /// to the bottom multiplied by 19.
    fn mul(&self, rhs: &FieldElement) -> FieldElement {
        let (a0, a1, a2, a3, a4) = (
            self.0[0] as u128,
            self.0[1] as u128,
            self.0[2] as u128,
            self.0[3] as u128,
            self.0[4] as u128,
        );
        let (b0, b1, b2, b3, b4) = (
            rhs.0[0] as u128,
            rhs.0[1] as u128,
            rhs.0[2] as u128,
            rhs.0[3] as u128,
            rhs.0[4] as u128,
        );
        let (b1_19, b2_19, b3_19, b4_19) = (b1 * 19, b2 * 19, b3 * 19, b4 * 19);

        let mut r0 = a0 * b0 + a1 * b4_19 + a2 * b3_19 + a3 * b2_19 + a4 * b1_19;
        let mut r1 = a0 * b1 + a1 * b0 + a2 * b4_19 + a3 * b3_19 + a4 * b2_19;
        let mut r2 = a0 * b2 + a1 * b1 + a2 * b0 + a3 * b4_19 + a4 * b3_19;
        let mut r3 = a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0 + a4 * b4_19;
        let mut r4 = a0 * b4 + a1 * b3 + a2 * b2 + a3 * b1 + a4 * b0;

        let mask = LIMB_MASK as u128;
        let c = r0 >> 51;
        r0 &= mask;
        r1 += c;
        let c = r1 >> 51;
        r1 &= mask;
        r2 += c;
        let c = r2 >> 51;
        r2 &= mask;
        r3 += c;
        let c = r3 >> 51;
        r3 &= mask;
        r4 += c;
        let c = r4 >> 51;
        r4 &= mask;
        r0 += c * 19;
        let c = r0 >> 51;
        r0 &= mask;
        r1 += c;

        FieldElement([r0 as u64, r1 as u64, r2 as u64, r3 as u64, r4 as u64])
    }

    fn square(&self) -> FieldElement { self.mul(self) }

    /// Squares `n` times.
    fn nsquare(&self, n: u32) -> FieldElement {
        let mut out = *self;
        for _ in 0..n {
            out = out.square();
        }
        out
    }

    /// Multiplication by a small constant, used for a24.
    fn mul_small(&self, small: u64) -> FieldElement {
        let small = small as u128;
        let mask = LIMB_MASK as u128;
        let mut r0 = (self.0[0] as u128) * small;
        let mut r1 = (self.0[1] as u128) * small;
        let mut r2 = (self.0[2] as u128) * small;
        let mut r3 = (self.0[3] as u128) * small;
        let mut r4 = (self.0[4] as u128) * small;

        let c = r0 >> 51;
        r0 &= mask;
        r1 += c;
        let c = r1 >> 51;
        r1 &= mask;
        r2 += c;
        let c = r2 >> 51;
        r2 &= mask;
        r3 += c;
        let c = r3 >> 51;
        r3 &= mask;
        r4 += c;
        let c = r4 >> 51;
        r4 &= mask;
        r0 += c * 19;

        FieldElement([r0 as u64, r1 as u64, r2 as u64, r3 as u64, r4 as u64])
    }

    /// Inversion as exponentiation by p - 2 = 2^255 - 21, Fermat's little
    /// theorem, with the standard addition chain. Zero maps to zero.
    fn invert(&self) -> FieldElement {
        let z2 = self.square();
        let z9 = self.mul(&z2.square().square());
        let z11 = z2.mul(&z9);
        let z2_5_0 = z9.mul(&z11.square());
        let z2_10_0 = z2_5_0.mul(&z2_5_0.nsquare(5));
        let z2_20_0 = z2_10_0.mul(&z2_10_0.nsquare(10));
        let z2_40_0 = z2_20_0.mul(&z2_20_0.nsquare(20));
        let z2_50_0 = z2_10_0.mul(&z2_40_0.nsquare(10));
        let z2_100_0 = z2_50_0.mul(&z2_50_0.nsquare(50));
        let z2_200_0 = z2_100_0.mul(&z2_100_0.nsquare(100));
        let z2_250_0 = z2_50_0.mul(&z2_200_0.nsquare(50));
        z11.mul(&z2_250_0.nsquare(5))
    }

    /// Swaps two elements when `swap` is 1, branchlessly.
    ///
    /// `swap` must be 0 or 1. The mask is derived arithmetically so the
    /// same instructions execute either way.
    fn conditional_swap(a: &mut FieldElement, b: &mut FieldElement, swap: u64) {
        let mask = 0u64.wrapping_sub(swap);
        for i in 0..5 {
            let t = mask & (a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }
}

fn load8(bytes: &[u8]) -> u64 {
    u64::from_le_bytes(bytes.try_into().expect("slicing produces an 8-byte slice"))
}
