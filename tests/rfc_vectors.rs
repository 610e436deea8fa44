// SPDX-License-Identifier: CC0-1.0

//! Published-vector conformance and cross-operation properties exercised
//! through the public API only.

use hex::prelude::*;
use x25519_poly1305::curve25519::{scalarmult, scalarmult_base};
use x25519_poly1305::{poly1305, Poly1305, PrivateKey, PublicKey};

fn bytes32(hex: &str) -> [u8; 32] {
    Vec::from_hex(hex).unwrap().as_slice().try_into().unwrap()
}

#[test]
fn poly1305_rfc7539_tag() {
    let key = bytes32("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    let tag = poly1305::authenticate(key, b"Cryptographic Forum Research Group");
    assert_eq!("a8061dc1305136c6c22b8baf0c0127a9", tag.to_lower_hex_string());
}

#[test]
fn poly1305_streaming_equals_one_shot_across_chunkings() {
    let key = bytes32("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
    let message: Vec<u8> = (0u8..=255).collect();
    let expected = poly1305::authenticate(key, &message);

    for chunk_size in [1, 5, 15, 16, 17, 32, 64, 255] {
        let mut mac = Poly1305::new(key);
        for chunk in message.chunks(chunk_size) {
            mac.input(chunk);
        }
        assert_eq!(expected, mac.tag(), "chunk size {}", chunk_size);
    }
}

#[test]
fn x25519_rfc7748_ecdh() {
    // RFC7748 section 6.1.
    let alice = PrivateKey::new(bytes32(
        "77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a",
    ));
    let bob = PrivateKey::new(bytes32(
        "5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb",
    ));

    let alice_public = scalarmult_base(&alice);
    let bob_public = scalarmult_base(&bob);
    assert_eq!(
        "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a",
        alice_public.as_bytes().to_lower_hex_string()
    );
    assert_eq!(
        "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f",
        bob_public.as_bytes().to_lower_hex_string()
    );

    let alice_shared = scalarmult(&alice, &bob_public);
    let bob_shared = scalarmult(&bob, &alice_public);
    assert_eq!(
        "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742",
        alice_shared.as_bytes().to_lower_hex_string()
    );
    assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
}

#[test]
fn x25519_symmetry_over_arbitrary_keys() {
    // Diffie-Hellman symmetry must hold for any pair of keys, not just the
    // published ones.
    for (a, b) in [(1u8, 2u8), (0x42, 0x42), (0xfe, 0x01)] {
        let ka = PrivateKey::new([a; 32]);
        let kb = PrivateKey::new([b; 32]);
        let pa = scalarmult_base(&ka);
        let pb = scalarmult_base(&kb);
        assert_eq!(scalarmult(&ka, &pb).to_bytes(), scalarmult(&kb, &pa).to_bytes());
    }
}

#[test]
fn x25519_from_slice_surface() {
    let raw = bytes32("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
    let key = PrivateKey::from_slice(&raw).unwrap();
    let public = scalarmult_base(&key);
    assert_eq!(public, PublicKey::from_slice(&public.to_bytes()).unwrap());
    assert!(PrivateKey::from_slice(&raw[1..]).is_err());
}
