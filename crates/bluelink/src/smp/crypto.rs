//! Cryptographic functions for LE legacy pairing
//!
//! Values are held in little-endian byte order, the order they travel in on
//! the wire: index 0 is the least significant octet. The security function
//! `e` works on big-endian blocks, so keys and plaintext are reversed on the
//! way into AES-128 and the ciphertext is reversed on the way out.

use crate::gap::DeviceAddress;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

/// Generate a 128-bit random number
pub fn generate_random_128() -> [u8; 16] {
    rand::random::<[u8; 16]>()
}

/// Security function e (BT Core Spec Vol 3, Part H, 2.2.1)
pub fn e(key: &[u8; 16], plaintext: &[u8; 16]) -> [u8; 16] {
    let mut key_be = *key;
    key_be.reverse();

    let mut block_be = *plaintext;
    block_be.reverse();

    let cipher = Aes128::new(&GenericArray::from(key_be));
    let mut block = GenericArray::from(block_be);
    cipher.encrypt_block(&mut block);

    let mut result: [u8; 16] = block.into();
    result.reverse();
    result
}

fn xor_128(a: &[u8; 16], b: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}

/// Confirm value generation function c1 (BT Core Spec Vol 3, Part H, 2.2.3)
///
/// `preq` and `pres` are the full 7-byte Pairing Request and Response PDUs.
pub fn c1(
    temp_key: &[u8; 16],
    rand: &[u8; 16],
    preq: &[u8; 7],
    pres: &[u8; 7],
    initiator: &DeviceAddress,
    responder: &DeviceAddress,
) -> [u8; 16] {
    // p1 = pres || preq || rat || iat
    let mut p1 = [0u8; 16];
    p1[0] = initiator.address_type.into();
    p1[1] = responder.address_type.into();
    p1[2..9].copy_from_slice(preq);
    p1[9..16].copy_from_slice(pres);

    // p2 = padding || ia || ra
    let mut p2 = [0u8; 16];
    p2[0..6].copy_from_slice(&responder.address.bytes);
    p2[6..12].copy_from_slice(&initiator.address.bytes);

    let res = e(temp_key, &xor_128(rand, &p1));
    e(temp_key, &xor_128(&res, &p2))
}

/// Key generation function s1 (BT Core Spec Vol 3, Part H, 2.2.4)
///
/// `r1` is the responder's random, `r2` the initiator's.
pub fn s1(temp_key: &[u8; 16], r1: &[u8; 16], r2: &[u8; 16]) -> [u8; 16] {
    // r' = r1[63:0] || r2[63:0]
    let mut r_prime = [0u8; 16];
    r_prime[0..8].copy_from_slice(&r2[0..8]);
    r_prime[8..16].copy_from_slice(&r1[0..8]);

    e(temp_key, &r_prime)
}
