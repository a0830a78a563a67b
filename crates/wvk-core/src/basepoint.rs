//! The only place this crate touches `curve25519-dalek`: scalar
//! multiplication of the Ed25519 basepoint. Called a handful of times per
//! process (computing `O = scalar_offset * G`, the skip-offset seed, and
//! the two scalar muls `add` needs) rather than per candidate, so dalek's
//! constant-time ladder is the right tool — the batch loop itself never
//! calls into here.

use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::scalar::Scalar;

use crate::edwards::ExtendedPoint;

/// scalar * G, decoded back into this crate's own `ExtendedPoint` so the
/// rest of the codebase never has to hold a dalek `EdwardsPoint`.
pub fn scalar_mul_base(scalar: &Scalar) -> ExtendedPoint {
    let point = scalar * ED25519_BASEPOINT_TABLE;
    let compressed = point.compress();
    let bytes = compressed.to_bytes();
    let x_sign = (bytes[31] & 0x80) != 0;
    ExtendedPoint::decode(&bytes, x_sign).expect("basepoint scalar multiple is always on-curve")
}

/// Build a `Scalar` from a small non-negative integer, little-endian,
/// reduced mod the group order — the same construction `lib.rs` used for
/// its wasm-facing `scalar_mult_base` before this crate grew its own
/// offset search.
pub fn scalar_from_u128(v: u128) -> Scalar {
    let mut bytes = [0u8; 32];
    bytes[0..16].copy_from_slice(&v.to_le_bytes());
    Scalar::from_bytes_mod_order(bytes)
}

/// s +/- n*k as a 32-byte little-endian scalar, reduced mod the group
/// order — the arithmetic `apply::apply_offset` needs to reconstruct a
/// candidate private scalar from a winning offset.
pub fn scalar_add(a: &Scalar, b: &Scalar) -> Scalar {
    a + b
}

pub fn scalar_sub(a: &Scalar, b: &Scalar) -> Scalar {
    a - b
}

pub fn scalar_mul(a: &Scalar, b: &Scalar) -> Scalar {
    a * b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_mul_base_matches_montgomery_u_of_basepoint() {
        // 1 * G must be the standard Ed25519 basepoint; its Montgomery u
        // is the well-known constant 9.
        let one = scalar_from_u128(1);
        let g = scalar_mul_base(&one);
        let u = g.montgomery_u();
        let mut expected = [0u8; 32];
        expected[0] = 9;
        assert_eq!(u.to_bytes(), expected);
    }

    #[test]
    fn scalar_arithmetic_round_trips() {
        let a = scalar_from_u128(100);
        let b = scalar_from_u128(37);
        let sum = scalar_add(&a, &b);
        let back = scalar_sub(&sum, &b);
        assert_eq!(back, a);
    }
}
