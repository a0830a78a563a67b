//! Batched Curve25519 vanity public-key search engine.
//!
//! This crate has no I/O and never exits a process — it is a pure
//! `Result`-returning library consumed by the `wvk` binary. See
//! `search::SearchState` for the hot path and `apply::apply_offset` for
//! the companion offset verifier.

pub mod apply;
pub mod base64_codec;
pub mod basepoint;
pub mod edwards;
pub mod error;
pub mod field;
pub mod prefix;
pub mod search;
pub mod vecdiv;

pub use error::Error;

use edwards::ExtendedPoint;
use field::FieldElement;

/// Decode a 44-character base64 WireGuard public key (a Montgomery
/// u-coordinate) into the Edwards point used internally by the search.
///
/// Per spec.md §4.D, the x-sign is forced to `false`: the sign is lost
/// in the Montgomery form anyway, and the search only ever compares
/// u-coordinates downstream, so either sign branch yields the same
/// sequence of candidate offsets (spec.md §9, "Sign ambiguity").
pub fn decode_public_key(base64_key: &str) -> Result<ExtendedPoint, Error> {
    let bytes = base64_codec::decode(base64_key).map_err(|_| Error::InvalidPublicKeyEncoding)?;
    if bytes.len() != 32 {
        return Err(Error::InvalidPublicKeyEncoding);
    }
    let mut u_bytes = [0u8; 32];
    u_bytes.copy_from_slice(&bytes);
    if u_bytes == [0u8; 32] {
        // u = 0 is the order-2 point: it decodes to a legitimate curve
        // point but is not a usable WireGuard public key (RFC 7748 §6.1
        // calls out the all-zero output explicitly).
        return Err(Error::PublicKeyNotOnCurve);
    }
    let u = FieldElement::from_bytes(&u_bytes);

    // Edwards y = (u-1)/(u+1).
    let num = FieldElement::sub(&u, &FieldElement::ONE);
    let den = FieldElement::add(&u, &FieldElement::ONE);
    let y = FieldElement::mul(&num, &FieldElement::invert(&den));

    ExtendedPoint::decode(&y.to_bytes(), false).ok_or(Error::PublicKeyNotOnCurve)
}
