//! The `add` subcommand's core: given a private scalar, a verified
//! offset `n`, and the target prefix, find whether `s + n*k` or `s - n*k`
//! (`k` = `scalar_offset`, the same constant that builds `O = k*G`)
//! produces the prefix, and return whichever does.

use curve25519_dalek::scalar::Scalar;

use crate::base64_codec;
use crate::basepoint;
use crate::edwards::ExtendedPoint;
use crate::error::Error;
use crate::prefix::Prefix;
use crate::search::SCALAR_OFFSET;

/// Decode a 44-character base64 private scalar (clamping is not applied
/// here — this tool works with already-valid Curve25519 scalars, not raw
/// random seeds, matching spec.md §4.H and §6's stdin contract).
pub fn decode_scalar(s: &str) -> Result<Scalar, Error> {
    let bytes = base64_codec::decode(s).map_err(|_| Error::InvalidScalarEncoding)?;
    if bytes.len() != 32 {
        return Err(Error::InvalidScalarEncoding);
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(Scalar::from_bytes_mod_order(arr))
}

fn encode_scalar(s: &Scalar) -> String {
    base64_codec::encode(s.as_bytes())
}

/// Try `s + n*k` then `s - n*k`; return the base64-encoded scalar whose
/// public key matches `prefix`, or `Error::PrefixMismatch` if neither does.
pub fn apply_offset(s: &Scalar, n: u64, prefix: &Prefix) -> Result<String, Error> {
    let nk = basepoint::scalar_from_u128((n as u128) * (SCALAR_OFFSET as u128));

    let candidates = [basepoint::scalar_add(s, &nk), basepoint::scalar_sub(s, &nk)];

    for candidate in candidates {
        let point: ExtendedPoint = basepoint::scalar_mul_base(&candidate);
        let u = point.montgomery_u();
        if prefix.matches(u.to_bytes_u64()) {
            return Ok(encode_scalar(&candidate));
        }
    }

    Err(Error::PrefixMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_matching_sign() {
        let s = basepoint::scalar_from_u128(999);
        let n = 5u64;
        let nk = basepoint::scalar_from_u128((n as u128) * (SCALAR_OFFSET as u128));
        let shifted = basepoint::scalar_add(&s, &nk);
        let shifted_point = basepoint::scalar_mul_base(&shifted);
        let u = shifted_point.montgomery_u();
        let encoded = base64_codec::encode(&u.to_bytes());
        let prefix = Prefix::parse(&encoded[0..1]).unwrap();

        let result = apply_offset(&s, n, &prefix).unwrap();
        let decoded = decode_scalar(&result).unwrap();
        let decoded_point = basepoint::scalar_mul_base(&decoded);
        let decoded_u = decoded_point.montgomery_u();
        let decoded_encoded = base64_codec::encode(&decoded_u.to_bytes());
        assert!(decoded_encoded.starts_with(&encoded[0..1]));
    }

    #[test]
    fn rejects_wrong_scalar_length() {
        assert!(decode_scalar("QQ==").is_err());
    }

    #[test]
    fn scalar_roundtrips_through_base64() {
        let s = basepoint::scalar_from_u128(123456789);
        let encoded = encode_scalar(&s);
        assert_eq!(encoded.len(), 44);
        let decoded = decode_scalar(&encoded).unwrap();
        assert_eq!(decoded, s);
    }
}
