//! Field arithmetic over GF(2^255 - 19), radix 2^51 (5 limbs).
//!
//! This is the same representation and carry-chain already used by this
//! crate's X25519 ladder (`x25519.rs`), lifted out into a standalone,
//! public type and extended with inversion and the extras the Edwards
//! extended-coordinate code in `edwards.rs` needs. It is deliberately not
//! built on `curve25519_dalek::field` — that type's internals are private
//! to the dalek crate, and the batched vanity search needs direct access
//! to `x`, `y`, and `x*y` of both operands at once, not just whatever
//! `EdwardsPoint`'s public `+`/`-`/compress API exposes.
//!
//! Not constant-time: every input here (public keys, offsets, prefixes)
//! is public, matching the original C reference this crate is based on.

/// 2 * p (for subtraction without underflow, where p = 2^255 - 19)
const P2: [u64; 5] = [
    0x7FFFFFFFFFFED * 2,
    0x7FFFFFFFFFFFF * 2,
    0x7FFFFFFFFFFFF * 2,
    0x7FFFFFFFFFFFF * 2,
    0x7FFFFFFFFFFFF * 2,
];

/// An element of GF(2^255 - 19), little-endian 51-bit limbs.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub [u64; 5]);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement([0; 5]);
    pub const ONE: FieldElement = FieldElement([1, 0, 0, 0, 0]);

    /// Decode a 32-byte little-endian integer into a field element.
    pub fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
        let mut h = [0u64; 5];
        let load = |src: &[u8]| -> u64 {
            let mut buf = [0u8; 8];
            let len = src.len().min(8);
            buf[..len].copy_from_slice(&src[..len]);
            u64::from_le_bytes(buf)
        };
        h[0] = load(&bytes[0..]) & 0x7FFFFFFFFFFFF;
        h[1] = (load(&bytes[6..]) >> 3) & 0x7FFFFFFFFFFFF;
        h[2] = (load(&bytes[12..]) >> 6) & 0x7FFFFFFFFFFFF;
        h[3] = (load(&bytes[19..]) >> 1) & 0x7FFFFFFFFFFFF;
        h[4] = (load(&bytes[24..]) >> 12) & 0x7FFFFFFFFFFFF;
        FieldElement(h)
    }

    /// Build a field element from a small non-negative integer.
    pub fn from_u64(v: u64) -> FieldElement {
        FieldElement([v, 0, 0, 0, 0])
    }

    /// Encode a field element to 32-byte little-endian, fully reduced mod p.
    #[allow(clippy::needless_range_loop)]
    pub fn to_bytes(self) -> [u8; 32] {
        let mut h = self.0;
        let mut carry: i64;

        for i in 0..4 {
            carry = h[i] as i64 >> 51;
            h[i] &= 0x7FFFFFFFFFFFF;
            h[i + 1] = (h[i + 1] as i64 + carry) as u64;
        }
        carry = h[4] as i64 >> 51;
        h[4] &= 0x7FFFFFFFFFFFF;
        h[0] = (h[0] as i64 + carry * 19) as u64;

        for i in 0..4 {
            carry = h[i] as i64 >> 51;
            h[i] &= 0x7FFFFFFFFFFFF;
            h[i + 1] = (h[i + 1] as i64 + carry) as u64;
        }
        carry = h[4] as i64 >> 51;
        h[4] &= 0x7FFFFFFFFFFFF;
        h[0] = (h[0] as i64 + carry * 19) as u64;

        // h is in [0, 2^255-1]; reduce mod p if h >= p (i.e. h + 19 >= 2^255).
        let mut q = (h[0] + 19) >> 51;
        for i in 1..5 {
            q = (h[i] + q) >> 51;
        }
        h[0] += 19 * q;
        carry = h[0] as i64 >> 51;
        h[0] &= 0x7FFFFFFFFFFFF;
        for i in 1..4 {
            h[i] = (h[i] as i64 + carry) as u64;
            carry = h[i] as i64 >> 51;
            h[i] &= 0x7FFFFFFFFFFFF;
        }
        h[4] = (h[4] as i64 + carry) as u64;
        h[4] &= 0x7FFFFFFFFFFFF;

        let mut out = [0u8; 32];
        let t0 = h[0] | (h[1] << 51);
        let t1 = (h[1] >> 13) | (h[2] << 38);
        let t2 = (h[2] >> 26) | (h[3] << 25);
        let t3 = (h[3] >> 39) | (h[4] << 12);

        out[0..8].copy_from_slice(&t0.to_le_bytes());
        out[8..16].copy_from_slice(&t1.to_le_bytes());
        out[16..24].copy_from_slice(&t2.to_le_bytes());
        out[24..32].copy_from_slice(&t3.to_le_bytes());

        out
    }

    /// The first 64 bits of `to_bytes()`, without paying for the rest of
    /// the encoding — this is all the prefix test in `search.rs` needs.
    pub fn to_bytes_u64(self) -> u64 {
        u64::from_le_bytes(self.to_bytes()[0..8].try_into().unwrap())
    }

    pub fn add(a: &FieldElement, b: &FieldElement) -> FieldElement {
        FieldElement([
            a.0[0] + b.0[0],
            a.0[1] + b.0[1],
            a.0[2] + b.0[2],
            a.0[3] + b.0[3],
            a.0[4] + b.0[4],
        ])
    }

    pub fn sub(a: &FieldElement, b: &FieldElement) -> FieldElement {
        FieldElement([
            a.0[0] + P2[0] - b.0[0],
            a.0[1] + P2[1] - b.0[1],
            a.0[2] + P2[2] - b.0[2],
            a.0[3] + P2[3] - b.0[3],
            a.0[4] + P2[4] - b.0[4],
        ])
    }

    pub fn carry_reduce(&self) -> FieldElement {
        let mut h = self.0;
        let mut carry: u64;
        for i in 0..4 {
            carry = h[i] >> 51;
            h[i] &= 0x7FFFFFFFFFFFF;
            h[i + 1] += carry;
        }
        carry = h[4] >> 51;
        h[4] &= 0x7FFFFFFFFFFFF;
        h[0] += carry * 19;
        carry = h[0] >> 51;
        h[0] &= 0x7FFFFFFFFFFFF;
        h[1] += carry;
        FieldElement(h)
    }

    pub fn mul(a: &FieldElement, b: &FieldElement) -> FieldElement {
        let (a0, a1, a2, a3, a4) = (a.0[0] as u128, a.0[1] as u128, a.0[2] as u128, a.0[3] as u128, a.0[4] as u128);
        let (b0, b1, b2, b3, b4) = (b.0[0] as u128, b.0[1] as u128, b.0[2] as u128, b.0[3] as u128, b.0[4] as u128);

        let b1_19 = 19 * b1;
        let b2_19 = 19 * b2;
        let b3_19 = 19 * b3;
        let b4_19 = 19 * b4;

        let mut t0 = a0 * b0 + a1 * b4_19 + a2 * b3_19 + a3 * b2_19 + a4 * b1_19;
        let mut t1 = a0 * b1 + a1 * b0 + a2 * b4_19 + a3 * b3_19 + a4 * b2_19;
        let mut t2 = a0 * b2 + a1 * b1 + a2 * b0 + a3 * b4_19 + a4 * b3_19;
        let mut t3 = a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0 + a4 * b4_19;
        let mut t4 = a0 * b4 + a1 * b3 + a2 * b2 + a3 * b1 + a4 * b0;

        let carry = t0 >> 51; t0 &= 0x7FFFFFFFFFFFF; t1 += carry;
        let carry = t1 >> 51; t1 &= 0x7FFFFFFFFFFFF; t2 += carry;
        let carry = t2 >> 51; t2 &= 0x7FFFFFFFFFFFF; t3 += carry;
        let carry = t3 >> 51; t3 &= 0x7FFFFFFFFFFFF; t4 += carry;
        let carry = t4 >> 51; t4 &= 0x7FFFFFFFFFFFF; t0 += carry * 19;
        let carry = t0 >> 51; t0 &= 0x7FFFFFFFFFFFF; t1 += carry;

        FieldElement([t0 as u64, t1 as u64, t2 as u64, t3 as u64, t4 as u64])
    }

    pub fn sq(a: &FieldElement) -> FieldElement {
        let (a0, a1, a2, a3, a4) = (a.0[0] as u128, a.0[1] as u128, a.0[2] as u128, a.0[3] as u128, a.0[4] as u128);

        let d0 = 2 * a0;
        let d1 = 2 * a1;

        let a1_38 = 38 * a1;
        let a2_38 = 38 * a2;
        let a3_38 = 38 * a3;
        let a4_19 = 19 * a4;

        let mut t0 = a0 * a0 + a1_38 * a4 + a2_38 * a3;
        let mut t1 = d0 * a1 + a2_38 * a4 + 19 * a3 * a3;
        let mut t2 = d0 * a2 + a1 * a1 + a3_38 * a4;
        let mut t3 = d0 * a3 + d1 * a2 + a4_19 * a4;
        let mut t4 = d0 * a4 + d1 * a3 + a2 * a2;

        let carry = t0 >> 51; t0 &= 0x7FFFFFFFFFFFF; t1 += carry;
        let carry = t1 >> 51; t1 &= 0x7FFFFFFFFFFFF; t2 += carry;
        let carry = t2 >> 51; t2 &= 0x7FFFFFFFFFFFF; t3 += carry;
        let carry = t3 >> 51; t3 &= 0x7FFFFFFFFFFFF; t4 += carry;
        let carry = t4 >> 51; t4 &= 0x7FFFFFFFFFFFF; t0 += carry * 19;
        let carry = t0 >> 51; t0 &= 0x7FFFFFFFFFFFF; t1 += carry;

        FieldElement([t0 as u64, t1 as u64, t2 as u64, t3 as u64, t4 as u64])
    }

    /// a^(-1) mod p = a^(p-2) mod p, via the standard 2^255-21 addition chain.
    pub fn invert(a: &FieldElement) -> FieldElement {
        let z2 = FieldElement::sq(a);
        let z9 = {
            let t = FieldElement::sq(&z2);
            let t = FieldElement::sq(&t);
            FieldElement::mul(&t, a)
        };
        let z11 = FieldElement::mul(&z9, &z2);
        let z_5_0 = {
            let t = FieldElement::sq(&z11);
            FieldElement::mul(&t, &z9)
        };
        let z_10_0 = {
            let mut t = FieldElement::sq(&z_5_0);
            for _ in 1..5 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_5_0)
        };
        let z_20_0 = {
            let mut t = FieldElement::sq(&z_10_0);
            for _ in 1..10 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_10_0)
        };
        let z_40_0 = {
            let mut t = FieldElement::sq(&z_20_0);
            for _ in 1..20 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_20_0)
        };
        let z_50_0 = {
            let mut t = FieldElement::sq(&z_40_0);
            for _ in 1..10 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_10_0)
        };
        let z_100_0 = {
            let mut t = FieldElement::sq(&z_50_0);
            for _ in 1..50 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_50_0)
        };
        let z_200_0 = {
            let mut t = FieldElement::sq(&z_100_0);
            for _ in 1..100 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_100_0)
        };
        let z_250_0 = {
            let mut t = FieldElement::sq(&z_200_0);
            for _ in 1..50 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_50_0)
        };
        {
            let mut t = FieldElement::sq(&z_250_0);
            for _ in 1..5 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z11)
        }
    }

    /// a^((p+3)/8) mod p — the candidate square root exponent used by
    /// Ed25519 compressed-point decoding (RFC 8032 section 5.1.3).
    /// (p+3)/8 = 2^252 - 2. Reuses the same addition-chain shape as
    /// `invert` up to a^(2^250 - 1), then two more steps:
    ///   a^(2^251-1) = (a^(2^250-1))^2 * a
    ///   a^(2^252-2) = (a^(2^251-1))^2
    pub fn pow_p58(a: &FieldElement) -> FieldElement {
        let z2 = FieldElement::sq(a);
        let z9 = {
            let t = FieldElement::sq(&z2);
            let t = FieldElement::sq(&t);
            FieldElement::mul(&t, a)
        };
        let z11 = FieldElement::mul(&z9, &z2);
        let z_5_0 = {
            let t = FieldElement::sq(&z11);
            FieldElement::mul(&t, &z9)
        };
        let z_10_0 = {
            let mut t = FieldElement::sq(&z_5_0);
            for _ in 1..5 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_5_0)
        };
        let z_20_0 = {
            let mut t = FieldElement::sq(&z_10_0);
            for _ in 1..10 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_10_0)
        };
        let z_40_0 = {
            let mut t = FieldElement::sq(&z_20_0);
            for _ in 1..20 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_20_0)
        };
        let z_50_0 = {
            let mut t = FieldElement::sq(&z_40_0);
            for _ in 1..10 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_10_0)
        };
        let z_100_0 = {
            let mut t = FieldElement::sq(&z_50_0);
            for _ in 1..50 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_50_0)
        };
        let z_200_0 = {
            let mut t = FieldElement::sq(&z_100_0);
            for _ in 1..100 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_100_0)
        };
        let z_250_0 = {
            let mut t = FieldElement::sq(&z_200_0);
            for _ in 1..50 { t = FieldElement::sq(&t); }
            FieldElement::mul(&t, &z_50_0)
        };
        let z_251_0 = FieldElement::mul(&FieldElement::sq(&z_250_0), a);
        FieldElement::sq(&z_251_0)
    }

    pub fn is_zero(&self) -> bool {
        self.to_bytes() == [0u8; 32]
    }

    pub fn negate(&self) -> FieldElement {
        FieldElement::sub(&FieldElement::ZERO, self)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}
impl Eq for FieldElement {}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    #[test]
    fn roundtrip() {
        let mut bytes = [0u8; 32];
        bytes[0] = 9;
        let f = FieldElement::from_bytes(&bytes);
        assert_eq!(f.to_bytes(), bytes);
    }

    #[test]
    fn add_sub_identity() {
        let a = fe(12345);
        let b = fe(6789);
        let sum = FieldElement::add(&a, &b);
        let back = FieldElement::sub(&sum, &b);
        assert_eq!(back.to_bytes(), a.to_bytes());
    }

    #[test]
    fn mul_identity() {
        let a = fe(42);
        let r = FieldElement::mul(&a, &FieldElement::ONE);
        assert_eq!(r.to_bytes(), a.to_bytes());
    }

    #[test]
    fn sq_matches_mul() {
        let a = fe(991);
        assert_eq!(FieldElement::sq(&a).to_bytes(), FieldElement::mul(&a, &a).to_bytes());
    }

    #[test]
    fn invert_is_multiplicative_inverse() {
        let a = fe(9);
        let inv = FieldElement::invert(&a);
        let product = FieldElement::mul(&a, &inv);
        assert_eq!(product.to_bytes(), FieldElement::ONE.to_bytes());
    }

    #[test]
    fn invert_random_values() {
        for seed in [1u64, 2, 17, 12345, 999999937, u64::MAX] {
            let a = fe(seed);
            let inv = FieldElement::invert(&a);
            let product = FieldElement::mul(&a, &inv);
            assert_eq!(product.to_bytes(), FieldElement::ONE.to_bytes(), "seed={seed}");
        }
    }

    #[test]
    fn is_zero_detects_zero() {
        assert!(FieldElement::ZERO.is_zero());
        assert!(!FieldElement::ONE.is_zero());
    }
}
