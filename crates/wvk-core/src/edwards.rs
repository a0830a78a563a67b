//! Edwards25519 extended-coordinate points and the handful of curve
//! primitives the batched search needs: point addition, affine conversion,
//! Montgomery-u extraction, and compressed-y decoding.
//!
//! `d`, the twisted-Edwards curve parameter, is derived rather than
//! hardcoded as a 77-digit literal: RFC 8032 §5.1 defines it as
//! `d = -121665/121666 mod p`, and deriving it from those two small
//! integers at startup is both harder to get wrong and self-documenting.

use std::sync::OnceLock;

use crate::field::FieldElement;

/// sqrt(-1) mod p (RFC 8032 / curve25519-dalek's `constants::SQRT_M1`),
/// little-endian. Used to fix up the candidate square root during
/// compressed-point decoding.
const SQRT_M1_BYTES: [u8; 32] = [
    0xb0, 0xa0, 0x0e, 0x4a, 0x27, 0x1b, 0xee, 0xc4, 0x78, 0xe4, 0x2f, 0xad, 0x06, 0x18, 0x43, 0x2f,
    0xa7, 0xd7, 0xfb, 0x3d, 0x99, 0x00, 0x4d, 0x2b, 0x0b, 0xdf, 0xc1, 0x4f, 0x80, 0x24, 0x83, 0x2b,
];

fn sqrt_m1() -> FieldElement {
    FieldElement::from_bytes(&SQRT_M1_BYTES)
}

/// d = -121665/121666 mod p, computed once — `add` calls this on every
/// point addition, and the division isn't worth re-inverting per call.
fn edwards_d() -> FieldElement {
    static D: OnceLock<FieldElement> = OnceLock::new();
    *D.get_or_init(|| {
        let num = FieldElement::from_u64(121665).negate();
        let den = FieldElement::from_u64(121666);
        FieldElement::mul(&num, &FieldElement::invert(&den))
    })
}

/// 2*d, precomputed alongside `d` — the only form `add` actually needs.
fn edwards_d2() -> FieldElement {
    static D2: OnceLock<FieldElement> = OnceLock::new();
    *D2.get_or_init(|| FieldElement::add(&edwards_d(), &edwards_d()))
}

/// An Edwards25519 point in extended coordinates: x = X/Z, y = Y/Z,
/// xy = T/Z. Invariant: Z is never zero for any point this module hands
/// back to a caller.
#[derive(Clone, Copy)]
pub struct ExtendedPoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
    pub t: FieldElement,
}

/// An affine point together with its precomputed `x*y` product — the
/// "affine-with-product" representation spec.md §3 uses as the second
/// operand of the batched addition, since `x`, `y`, and `xy` are exactly
/// the three values the search's inner loop multiplies together.
#[derive(Clone, Copy)]
pub struct AffinePoint {
    pub x: FieldElement,
    pub y: FieldElement,
    pub xy: FieldElement,
}

impl ExtendedPoint {
    pub fn from_affine_xy(x: FieldElement, y: FieldElement) -> ExtendedPoint {
        ExtendedPoint { x, y, z: FieldElement::ONE, t: FieldElement::mul(&x, &y) }
    }

    /// Standard complete twisted-Edwards extended-coordinate addition
    /// (add-2008-hwcd-4, specialized to a = -1). Works for doubling too —
    /// the a = -1 Edwards25519 curve has no exceptional input pairs.
    pub fn add(p1: &ExtendedPoint, p2: &ExtendedPoint) -> ExtendedPoint {
        let d2 = edwards_d2();

        let a = FieldElement::mul(&FieldElement::sub(&p1.y, &p1.x), &FieldElement::sub(&p2.y, &p2.x));
        let b = FieldElement::mul(&FieldElement::add(&p1.y, &p1.x), &FieldElement::add(&p2.y, &p2.x));
        let c = FieldElement::mul(&FieldElement::mul(&d2, &p1.t), &p2.t);
        let d = FieldElement::mul(&FieldElement::add(&p1.z, &p1.z), &p2.z);

        let e = FieldElement::sub(&b, &a);
        let f = FieldElement::sub(&d, &c);
        let g = FieldElement::add(&d, &c);
        let h = FieldElement::add(&b, &a);

        ExtendedPoint {
            x: FieldElement::mul(&e, &f),
            y: FieldElement::mul(&g, &h),
            z: FieldElement::mul(&f, &g),
            t: FieldElement::mul(&e, &h),
        }
    }

    /// affine_fromP3: normalize out Z, paying for the inversion directly.
    pub fn to_affine(&self) -> AffinePoint {
        let z_inv = FieldElement::invert(&self.z);
        self.to_affine_with_z_inv(&z_inv)
    }

    /// affine_fromP3zInv: normalize out Z using a caller-supplied inverse,
    /// so the one inversion the batch loop already paid for in
    /// `vecdiv::vector_division` is reused instead of paying for another.
    pub fn to_affine_with_z_inv(&self, z_inv: &FieldElement) -> AffinePoint {
        let x = FieldElement::mul(&self.x, z_inv);
        let y = FieldElement::mul(&self.y, z_inv);
        let xy = FieldElement::mul(&x, &y);
        AffinePoint { x, y, xy }
    }

    /// u = (1+y)/(1-y) = (Z+Y)/(Z-Y), the Montgomery u-coordinate,
    /// computed directly from extended coordinates without normalizing
    /// the point first.
    pub fn montgomery_u(&self) -> FieldElement {
        let n = FieldElement::add(&self.z, &self.y);
        let d = FieldElement::sub(&self.z, &self.y);
        FieldElement::mul(&n, &FieldElement::invert(&d))
    }

    /// Decode an Edwards25519 point from its compressed-y form: a
    /// 32-byte little-endian y-coordinate plus the sign bit of x.
    /// Returns `None` if `y` does not correspond to a point on the curve.
    pub fn decode(y_bytes: &[u8; 32], x_sign: bool) -> Option<ExtendedPoint> {
        let mut cleared = *y_bytes;
        cleared[31] &= 0x7F;
        let y = FieldElement::from_bytes(&cleared);

        let yy = FieldElement::sq(&y);
        let u = FieldElement::sub(&yy, &FieldElement::ONE); // y^2 - 1
        let v = FieldElement::add(&FieldElement::mul(&edwards_d(), &yy), &FieldElement::ONE); // d*y^2 + 1

        let v_inv = FieldElement::invert(&v);
        let uv = FieldElement::mul(&u, &v_inv);

        let mut x = FieldElement::pow_p58(&uv);
        let x_sq = FieldElement::sq(&x);

        let neg_uv = uv.negate();
        if x_sq == uv {
            // correct sign already
        } else if x_sq == neg_uv {
            x = FieldElement::mul(&x, &sqrt_m1());
        } else {
            return None; // uv is not a square: y does not decode to a curve point
        }

        let x_is_odd = (x.to_bytes()[0] & 1) == 1;
        if x_is_odd != x_sign {
            x = x.negate();
        }

        Some(ExtendedPoint::from_affine_xy(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_m1_squares_to_minus_one() {
        let s = sqrt_m1();
        let neg_one = FieldElement::ONE.negate();
        assert_eq!(FieldElement::sq(&s).to_bytes(), neg_one.to_bytes());
    }

    #[test]
    fn d_matches_rfc8032() {
        // d = -121665/121666 mod p; known decimal value from RFC 8032 §5.1.
        let expected_hex = "a3785913ca4deb75abd841414d0a700098e879777940c78c73fe6f2bee6c0352"; // LE bytes of d
        let d_bytes = edwards_d().to_bytes();
        assert_eq!(hex::encode(d_bytes), expected_hex);
    }

    #[test]
    fn doubling_the_neutral_element_is_the_neutral_element() {
        let p = ExtendedPoint::from_affine_xy(FieldElement::ZERO, FieldElement::ONE);
        let p2 = ExtendedPoint::add(&p, &p);
        let aff = p2.to_affine();
        assert_eq!(aff.x.to_bytes(), FieldElement::ZERO.to_bytes());
        assert_eq!(aff.y.to_bytes(), FieldElement::ONE.to_bytes());
    }

    #[test]
    fn decode_roundtrips_through_montgomery_u() {
        // 1*G decoded straight through curve25519-dalek, re-decoded via
        // this module's own `decode`, must produce the same u.
        let g = crate::basepoint::scalar_mul_base(&crate::basepoint::scalar_from_u128(1));
        let y_bytes = g.y.to_bytes();
        let x_is_odd = (g.x.to_bytes()[0] & 1) == 1;
        let redecoded = ExtendedPoint::decode(&y_bytes, x_is_odd).unwrap();
        assert_eq!(redecoded.montgomery_u().to_bytes(), g.montgomery_u().to_bytes());
    }
}
