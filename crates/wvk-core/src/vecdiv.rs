//! Simultaneous field division: given parallel `x` and `y` slices with
//! every `y[i] != 0`, compute `u[i] = x[i] / y[i]` for the whole vector
//! using exactly one inversion, via Montgomery's trick extended to
//! division (Harris, "Simultaneous field divisions", ePrint 2008/199).

use crate::field::FieldElement;

/// `x` and `y` must have equal, non-zero length, and every `y[i]` must be
/// non-zero — the search driver guarantees this by construction (see
/// `search::generate_batch`), so this is a caller invariant rather than
/// a recoverable error.
pub fn vector_division(x: &[FieldElement], y: &[FieldElement]) -> Vec<FieldElement> {
    assert_eq!(x.len(), y.len(), "vector_division: x and y must be the same length");
    let n = x.len();
    assert!(n > 0, "vector_division: empty input");

    // Forward pass: running product R, R_0 = y_0; for i >= 1,
    // t_i = R_{i-1} * x_i (stashed into the output slot), R_i = R_{i-1} * y_i.
    let mut running = vec![FieldElement::ZERO; n];
    running[0] = y[0];
    let mut out = vec![FieldElement::ZERO; n];
    for i in 1..n {
        out[i] = FieldElement::mul(&running[i - 1], &x[i]);
        running[i] = FieldElement::mul(&running[i - 1], &y[i]);
    }

    // Single inversion.
    let mut inv = FieldElement::invert(&running[n - 1]);

    // Backward pass: u_i = inv * t_i, then inv *= y_i.
    for i in (1..n).rev() {
        let t_i = out[i];
        out[i] = FieldElement::mul(&inv, &t_i);
        inv = FieldElement::mul(&inv, &y[i]);
    }

    // Terminal: u_0 = inv * x_0.
    out[0] = FieldElement::mul(&inv, &x[0]);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    #[test]
    fn matches_independent_divisions_small() {
        let x: Vec<FieldElement> = (1u64..=5).map(fe).collect();
        let y: Vec<FieldElement> = (10u64..=14).map(fe).collect();
        let result = vector_division(&x, &y);
        for i in 0..5 {
            let expected = FieldElement::mul(&x[i], &FieldElement::invert(&y[i]));
            assert_eq!(result[i].to_bytes(), expected.to_bytes(), "index {i}");
        }
    }

    #[test]
    fn matches_independent_divisions_varied_lengths() {
        for n in [1usize, 2, 3, 7, 64, 4098] {
            let x: Vec<FieldElement> = (0..n).map(|i| fe((i as u64) * 7 + 3)).collect();
            let y: Vec<FieldElement> = (0..n).map(|i| fe((i as u64) * 11 + 5)).collect();
            let result = vector_division(&x, &y);
            for i in 0..n {
                let expected = FieldElement::mul(&x[i], &FieldElement::invert(&y[i]));
                assert_eq!(result[i].to_bytes(), expected.to_bytes(), "n={n} index={i}");
            }
        }
    }

    #[test]
    fn single_element() {
        let x = vec![fe(42)];
        let y = vec![fe(7)];
        let result = vector_division(&x, &y);
        let expected = FieldElement::mul(&fe(42), &FieldElement::invert(&fe(7)));
        assert_eq!(result[0].to_bytes(), expected.to_bytes());
    }
}
