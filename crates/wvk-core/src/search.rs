//! The batched vanity search: candidate generation (one iteration of the
//! inner loop) plus the driver state machine that wraps it with skip,
//! limit, and cancellation handling.
//!
//! **Offset-to-slot convention** (the one free choice spec left
//! implementation-defined): each outer iteration covers a *contiguous*
//! range of `batch_size + 1` offsets, tested in descending order. With
//! `half = batch_size / 2`, an iteration whose predecessor point
//! corresponds to offset `n_base` tests slot `k` (`k` in `0..=batch_size`)
//! at offset `n_base + half - k`: slot 0 is the highest offset
//! (`n_base + half`), slot `half` is `n_base` itself, and slot
//! `batch_size` is the lowest (`n_base - half`). The first iteration sets
//! `n_base = skip + half` so its lowest offset is exactly `skip`;
//! subsequent iterations advance `n_base` by `batch_size + 1`, so the
//! ranges tile the integers above `skip` with no gap and no overlap.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};

use crate::edwards::{AffinePoint, ExtendedPoint};
use crate::field::FieldElement;
use crate::prefix::Prefix;
use crate::vecdiv::vector_division;
use crate::basepoint;

/// scalar_offset: O = SCALAR_OFFSET * G.
pub const SCALAR_OFFSET: u64 = 8;

pub const DEFAULT_BATCH_SIZE: usize = 4096;

pub enum SearchOutcome {
    Found(u64),
    LimitExhausted,
    Interrupted,
}

/// Per-iteration candidate batch: `batch_size + 2` (numerator, denominator)
/// pairs, ready for `vecdiv::vector_division`. Slots `0..=batch_size` are
/// candidate offsets; slot `batch_size + 1` carries `(1, Z)` of the
/// just-advanced running point, recovering `1/Z` from the same inversion.
fn generate_batch(
    pa: &AffinePoint,
    offsets: &[AffinePoint],
    next_predecessor_z: FieldElement,
) -> (Vec<FieldElement>, Vec<FieldElement>) {
    let half = offsets.len();
    let mut ua = Vec::with_capacity(half * 2 + 2);
    let mut ub = Vec::with_capacity(half * 2 + 2);

    // One pair of multiplications per offset produces both pa+i*O and
    // pa-i*O (see module doc / spec.md §4.F).
    let mut plus = Vec::with_capacity(half);
    let mut minus = Vec::with_capacity(half);
    for ob in offsets {
        let x1y2 = FieldElement::mul(&pa.x, &ob.y);
        let y1x2 = FieldElement::mul(&pa.y, &ob.x);
        let denom_plus = FieldElement::add(&x1y2, &y1x2);
        let denom_minus = FieldElement::sub(&x1y2, &y1x2);
        let num_plus = FieldElement::add(&pa.xy, &ob.xy);
        let num_minus = FieldElement::sub(&pa.xy, &ob.xy);

        plus.push((FieldElement::add(&denom_plus, &num_plus), FieldElement::sub(&denom_plus, &num_plus)));
        minus.push((FieldElement::add(&denom_minus, &num_minus), FieldElement::sub(&denom_minus, &num_minus)));
    }

    // Slots 0..half-1: pa + i*O, i = half down to 1.
    for (n, d) in plus.iter().rev() {
        ua.push(*n);
        ub.push(*d);
    }
    // Slot half: pa itself, u = (1+y)/(1-y) directly, no multiplication needed.
    ua.push(FieldElement::add(&FieldElement::ONE, &pa.y));
    ub.push(FieldElement::sub(&FieldElement::ONE, &pa.y));
    // Slots half+1..2*half: pa - i*O, i = 1..half.
    for (n, d) in minus.iter() {
        ua.push(*n);
        ub.push(*d);
    }
    // Slot 2*half+1: carries 1/Z of the just-advanced running point.
    ua.push(FieldElement::ONE);
    ub.push(next_predecessor_z);

    (ua, ub)
}

/// Owns every piece of mutable search state: the precomputed offsets
/// table, the fixed batch-advance point, and the current predecessor
/// point (both extended and affine forms).
pub struct SearchState {
    offsets: Vec<AffinePoint>,
    batch_offset: ExtendedPoint,
    predecessor: ExtendedPoint,
    predecessor_affine: AffinePoint,
    n_base: u64,
    half: usize,
    prefix: Prefix,
    skip: u64,
    limit: u64,
    tested: u64,
}

impl SearchState {
    /// `victim`: the decoded Montgomery public key being searched around.
    /// `batch_size` must be even and greater than zero — this is a
    /// caller/CLI precondition, not a recoverable `wvk_core::Error`.
    pub fn new(victim: ExtendedPoint, prefix: Prefix, skip: u64, limit: u64, batch_size: usize) -> SearchState {
        assert!(batch_size > 0 && batch_size % 2 == 0, "batch_size must be even and positive");
        let half = batch_size / 2;

        debug!(
            "seeding search: skip={skip} limit={limit} prefix_len={} batch_size={batch_size}",
            prefix.len_chars
        );

        let o = basepoint::scalar_mul_base(&basepoint::scalar_from_u128(SCALAR_OFFSET as u128));

        // Chain additions to build 1*O..half*O (affine) and continue on
        // to batch_offset = (half+2)*O, all from the single dalek call above.
        let mut acc = o;
        let mut offsets = Vec::with_capacity(half);
        offsets.push(acc.to_affine());
        for _ in 2..=half {
            acc = ExtendedPoint::add(&acc, &o);
            offsets.push(acc.to_affine());
        }
        let mut bo = ExtendedPoint::add(&acc, &o); // (half+1)*O
        bo = ExtendedPoint::add(&bo, &o); // (half+2)*O
        let batch_offset = bo;

        // n_base = skip + half so the first iteration's lowest tested
        // offset (n_base - half) is exactly `skip`.
        let n_base = skip + half as u64;
        let seed_scalar = basepoint::scalar_from_u128((SCALAR_OFFSET as u128) * (n_base as u128));
        let seed_point = basepoint::scalar_mul_base(&seed_scalar);
        let predecessor = ExtendedPoint::add(&victim, &seed_point);
        let predecessor_affine = predecessor.to_affine();

        SearchState {
            offsets,
            batch_offset,
            predecessor,
            predecessor_affine,
            n_base,
            half,
            prefix,
            skip,
            limit,
            tested: 0,
        }
    }

    /// Run the search loop to completion, checking `keep_running` once
    /// per outer iteration (not per candidate) as spec.md §5 requires.
    pub fn run(&mut self, keep_running: &AtomicBool) -> SearchOutcome {
        loop {
            if !keep_running.load(Ordering::Relaxed) {
                return SearchOutcome::Interrupted;
            }
            if self.limit != 0 && self.tested >= self.limit {
                return SearchOutcome::LimitExhausted;
            }

            let next_predecessor = ExtendedPoint::add(&self.predecessor, &self.batch_offset);
            let (ua, ub) = generate_batch(&self.predecessor_affine, &self.offsets, next_predecessor.z);
            let u = vector_division(&ua, &ub);

            let batch_len = self.half * 2; // == batch_size
            trace!("batch at n_base={} tested_so_far={}", self.n_base, self.tested);

            for k in 0..=batch_len {
                let offset = self.n_base + self.half as u64 - k as u64;
                if offset < self.skip {
                    continue;
                }
                if self.limit != 0 && offset >= self.skip + self.limit {
                    continue;
                }
                if self.prefix.matches(u[k].to_bytes_u64()) {
                    return SearchOutcome::Found(offset);
                }
            }

            // Batches tile [skip, ..) contiguously with no gaps or overlap,
            // so the count tested so far is just this batch's highest
            // offset minus skip, plus one (clamped to the requested limit).
            self.tested = self.n_base + self.half as u64 - self.skip + 1;
            if self.limit != 0 {
                self.tested = self.tested.min(self.limit);
            }

            self.predecessor_affine = next_predecessor.to_affine_with_z_inv(&u[batch_len + 1]);
            self.predecessor = next_predecessor;
            self.n_base += batch_len as u64 + 1;
        }
    }
}

/// Recompute the Montgomery u of `P + n*O` directly (one-off, not the
/// batch path) — used by `apply::apply_offset`'s prefix check and by
/// tests that verify a reported hit independently of the search loop.
pub fn montgomery_u_at_offset(victim: &ExtendedPoint, n: u64) -> FieldElement {
    let o_n = basepoint::scalar_mul_base(&basepoint::scalar_from_u128((SCALAR_OFFSET as u128) * (n as u128)));
    let p = ExtendedPoint::add(victim, &o_n);
    p.montgomery_u()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basepoint_victim() -> ExtendedPoint {
        basepoint::scalar_mul_base(&basepoint::scalar_from_u128(1))
    }

    #[test]
    fn determinism() {
        let prefix = Prefix::parse("A").unwrap();
        let mut a = SearchState::new(basepoint_victim(), prefix, 0, 200, 16);
        let mut b = SearchState::new(basepoint_victim(), Prefix::parse("A").unwrap(), 0, 200, 16);
        let flag = AtomicBool::new(true);
        let ra = match a.run(&flag) {
            SearchOutcome::Found(n) => Some(n),
            _ => None,
        };
        let rb = match b.run(&flag) {
            SearchOutcome::Found(n) => Some(n),
            _ => None,
        };
        assert_eq!(ra, rb);
    }

    #[test]
    fn reported_hit_matches_prefix_independently() {
        let prefix = Prefix::parse("A").unwrap();
        let mut state = SearchState::new(basepoint_victim(), prefix, 0, 5000, 16);
        let flag = AtomicBool::new(true);
        if let SearchOutcome::Found(n) = state.run(&flag) {
            let u = montgomery_u_at_offset(&basepoint_victim(), n);
            let encoded = crate::base64_codec::encode(&u.to_bytes());
            assert!(encoded.starts_with('A'), "n={n} encoded={encoded}");
        } else {
            panic!("expected to find a hit for a single-character prefix within 5000 offsets");
        }
    }

    #[test]
    fn tiny_limit_exhausts_without_hit_for_rare_prefix() {
        // Two-character prefix over a tiny limit is overwhelmingly
        // unlikely to hit; exercises the LimitExhausted path.
        let prefix = Prefix::parse("+/").unwrap();
        let mut state = SearchState::new(basepoint_victim(), prefix, 0, 2, 16);
        let flag = AtomicBool::new(true);
        assert!(matches!(state.run(&flag), SearchOutcome::LimitExhausted));
    }

    #[test]
    fn interrupt_flag_stops_the_loop() {
        let prefix = Prefix::parse("+/").unwrap();
        let mut state = SearchState::new(basepoint_victim(), prefix, 0, 0, 16);
        let flag = AtomicBool::new(false);
        assert!(matches!(state.run(&flag), SearchOutcome::Interrupted));
    }
}
