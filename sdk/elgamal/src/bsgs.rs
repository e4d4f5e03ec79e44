//! Baby-step giant-step discrete logarithm over Grumpkin
//!
//! Decryption leaves `m·G`; recovering `m` needs a discrete log. Plaintexts
//! are bounded (balances fit in 13 decimal digits), so a table of
//! `m = ⌈√N⌉` baby steps answers any query below `N` in at most `m` giant
//! steps.
//!
//! ```text
//! baby:  j·G            for j in 1..m        (keyed by x-coordinate fingerprint)
//! giant: T − i·(m·G)    for i in 0..m        (look up each in the baby table)
//! hit:   x = i·m + j,   confirmed by x·G == T
//! ```

use std::collections::HashMap;
use std::fmt;

use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};
use ark_ff::PrimeField;
use ark_grumpkin::{Affine, Fq, Fr, Projective};

use crate::point::Point;

/// Points normalized per batch inversion
const BATCH_SIZE: usize = 4096;

/// Precomputed baby-step table for plaintexts in `[0, bound)`
pub struct DiscreteLog {
    bound: u64,
    m: u64,
    baby_steps: HashMap<u64, u32>,
    giant_stride: Projective,
}

impl DiscreteLog {
    /// Build the table. Cost is `O(√bound)` in time and memory.
    pub fn new(bound: u64) -> Self {
        let bound = bound.max(1);
        let m = ceil_sqrt(bound);
        let g = Projective::generator();

        let mut baby_steps = HashMap::with_capacity(m as usize);
        let mut acc = g;
        let mut j: u64 = 1;
        let mut chunk = Vec::with_capacity(BATCH_SIZE);
        while j < m {
            chunk.clear();
            let start = j;
            while j < m && chunk.len() < BATCH_SIZE {
                chunk.push(acc);
                acc += g;
                j += 1;
            }
            for (offset, point) in Projective::normalize_batch(&chunk).iter().enumerate() {
                baby_steps
                    .entry(fingerprint(&point.x))
                    .or_insert((start + offset as u64) as u32);
            }
        }

        let giant_stride = -(g * Fr::from(m));
        Self {
            bound,
            m,
            baby_steps,
            giant_stride,
        }
    }

    /// Exclusive upper bound on recoverable plaintexts
    pub fn bound(&self) -> u64 {
        self.bound
    }

    /// Find `x < bound` with `x·G == target`
    pub fn solve(&self, target: &Affine) -> Option<u64> {
        if target.is_zero() {
            return Some(0);
        }

        let mut gamma = Projective::from(*target);
        let mut i: u64 = 0;
        let mut chunk = Vec::with_capacity(BATCH_SIZE);
        while i < self.m {
            chunk.clear();
            let start = i;
            while i < self.m && chunk.len() < BATCH_SIZE {
                chunk.push(gamma);
                gamma += self.giant_stride;
                i += 1;
            }
            for (offset, point) in Projective::normalize_batch(&chunk).iter().enumerate() {
                let giant = (start + offset as u64) * self.m;
                if point.is_zero() {
                    if self.confirm(giant, target) {
                        return Some(giant);
                    }
                    continue;
                }
                if let Some(&j) = self.baby_steps.get(&fingerprint(&point.x)) {
                    let candidate = giant + j as u64;
                    if self.confirm(candidate, target) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Convenience wrapper over [`DiscreteLog::solve`] for wire-format points
    pub fn solve_point(&self, target: &Point) -> Option<u64> {
        let affine = target.to_affine().ok()?;
        self.solve(&affine)
    }

    fn confirm(&self, candidate: u64, target: &Affine) -> bool {
        candidate < self.bound
            && (Projective::generator() * Fr::from(candidate)).into_affine() == *target
    }
}

impl fmt::Debug for DiscreteLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscreteLog")
            .field("bound", &self.bound)
            .field("baby_steps", &self.baby_steps.len())
            .finish()
    }
}

/// Low 64 bits of the canonical x-coordinate
fn fingerprint(x: &Fq) -> u64 {
    x.into_bigint().0[0]
}

fn ceil_sqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while (r as u128) * (r as u128) > n as u128 {
        r -= 1;
    }
    while (r as u128) * (r as u128) < n as u128 {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times_g(x: u64) -> Affine {
        (Projective::generator() * Fr::from(x)).into_affine()
    }

    #[test]
    fn test_ceil_sqrt() {
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(16), 4);
        assert_eq!(ceil_sqrt(17), 5);
        assert_eq!(ceil_sqrt(10_000_000_000_000), 3_162_278);
    }

    #[test]
    fn test_solves_small_values() {
        let dlog = DiscreteLog::new(10_000);
        for x in [0u64, 1, 2, 99, 100, 101, 5_000, 9_999] {
            assert_eq!(dlog.solve(&times_g(x)), Some(x), "failed for {x}");
        }
    }

    #[test]
    fn test_crosses_batch_boundaries() {
        // m = 5000 spans two baby-step batches and two giant-step batches
        let dlog = DiscreteLog::new(25_000_000);
        for x in [4_095u64, 4_096, 4_097, 20_480_001, 24_999_999] {
            assert_eq!(dlog.solve(&times_g(x)), Some(x), "failed for {x}");
        }
    }

    #[test]
    fn test_out_of_bound_is_none() {
        let dlog = DiscreteLog::new(100);
        assert_eq!(dlog.solve(&times_g(100)), None);
        assert_eq!(dlog.solve(&times_g(123_456)), None);
    }

    #[test]
    fn test_solve_point_rejects_off_curve() {
        let dlog = DiscreteLog::new(100);
        let off_curve = Point {
            x: Fq::from(1u64),
            y: Fq::from(2u64),
        };
        assert_eq!(dlog.solve_point(&off_curve), None);
        assert_eq!(dlog.solve_point(&Point::zero()), Some(0));
    }
}
