use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::NeatError;

/// Seedable PRNG wrapper so tests can reproduce a generation exactly, per
/// spec.md §5 ("PRNG is a process-wide resource; tests must be able to seed
/// it"). `SilvanCodes-novel-set-neat` carries the same idea as a small
/// `NeatRng` newtype threaded through `Population`/`Genome` instead of
/// reaching for `rand::thread_rng()` at every call site, which is the
/// pattern generalized here.
#[derive(Debug, Clone)]
pub struct NeatRng(pub StdRng);

impl NeatRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for NeatRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// spec.md §4.G: returns true with probability `p`.
pub fn chance(rng: &mut impl Rng, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// spec.md §4.G: uniform integer in `[lower, upper]` excluding every value
/// in `excluded`. Rejection sampling; the caller must guarantee `excluded`
/// does not cover the whole range, otherwise this fails `InvalidArgument`
/// (spec.md §7) instead of looping forever.
pub fn random_exclude(
    rng: &mut impl Rng,
    lower: i64,
    upper: i64,
    excluded: &[i64],
) -> Result<i64, NeatError> {
    if lower > upper {
        return Err(NeatError::InvalidArgument(format!(
            "empty range [{lower}, {upper}]"
        )));
    }
    let span = (upper - lower + 1) as usize;
    if excluded.len() >= span {
        let remaining = (lower..=upper).any(|v| !excluded.contains(&v));
        if !remaining {
            return Err(NeatError::InvalidArgument(
                "random_exclude domain is fully excluded".to_string(),
            ));
        }
    }
    loop {
        let candidate = rng.random_range(lower..=upper);
        if !excluded.contains(&candidate) {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chance_zero_is_never_true() {
        let mut rng = NeatRng::from_seed(42).0;
        for _ in 0..100 {
            assert!(!chance(&mut rng, 0.0));
        }
    }

    #[test]
    fn chance_one_is_always_true() {
        let mut rng = NeatRng::from_seed(42).0;
        for _ in 0..100 {
            assert!(chance(&mut rng, 1.0));
        }
    }

    #[test]
    fn random_exclude_never_returns_excluded_values() {
        let mut rng = NeatRng::from_seed(7).0;
        for _ in 0..200 {
            let v = random_exclude(&mut rng, 0, 3, &[1]).unwrap();
            assert_ne!(v, 1);
            assert!((0..=3).contains(&v));
        }
    }

    #[test]
    fn random_exclude_full_domain_fails() {
        let mut rng = NeatRng::from_seed(7).0;
        assert!(random_exclude(&mut rng, 0, 1, &[0, 1]).is_err());
    }
}
