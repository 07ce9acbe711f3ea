//! Bernstein basis helpers.

use crate::expr::Real;

/// Binomial coefficient `n choose k`, computed in exact integer arithmetic.
///
/// Each step divides out the common factor before multiplying, so an
/// intermediate never exceeds the next coefficient. Returns `None` when the
/// coefficient does not fit in a `u128`.
pub fn binomial(n: u64, k: u64) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let n = u128::from(n);
    let mut result: u128 = 1;
    for i in 0..u128::from(k) {
        let divisor = i + 1;
        let common = gcd(result, divisor);
        result = (result / common).checked_mul((n - i) / (divisor / common))?;
    }
    Some(result)
}

/// `n choose k` as a float: rounded from the exact integer when it fits in a
/// `u128`, otherwise a running product. Infinite once the coefficient
/// leaves the `f64` range.
pub fn binomial_f64(n: u64, k: u64) -> f64 {
    if let Some(exact) = binomial(n, k) {
        return exact as f64;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Bernstein basis polynomial `b_{i,n}(u) = C(n, i) u^i (1 - u)^(n - i)`.
pub fn bernstein<T: Real>(i: usize, n: usize, u: T) -> T {
    if i > n {
        return T::zero();
    }
    let coeff: T = crate::expr::real(binomial_f64(n as u64, i as u64));
    coeff * u.powi(i as i32) * (T::one() - u).powi((n - i) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_small() {
        assert_eq!(binomial(0, 0), Some(1));
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(5, 5), Some(1));
        assert_eq!(binomial(3, 4), Some(0));
    }

    #[test]
    fn test_binomial_large_is_exact() {
        assert_eq!(binomial(60, 30), Some(118_264_581_564_861_424));
        assert_eq!(binomial(20, 7), binomial(20, 13));
        assert_eq!(
            binomial(128, 64),
            Some(23_951_146_041_928_082_866_135_587_776_380_551_750)
        );
        assert!(binomial(130, 65).is_some());
    }

    #[test]
    fn test_binomial_overflow_is_reported() {
        assert_eq!(binomial(200, 100), None);
        assert_eq!(binomial(200, 1), Some(200));
    }

    #[test]
    fn test_binomial_f64_past_u128() {
        // C(200, 100) = 9.054851465610328e58
        let c = binomial_f64(200, 100);
        assert!((c / 9.054_851_465_610_328e58 - 1.0).abs() < 1e-12);
        assert_eq!(binomial_f64(128, 64), 23_951_146_041_928_082_866_135_587_776_380_551_750u128 as f64);
        assert!(binomial_f64(2000, 1000).is_infinite());
    }

    #[test]
    fn test_bernstein_partition_of_unity() {
        for n in 0..7 {
            let total: f64 = (0..=n).map(|i| bernstein(i, n, 0.37)).sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }
}
