//! Standard normal distribution.
//!
//! `cdf` goes through the complementary error function so the lower tail keeps
//! full relative precision: Φ(x) = ½·erfc(−x/√2). There is no `1 - tiny`
//! cancellation for negative arguments, and both tails saturate to exact 0/1
//! instead of producing NaN.

use statrs::function::erf::erfc;
use std::f64::consts::FRAC_1_SQRT_2;

/// 1/√(2π)
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal CDF Φ(x).
pub fn cdf(x: f64) -> f64 {
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal PDF φ(x).
pub fn pdf(x: f64) -> f64 {
    if x.is_infinite() {
        return 0.0;
    }
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}
