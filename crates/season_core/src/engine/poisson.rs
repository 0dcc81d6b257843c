//! Poisson sampling by multiplying uniforms.
//!
//! Draw uniforms until their running product drops below `e^-lambda`; the
//! number of draws minus one is the sample.

use rand::Rng;

/// Above this the running product can underflow before crossing `e^-lambda`.
pub const MAX_LAMBDA: f64 = 30.0;

pub fn sample_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u32 {
    if lambda.is_nan() || lambda <= 0.0 {
        return 0;
    }
    let limit = (-lambda.min(MAX_LAMBDA)).exp();
    let mut product = 1.0f64;
    let mut draws = 0u32;
    loop {
        product *= rng.gen::<f64>();
        draws += 1;
        if product < limit {
            return draws - 1;
        }
    }
}
