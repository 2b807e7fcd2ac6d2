//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Return true if the relative difference between `a` and `b` is larger
/// than `rel_tol`.
///
/// The difference is normalised by the larger magnitude of the two values,
/// offset by `eps` so that comparisons around zero remain defined.
pub fn rel_diff_exceeds<T>(a: T, b: T, rel_tol: T, eps: T) -> bool
where
    T: Float,
{
    (a - b).abs() / (a.abs().max(b.abs()) + eps) > rel_tol
}

/// Get the number of zeros between the decimal point and the first
/// significant digit of `value`.
///
/// Negative for values with a magnitude of 10 or more. `value` must not be
/// zero.
pub fn zeros_post_decimal<T>(value: T) -> i32
where
    T: Float,
{
    let tenth = match T::from(0.1) {
        Some(t) => t,
        None => return 0,
    };

    match (value.abs().ln() / tenth.ln()).floor().to_i32() {
        Some(z) => z,
        None => 0,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rel_diff_exceeds() {
        assert_eq!(rel_diff_exceeds(5.0, 5.0, 0.006, 1e-6), false);
        assert_eq!(rel_diff_exceeds(1.0, 2.0, 0.006, 1e-6), true);
        assert_eq!(rel_diff_exceeds(0.0, 0.0, 0.006, 1e-6), false);
        assert_eq!(rel_diff_exceeds(100.0, 100.5, 0.006, 1e-6), false);
        assert_eq!(rel_diff_exceeds(100.0, 101.0, 0.006, 1e-6), true);
        assert_eq!(rel_diff_exceeds(-1.0, 1.0, 0.006, 1e-6), true);
    }

    #[test]
    fn test_zeros_post_decimal() {
        assert_eq!(zeros_post_decimal(0.5f64), 0);
        assert_eq!(zeros_post_decimal(0.05f64), 1);
        assert_eq!(zeros_post_decimal(0.002f64), 2);
        assert_eq!(zeros_post_decimal(-0.05f64), 1);
        assert_eq!(zeros_post_decimal(2.0f64), -1);
        assert_eq!(zeros_post_decimal(1234.5f64), -4);
    }
}
