//! Element-wise result comparison.

/// Default comparison threshold for double precision results.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// First element where `actual` disagrees with `expected`.
///
/// An element disagrees when both its absolute error and its relative
/// error (against `|expected| + 1e-15`) exceed `epsilon`. Requiring both
/// keeps cancellations near zero from tripping the relative test.
/// Returns `(index, expected, actual)`.
pub fn first_mismatch(expected: &[f64], actual: &[f64], epsilon: f64) -> Option<(usize, f64, f64)> {
    if expected.len() != actual.len() {
        let at = expected.len().min(actual.len());
        return Some((at, f64::NAN, f64::NAN));
    }
    expected
        .iter()
        .zip(actual)
        .enumerate()
        .find(|(_, (e, a))| {
            let diff = (*e - *a).abs();
            let rel = diff / (e.abs() + 1e-15);
            // NaN compares false, so test for agreement and negate
            !(diff <= epsilon || rel <= epsilon)
        })
        .map(|(i, (e, a))| (i, *e, *a))
}

/// Largest relative error over all elements.
pub fn max_relative_error(expected: &[f64], actual: &[f64]) -> f64 {
    expected
        .iter()
        .zip(actual)
        .map(|(e, a)| (e - a).abs() / (e.abs() + 1e-15))
        .fold(0.0, f64::max)
}
