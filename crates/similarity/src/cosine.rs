//! Cosine similarity between embedding vectors.

/// Vectors with a norm below this are treated as no-data.
pub const NORM_EPSILON: f64 = 1e-6;

/// Compute cosine similarity between two equal-length vectors.
///
/// # Algorithm
/// cos(a, b) = (a · b) / (‖a‖ × ‖b‖), accumulated in f64.
///
/// # Returns
/// * `Some(sim)` with `sim` clamped to `[-1, 1]`
/// * `None` if either vector has norm below [`NORM_EPSILON`], contains a
///   non-finite component, or the lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if !(norm_a.is_finite() && norm_b.is_finite() && dot.is_finite()) {
        return None;
    }
    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return None;
    }

    // Rounding can push identical directions to 1.0000001
    Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Cosine similarity shifted onto `[0, 1]` via `(sim + 1) / 2`.
///
/// 1.0 means identical direction, 0.0 exactly opposite.
pub fn normalized_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    cosine_similarity(a, b).map(|sim| (sim + 1.0) / 2.0)
}
