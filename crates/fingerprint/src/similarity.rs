//! Vector similarity primitives.

/// Chunk size used to keep the inner loops auto-vectorizable.
const SIMD_CHUNK_SIZE: usize = 8;

/// Cosine similarity of two equal-length vectors, in [-1, 1].
///
/// Returns 0.0 when the lengths differ, either side is empty, or either
/// side has zero magnitude. Never panics and never divides by zero.
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (ca, cb) in a.chunks(SIMD_CHUNK_SIZE).zip(b.chunks(SIMD_CHUNK_SIZE)) {
        let (chunk_dot, chunk_norm_a, chunk_norm_b) = dot_and_norms(ca, cb);
        dot += chunk_dot;
        norm_a += chunk_norm_a;
        norm_b += chunk_norm_b;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[inline(always)]
fn dot_and_norms(a: &[f64], b: &[f64]) -> (f64, f64, f64) {
    a.iter()
        .zip(b.iter())
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (&x, &y)| {
            (dot + x * y, na + x * x, nb + y * y)
        })
}
