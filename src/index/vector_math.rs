use ndarray::ArrayView1;

/// Cosine similarity in [-1, 1]; mismatched or empty vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let va = ArrayView1::from(a);
    let vb = ArrayView1::from(b);

    let dot = va.dot(&vb);
    let denom = va.dot(&va).sqrt() * vb.dot(&vb).sqrt();

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
