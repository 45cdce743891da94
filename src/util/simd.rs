//! SIMD vector arithmetic using the `wide` crate.

use wide::f32x8;

/// Dot product of two equal-length slices, 8 lanes at a time.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());

    if a.len() < 8 {
        return a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    }

    let mut dot_vec = f32x8::splat(0.0);

    let chunks_a = a.chunks_exact(8);
    let chunks_b = b.chunks_exact(8);
    let remainder_a = chunks_a.remainder();
    let remainder_b = chunks_b.remainder();

    for (chunk_a, chunk_b) in chunks_a.zip(chunks_b) {
        let mut lanes_a = [0.0f32; 8];
        let mut lanes_b = [0.0f32; 8];
        lanes_a.copy_from_slice(chunk_a);
        lanes_b.copy_from_slice(chunk_b);
        dot_vec = dot_vec + f32x8::new(lanes_a) * f32x8::new(lanes_b);
    }

    let mut total = dot_vec.to_array().iter().sum::<f32>();
    total += remainder_a
        .iter()
        .zip(remainder_b.iter())
        .map(|(x, y)| x * y)
        .sum::<f32>();

    total
}

/// Euclidean norm.
pub fn norm(values: &[f32]) -> f32 {
    dot_product(values, values).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product_matches_scalar() {
        let a: Vec<f32> = (0..19).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..19).map(|i| 1.0 - i as f32 * 0.1).collect();
        let scalar: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        assert!((dot_product(&a, &b) - scalar).abs() < 1e-3);
    }

    #[test]
    fn test_short_vectors() {
        assert_eq!(dot_product(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
        assert_eq!(dot_product(&[], &[]), 0.0);
    }
}
