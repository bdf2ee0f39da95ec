//! Score Normalizer (spec §4.5): min-max normalization shared by the
//! keyword (`f32`) and vector (`f64`) score streams so they sit on a
//! comparable [0, 1] scale before hybrid combination.

/// Min-max normalize a slice of `f32` scores into `[0.0, 1.0]`.
///
/// - Empty input returns an empty vec.
/// - A single score, or all-equal scores, normalize to `1.0` for every
///   entry (there is no spread to express, and treating the lone/only
///   candidate as maximally relevant keeps it from being zeroed out).
/// - Otherwise each score maps to `(score - min) / (max - min)`,
///   preserving relative order.
/// - The input is not mutated; a new `Vec` is returned in the same order.
pub fn normalize_scores_f32(scores: &[f32]) -> Vec<f32> {
    normalize_scores_generic(scores, |a, b| a.partial_cmp(b).unwrap())
}

/// `f64` counterpart of [`normalize_scores_f32`], used for vector-index
/// similarity scores.
pub fn normalize_scores_f64(scores: &[f64]) -> Vec<f64> {
    normalize_scores_generic(scores, |a, b| a.partial_cmp(b).unwrap())
}

fn normalize_scores_generic<T>(scores: &[T], cmp: impl Fn(&T, &T) -> std::cmp::Ordering) -> Vec<T>
where
    T: Copy + PartialEq + std::ops::Sub<Output = T> + std::ops::Div<Output = T> + From<u8>,
{
    if scores.is_empty() {
        return Vec::new();
    }

    let min = *scores.iter().min_by(|a, b| cmp(a, b)).unwrap();
    let max = *scores.iter().max_by(|a, b| cmp(a, b)).unwrap();

    if max == min {
        return vec![T::from(1); scores.len()];
    }

    let range = max - min;
    scores.iter().map(|&s| (s - min) / range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(normalize_scores_f32(&[]).is_empty());
    }

    #[test]
    fn single_score_normalizes_to_one() {
        assert_eq!(normalize_scores_f32(&[0.42]), vec![1.0]);
    }

    #[test]
    fn all_equal_scores_normalize_to_one() {
        assert_eq!(normalize_scores_f32(&[2.0, 2.0, 2.0]), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn min_max_spread() {
        let out = normalize_scores_f32(&[0.3, 0.6, 0.9]);
        assert!((out[0] - 0.0).abs() < 1e-3);
        assert!((out[1] - 0.5).abs() < 1e-3);
        assert!((out[2] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn order_preserving() {
        let input = [5.0, 1.0, 3.0];
        let out = normalize_scores_f32(&input);
        assert!(out[1] < out[2]);
        assert!(out[2] < out[0]);
    }

    #[test]
    fn f64_variant_matches_semantics() {
        let out = normalize_scores_f64(&[1.0, 2.0, 3.0]);
        assert!((out[0] - 0.0).abs() < 1e-9);
        assert!((out[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn input_not_mutated() {
        let input = [0.3, 0.6, 0.9];
        let _ = normalize_scores_f32(&input);
        assert_eq!(input, [0.3, 0.6, 0.9]);
    }
}
