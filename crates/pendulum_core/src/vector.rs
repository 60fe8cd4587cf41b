//! Minimal vector arithmetic over state slices of any length.

use crate::traits::Scalar;

/// Returns `v` with every component multiplied by `c`.
pub fn scale<T: Scalar>(v: &[T], c: T) -> Vec<T> {
    v.iter().map(|&x| x * c).collect()
}

/// Component-wise sum of all `vectors`.
///
/// # Panics
///
/// Panics if the inputs do not all have the same length. Mismatched lengths
/// are a programming error, so nothing is truncated.
pub fn add<T: Scalar>(vectors: &[&[T]]) -> Vec<T> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let len = first.len();
    for (idx, v) in vectors.iter().enumerate() {
        assert_eq!(
            v.len(),
            len,
            "vector {idx} has length {}, expected {len}",
            v.len()
        );
    }

    let mut out = vec![T::zero(); len];
    for v in vectors {
        for (acc, &x) in out.iter_mut().zip(v.iter()) {
            *acc = *acc + x;
        }
    }
    out
}

/// True when every component is finite.
pub fn is_finite<T: Scalar>(v: &[T]) -> bool {
    v.iter().all(|x| x.is_finite())
}
