use num_traits::{Float, FloatConst};

/// Cosine taper of length `n`.
///
/// The weights are `cos(pi * (j + 1) / (2 * n))` for `j = 0, ..., n - 1`, so
/// they decrease from nearly one to zero.
pub fn cosine_taper<T: Float + FloatConst>(n: usize) -> Vec<T> {
    let den = T::from(2 * n).unwrap();
    (0..n)
        .map(|j| (T::PI() * T::from(j + 1).unwrap() / den).cos())
        .collect()
}

/// Sequence extended at both ends by tapered reflections.
///
/// This is produced by [`taper_and_reflect`]. The original sequence occupies
/// the samples `pad..pad + len`, where `len` is its length.
#[derive(Debug, Clone, PartialEq)]
pub struct TaperedExtension<T> {
    /// Samples of the extended sequence.
    pub samples: Vec<T>,
    /// Number of samples prepended (and appended) to the original sequence.
    pub pad: usize,
}

impl<T> TaperedExtension<T> {
    /// Returns the part of the extension holding the original sequence.
    pub fn interior(&self) -> &[T] {
        &self.samples[self.pad..self.samples.len() - self.pad]
    }
}

/// Folds a sequence over at both ends and tapers the folded parts.
///
/// The first `n` samples of `x` are reversed, weighted by a
/// [`cosine_taper`] that vanishes towards the outer end, and prepended. The
/// last `n` samples are treated in the same way and appended. The extended
/// sequence has length `x.len() + 2 * n`.
///
/// # Panics
///
/// Panics if `n` is larger than the length of `x`.
pub fn taper_and_reflect<T: Float + FloatConst>(x: &[T], n: usize) -> TaperedExtension<T> {
    assert!(n <= x.len());
    let taper = cosine_taper::<T>(n);
    let head = taper.iter().zip(x.iter()).map(|(&c, &v)| c * v).rev();
    let tail = taper.iter().zip(x.iter().rev()).map(|(&c, &v)| c * v);
    let mut samples = Vec::with_capacity(x.len() + 2 * n);
    samples.extend(head);
    samples.extend_from_slice(x);
    samples.extend(tail);
    TaperedExtension { samples, pad: n }
}
