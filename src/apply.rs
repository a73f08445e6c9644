use crate::error::{Error, Result};
use crate::kernels::{ReferenceKernel, lowpass_kernel};
use crate::taper::taper_and_reflect;
use ndarray::{Array2, ArrayView2, Axis};
use num_traits::{Float, FloatConst};

/// Filter application mode.
///
/// The modes differ in how they deal with the ends of the sequence, where the
/// kernel extends beyond the available samples.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FilterMode {
    /// Same-length convolution.
    ///
    /// The sequence is implicitly padded with zeros, and the first and last
    /// `ceil(K / 2)` outputs, where `K` is the kernel length, are replaced by
    /// NaN because they are affected by the padding.
    #[default]
    Convolution,
    /// Causal FIR filtering of a tapered extension.
    ///
    /// The sequence is extended at both ends with [`taper_and_reflect`],
    /// filtered causally, and the output is shifted back by the group delay
    /// of the kernel. All the outputs are defined.
    Tapered,
    /// Zero-phase forward-backward filtering of a tapered extension.
    ///
    /// The extended sequence is filtered causally, time reversed, filtered
    /// again and reversed back. The kernel is therefore applied twice. All
    /// the outputs are defined.
    ForwardBackward,
}

/// Low-pass filter parameters.
///
/// This struct holds the parameters used by [`lowpass`] and
/// [`lowpass_columns`]. The half-amplitude period defaults to the native
/// period of the kernel (see [`ReferenceKernel::native_period`]) and the mode
/// defaults to [`FilterMode::Convolution`].
#[derive(Debug, Clone, PartialEq)]
pub struct LowpassParameters<T> {
    kind: ReferenceKernel,
    sample_interval: T,
    half_amplitude_period: T,
    mode: FilterMode,
}

impl<T: Float> LowpassParameters<T> {
    /// Creates new low-pass filter parameters.
    ///
    /// An [`Error::InvalidSampleInterval`] is returned if the sample interval
    /// in hours is not finite or not positive.
    pub fn new(kind: ReferenceKernel, sample_interval: T) -> Result<LowpassParameters<T>> {
        if !sample_interval.is_finite() || sample_interval <= T::zero() {
            return Err(Error::InvalidSampleInterval);
        }
        Ok(LowpassParameters {
            kind,
            sample_interval,
            half_amplitude_period: T::from(kind.native_period()).unwrap(),
            mode: FilterMode::default(),
        })
    }

    /// Returns the reference kernel.
    pub fn kind(&self) -> ReferenceKernel {
        self.kind
    }

    /// Returns the sample interval in hours.
    pub fn sample_interval(&self) -> T {
        self.sample_interval
    }

    /// Returns the half-amplitude period in hours.
    pub fn half_amplitude_period(&self) -> T {
        self.half_amplitude_period
    }

    /// Returns the filter application mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Sets the half-amplitude period in hours.
    ///
    /// The period is validated when the kernel is built.
    pub fn set_half_amplitude_period(&mut self, period: T) -> &mut Self {
        self.half_amplitude_period = period;
        self
    }

    /// Sets the filter application mode.
    pub fn set_mode(&mut self, mode: FilterMode) -> &mut Self {
        self.mode = mode;
        self
    }
}

/// Causal FIR filter.
///
/// Computes `y[n] = sum(b[k] * x[n - k])`, with the samples before the start
/// of `x` taken as zero. This is a recursive filter with numerator `b` and a
/// unity denominator.
pub fn fir_filter<T: Float>(b: &[T], x: &[T]) -> Vec<T> {
    (0..x.len())
        .map(|n| {
            b.iter()
                .zip(x[..=n].iter().rev())
                .fold(T::zero(), |acc, (&bk, &xk)| acc + bk * xk)
        })
        .collect()
}

/// Same-length convolution, centred on the middle tap of the kernel.
fn convolve_same<T: Float>(x: &[T], kernel: &[T]) -> Vec<T> {
    let centre = (kernel.len() - 1) / 2;
    (0..x.len())
        .map(|n| {
            let m = n + centre;
            let first = m.saturating_sub(x.len() - 1);
            let last = m.min(kernel.len() - 1);
            (first..=last).fold(T::zero(), |acc, k| acc + kernel[k] * x[m - k])
        })
        .collect()
}

/// Number of outputs lost at each end of the sequence in
/// [`FilterMode::Convolution`], which is also the taper length used by the
/// tapered modes.
pub fn edge_length(kernel_length: usize) -> usize {
    kernel_length.div_ceil(2)
}

/// Filters a sequence with a kernel.
///
/// The output has the same length as `x`. See [`FilterMode`] for the
/// behaviour of each mode.
///
/// An [`Error::InvalidKernelLength`] is returned if the kernel is empty, and
/// an [`Error::SequenceTooShort`] is returned if `x` has fewer than
/// `2 * ceil(K / 2)` samples, where `K` is the kernel length.
pub fn filter_sequence<T: Float + FloatConst>(
    x: &[T],
    kernel: &[T],
    mode: FilterMode,
) -> Result<Vec<T>> {
    if kernel.is_empty() {
        return Err(Error::InvalidKernelLength);
    }
    let edge = edge_length(kernel.len());
    if x.len() < 2 * edge {
        return Err(Error::SequenceTooShort {
            length: x.len(),
            required: 2 * edge,
        });
    }
    log::trace!(
        "filtering {} samples with {} taps in {:?} mode",
        x.len(),
        kernel.len(),
        mode
    );
    Ok(match mode {
        FilterMode::Convolution => {
            let mut y = convolve_same(x, kernel);
            let len = y.len();
            y[..edge].fill(T::nan());
            y[len - edge..].fill(T::nan());
            y
        }
        FilterMode::Tapered => {
            let ext = taper_and_reflect(x, edge);
            let y = fir_filter(kernel, &ext.samples);
            let start = ext.pad + (kernel.len() - 1) / 2;
            y[start..start + x.len()].to_vec()
        }
        FilterMode::ForwardBackward => {
            let ext = taper_and_reflect(x, edge);
            let mut y = fir_filter(kernel, &ext.samples);
            y.reverse();
            let mut y = fir_filter(kernel, &y);
            y.reverse();
            y[ext.pad..ext.pad + x.len()].to_vec()
        }
    })
}

/// Filters each column of a matrix with a kernel.
///
/// Each column is filtered independently with [`filter_sequence`], so rows
/// are time samples. The output has the same shape as `x`.
pub fn filter_columns<T: Float + FloatConst>(
    x: ArrayView2<T>,
    kernel: &[T],
    mode: FilterMode,
) -> Result<Array2<T>> {
    let mut out = Array2::zeros(x.raw_dim());
    for (column, mut out_column) in x
        .axis_iter(Axis(1))
        .zip(out.axis_iter_mut(Axis(1)))
    {
        let y = filter_sequence(&column.to_vec(), kernel, mode)?;
        for (o, v) in out_column.iter_mut().zip(y) {
            *o = v;
        }
    }
    Ok(out)
}

/// Low-pass filters a sequence with a reference kernel.
///
/// The kernel is built with [`lowpass_kernel`] and applied with
/// [`filter_sequence`] in the mode given by the parameters.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), tidal_lowpass::error::Error> {
/// use tidal_lowpass::{FilterMode, LowpassParameters, ReferenceKernel, lowpass};
/// let x: Vec<f64> = (0..500)
///     .map(|t| 2.5 * (2.0 * std::f64::consts::PI * t as f64 / 12.42).sin() + 1.0)
///     .collect();
/// let mut params = LowpassParameters::new(ReferenceKernel::Pl66, 1.0)?;
/// params.set_mode(FilterMode::Tapered);
/// let y = lowpass(&x, &params)?;
/// assert_eq!(y.len(), x.len());
/// assert!((y[250] - 1.0).abs() < 0.01);
/// # Ok(())
/// # }
/// ```
pub fn lowpass<T: Float + FloatConst>(
    x: &[T],
    parameters: &LowpassParameters<T>,
) -> Result<Vec<T>> {
    let kernel = lowpass_kernel(parameters)?;
    filter_sequence(x, &kernel, parameters.mode())
}

/// Low-pass filters each column of a matrix with a reference kernel.
///
/// This is the column-wise version of [`lowpass`].
pub fn lowpass_columns<T: Float + FloatConst>(
    x: ArrayView2<T>,
    parameters: &LowpassParameters<T>,
) -> Result<Array2<T>> {
    let kernel = lowpass_kernel(parameters)?;
    filter_columns(x, &kernel, parameters.mode())
}
