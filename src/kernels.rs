//! Reference low-pass kernels.
//!
//! This module builds the symmetric kernels used by [`lowpass`](crate::lowpass):
//! the tabulated PL33 and Thompson (1983) "120i913" kernels, which are resampled
//! to the requested sample interval and half-amplitude period, and the PL64 and
//! PL66 kernels, which are generated from a closed-form expression.

use crate::apply::{FilterMode, LowpassParameters};
use crate::error::{Error, Result};
use num_traits::{Float, FloatConst};

/// Reference low-pass kernel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ReferenceKernel {
    /// PL33 filter of Rosenfeld (1983), tabulated over +/-33 hours.
    Pl33,
    /// PL64 filter, with 64 hours of one-sided weights.
    ///
    /// The mirrored kernel is not normalized, so its sum is only
    /// approximately one.
    Pl64,
    /// PL66 filter, with weights up to twice the half-amplitude period.
    Pl66,
    /// "120i913" filter of Thompson (1983), tabulated over +/-120 hours.
    Thompson1983,
}

impl ReferenceKernel {
    /// Returns the native half-amplitude period of the kernel in hours.
    ///
    /// This is the default half-amplitude period used by
    /// [`LowpassParameters::new`].
    pub fn native_period(&self) -> f64 {
        match self {
            ReferenceKernel::Pl33 | ReferenceKernel::Pl64 | ReferenceKernel::Pl66 => 33.0,
            ReferenceKernel::Thompson1983 => 120.0,
        }
    }
}

/// Endpoints of the resampled time axis.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Endpoints {
    /// The time axis covers the half-open interval `[0, half_span)`.
    Exclude,
    /// The time axis covers the closed interval `[0, half_span]`.
    ///
    /// No sample is taken beyond `half_span`, so when the step does not
    /// divide the span the last sample falls short of it.
    Include,
}

/// PL33 weights at one hour spacing, from -33 to 33 hours.
pub const PL33_WEIGHTS: [f64; 67] = [
    -0.00027, -0.00114, -0.00211, -0.00317, -0.00427, -0.00537,
    -0.00641, -0.00735, -0.00811, -0.00864, -0.00887, -0.00872,
    -0.00816, -0.00714, -0.00560, -0.00355, -0.00097, 0.00213,
    0.00574, 0.00980, 0.01425, 0.01902, 0.02400, 0.02911,
    0.03423, 0.03923, 0.04399, 0.04842, 0.05237, 0.05576,
    0.05850, 0.06051, 0.06174, 0.06215, 0.06174, 0.06051,
    0.05850, 0.05576, 0.05237, 0.04842, 0.04399, 0.03923,
    0.03423, 0.02911, 0.02400, 0.01902, 0.01425, 0.00980,
    0.00574, 0.00213, -0.00097, -0.00355, -0.00560, -0.00714,
    -0.00816, -0.00872, -0.00887, -0.00864, -0.00811, -0.00735,
    -0.00641, -0.00537, -0.00427, -0.00317, -0.00211, -0.00114,
    -0.00027,
];

/// Thompson (1983) "120i913" weights at one hour spacing, from -120 to 120
/// hours.
pub const THOMPSON_1983_WEIGHTS: [f64; 241] = [
    -0.0001255975169529, -0.0000576566212960, 0.0000008772625492, 0.0000504990701605,
    0.0000942800339363, 0.0001364265309623, 0.0001806489560515, 0.0002287678672126,
    0.0002798969463550, 0.0003303767333693, 0.0003744359684560, 0.0004053797177045,
    0.0004169878608051, 0.0004047781247945, 0.0003668456031790, 0.0003041148023638,
    0.0002199949519143, 0.0001195739580541, 0.0000085859812592, -0.0001075788384422,
    -0.0002245893905455, -0.0003394700761412, -0.0004504529871661, -0.0005564737287697,
    -0.0006564810771678, -0.0007487640159512, -0.0008304804428853, -0.0008975096399215,
    -0.0009446647583862, -0.0009662152532209, -0.0009566032233169, -0.0009112054794798,
    -0.0008269984668252, -0.0007030198466382, -0.0005405755511982, -0.0003431986285532,
    -0.0001164119731874, 0.0001326280681766, 0.0003955286488028, 0.0006630371369789,
    0.0009253655622452, 0.0011724606875113, 0.0013942402966371, 0.0015808268731708,
    0.0017228077359594, 0.0018115390102654, 0.0018394947886009, 0.0018006478593020,
    0.0016908582800693, 0.0015082421867801, 0.0012534944537684, 0.0009301425178768,
    0.0005447120097246, 0.0001067860560333, -0.0003710606763679, -0.0008734730218081,
    -0.0013826893388516, -0.0018790889539334, -0.0023419092817862, -0.0027501090943452,
    -0.0030833325127995, -0.0033229093511619, -0.0034528166570604, -0.0034605274105611,
    -0.0033376862901474, -0.0030805767616674, -0.0026903730907849, -0.0021731981753985,
    -0.0015400265393673, -0.0008064767996314, 0.0000074716137969, 0.0008778237149054,
    0.0017769884931807, 0.0026743079755453, 0.0035367432067438, 0.0043297607266505,
    0.0050184423729522, 0.0055688071033572, 0.0059492933454438, 0.0061323134445715,
    0.0060957669907227, 0.0058243933643957, 0.0053108576334068, 0.0045564950198581,
    0.0035716805257987, 0.0023758326599445, 0.0009970943319706, -0.0005282469392941,
    -0.0021565360734941, -0.0038376759144109, -0.0055161769150466, -0.0071323330124128,
    -0.0086235450735164, -0.0099258193929847, -0.0109754587308147, -0.0117109387968976,
    -0.0120749292502215, -0.0120163829300949, -0.0114925883575559, -0.0104710651532758,
    -0.0089311834319159, -0.0068654061760652, -0.0042800842603486, -0.0011957709551415,
    0.0023529406613552, 0.0063180240999614, 0.0106390172601230, 0.0152443519297012,
    0.0200529580916656, 0.0249760952599217, 0.0299193737696328, 0.0347849368494655,
    0.0394737763693820, 0.0438881502843118, 0.0479340588587595, 0.0515237222033966,
    0.0545779867795019, 0.0570285766902611, 0.0588200995238596, 0.0599117179373416,
    0.0602784024045874, 0.0599117179373416, 0.0588200995238596, 0.0570285766902611,
    0.0545779867795019, 0.0515237222033966, 0.0479340588587595, 0.0438881502843118,
    0.0394737763693820, 0.0347849368494655, 0.0299193737696328, 0.0249760952599217,
    0.0200529580916656, 0.0152443519297012, 0.0106390172601230, 0.0063180240999614,
    0.0023529406613552, -0.0011957709551415, -0.0042800842603486, -0.0068654061760652,
    -0.0089311834319159, -0.0104710651532758, -0.0114925883575559, -0.0120163829300949,
    -0.0120749292502215, -0.0117109387968976, -0.0109754587308147, -0.0099258193929847,
    -0.0086235450735164, -0.0071323330124128, -0.0055161769150466, -0.0038376759144109,
    -0.0021565360734941, -0.0005282469392941, 0.0009970943319706, 0.0023758326599445,
    0.0035716805257987, 0.0045564950198581, 0.0053108576334068, 0.0058243933643957,
    0.0060957669907227, 0.0061323134445715, 0.0059492933454438, 0.0055688071033572,
    0.0050184423729522, 0.0043297607266505, 0.0035367432067438, 0.0026743079755453,
    0.0017769884931807, 0.0008778237149054, 0.0000074716137969, -0.0008064767996314,
    -0.0015400265393673, -0.0021731981753985, -0.0026903730907849, -0.0030805767616674,
    -0.0033376862901474, -0.0034605274105611, -0.0034528166570604, -0.0033229093511619,
    -0.0030833325127995, -0.0027501090943452, -0.0023419092817862, -0.0018790889539334,
    -0.0013826893388516, -0.0008734730218081, -0.0003710606763679, 0.0001067860560333,
    0.0005447120097246, 0.0009301425178768, 0.0012534944537684, 0.0015082421867801,
    0.0016908582800693, 0.0018006478593020, 0.0018394947886009, 0.0018115390102654,
    0.0017228077359594, 0.0015808268731708, 0.0013942402966371, 0.0011724606875113,
    0.0009253655622452, 0.0006630371369789, 0.0003955286488028, 0.0001326280681766,
    -0.0001164119731874, -0.0003431986285532, -0.0005405755511982, -0.0007030198466382,
    -0.0008269984668252, -0.0009112054794798, -0.0009566032233169, -0.0009662152532209,
    -0.0009446647583862, -0.0008975096399215, -0.0008304804428853, -0.0007487640159512,
    -0.0006564810771678, -0.0005564737287697, -0.0004504529871661, -0.0003394700761412,
    -0.0002245893905455, -0.0001075788384422, 0.0000085859812592, 0.0001195739580541,
    0.0002199949519143, 0.0003041148023638, 0.0003668456031790, 0.0004047781247945,
    0.0004169878608051, 0.0004053797177045, 0.0003744359684560, 0.0003303767333693,
    0.0002798969463550, 0.0002287678672126, 0.0001806489560515, 0.0001364265309623,
    0.0000942800339363, 0.0000504990701605, 0.0000008772625492, -0.0000576566212960,
    -0.0001255975169529,
];

// Relative tolerance used to decide whether the end of the time axis falls on
// a sample.
const AXIS_TOLERANCE: f64 = 1e-9;

/// Resamples a tabulated symmetric kernel.
///
/// The `table` holds a symmetric kernel at unit spacing over
/// `[-half_span, half_span]` hours, so its length must be `2 * half_span + 1`.
/// The kernel is stretched so that its half-amplitude period becomes `period`
/// (the native period is `half_span`), sampled every `sample_interval` hours
/// by linear interpolation (clamped at the ends of the table), mirrored and
/// normalized to sum one.
///
/// An [`Error::InvalidKernelLength`] is returned if the length of the table
/// does not match `half_span`, or if the resampled kernel would have a single
/// tap.
pub fn resample_kernel<T: Float>(
    table: &[T],
    half_span: T,
    sample_interval: T,
    period: T,
    endpoints: Endpoints,
) -> Result<Vec<T>> {
    check_interval_and_period(sample_interval, period)?;
    let two = T::from(2).unwrap();
    if !half_span.is_finite()
        || half_span <= T::zero()
        || T::from(table.len()).unwrap() != two * half_span + T::one()
    {
        return Err(Error::InvalidKernelLength);
    }
    let step = sample_interval * half_span / period;
    if step >= half_span {
        return Err(Error::InvalidKernelLength);
    }
    let ratio = half_span / step;
    let tol = T::from(AXIS_TOLERANCE).unwrap() * ratio;
    let one_sided = match endpoints {
        Endpoints::Exclude => (ratio - tol).ceil(),
        Endpoints::Include => (ratio + tol).floor() + T::one(),
    }
    .to_usize()
    .ok_or(Error::InvalidKernelLength)?;

    let half: Vec<T> = (0..one_sided)
        .map(|k| interpolate(table, T::from(k).unwrap() * step + half_span))
        .collect();
    Ok(normalize(mirror(&half)))
}

/// Linear interpolation of a table at a fractional index, clamped at the
/// ends.
fn interpolate<T: Float>(table: &[T], position: T) -> T {
    let last = table.len() - 1;
    if position <= T::zero() {
        return table[0];
    }
    if position >= T::from(last).unwrap() {
        return table[last];
    }
    let j = position.floor();
    let frac = position - j;
    let j = j.to_usize().unwrap_or(last).min(last - 1);
    table[j] + frac * (table[j + 1] - table[j])
}

/// Builds a symmetric kernel `[w[n-1], ..., w[1], w[0], w[1], ..., w[n-1]]`
/// from one-sided weights.
pub(crate) fn mirror<T: Copy>(one_sided: &[T]) -> Vec<T> {
    one_sided
        .iter()
        .skip(1)
        .rev()
        .chain(one_sided.iter())
        .copied()
        .collect()
}

pub(crate) fn normalize<T: Float>(mut kernel: Vec<T>) -> Vec<T> {
    let sum = kernel.iter().fold(T::zero(), |acc, &x| acc + x);
    for x in kernel.iter_mut() {
        *x = *x / sum;
    }
    kernel
}

fn check_interval_and_period<T: Float>(sample_interval: T, period: T) -> Result<()> {
    if !sample_interval.is_finite() || sample_interval <= T::zero() {
        return Err(Error::InvalidSampleInterval);
    }
    if !period.is_finite() || period <= T::zero() {
        return Err(Error::InvalidPeriod);
    }
    Ok(())
}

/// One-sided weights `(2 sin(2ft) - sin(ft) - sin(3ft)) / (f^2 t^3)` with
/// `t = j pi` for `j` in `range`.
fn pl_weights<T: Float + FloatConst>(
    f: T,
    range: impl Iterator<Item = usize>,
) -> impl Iterator<Item = T> {
    let two = T::from(2).unwrap();
    let three = T::from(3).unwrap();
    range.map(move |j| {
        let t = T::from(j).unwrap() * T::PI();
        (two * (two * f * t).sin() - (f * t).sin() - (three * f * t).sin()) / (f * f * t * t * t)
    })
}

/// Builds the PL64 kernel.
///
/// The kernel has `round(64 / sample_interval) - 1` weights on each side of
/// the centre tap. It is not normalized.
pub fn pl64_kernel<T: Float + FloatConst>(sample_interval: T, period: T) -> Result<Vec<T>> {
    check_interval_and_period(sample_interval, period)?;
    let f = sample_interval / period;
    let nw = (T::from(64).unwrap() / sample_interval)
        .round()
        .to_usize()
        .ok_or(Error::InvalidKernelLength)?;
    if nw < 2 {
        return Err(Error::InvalidKernelLength);
    }
    let one_sided: Vec<T> = std::iter::once(T::from(2).unwrap() * f)
        .chain(pl_weights(f, 1..nw))
        .collect();
    Ok(mirror(&one_sided))
}

/// Builds the PL66 kernel.
///
/// The kernel has `round(2 * period / sample_interval)` weights on each side
/// of the centre tap, which reach the fourth zero crossing of the weights, and
/// it is normalized to sum one.
pub fn pl66_kernel<T: Float + FloatConst>(sample_interval: T, period: T) -> Result<Vec<T>> {
    check_interval_and_period(sample_interval, period)?;
    let f = sample_interval / period;
    let nw = (T::from(2).unwrap() * period / sample_interval)
        .round()
        .to_usize()
        .ok_or(Error::InvalidKernelLength)?;
    if nw < 1 {
        return Err(Error::InvalidKernelLength);
    }
    let one_sided: Vec<T> = std::iter::once(T::from(2).unwrap() * f)
        .chain(pl_weights(f, 1..=nw))
        .collect();
    Ok(normalize(mirror(&one_sided)))
}

/// Builds the kernel used by [`lowpass`](crate::lowpass).
///
/// Tabulated kernels are resampled on the half-open time axis in
/// [`FilterMode::Convolution`] and on the closed time axis in the tapered
/// modes.
pub fn lowpass_kernel<T: Float + FloatConst>(parameters: &LowpassParameters<T>) -> Result<Vec<T>> {
    let dt = parameters.sample_interval();
    let period = parameters.half_amplitude_period();
    let endpoints = match parameters.mode() {
        FilterMode::Convolution => Endpoints::Exclude,
        FilterMode::Tapered | FilterMode::ForwardBackward => Endpoints::Include,
    };
    let kernel = match parameters.kind() {
        ReferenceKernel::Pl33 => resample_kernel(
            &table(&PL33_WEIGHTS),
            T::from(33).unwrap(),
            dt,
            period,
            endpoints,
        )?,
        ReferenceKernel::Thompson1983 => resample_kernel(
            &table(&THOMPSON_1983_WEIGHTS),
            T::from(120).unwrap(),
            dt,
            period,
            endpoints,
        )?,
        ReferenceKernel::Pl64 => pl64_kernel(dt, period)?,
        ReferenceKernel::Pl66 => pl66_kernel(dt, period)?,
    };
    log::debug!(
        "{:?} kernel with {} taps for {:?} mode",
        parameters.kind(),
        kernel.len(),
        parameters.mode()
    );
    Ok(kernel)
}

fn table<T: Float>(weights: &[f64]) -> Vec<T> {
    weights.iter().map(|&w| T::from(w).unwrap()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn sum(x: &[f64]) -> f64 {
        x.iter().sum()
    }

    fn is_symmetric(x: &[f64]) -> bool {
        x.iter().zip(x.iter().rev()).all(|(a, b)| a == b)
    }

    #[test]
    fn pl33_native() {
        let half_open =
            resample_kernel(&PL33_WEIGHTS, 33.0, 1.0, 33.0, Endpoints::Exclude).unwrap();
        assert_eq!(half_open.len(), 65);
        assert!(is_symmetric(&half_open));
        assert!((sum(&half_open) - 1.0).abs() < 1e-12);
        let table_sum = sum(&PL33_WEIGHTS[1..66]);
        for (k, w) in half_open.iter().zip(PL33_WEIGHTS[1..66].iter()) {
            assert!((k - w / table_sum).abs() < 1e-15);
        }
        let closed = resample_kernel(&PL33_WEIGHTS, 33.0, 1.0, 33.0, Endpoints::Include).unwrap();
        assert_eq!(closed.len(), 67);
        assert!((closed[0] - PL33_WEIGHTS[0] / sum(&PL33_WEIGHTS)).abs() < 1e-15);
    }

    #[test]
    fn pl33_stretched() {
        // dt = 4 h: 0, 4, ..., 32
        let k = resample_kernel(&PL33_WEIGHTS, 33.0, 4.0, 33.0, Endpoints::Exclude).unwrap();
        assert_eq!(k.len(), 17);
        let k = resample_kernel(&PL33_WEIGHTS, 33.0, 4.0, 33.0, Endpoints::Include).unwrap();
        assert_eq!(k.len(), 17);
        // dt = 3 h: 0, 3, ..., 30 and 33 only on the closed axis
        let k = resample_kernel(&PL33_WEIGHTS, 33.0, 3.0, 33.0, Endpoints::Exclude).unwrap();
        assert_eq!(k.len(), 21);
        let k = resample_kernel(&PL33_WEIGHTS, 33.0, 3.0, 33.0, Endpoints::Include).unwrap();
        assert_eq!(k.len(), 23);
        // 72 h period at dt = 4 h: step 11/6 h
        let k = resample_kernel(&PL33_WEIGHTS, 33.0, 4.0, 72.0, Endpoints::Exclude).unwrap();
        assert_eq!(k.len(), 2 * 18 - 1);
        assert!(is_symmetric(&k));
        assert!((sum(&k) - 1.0).abs() < 1e-12);
        // t = 1.5 h falls half way between the 1 h and 2 h table values
        let k = resample_kernel(&PL33_WEIGHTS, 33.0, 0.5, 33.0, Endpoints::Exclude).unwrap();
        assert_eq!(k.len(), 131);
        let ratio = 0.5 * (PL33_WEIGHTS[34] + PL33_WEIGHTS[35]) / PL33_WEIGHTS[33];
        assert!((k[65 + 3] / k[65] - ratio).abs() < 1e-12);
    }

    #[test]
    fn resample_errors() {
        assert!(matches!(
            resample_kernel(&PL33_WEIGHTS, 33.0, 33.0, 33.0, Endpoints::Exclude),
            Err(Error::InvalidKernelLength)
        ));
        assert!(matches!(
            resample_kernel(&PL33_WEIGHTS[1..], 33.0, 1.0, 33.0, Endpoints::Exclude),
            Err(Error::InvalidKernelLength)
        ));
        assert!(matches!(
            resample_kernel(&PL33_WEIGHTS, 33.0, 0.0, 33.0, Endpoints::Exclude),
            Err(Error::InvalidSampleInterval)
        ));
        assert!(matches!(
            resample_kernel(&PL33_WEIGHTS, 33.0, 1.0, f64::NAN, Endpoints::Exclude),
            Err(Error::InvalidPeriod)
        ));
    }

    #[test]
    fn thompson_table() {
        assert!((sum(&THOMPSON_1983_WEIGHTS) - 1.0).abs() < 1e-9);
        assert!(is_symmetric(&THOMPSON_1983_WEIGHTS));
        let k =
            resample_kernel(&THOMPSON_1983_WEIGHTS, 120.0, 1.0, 120.0, Endpoints::Include).unwrap();
        assert_eq!(k.len(), 241);
        let k =
            resample_kernel(&THOMPSON_1983_WEIGHTS, 120.0, 1.0, 120.0, Endpoints::Exclude).unwrap();
        assert_eq!(k.len(), 239);
    }

    #[test]
    fn pl64() {
        let k = pl64_kernel(1.0, 33.0).unwrap();
        assert_eq!(k.len(), 2 * 63 + 1);
        assert!(is_symmetric(&k));
        assert_eq!(k[63], 2.0 / 33.0);
        // not normalized
        assert!((sum(&k) - 1.0).abs() > 1e-6);
        assert!((sum(&k) - 1.0).abs() < 0.05);
        assert_eq!(pl64_kernel(4.0, 33.0).unwrap().len(), 2 * 15 + 1);
        assert!(matches!(pl64_kernel(64.0, 33.0), Err(Error::InvalidKernelLength)));
    }

    #[test]
    fn pl66() {
        let k = pl66_kernel(1.0, 33.0).unwrap();
        assert_eq!(k.len(), 2 * 66 + 1);
        assert!(is_symmetric(&k));
        assert!((sum(&k) - 1.0).abs() < 1e-12);
        let k = pl66_kernel(4.0, 72.0).unwrap();
        assert_eq!(k.len(), 2 * 36 + 1);
        assert!(matches!(pl66_kernel(200.0, 33.0), Err(Error::InvalidKernelLength)));
    }

    #[test]
    fn lowpass_kernels() {
        let mut params = LowpassParameters::new(ReferenceKernel::Pl33, 1.0).unwrap();
        assert_eq!(lowpass_kernel(&params).unwrap().len(), 65);
        params.set_mode(FilterMode::Tapered);
        assert_eq!(lowpass_kernel(&params).unwrap().len(), 67);
        let mut params = LowpassParameters::new(ReferenceKernel::Thompson1983, 2.0).unwrap();
        assert_eq!(lowpass_kernel(&params).unwrap().len(), 119);
        params.set_mode(FilterMode::ForwardBackward);
        assert_eq!(lowpass_kernel(&params).unwrap().len(), 121);
        let params = LowpassParameters::new(ReferenceKernel::Pl66, 1.0).unwrap();
        assert_eq!(lowpass_kernel(&params).unwrap().len(), 133);
    }
}
