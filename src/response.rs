use crate::types::ThompsonDesign;
use num_complex::Complex;
use num_traits::{Float, FloatConst};

/// Frequency step of the diagnostics grid, in degrees per sample.
const GRID_STEP: f64 = 0.01;
/// Number of points of the diagnostics grid, which ends at the Nyquist
/// frequency (180 degrees per sample).
const GRID_POINTS: usize = 18000;

/// Response of a symmetric filter given by its one-sided weights.
///
/// The response at an angular speed `speed` in degrees per hour is
/// `w[0] + 2 * sum(w[i] * cos(i * speed * sample_interval))`, which is real
/// because the filter is symmetric.
pub fn symmetric_response<T: Float + FloatConst>(
    one_sided_weights: &[T],
    speed: T,
    sample_interval: T,
) -> T {
    let Some((&w0, rest)) = one_sided_weights.split_first() else {
        return T::zero();
    };
    let step = speed * sample_interval * T::PI() / T::from(180).unwrap();
    let two = T::from(2).unwrap();
    rest.iter().enumerate().fold(w0, |acc, (i, &w)| {
        acc + two * w * (T::from(i + 1).unwrap() * step).cos()
    })
}

/// Complex frequency response of an arbitrary FIR kernel.
///
/// The response is evaluated at an angular speed `speed` in degrees per hour,
/// for a kernel whose taps are spaced `sample_interval` hours apart. The phase
/// is referred to the first tap of the kernel.
pub fn frequency_response<T: Float + FloatConst>(
    kernel: &[T],
    speed: T,
    sample_interval: T,
) -> Complex<T> {
    let step = -speed * sample_interval * T::PI() / T::from(180).unwrap();
    kernel
        .iter()
        .enumerate()
        .fold(Complex::new(T::zero(), T::zero()), |acc, (k, &h)| {
            acc + Complex::from_polar(h, T::from(k).unwrap() * step)
        })
}

/// Filter diagnostics.
///
/// These figures are used to verify a design produced by
/// [`thompson_weights`](crate::thompson_weights). They are obtained with
/// [`ThompsonDesign::diagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics<T> {
    /// Sum `w[0] + 2 * sum(w[1..])` of the one-sided weights. This should be
    /// one.
    pub weight_sum: T,
    /// Sum `sum((i + 1)^2 * w[i])` of the one-sided weights. This should be
    /// zero, since it is the zero curvature constraint.
    pub second_moment: T,
    /// Response at the speed of each zero constraint, in the order of
    /// [`ThompsonDesign::zeros`]. These should be zero.
    pub zero_responses: Vec<T>,
    /// Largest absolute response at the zero constraints.
    pub max_zero_response: T,
    /// Highest grid speed below the pass band edge, in degrees per hour.
    pub pass_band_grid_edge: T,
    /// RMS departure of the response from one below the pass band edge.
    pub pass_band_rms: T,
    /// Lowest grid speed above the stop band edge, in degrees per hour.
    pub stop_band_grid_edge: T,
    /// RMS departure of the response from zero above the stop band edge.
    pub stop_band_rms: T,
}

impl<T: Float + FloatConst> ThompsonDesign<T> {
    /// Returns the response of the filter at an angular speed in degrees per
    /// hour.
    pub fn response(&self, speed: T) -> T {
        symmetric_response(&self.one_sided_weights, speed, self.sample_interval)
    }

    /// Computes the filter diagnostics.
    ///
    /// The RMS departures are evaluated on a grid of steps of 0.01 degrees per
    /// sample up to the Nyquist frequency.
    pub fn diagnostics(&self) -> Diagnostics<T> {
        let w = &self.one_sided_weights;
        let two = T::from(2).unwrap();
        let weight_sum = w
            .iter()
            .skip(1)
            .fold(w.first().copied().unwrap_or_else(T::zero), |acc, &x| {
                acc + two * x
            });
        let second_moment = w.iter().enumerate().fold(T::zero(), |acc, (i, &x)| {
            let k = T::from(i + 1).unwrap();
            acc + k * k * x
        });
        let zero_responses: Vec<T> = self.zeros.iter().map(|z| self.response(z.speed)).collect();
        let max_zero_response = zero_responses
            .iter()
            .map(|r| r.abs())
            .fold(T::zero(), T::max);

        let step = T::from(GRID_STEP).unwrap();
        let mut pass = RmsAccumulator::new();
        let mut stop = RmsAccumulator::new();
        let mut pass_band_grid_edge = T::nan();
        let mut stop_band_grid_edge = T::nan();
        for j in 1..=GRID_POINTS {
            // grid speed in degrees per hour
            let speed = T::from(j).unwrap() * step / self.sample_interval;
            let r = self.response(speed) / weight_sum;
            if speed < self.pass_band_edge {
                pass.push(r - T::one());
                pass_band_grid_edge = speed;
            } else if speed > self.stop_band_edge {
                if stop.is_empty() {
                    stop_band_grid_edge = speed;
                }
                stop.push(r);
            }
        }

        Diagnostics {
            weight_sum,
            second_moment,
            zero_responses,
            max_zero_response,
            pass_band_grid_edge,
            pass_band_rms: pass.rms(),
            stop_band_grid_edge,
            stop_band_rms: stop.rms(),
        }
    }
}

impl<T: Float> Diagnostics<T> {
    /// Writes the diagnostics to the log at info level.
    pub fn log(&self, design: &ThompsonDesign<T>) {
        log::info!("sum of weights is {:15.10}", as_f64(self.weight_sum));
        log::info!("sum of k^2 weights is {:15.10}", as_f64(self.second_moment));
        log::info!(
            "OM1 = {:9.7} deg/h, OM2 = {:9.7} deg/h",
            as_f64(design.pass_band_edge),
            as_f64(design.stop_band_edge)
        );
        for (zero, &r) in design.zeros.iter().zip(self.zero_responses.iter()) {
            log::info!(
                "response at {}: speed = {:9.7} deg/h, R = {:9.6e}",
                zero.name,
                as_f64(zero.speed),
                as_f64(r)
            );
        }
        log::info!(
            "RMS departure from 1.0 below {:6.2} deg/h is {:9.6e}",
            as_f64(self.pass_band_grid_edge),
            as_f64(self.pass_band_rms)
        );
        log::info!(
            "RMS departure from 0.0 above {:6.2} deg/h is {:9.6e}",
            as_f64(self.stop_band_grid_edge),
            as_f64(self.stop_band_rms)
        );
    }
}

pub(crate) fn as_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

struct RmsAccumulator<T> {
    sum_squares: T,
    count: usize,
}

impl<T: Float> RmsAccumulator<T> {
    fn new() -> RmsAccumulator<T> {
        RmsAccumulator {
            sum_squares: T::zero(),
            count: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn push(&mut self, x: T) {
        self.sum_squares = self.sum_squares + x * x;
        self.count += 1;
    }

    fn rms(&self) -> T {
        if self.is_empty() {
            return T::nan();
        }
        (self.sum_squares / T::from(self.count).unwrap()).sqrt()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::ZeroConstraint;

    #[test]
    fn symmetric_and_complex_agree() {
        let one_sided = [0.5, 0.2, 0.05];
        let full = [0.05, 0.2, 0.5, 0.2, 0.05];
        for speed in [0.0, 5.0, 13.0, 28.9841042, 90.0] {
            let r = symmetric_response(&one_sided, speed, 2.0);
            // remove the linear phase of the two-sample delay
            let h = frequency_response(&full, speed, 2.0)
                * Complex::from_polar(1.0, 2.0 * speed * 2.0 * f64::PI() / 180.0);
            assert!((h.re - r).abs() < 1e-12);
            assert!(h.im.abs() < 1e-12);
        }
        assert_eq!(symmetric_response(&one_sided, 0.0, 1.0), 1.0);
        assert_eq!(symmetric_response::<f64>(&[], 10.0, 1.0), 0.0);
    }

    #[test]
    fn diagnostics_of_moving_average() {
        // three-point moving average has a zero at 120 deg/sample
        let design = ThompsonDesign {
            impulse_response: vec![1.0 / 3.0; 3],
            one_sided_weights: vec![1.0 / 3.0, 1.0 / 3.0],
            zeros: vec![ZeroConstraint {
                name: "test".to_string(),
                speed: 60.0,
            }],
            pass_band_edge: 10.0,
            stop_band_edge: 20.0,
            sample_interval: 2.0,
        };
        let diag = design.diagnostics();
        assert!((diag.weight_sum - 1.0).abs() < 1e-15);
        assert!((diag.second_moment - 5.0 / 3.0).abs() < 1e-15);
        assert_eq!(diag.zero_responses.len(), 1);
        assert!(diag.max_zero_response < 1e-15);
        assert!(diag.pass_band_grid_edge < 10.0);
        assert!(diag.pass_band_grid_edge > 9.99);
        assert!(diag.stop_band_grid_edge > 20.0);
        assert!(diag.stop_band_grid_edge < 20.01);
        assert!(diag.pass_band_rms > 0.0 && diag.pass_band_rms < 0.1);
        assert!(diag.stop_band_rms > 0.0);
    }
}
