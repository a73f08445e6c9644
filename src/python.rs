#![cfg(not(doctest))]

// Do not run doctests, since otherwise Rust attempts to build the Python
// examples as Rust code. There are no Rust doctests in this module, so the
// easiest solution is to disable doctests.

use crate::{
    Convf64, DefaultSolverBackend, FilterMode, LowpassParameters, ParametersBuilder,
    ReferenceKernel, SolverBackend, ThompsonParameters, ZeroConstraint, error::Error,
};
use num_bigfloat::BigFloat;
use num_traits::{Float, FloatConst};
use pyo3::{
    exceptions::{PyRuntimeError, PyValueError},
    prelude::*,
};

/// tidal-lowpass designs and applies the low-pass filters used to remove tidal
/// and inertial oscillations from oceanographic time series.
///
/// Filter weights can be designed with the constrained least squares method of
/// Thompson (1983), which places exact zeros in the frequency response at the
/// speeds of a set of tidal constituents and optionally at the local inertial
/// frequency. Time series can be filtered with the PL33, PL64, PL66 and
/// Thompson (1983) "120i913" reference kernels, either by convolution, which
/// marks the ends of the output as NaN, or by FIR filtering of a sequence
/// extended with cosine tapered reflections.
#[pymodule]
fn tidal_lowpass(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(thompson_weights, m)?)?;
    m.add_function(wrap_pyfunction!(lowpass, m)?)?;
    m.add_function(wrap_pyfunction!(constituent_speed, m)?)?;
    m.add_class::<ThompsonDesign>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__license__", env!("CARGO_PKG_LICENSE"))?;
    Ok(())
}

/// Calculate low-pass filter weights following Thompson (1983).
///
/// The filter approximates an ideal low-pass response with a cosine
/// transition band between the periods `t1` and `t2`, and its response is
/// exactly zero at the speed of each of the tidal constituents listed in
/// `constituents`. If `latitude` is given, the response is also zero at the
/// local inertial frequency.
///
/// The defaults reproduce the "120i913" filter of Thompson (1983).
///
/// Parameters
/// ----------
/// dt : float
///     Sample interval of the data, in hours.
/// constituents : list of str, optional
///     Names of the tidal constituents to suppress. Defaults to
///     ``["Q1", "O1", "K1", "N2", "M2", "L2", "S2"]``.
/// latitude : float, optional
///     Latitude in degrees (negative south), used to suppress the local
///     inertial frequency.
/// t1 : float, optional
///     Period in hours at the upper end of the pass band.
/// t2 : float, optional
///     Period in hours at the lower end of the stop band.
/// filter_length : float, optional
///     One-sided filter length in hours.
/// use_eq10 : bool, optional
///     Additionally impose unit gain at zero frequency (equation 10 of
///     Thompson 1983). This only gives a correct frequency response for
///     ``dt = 1``.
/// show_info : bool, optional
///     Log the filter diagnostics at info level.
/// bigfloat : bool, optional
///     Use `num-bigfloat` for the calculations.
///
/// Returns
/// -------
/// ThompsonDesign
///     The designed filter.
#[pyfunction]
#[pyo3(signature = (dt, constituents=None, latitude=None, t1=41.379, t2=27.907,
                    filter_length=120.0, use_eq10=false, show_info=false, bigfloat=false))]
#[allow(clippy::too_many_arguments)]
fn thompson_weights(
    dt: f64,
    constituents: Option<Vec<String>>,
    latitude: Option<f64>,
    t1: f64,
    t2: f64,
    filter_length: f64,
    use_eq10: bool,
    show_info: bool,
    bigfloat: bool,
) -> PyResult<ThompsonDesign> {
    let settings = DesignSettings {
        dt,
        constituents,
        latitude,
        t1,
        t2,
        filter_length,
        use_eq10,
        show_info,
    };
    if bigfloat {
        thompson_weights_impl::<BigFloat>(settings)
    } else {
        thompson_weights_impl::<f64>(settings)
    }
}

struct DesignSettings {
    dt: f64,
    constituents: Option<Vec<String>>,
    latitude: Option<f64>,
    t1: f64,
    t2: f64,
    filter_length: f64,
    use_eq10: bool,
    show_info: bool,
}

fn thompson_weights_impl<T>(settings: DesignSettings) -> PyResult<ThompsonDesign>
where
    T: Convf64 + Float + FloatConst,
    DefaultSolverBackend: SolverBackend<T>,
{
    let mut params = ThompsonParameters::new(T::from_f64(settings.dt))?;
    if let Some(constituents) = settings.constituents {
        params.set_constituents(constituents);
    }
    params
        .set_latitude(settings.latitude.map(T::from_f64))
        .set_band_periods(T::from_f64(settings.t1), T::from_f64(settings.t2))
        .set_filter_length(T::from_f64(settings.filter_length))
        .set_dc_constraint(settings.use_eq10)
        .set_show_info(settings.show_info);
    Ok(ThompsonDesign::from_design(crate::thompson_weights(&params)?))
}

/// Low-pass filter weights designed with the method of Thompson (1983).
#[derive(Debug, Clone)]
#[pyclass]
struct ThompsonDesign(crate::ThompsonDesign<f64>);

#[pymethods]
impl ThompsonDesign {
    /// Full symmetric impulse response, normalized to sum one.
    #[getter]
    fn get_impulse_response(&self) -> Vec<f64> {
        self.0.impulse_response.clone()
    }

    /// One-sided weights, starting with the centre tap.
    #[getter]
    fn get_one_sided_weights(&self) -> Vec<f64> {
        self.0.one_sided_weights.clone()
    }

    /// Zero constraints as a list of (name, speed in degrees/hour) tuples.
    #[getter]
    fn get_zeros(&self) -> Vec<(String, f64)> {
        self.0
            .zeros
            .iter()
            .map(|z| (z.name.clone(), z.speed))
            .collect()
    }

    /// Upper end of the pass band, in degrees/hour.
    #[getter]
    fn get_pass_band_edge(&self) -> f64 {
        self.0.pass_band_edge
    }

    /// Lower end of the stop band, in degrees/hour.
    #[getter]
    fn get_stop_band_edge(&self) -> f64 {
        self.0.stop_band_edge
    }

    /// Sample interval in hours.
    #[getter]
    fn get_sample_interval(&self) -> f64 {
        self.0.sample_interval
    }

    /// Response of the filter at an angular speed in degrees/hour.
    fn response(&self, speed: f64) -> f64 {
        self.0.response(speed)
    }

    fn __repr__(&self) -> String {
        format!(
            "ThompsonDesign(impulse_response={:?}, zeros={:?}, pass_band_edge={}, \
             stop_band_edge={}, sample_interval={})",
            self.0.impulse_response,
            self.get_zeros(),
            self.0.pass_band_edge,
            self.0.stop_band_edge,
            self.0.sample_interval
        )
    }
}

impl ThompsonDesign {
    fn from_design<T: Convf64>(design: crate::ThompsonDesign<T>) -> ThompsonDesign {
        let to_f64 = |v: Vec<T>| -> Vec<f64> { v.iter().map(Convf64::to_f64).collect() };
        ThompsonDesign(crate::ThompsonDesign {
            impulse_response: to_f64(design.impulse_response),
            one_sided_weights: to_f64(design.one_sided_weights),
            zeros: design
                .zeros
                .into_iter()
                .map(|z| ZeroConstraint {
                    name: z.name,
                    speed: Convf64::to_f64(&z.speed),
                })
                .collect(),
            pass_band_edge: Convf64::to_f64(&design.pass_band_edge),
            stop_band_edge: Convf64::to_f64(&design.stop_band_edge),
            sample_interval: Convf64::to_f64(&design.sample_interval),
        })
    }
}

/// Low-pass filter a time series with a reference kernel.
///
/// Parameters
/// ----------
/// x : list of float
///     Time series, uniformly sampled.
/// kind : str, optional
///     Reference kernel: ``"pl33"``, ``"pl64"``, ``"pl66"`` or
///     ``"thompson1983"``.
/// dt : float, optional
///     Sample interval in hours.
/// period : float, optional
///     Half-amplitude period in hours. Defaults to the native period of the
///     kernel (33 hours, or 120 hours for ``"thompson1983"``).
/// mode : str, optional
///     ``"convolution"`` (the ends of the output are NaN), ``"tapered"``
///     (causal filtering of a tapered extension) or ``"filtfilt"``
///     (forward-backward filtering of a tapered extension).
///
/// Returns
/// -------
/// list of float
///     Filtered time series, with the same length as `x`.
#[pyfunction]
#[pyo3(signature = (x, kind="pl33", dt=1.0, period=None, mode="convolution"))]
fn lowpass(
    x: Vec<f64>,
    kind: &str,
    dt: f64,
    period: Option<f64>,
    mode: &str,
) -> PyResult<Vec<f64>> {
    let kind = match kind {
        "pl33" => ReferenceKernel::Pl33,
        "pl64" => ReferenceKernel::Pl64,
        "pl66" => ReferenceKernel::Pl66,
        "thompson1983" => ReferenceKernel::Thompson1983,
        _ => {
            return Err(PyValueError::new_err(
                "kind must be \"pl33\", \"pl64\", \"pl66\" or \"thompson1983\"",
            ));
        }
    };
    let mode = match mode {
        "convolution" => FilterMode::Convolution,
        "tapered" => FilterMode::Tapered,
        "filtfilt" => FilterMode::ForwardBackward,
        _ => {
            return Err(PyValueError::new_err(
                "mode must be \"convolution\", \"tapered\" or \"filtfilt\"",
            ));
        }
    };
    let mut params = LowpassParameters::new(kind, dt)?;
    if let Some(period) = period {
        params.set_half_amplitude_period(period);
    }
    params.set_mode(mode);
    Ok(crate::lowpass(&x, &params)?)
}

/// Angular speed of a tidal constituent in degrees/hour.
#[pyfunction]
fn constituent_speed(name: &str) -> PyResult<f64> {
    Ok(crate::constituents::speed(name)?)
}

impl From<Error> for PyErr {
    fn from(error: Error) -> PyErr {
        match error {
            Error::InvalidLatitude
            | Error::UnknownConstituent(_)
            | Error::DegenerateBand { .. }
            | Error::InvalidSampleInterval
            | Error::InvalidPeriod
            | Error::BandEdgesWrongOrder
            | Error::InvalidFilterLength
            | Error::TooManyConstraints { .. }
            | Error::InvalidKernelLength
            | Error::SequenceTooShort { .. } => PyValueError::new_err(error.to_string()),
            Error::SolverError(_) | Error::ConstraintsNotMet { .. } => {
                PyRuntimeError::new_err(error.to_string())
            }
        }
    }
}
