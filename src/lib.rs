//! # Tidal low-pass filters
//!
//! The [`tidal_lowpass`](crate) crate designs and applies the low-pass filters
//! that are commonly used to remove tidal and inertial oscillations from
//! oceanographic time series, such as currents and temperatures measured by
//! moored instruments.
//!
//! Two kinds of functionality are provided:
//!
//! - Filter design with the constrained least squares method of Thompson
//!   (1983) \[1\]. The function [`thompson_weights`] computes symmetric FIR
//!   filter weights whose frequency response approximates an ideal low-pass
//!   response with a cosine transition band, and which is exactly zero at the
//!   angular speeds of a set of tidal constituents (taken from the
//!   [`constituents`] table) and optionally at the local inertial frequency.
//!
//! - Filter application with the reference kernels PL33 \[2\], PL64, PL66 and
//!   the "120i913" kernel of \[1\]. The function [`lowpass`] resamples the
//!   kernel to the sample interval of the data and filters it either by
//!   convolution, marking the ends of the output as missing (NaN), or by
//!   causal or forward-backward FIR filtering of a sequence that has been
//!   extended with cosine tapered reflections, which gives a fully defined
//!   output. Any kernel, including the ones designed with
//!   [`thompson_weights`], can be applied with [`filter_sequence`].
//!
//! All the functions are pure and reentrant, so independent time series can be
//! filtered concurrently.
//!
//! ## Examples
//!
//! The following designs the "120i913" filter for hourly data, with an
//! additional zero at the inertial frequency of Sydney, and applies it to a
//! sequence.
//!
//! ```
//! # #[cfg(any(
//! #     feature = "lapack-backend",
//! #     feature = "faer-backend",
//! #     feature = "nalgebra-backend"
//! # ))]
//! # fn main() -> Result<(), tidal_lowpass::error::Error> {
//! use tidal_lowpass::{
//!     filter_sequence, thompson_weights, FilterMode, ParametersBuilder, ThompsonParameters,
//! };
//! let mut parameters = ThompsonParameters::<f64>::new(1.0)?;
//! parameters.set_latitude(Some(-33.86));
//! let design = thompson_weights(&parameters)?;
//! assert_eq!(design.impulse_response.len(), 241);
//! for zero in &design.zeros {
//!     assert!(design.response(zero.speed).abs() < 1e-6);
//! }
//!
//! let x: Vec<f64> = (0..1000)
//!     .map(|t| (2.0 * std::f64::consts::PI * t as f64 / 12.42).sin())
//!     .collect();
//! let y = filter_sequence(&x, &design.impulse_response, FilterMode::Convolution)?;
//! assert!(y[0].is_nan());
//! assert!(y[500].abs() < 1e-6);
//! # Ok(())
//! # }
//! # #[cfg(not(any(
//! #     feature = "lapack-backend",
//! #     feature = "faer-backend",
//! #     feature = "nalgebra-backend"
//! # )))]
//! # fn main() {}
//! ```
//!
//! ## Building
//!
//! The `tidal_lowpass` crate supports different backends to solve the linear
//! system of the filter design. These are selected with feature flags. See
//! [`SolverBackend`] for more details. By default, only the faer backend is
//! enabled, which is a pure Rust implementation.
//!
//! Another supported backend uses `ndarray_linalg` to solve the system with
//! LAPACK. It is enabled with the `lapack-backend` feature flag, together with
//! exactly one of the feature flags `openblas-static`, `openblas-system`,
//! `netlib-static`, `netlib-system`, `intel-mkl-static` and
//! `intel-mkl-system`, which select the LAPACK implementation and how it is
//! linked.
//!
//! ## Logging
//!
//! Warnings and diagnostics are emitted with the [`log`] crate. No logger is
//! installed by this crate.
//!
//! ## References
//!
//! \[1\] R.O.R.Y. Thompson, "Low-Pass Filters to Suppress Inertial and Tidal
//! Frequencies," in J. Phys. Oceanogr., 13, pp. 1077-1083, 1983.
//!
//! \[2\] M. Rosenfeld, "CODE-2: Moored Array and Large-Scale Data Report",
//! WHOI Technical Report 85-35, 1985.

#![warn(missing_docs)]

use itertools::Itertools;
use num_traits::{Float, FloatConst};

mod apply;
pub use apply::{
    FilterMode, LowpassParameters, edge_length, filter_columns, filter_sequence, fir_filter,
    lowpass, lowpass_columns,
};
pub mod constituents;
use constituents::{LOCAL_INERTIAL, check_latitude, local_inertial_speed};
mod constraints;
use constraints::ConstraintSystem;
mod convf64;
pub use convf64::Convf64;
pub mod error;
use error::{Error, Result};
mod kernels;
pub use kernels::{
    Endpoints, PL33_WEIGHTS, ReferenceKernel, THOMPSON_1983_WEIGHTS, lowpass_kernel, pl64_kernel,
    pl66_kernel, resample_kernel,
};
#[cfg(feature = "lapack-backend")]
mod lapack;
#[cfg(feature = "lapack-backend")]
pub use lapack::{IsLapack, ToLapack};
#[cfg(all(
    feature = "python",
    any(
        feature = "faer-backend",
        feature = "lapack-backend",
        feature = "nalgebra-backend"
    )
))]
mod python;
mod response;
pub use response::{Diagnostics, frequency_response, symmetric_response};
mod solver;
#[cfg(any(
    feature = "faer-backend",
    feature = "lapack-backend",
    feature = "nalgebra-backend"
))]
pub use solver::DefaultSolverBackend;
#[cfg(feature = "faer-backend")]
pub use solver::FaerBackend;
#[cfg(feature = "lapack-backend")]
pub use solver::LapackBackend;
#[cfg(feature = "nalgebra-backend")]
pub use solver::NalgebraBackend;
pub use solver::{SolverBackend, SolverFailure};
mod taper;
pub use taper::{TaperedExtension, cosine_taper, taper_and_reflect};
mod types;
pub use types::{
    DesignParameters, ParametersBuilder, ThompsonDesign, ThompsonParameters, ZeroConstraint,
};

/// Thompson (1983) low-pass filter design.
///
/// This function computes the weights of a symmetric FIR low-pass filter
/// following the method of Thompson (1983). The weights minimize the squared
/// departure of the filter response from an ideal response that is one up to
/// the pass band edge, zero above the stop band edge and has a cosine
/// transition in between. They are subject to exact constraints: the response
/// is zero at the speed of each requested tidal constituent (and at the local
/// inertial frequency if a latitude is given), and the second moment of the
/// weights is zero, which makes the response flat at zero frequency.
///
/// The type parameter `T` represents the scalar used in all the computations,
/// except potentially when solving the linear system for the Lagrange
/// multipliers.
///
/// The type parameter `P` represents the type of the design parameters. It
/// needs to implement the [`DesignParameters`] trait. Usually
/// [`ThompsonParameters`] is used.
///
/// This function uses the [`DefaultSolverBackend`] to solve the linear
/// system. The backend that is selected as default backend depends on the
/// feature flags. Use [`thompson_weights_with_backend`] to specify a
/// particular backend.
///
/// # Errors
///
/// The parameters are validated in this order: sample interval
/// ([`Error::InvalidSampleInterval`]), latitude ([`Error::InvalidLatitude`]),
/// constituent names ([`Error::UnknownConstituent`]), band edge periods
/// ([`Error::InvalidPeriod`] and [`Error::BandEdgesWrongOrder`]) and filter
/// length ([`Error::InvalidFilterLength`] and
/// [`Error::TooManyConstraints`]). Combinations of band edges and sample
/// interval for which the least squares target is singular produce an
/// [`Error::DegenerateBand`]. Failures of the linear solver produce an
/// [`Error::SolverError`]. If the normalized weights do not have unit gain at
/// zero frequency or do not vanish at every zero constraint, which happens
/// when a zero lies at or near zero frequency (for instance the local
/// inertial frequency at the equator), an [`Error::ConstraintsNotMet`] is
/// returned.
///
/// Zero constraints at the same speed, such as S2 and the local inertial
/// frequency at the poles, are merged into a single constraint.
///
/// # Examples
///
/// See the [crate-level examples](crate#examples).
#[cfg(any(
    feature = "lapack-backend",
    feature = "faer-backend",
    feature = "nalgebra-backend"
))]
pub fn thompson_weights<T, P>(parameters: &P) -> Result<ThompsonDesign<T>>
where
    T: Float + FloatConst,
    P: DesignParameters<T>,
    DefaultSolverBackend: SolverBackend<T>,
{
    thompson_weights_with_backend(parameters, &DefaultSolverBackend::default())
}

/// Thompson (1983) low-pass filter design with solver backend.
///
/// This function behaves like [`thompson_weights`], but it additionally allows
/// a linear solver backend to be specified. The backend must support the
/// scalar type `T` that is used. See the [`SolverBackend`] trait for more
/// details.
pub fn thompson_weights_with_backend<T, P, B>(
    parameters: &P,
    solver_backend: &B,
) -> Result<ThompsonDesign<T>>
where
    T: Float + FloatConst,
    P: DesignParameters<T>,
    B: SolverBackend<T>,
{
    let dt = parameters.sample_interval();
    if !dt.is_finite() || dt <= T::zero() {
        return Err(Error::InvalidSampleInterval);
    }
    let latitude = parameters.latitude();
    if let Some(latitude) = latitude {
        check_latitude(latitude)?;
    }
    let mut zeros = zero_constraints(parameters.constituents())?;

    let t1 = parameters.pass_band_period();
    let t2 = parameters.stop_band_period();
    for t in [t1, t2] {
        if !t.is_finite() || t <= T::zero() {
            return Err(Error::InvalidPeriod);
        }
    }
    if t1 <= t2 {
        return Err(Error::BandEdgesWrongOrder);
    }
    let num_weights = num_weights(parameters.filter_length(), dt)?;

    if let Some(latitude) = latitude {
        zeros.push(ZeroConstraint {
            name: LOCAL_INERTIAL.to_string(),
            speed: local_inertial_speed(latitude)?,
        });
    }
    zeros.sort_by(|a, b| {
        a.speed
            .partial_cmp(&b.speed)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let zeros = merge_coincident_zeros(zeros);

    let full_turn = T::from(360).unwrap();
    let pass_band_edge = full_turn / t1;
    let stop_band_edge = full_turn / t2;
    let use_dc_constraint = parameters.use_dc_constraint();
    if use_dc_constraint {
        log::warn!(
            "the DC gain constraint (eq. 10) only gives a correct frequency response \
             for a sample interval of 1 hour"
        );
    }
    if let Some(lowest) = zeros.first() {
        if lowest.speed < stop_band_edge {
            log::warn!(
                "zero at {} ({} deg/h) lies below the stop band edge \
                 OM2 = {} deg/h (OM1 = {} deg/h)",
                lowest.name,
                response::as_f64(lowest.speed),
                response::as_f64(stop_band_edge),
                response::as_f64(pass_band_edge)
            );
        }
    }

    let speeds: Vec<T> = zeros.iter().map(|z| z.speed).collect();
    let system = ConstraintSystem::new(
        num_weights,
        dt,
        pass_band_edge,
        stop_band_edge,
        &speeds,
        use_dc_constraint,
    )?;
    let multipliers =
        solver_backend.solve(system.multiplier_matrix(), system.multiplier_rhs())?;
    if multipliers.iter().any(|x| !x.is_finite()) {
        return Err(Error::SolverError(
            "constraint system is singular".to_string(),
        ));
    }
    let mut one_sided_weights = system.weights(&multipliers);

    let two = T::from(2).unwrap();
    let weight_sum = one_sided_weights
        .iter()
        .skip(1)
        .fold(one_sided_weights[0], |acc, &w| acc + two * w);
    if !weight_sum.is_finite() || weight_sum == T::zero() {
        return Err(Error::SolverError(
            "filter weights cannot be normalized".to_string(),
        ));
    }
    for w in one_sided_weights.iter_mut() {
        *w = *w / weight_sum;
    }
    check_constraints(&one_sided_weights, &zeros, dt)?;
    let impulse_response = kernels::normalize(kernels::mirror(&one_sided_weights));

    let design = ThompsonDesign {
        impulse_response,
        one_sided_weights,
        zeros,
        pass_band_edge,
        stop_band_edge,
        sample_interval: dt,
    };
    if parameters.show_info() {
        design.diagnostics().log(&design);
    }
    Ok(design)
}

fn zero_constraints<T: Float>(names: &[String]) -> Result<Vec<ZeroConstraint<T>>> {
    names
        .iter()
        .unique()
        .map(|name| {
            Ok(ZeroConstraint {
                name: name.clone(),
                speed: T::from(constituents::speed(name)?).unwrap(),
            })
        })
        .collect()
}

// Relative difference below which two zero constraints are the same
// constraint row.
const COINCIDENT_SPEEDS: f64 = 1e-9;

// Absolute tolerance on the response of the normalized filter at zero
// frequency and at the zero constraints.
const CONSTRAINT_TOLERANCE: f64 = 1e-8;

/// Merges zero constraints with the same speed, which would make the
/// constraint system singular. The zeros must be sorted by speed. A tabulated
/// constituent is kept in preference to the local inertial frequency.
fn merge_coincident_zeros<T: Float>(zeros: Vec<ZeroConstraint<T>>) -> Vec<ZeroConstraint<T>> {
    let tolerance = T::from(COINCIDENT_SPEEDS).unwrap();
    zeros
        .into_iter()
        .coalesce(|a, b| {
            if (b.speed - a.speed).abs() <= tolerance * b.speed.abs() {
                log::debug!("zero at {} coincides with zero at {}", b.name, a.name);
                Ok(if a.name == LOCAL_INERTIAL { b } else { a })
            } else {
                Err((a, b))
            }
        })
        .collect()
}

/// Checks that the normalized weights have unit gain at zero frequency and
/// vanish at each zero constraint.
fn check_constraints<T: Float + FloatConst>(
    one_sided_weights: &[T],
    zeros: &[ZeroConstraint<T>],
    sample_interval: T,
) -> Result<()> {
    let tolerance = T::epsilon()
        .sqrt()
        .max(T::from(CONSTRAINT_TOLERANCE).unwrap());
    let dc = symmetric_response(one_sided_weights, T::zero(), sample_interval);
    if !((dc - T::one()).abs() <= tolerance) {
        return Err(Error::ConstraintsNotMet {
            at: "zero frequency".to_string(),
            response: response::as_f64(dc),
        });
    }
    for zero in zeros {
        let r = symmetric_response(one_sided_weights, zero.speed, sample_interval);
        if !(r.abs() <= tolerance) {
            return Err(Error::ConstraintsNotMet {
                at: zero.name.clone(),
                response: response::as_f64(r),
            });
        }
    }
    Ok(())
}

fn num_weights<T: Float>(filter_length: T, sample_interval: T) -> Result<usize> {
    (filter_length / sample_interval)
        .round()
        .to_usize()
        .filter(|&n| n >= 1)
        .map(|n| n + 1)
        .ok_or(Error::InvalidFilterLength)
}
