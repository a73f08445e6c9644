//! Error types used by `tidal_lowpass`.

use thiserror::Error;

/// `tidal_lowpass` `Result` type.
pub type Result<T> = core::result::Result<T, Error>;

/// `tidal_lowpass` error.
///
/// This enum represents all the errors that can be produced when designing
/// filter weights or applying a low-pass filter. All of them are detected
/// before any output is produced, so a failed call never returns a partial
/// kernel or a partially filtered sequence.
#[derive(Error, Debug)]
pub enum Error {
    /// The latitude is not finite or lies outside [-90, 90] degrees.
    #[error("latitude out of bounds")]
    InvalidLatitude,
    /// A requested tidal constituent is not present in the constituent table.
    #[error("unknown tidal constituent {0:?}")]
    UnknownConstituent(String),
    /// The closed-form target response is singular for this combination of
    /// band edges and sample interval.
    ///
    /// This happens when `(index * sample_interval)^2` equals
    /// `180^2 / (OM2 - OM1)^2` for some weight index.
    #[error("band edges cause a zero divide at weight {index} while forming the target response")]
    DegenerateBand {
        /// Index of the one-sided weight at which the singularity occurs.
        index: usize,
    },
    /// The sample interval is not finite or not positive.
    #[error("sample interval must be finite and positive")]
    InvalidSampleInterval,
    /// A period (band edge or half-amplitude period) is not finite or not
    /// positive.
    #[error("period must be finite and positive")]
    InvalidPeriod,
    /// The pass band period is not longer than the stop band period.
    #[error("pass band period must be longer than stop band period")]
    BandEdgesWrongOrder,
    /// The filter length is shorter than one sample interval.
    #[error("filter length must span at least one sample interval")]
    InvalidFilterLength,
    /// There are more constraints than one-sided filter weights.
    #[error("{constraints} constraints cannot be satisfied with {weights} weights")]
    TooManyConstraints {
        /// Number of constraint rows.
        constraints: usize,
        /// Number of one-sided weights.
        weights: usize,
    },
    /// The kernel geometry is incompatible with the requested resampling, or
    /// the kernel is empty.
    #[error("invalid kernel length")]
    InvalidKernelLength,
    /// The sequence is shorter than twice the one-sided kernel length.
    #[error("sequence of length {length} is too short, at least {required} samples are required")]
    SequenceTooShort {
        /// Length of the input sequence.
        length: usize,
        /// Minimum length required by the kernel.
        required: usize,
    },
    /// The linear solver failed to solve the constraint system.
    ///
    /// This error is typically produced by a singular constraint system, for
    /// instance when two zero constraints are placed at the same speed.
    #[error("unable to solve constraint system: {0}")]
    SolverError(String),
    /// The designed filter does not meet its constraints to working
    /// precision.
    ///
    /// The response must be one at zero frequency and zero at each zero
    /// constraint. Both cannot hold when a zero constraint lies at or very
    /// near zero frequency, as the local inertial frequency does close to
    /// the equator.
    #[error("designed response {response:e} at {at} does not meet its constraint")]
    ConstraintsNotMet {
        /// Where the constraint fails: "zero frequency" or the name of the
        /// zero constraint.
        at: String,
        /// Response of the normalized filter at that point.
        response: f64,
    },
}
