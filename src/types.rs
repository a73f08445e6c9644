use crate::constituents::DEFAULT_CONSTITUENTS;
use crate::error::{Error, Result};
use num_traits::Float;

/// Zero constraint of a Thompson filter design.
///
/// The frequency response of the designed filter is forced to be exactly zero
/// at the angular speed of each zero constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroConstraint<T> {
    /// Name of the tidal constituent, or
    /// [`LOCAL_INERTIAL`](crate::constituents::LOCAL_INERTIAL) for the
    /// inertial frequency.
    pub name: String,
    /// Angular speed in degrees per hour.
    pub speed: T,
}

/// Low-pass filter weights produced by the
/// [`thompson_weights`](crate::thompson_weights) function.
///
/// The type parameter `T` corresponds to the scalar type used in the
/// calculations. Typically it implements the [`Float`] trait.
#[derive(Debug, Clone)]
pub struct ThompsonDesign<T> {
    /// Symmetric impulse response of the filter.
    ///
    /// This has `2 * N - 1` taps, where `N` is the number of one-sided
    /// weights, and it is normalized so that its sum is one. It can be
    /// applied to a sequence with
    /// [`filter_sequence`](crate::filter_sequence).
    pub impulse_response: Vec<T>,
    /// One-sided weights.
    ///
    /// Element 0 is the centre tap. The weights are normalized so that
    /// `w[0] + 2 * sum(w[1..])` is one.
    pub one_sided_weights: Vec<T>,
    /// Zero constraints, sorted by increasing angular speed.
    pub zeros: Vec<ZeroConstraint<T>>,
    /// Upper end of the pass band (OM1), in degrees per hour.
    pub pass_band_edge: T,
    /// Lower end of the stop band (OM2), in degrees per hour.
    pub stop_band_edge: T,
    /// Sample interval in hours.
    pub sample_interval: T,
}

/// Thompson (1983) design parameters struct.
///
/// This struct holds the parameters used by
/// [`thompson_weights`](crate::thompson_weights). It is created with
/// [`ThompsonParameters::new`], which only requires the sample interval, and
/// the remaining parameters can be changed with the methods of the
/// [`ParametersBuilder`] trait. The defaults reproduce the "120i913" filter
/// of Thompson (1983): a 120 hour filter with zeros at Q1, O1, K1, N2, M2, L2
/// and S2, a pass band up to a period of 41.379 hours (8.7 degrees/hour) and a
/// stop band starting at a period of 27.907 hours (12.9 degrees/hour).
#[derive(Debug, Clone)]
pub struct ThompsonParameters<T> {
    sample_interval: T,
    constituents: Vec<String>,
    latitude: Option<T>,
    pass_band_period: T,
    stop_band_period: T,
    filter_length: T,
    use_dc_constraint: bool,
    show_info: bool,
}

/// Thompson (1983) design parameters trait.
///
/// This trait defines the methods that
/// [`thompson_weights`](crate::thompson_weights) uses to obtain the
/// parameters of the filter to be designed. It is implemented by
/// [`ThompsonParameters`]. If needed, the user can provide another object
/// implementing this trait.
pub trait DesignParameters<T> {
    /// Returns the sample interval of the data, in hours.
    fn sample_interval(&self) -> T;

    /// Returns the names of the tidal constituents at which the filter
    /// response must be zero.
    ///
    /// The names are treated as a set. Repeated names are ignored.
    fn constituents(&self) -> &[String];

    /// Returns the latitude in degrees (negative south), if any.
    ///
    /// When a latitude is given, the local inertial frequency is added as an
    /// additional zero constraint.
    fn latitude(&self) -> Option<T>;

    /// Returns the period in hours at the upper end of the pass band (T1).
    fn pass_band_period(&self) -> T;

    /// Returns the period in hours at the lower end of the stop band (T2).
    fn stop_band_period(&self) -> T;

    /// Returns the one-sided filter length in hours.
    fn filter_length(&self) -> T;

    /// Returns whether the unit DC gain constraint (equation 10 in Thompson
    /// 1983) is used in addition to the zero curvature constraint.
    ///
    /// This constraint only gives a correct frequency response for a sample
    /// interval of one hour, so its use is discouraged.
    fn use_dc_constraint(&self) -> bool;

    /// Returns whether the filter diagnostics should be logged.
    fn show_info(&self) -> bool;
}

impl<T: Copy> DesignParameters<T> for ThompsonParameters<T> {
    fn sample_interval(&self) -> T {
        self.sample_interval
    }
    fn constituents(&self) -> &[String] {
        &self.constituents
    }
    fn latitude(&self) -> Option<T> {
        self.latitude
    }
    fn pass_band_period(&self) -> T {
        self.pass_band_period
    }
    fn stop_band_period(&self) -> T {
        self.stop_band_period
    }
    fn filter_length(&self) -> T {
        self.filter_length
    }
    fn use_dc_constraint(&self) -> bool {
        self.use_dc_constraint
    }
    fn show_info(&self) -> bool {
        self.show_info
    }
}

/// Thompson (1983) design parameters setter trait.
///
/// This trait is implemented by [`ThompsonParameters`] and allows the default
/// values to be modified by calling the methods defined by the trait. The
/// values are validated when the filter is designed.
pub trait ParametersBuilder<T>: DesignParameters<T> {
    /// Sets the names of the tidal constituents at which the filter response
    /// must be zero.
    fn set_constituents<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>;

    /// Sets the latitude in degrees (negative south).
    ///
    /// Passing `None` removes the local inertial zero constraint.
    fn set_latitude(&mut self, latitude: Option<T>) -> &mut Self;

    /// Sets the periods in hours at the upper end of the pass band (T1) and at
    /// the lower end of the stop band (T2).
    fn set_band_periods(&mut self, pass_band_period: T, stop_band_period: T) -> &mut Self;

    /// Sets the one-sided filter length in hours.
    fn set_filter_length(&mut self, filter_length: T) -> &mut Self;

    /// Sets whether the unit DC gain constraint is used.
    ///
    /// See [`DesignParameters::use_dc_constraint`].
    fn set_dc_constraint(&mut self, use_dc_constraint: bool) -> &mut Self;

    /// Sets whether the filter diagnostics should be logged.
    fn set_show_info(&mut self, show_info: bool) -> &mut Self;
}

impl<T: Float> ThompsonParameters<T> {
    /// Creates new design parameters for a given sample interval in hours.
    ///
    /// The other parameters are given the defaults of the "120i913" filter,
    /// and can be changed using the methods defined by the
    /// [`ParametersBuilder`] trait.
    ///
    /// An [`Error::InvalidSampleInterval`] is returned if the sample interval
    /// is not finite or not positive.
    pub fn new(sample_interval: T) -> Result<Self> {
        if !sample_interval.is_finite() || sample_interval <= T::zero() {
            return Err(Error::InvalidSampleInterval);
        }
        Ok(ThompsonParameters {
            sample_interval,
            constituents: DEFAULT_CONSTITUENTS.iter().map(|&s| s.to_string()).collect(),
            latitude: None,
            pass_band_period: T::from(41.379).unwrap(),
            stop_band_period: T::from(27.907).unwrap(),
            filter_length: T::from(120).unwrap(),
            use_dc_constraint: false,
            show_info: false,
        })
    }
}

impl<T: Copy> ParametersBuilder<T> for ThompsonParameters<T> {
    fn set_constituents<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constituents = names.into_iter().map(Into::into).collect();
        self
    }

    fn set_latitude(&mut self, latitude: Option<T>) -> &mut Self {
        self.latitude = latitude;
        self
    }

    fn set_band_periods(&mut self, pass_band_period: T, stop_band_period: T) -> &mut Self {
        self.pass_band_period = pass_band_period;
        self.stop_band_period = stop_band_period;
        self
    }

    fn set_filter_length(&mut self, filter_length: T) -> &mut Self {
        self.filter_length = filter_length;
        self
    }

    fn set_dc_constraint(&mut self, use_dc_constraint: bool) -> &mut Self {
        self.use_dc_constraint = use_dc_constraint;
        self
    }

    fn set_show_info(&mut self, show_info: bool) -> &mut Self {
        self.show_info = show_info;
        self
    }
}
