/// Conversion between a scalar type and [`f64`].
///
/// The conversions are allowed to be lossy. The trait is used to hand
/// parameters given as `f64` to designs computed with another scalar type,
/// such as [`num_bigfloat::BigFloat`], and to convert the resulting
/// [`ThompsonDesign`](crate::ThompsonDesign) back to `f64`.
// num_bigfloat is a broken link when the num-bigfloat feature is disabled.
#[allow(rustdoc::broken_intra_doc_links)]
pub trait Convf64 {
    /// Converts self to an `f64`, possibly in a lossy way.
    fn to_f64(&self) -> f64;

    /// Converts an `f64` to the type `Self`, possibly in a lossy way.
    fn from_f64(x: f64) -> Self;
}

impl Convf64 for f32 {
    fn to_f64(&self) -> f64 {
        (*self).into()
    }

    fn from_f64(x: f64) -> f32 {
        x as f32
    }
}

impl Convf64 for f64 {
    fn to_f64(&self) -> f64 {
        *self
    }

    fn from_f64(x: f64) -> f64 {
        x
    }
}

#[cfg(feature = "num-bigfloat")]
impl Convf64 for num_bigfloat::BigFloat {
    fn to_f64(&self) -> f64 {
        self.to_f64()
    }

    fn from_f64(x: f64) -> Self {
        x.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        assert_eq!(Convf64::to_f64(&0.25f32), 0.25);
        assert_eq!(<f32 as Convf64>::from_f64(0.1), 0.1f32);
        assert_eq!(<f64 as Convf64>::from_f64(-3.5).to_f64(), -3.5);
    }
}
