use ndarray::{Array, Array1, Dimension};

/// Conversion to a LAPACK-compatible scalar.
///
/// [`LapackBackend`](crate::LapackBackend) solves the small system for the
/// Lagrange multipliers of the Thompson (1983) design with the LU
/// factorization of LAPACK, called through [`ndarray_linalg`]. LAPACK only
/// handles [`f64`] and [`f32`], so the matrix `A D⁻¹ Aᵗ` and the right-hand
/// side are converted with this trait before the solve, and the multipliers
/// are converted back to the scalar type of the design afterwards.
pub trait ToLapack: Sized + 'static {
    /// The LAPACK-supported type to which the scalar is converted.
    type Lapack: ndarray_linalg::Lapack;

    /// Returns the conversion of `self` to a `Self::Lapack` scalar.
    fn to_lapack(&self) -> Self::Lapack;

    /// Returns the conversion of a `Self::Lapack` scalar to a `Self` scalar.
    fn from_lapack(lapack: &Self::Lapack) -> Self;

    /// Converts the matrix or right-hand side of the multiplier system to
    /// LAPACK scalars.
    ///
    /// The provided implementation converts element by element with
    /// [`ToLapack::to_lapack`].
    fn array_to_lapack<D: Dimension>(array: Array<Self, D>) -> Array<Self::Lapack, D> {
        array.map(|s| s.to_lapack())
    }

    /// Converts the multipliers returned by LAPACK back to `Self` scalars.
    fn multipliers_from_lapack(solution: Array1<Self::Lapack>) -> Vec<Self> {
        solution.iter().map(Self::from_lapack).collect()
    }
}

/// Scalars that LAPACK handles natively.
///
/// For these types [`ToLapack`] is the identity and the multiplier system is
/// passed to LAPACK without copying. A blanket implementation over
/// `ndarray_linalg::Lapack` is not possible, since it would conflict with
/// the conversions for other scalars such as `BigFloat`.
pub trait IsLapack: ndarray_linalg::Lapack {}
impl IsLapack for f64 {}
impl IsLapack for f32 {}

impl<T: IsLapack> ToLapack for T {
    type Lapack = Self;

    fn to_lapack(&self) -> Self::Lapack {
        *self
    }

    fn from_lapack(lapack: &Self::Lapack) -> Self {
        *lapack
    }

    fn array_to_lapack<D: Dimension>(array: Array<Self, D>) -> Array<Self::Lapack, D> {
        array
    }

    fn multipliers_from_lapack(solution: Array1<Self::Lapack>) -> Vec<Self> {
        solution.to_vec()
    }
}

// The multipliers are solved in f64 and the weights are then formed in full
// precision.
#[cfg(feature = "num-bigfloat")]
impl ToLapack for num_bigfloat::BigFloat {
    type Lapack = f64;

    fn to_lapack(&self) -> Self::Lapack {
        self.to_f64()
    }

    fn from_lapack(lapack: &Self::Lapack) -> Self {
        Self::from_f64(*lapack)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn native_scalars() {
        let x = array![1.5f64, -2.0, 0.25];
        let back = f64::multipliers_from_lapack(f64::array_to_lapack(x));
        assert_eq!(back, vec![1.5, -2.0, 0.25]);
    }

    #[cfg(feature = "num-bigfloat")]
    #[test]
    fn bigfloat() {
        use num_bigfloat::BigFloat;
        let x = array![BigFloat::from_f64(0.5), BigFloat::from_f64(-3.0)];
        let lapack = BigFloat::array_to_lapack(x);
        assert_eq!(lapack, array![0.5, -3.0]);
        let back = BigFloat::multipliers_from_lapack(lapack);
        assert_eq!(back[1].to_f64(), -3.0);
    }
}
