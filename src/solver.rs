use crate::error::Error;
use ndarray::{Array1, Array2};

/// Linear solver backend.
///
/// This trait models a backend that solves square linear systems `A x = b`
/// with real scalars of type `T`. It is used by
/// [`thompson_weights_with_backend`](crate::thompson_weights_with_backend) to
/// find the Lagrange multipliers of the constrained least squares problem.
///
/// `tidal-lowpass` includes support for several Rust linear algebra libraries
/// through types that implement this trait. These libraries are optional and
/// selected with features flags. At the moment the following backends are
/// supported:
///
/// - `lapack-backend` feature flag. This defines the `LapackBackend` backend,
///   which uses `ndarray_linalg` to solve the system with LAPACK.
///
/// - `faer-backend` feature flag. This defines the `FaerBackend` backend,
///   which uses the LU decomposition with partial pivoting of `faer`.
///
/// - `nalgebra-backend` feature flag. This defines the `NalgebraBackend`,
///   which uses the LU decomposition of `nalgebra`.
pub trait SolverBackend<T> {
    /// Solves the linear system `matrix * x = rhs` and returns `x`.
    ///
    /// An error is returned if the system cannot be solved. Some backends do
    /// not detect singular systems and return non-finite values instead.
    ///
    /// # Panics
    ///
    /// This function is allowed to panic if `matrix` is not a square matrix or
    /// if its size does not match the length of `rhs`.
    fn solve(&self, matrix: Array2<T>, rhs: Array1<T>) -> Result<Vec<T>>;
}

type Result<T> = std::result::Result<T, SolverFailure>;

/// Linear solver error.
///
/// This struct represents an error obtained by a solver backend while solving
/// a linear system. The error contains a descriptive string of the problem.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SolverFailure(pub String);

impl From<SolverFailure> for Error {
    fn from(value: SolverFailure) -> Error {
        Error::SolverError(value.0)
    }
}

#[cfg(any(
    feature = "lapack-backend",
    feature = "faer-backend",
    feature = "nalgebra-backend"
))]
macro_rules! default_solver_doc {
    () => {
        r#" Default solver backend.

 This defines the default linear solver backend, which depends on what feature
 flags are enabled. The selected default backend is the first available from this priority list:

 - `lapack-backend`
 - `faer-backend`
 - `nalgebra-backend`
"#
    };
}

#[doc = default_solver_doc!()]
#[cfg(feature = "lapack-backend")]
pub type DefaultSolverBackend = LapackBackend;

#[doc = default_solver_doc!()]
#[cfg(all(not(feature = "lapack-backend"), feature = "faer-backend"))]
pub type DefaultSolverBackend = FaerBackend;

#[doc = default_solver_doc!()]
#[cfg(all(
    not(any(feature = "lapack-backend", feature = "faer-backend")),
    feature = "nalgebra-backend"
))]
pub type DefaultSolverBackend = NalgebraBackend;

#[cfg(feature = "lapack-backend")]
pub use lapack::LapackBackend;

#[cfg(feature = "lapack-backend")]
mod lapack {
    use super::*;
    use crate::lapack::ToLapack;
    use ndarray_linalg::{Solve, error::LinalgError};

    /// LAPACK solver backend.
    ///
    /// This is a solver backend that uses [`ndarray_linalg`] to solve linear
    /// systems with LAPACK. For types natively supported by LAPACK, which are
    /// `f64` and `f32`, the calculations are done directly using that
    /// type. For other types, the [`ToLapack`] trait is used to convert the
    /// type `T` into a type (generally `f64`) that can be handled by LAPACK.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct LapackBackend {}

    impl<T: ToLapack> SolverBackend<T> for LapackBackend {
        fn solve(&self, matrix: Array2<T>, rhs: Array1<T>) -> Result<Vec<T>> {
            let matrix = T::array_to_lapack(matrix);
            let rhs = T::array_to_lapack(rhs);
            let x = matrix.solve_into(rhs)?;
            Ok(T::multipliers_from_lapack(x))
        }
    }

    impl From<LinalgError> for SolverFailure {
        fn from(value: LinalgError) -> SolverFailure {
            SolverFailure(value.to_string())
        }
    }
}

#[cfg(feature = "faer-backend")]
pub use faer::FaerBackend;

#[cfg(feature = "faer-backend")]
mod faer {
    use super::*;
    use ::faer::{Mat, linalg::solvers::Solve, traits::RealField};
    use faer_ext::IntoFaer;

    // This is needed because num_bigfloat can be a broken link if the crate is
    // not being built due to selected feature flags.
    #[allow(rustdoc::broken_intra_doc_links)]
    /// faer solver backend.
    ///
    /// This is a solver backend that uses the LU decomposition with partial
    /// pivoting of [`faer`](::faer). For types natively supported by `faer`,
    /// the calculations are done using that type. With
    /// [`num_bigfloat::BigFloat`] the type is converted first to `f64`.
    ///
    /// The decomposition does not report singular matrices. A singular system
    /// gives non-finite values, which are detected by the caller.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct FaerBackend {}

    /// Marker trait used to mark for which types `T` that have the trait
    /// [`RealField`](RealField), the trait `SolverBackend<T>` should be
    /// implemented for `FaerBackend` by doing no scalar type conversion and
    /// using the type `T` natively in [`faer`].
    ///
    /// A marker trait is needed because `RealField` is defined by an upstream
    /// crate. With a blanket implementation
    ///
    /// ```ignore
    /// impl<T: RealField> SolverBackend<T> for FaerBackend { ... }
    /// ```
    ///
    /// it would not be possible to do specialized implementations for types
    /// `T` that do not implement `RealField` (because at any point the
    /// upstream crate could add an implementation of `RealField` for these
    /// types).
    pub trait IsRealField: RealField {}
    impl IsRealField for f64 {}
    impl IsRealField for f32 {}
    impl IsRealField for ::faer::fx128 {}

    fn solve_native<T: IsRealField>(matrix: Array2<T>, rhs: Array1<T>) -> Vec<T> {
        let lu = matrix.view().into_faer().partial_piv_lu();
        let rhs = Mat::from_fn(rhs.len(), 1, |i, _| rhs[i].clone());
        let x = lu.solve(rhs.as_ref());
        (0..x.nrows()).map(|i| x[(i, 0)].clone()).collect()
    }

    impl<T: IsRealField> SolverBackend<T> for FaerBackend {
        fn solve(&self, matrix: Array2<T>, rhs: Array1<T>) -> Result<Vec<T>> {
            Ok(solve_native(matrix, rhs))
        }
    }

    // Stop-gap to use num-bigfloat with faer, by converting back and forth to
    // f64.
    #[cfg(feature = "num-bigfloat")]
    impl SolverBackend<num_bigfloat::BigFloat> for FaerBackend {
        fn solve(
            &self,
            matrix: Array2<num_bigfloat::BigFloat>,
            rhs: Array1<num_bigfloat::BigFloat>,
        ) -> Result<Vec<num_bigfloat::BigFloat>> {
            let x = solve_native(matrix.map(|x| x.to_f64()), rhs.map(|x| x.to_f64()));
            Ok(x.into_iter().map(num_bigfloat::BigFloat::from_f64).collect())
        }
    }
}

#[cfg(feature = "nalgebra-backend")]
pub use nalgebra::NalgebraBackend;

#[cfg(feature = "nalgebra-backend")]
mod nalgebra {
    use super::*;
    use ::nalgebra::{DMatrix, DVector, RealField};

    /// nalgebra solver backend.
    ///
    /// This is a solver backend that uses the LU decomposition of
    /// [`nalgebra`](::nalgebra). For types natively supported by `nalgebra`,
    /// which are only `f32` and `f64`, the calculations are done using that
    /// type. With [`num_bigfloat::BigFloat`] the type is converted first to
    /// `f64`.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct NalgebraBackend {}

    /// Marker trait used to mark for which types `T` that have the trait
    /// [`RealField`](RealField), the trait `SolverBackend<T>` should be
    /// implemented for `NalgebraBackend` by doing no scalar type conversion and
    /// using the type `T` natively in [`nalgebra`].
    ///
    /// See the documentation of the marker trait used by the `faer` backend
    /// for the reason why a marker trait is needed.
    pub trait IsRealField: RealField {}
    impl IsRealField for f64 {}
    impl IsRealField for f32 {}

    fn solve_native<T: IsRealField>(matrix: Array2<T>, rhs: Array1<T>) -> Result<Vec<T>> {
        let matrix = DMatrix::from_row_iterator(matrix.nrows(), matrix.ncols(), matrix);
        let rhs = DVector::from_iterator(rhs.len(), rhs);
        let x = matrix
            .lu()
            .solve(&rhs)
            .ok_or_else(|| SolverFailure("singular matrix".to_string()))?;
        Ok(x.iter().cloned().collect())
    }

    impl<T: IsRealField> SolverBackend<T> for NalgebraBackend {
        fn solve(&self, matrix: Array2<T>, rhs: Array1<T>) -> Result<Vec<T>> {
            solve_native(matrix, rhs)
        }
    }

    #[cfg(feature = "num-bigfloat")]
    impl SolverBackend<num_bigfloat::BigFloat> for NalgebraBackend {
        fn solve(
            &self,
            matrix: Array2<num_bigfloat::BigFloat>,
            rhs: Array1<num_bigfloat::BigFloat>,
        ) -> Result<Vec<num_bigfloat::BigFloat>> {
            let x = solve_native(matrix.map(|x| x.to_f64()), rhs.map(|x| x.to_f64()))?;
            Ok(x.into_iter().map(num_bigfloat::BigFloat::from_f64).collect())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    fn check<B: SolverBackend<f64>>(backend: B) {
        let matrix = array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let rhs = array![1.0, 2.0, 3.0];
        let x = backend.solve(matrix.clone(), rhs.clone()).unwrap();
        let residual = matrix.dot(&Array1::from(x)) - rhs;
        assert!(residual.iter().all(|r| r.abs() < 1e-12));
    }

    #[cfg(feature = "faer-backend")]
    #[test]
    fn faer() {
        check(FaerBackend::default());
    }

    #[cfg(feature = "nalgebra-backend")]
    #[test]
    fn nalgebra() {
        check(NalgebraBackend::default());
        let singular = ndarray::array![[1.0, 2.0], [2.0, 4.0]];
        assert!(
            NalgebraBackend::default()
                .solve(singular, ndarray::array![1.0, 1.0])
                .is_err()
        );
    }

    #[cfg(feature = "lapack-backend")]
    #[test]
    fn lapack() {
        check(LapackBackend::default());
    }
}
