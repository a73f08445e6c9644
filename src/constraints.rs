use crate::error::{Error, Result};
use ndarray::{Array1, Array2};
use num_traits::{Float, FloatConst};

/// Constrained least squares problem of Thompson (1983).
///
/// The one-sided weights `w` minimize the squared departure of the filter
/// response from an ideal response with a cosine transition between OM1 and
/// OM2, subject to `A w = B`. The least squares target is `S` and the metric
/// is the diagonal matrix `D`, whose inverse is 1 at index 0 and 1/2
/// elsewhere.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintSystem<T> {
    a: Array2<T>,
    b: Array1<T>,
    s: Array1<T>,
}

impl<T: Float + FloatConst> ConstraintSystem<T> {
    /// Builds the constraint system.
    ///
    /// The rows of `A` are the zero curvature constraint (equation 21), the
    /// optional unit DC gain constraint (equation 10) and one zero response
    /// constraint (equation 13) for each speed in `zeros`.
    pub fn new(
        num_weights: usize,
        sample_interval: T,
        pass_band_edge: T,
        stop_band_edge: T,
        zeros: &[T],
        use_dc_constraint: bool,
    ) -> Result<ConstraintSystem<T>> {
        let first_zero_row = if use_dc_constraint { 2 } else { 1 };
        let num_constraints = first_zero_row + zeros.len();
        if num_constraints > num_weights {
            return Err(Error::TooManyConstraints {
                constraints: num_constraints,
                weights: num_weights,
            });
        }
        let s = target_response(num_weights, sample_interval, pass_band_edge, stop_band_edge)?;

        let two = T::from(2).unwrap();
        let deg = T::PI() / T::from(180).unwrap();
        let mut a = Array2::zeros((num_constraints, num_weights));
        for (i, x) in a.row_mut(0).iter_mut().enumerate() {
            let k = T::from(i + 1).unwrap();
            *x = k * k;
        }
        let mut b = Array1::zeros(num_constraints);
        if use_dc_constraint {
            a.row_mut(1).fill(two);
            a[(1, 0)] = T::one();
            b[1] = T::one();
        }
        for (&speed, mut row) in zeros
            .iter()
            .zip(a.rows_mut().into_iter().skip(first_zero_row))
        {
            let step = speed * sample_interval * deg;
            row[0] = T::one();
            for (i, x) in row.iter_mut().enumerate().skip(1) {
                *x = two * (T::from(i).unwrap() * step).cos();
            }
        }

        Ok(ConstraintSystem { a, b, s })
    }

    pub fn num_constraints(&self) -> usize {
        self.a.nrows()
    }

    pub fn num_weights(&self) -> usize {
        self.a.ncols()
    }

    fn d_inv(i: usize) -> T {
        if i == 0 {
            T::one()
        } else {
            T::from(0.5).unwrap()
        }
    }

    /// Returns the matrix `A D^-1 A^t` of the system for the Lagrange
    /// multipliers.
    pub fn multiplier_matrix(&self) -> Array2<T> {
        let m = self.num_constraints();
        Array2::from_shape_fn((m, m), |(r, c)| {
            self.a
                .row(r)
                .iter()
                .zip(self.a.row(c).iter())
                .enumerate()
                .fold(T::zero(), |acc, (i, (&x, &y))| acc + x * Self::d_inv(i) * y)
        })
    }

    /// Returns the right hand side `B - A D^-1 S` of the system for the
    /// Lagrange multipliers.
    pub fn multiplier_rhs(&self) -> Array1<T> {
        Array1::from_shape_fn(self.num_constraints(), |r| {
            let ads = self
                .a
                .row(r)
                .iter()
                .zip(self.s.iter())
                .enumerate()
                .fold(T::zero(), |acc, (i, (&x, &s))| acc + x * Self::d_inv(i) * s);
            self.b[r] - ads
        })
    }

    /// Returns the weights `D^-1 (S + A^t lambda)` for the Lagrange
    /// multipliers `lambda`.
    pub fn weights(&self, multipliers: &[T]) -> Vec<T> {
        assert_eq!(multipliers.len(), self.num_constraints());
        (0..self.num_weights())
            .map(|i| {
                let atl = self
                    .a
                    .column(i)
                    .iter()
                    .zip(multipliers.iter())
                    .fold(T::zero(), |acc, (&x, &l)| acc + x * l);
                Self::d_inv(i) * (self.s[i] + atl)
            })
            .collect()
    }
}

/// Least squares target for the one-sided weights.
///
/// This is the closed-form integral of the ideal response, which is one up
/// to `pass_band_edge`, zero above `stop_band_edge` and has a cosine
/// transition in between.
fn target_response<T: Float + FloatConst>(
    num_weights: usize,
    sample_interval: T,
    pass_band_edge: T,
    stop_band_edge: T,
) -> Result<Array1<T>> {
    let half_turn = T::from(180).unwrap();
    let deg = T::PI() / half_turn;
    let width = stop_band_edge - pass_band_edge;
    let romsq = half_turn * half_turn / (width * width);
    let tol = T::from(8).unwrap() * T::epsilon() * romsq;
    let mut s = Array1::zeros(num_weights);
    s[0] = pass_band_edge / half_turn + width / T::from(360).unwrap();
    for i in 1..num_weights {
        let a = T::from(i).unwrap() * sample_interval;
        let jsq = a * a;
        if (jsq - romsq).abs() <= tol {
            return Err(Error::DegenerateBand { index: i });
        }
        let sine = (pass_band_edge * a * deg).sin() + (stop_band_edge * a * deg).sin();
        s[i] = (sine / a - a * sine / (jsq - romsq)) / T::PI();
    }
    Ok(s)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rows() {
        let sys = ConstraintSystem::new(5, 1.0, 8.7, 12.9, &[15.0, 30.0], true).unwrap();
        assert_eq!(sys.num_constraints(), 4);
        assert_eq!(sys.num_weights(), 5);
        assert_eq!(sys.a.row(0).to_vec(), vec![1.0, 4.0, 9.0, 16.0, 25.0]);
        assert_eq!(sys.a.row(1).to_vec(), vec![1.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(sys.b.to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
        // 30 deg/h sampled every hour: cos(k * 30 deg)
        let row = sys.a.row(3);
        assert_eq!(row[0], 1.0);
        assert!((row[2] - 1.0).abs() < 1e-12);
        assert!(row[3].abs() < 1e-12);
        assert!((row[4] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn target() {
        let s = target_response(3, 1.0, 8.7, 12.9).unwrap();
        assert!((s[0] - (8.7 / 180.0 + 4.2 / 360.0)).abs() < 1e-15);
        let romsq = 180.0f64 * 180.0 / (4.2 * 4.2);
        let sine = 8.7f64.to_radians().sin() + 12.9f64.to_radians().sin();
        let expected = (sine - sine / (1.0 - romsq)) / std::f64::consts::PI;
        assert!((s[1] - expected).abs() < 1e-15);
    }

    #[test]
    fn degenerate_band() {
        // (30 * 1)^2 == 180^2 / (12 - 6)^2
        match target_response(121, 1.0, 6.0, 12.0) {
            Err(Error::DegenerateBand { index }) => assert_eq!(index, 30),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn too_many_constraints() {
        let zeros = [13.0, 14.0, 15.0];
        match ConstraintSystem::new(3, 1.0, 8.7, 12.9, &zeros, false) {
            Err(Error::TooManyConstraints {
                constraints,
                weights,
            }) => {
                assert_eq!(constraints, 4);
                assert_eq!(weights, 3);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn multipliers_satisfy_constraints() {
        let sys = ConstraintSystem::new(4, 1.0, 8.7, 12.9, &[30.0], false).unwrap();
        let m = sys.multiplier_matrix();
        let rhs = sys.multiplier_rhs();
        // 2x2 system solved by Cramer's rule
        let det = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)];
        let l0 = (rhs[0] * m[(1, 1)] - m[(0, 1)] * rhs[1]) / det;
        let l1 = (m[(0, 0)] * rhs[1] - m[(1, 0)] * rhs[0]) / det;
        let w = sys.weights(&[l0, l1]);
        for (row, &b) in sys.a.rows().into_iter().zip(sys.b.iter()) {
            let aw: f64 = row.iter().zip(w.iter()).map(|(x, y)| x * y).sum();
            assert!((aw - b).abs() < 1e-9, "{aw} != {b}");
        }
    }
}
