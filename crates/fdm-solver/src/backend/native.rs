//! Native backend using nalgebra and nalgebra-lapack.
//!
//! Dense LU for linear systems; a general (non-symmetric) real eigenvalue
//! decomposition for the `A * mass^-1` operator, since that product is not
//! generally symmetric even when `A` is.

use nalgebra::DMatrix;
use nalgebra_lapack::Eigen;

use super::traits::{BackendError, EigenSolver, LinearSolver};

pub struct NativeBackend;

/// Zero mass-diagonal entries only occur on boundary rows whose equation
/// already pins the DOF; treat their reciprocal as 0 rather than letting
/// them blow up the product matrix with `inf`.
const MASS_ZERO_TOLERANCE: f64 = 1e-12;

impl LinearSolver for NativeBackend {
    fn solve_linear(
        &self,
        a: &nalgebra::DMatrix<f64>,
        b: &nalgebra::DVector<f64>,
    ) -> Result<nalgebra::DVector<f64>, BackendError> {
        a.clone()
            .lu()
            .solve(b)
            .ok_or_else(|| BackendError("singular matrix in LU decomposition".into()))
    }
}

impl EigenSolver for NativeBackend {
    fn solve_eigen(
        &self,
        a: &DMatrix<f64>,
        mass_diag: &nalgebra::DVector<f64>,
    ) -> Result<nalgebra::DVector<f64>, BackendError> {
        let n = a.nrows();
        let mut mass_inv = DMatrix::zeros(n, n);
        for i in 0..n {
            let m = mass_diag[i];
            mass_inv[(i, i)] = if m.abs() < MASS_ZERO_TOLERANCE { 0.0 } else { 1.0 / m };
        }

        let m = a * &mass_inv;

        let eigen = Eigen::new(m, false, true)
            .ok_or_else(|| BackendError("eigenvalue decomposition did not converge".into()))?;
        let eigenvectors = eigen
            .eigenvectors
            .ok_or_else(|| BackendError("backend did not return eigenvectors".into()))?;

        Ok(eigenvectors.column(0).into_owned())
    }
}

impl super::traits::SolverBackend for NativeBackend {
    fn name(&self) -> &str {
        "native-nalgebra"
    }
}
