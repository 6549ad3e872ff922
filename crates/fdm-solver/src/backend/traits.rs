//! Backend trait definitions for the dense linear-algebra solvers.
//!
//! Unlike a FEM assembler, this crate always produces small dense
//! systems, so the interchange format between assembly and backend is a
//! plain `DMatrix`/`DVector` pair rather than COO triplets.

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct BackendError(pub String);

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BackendError {}

impl From<&str> for BackendError {
    fn from(s: &str) -> Self {
        BackendError(s.to_string())
    }
}

impl From<String> for BackendError {
    fn from(s: String) -> Self {
        BackendError(s)
    }
}

/// Solves `A x = b`.
pub trait LinearSolver {
    fn solve_linear(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, BackendError>;
}

/// Solves `M = A * mass^-1` and returns its first eigenvector (the
/// operation is frozen to match source behavior — see the Open Question
/// in the assembly module).
pub trait EigenSolver {
    fn solve_eigen(&self, a: &DMatrix<f64>, mass_diag: &DVector<f64>) -> Result<DVector<f64>, BackendError>;
}

pub trait SolverBackend: LinearSolver + EigenSolver {
    fn name(&self) -> &str;
}
