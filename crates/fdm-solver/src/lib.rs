//! Equation assembly plus the linear/eigenproblem solver dispatch that
//! sits on top of it.

pub mod assembly;
pub mod backend;
mod error;
mod output;

pub use assembly::{
    assemble, extract_virtual_nodes, model_to_equations, AssembledSystem, EquationWriter,
    LinearEquation, VirtualNode, VirtualNodeWriter, VirtualValueStrategy,
};
pub use error::{Result, SolverError};
pub use output::Output;

use backend::native::NativeBackend;
use backend::traits::{EigenSolver, LinearSolver};
use fdm_model::Model;

/// `solve(kind, model)`: `kind` is `"linear_system_of_equations"` or
/// `"eigenproblem"`. Uses the `SYMMETRY` virtual-value strategy, matching
/// the source's default.
pub fn solve(kind: &str, model: &Model) -> Result<Output> {
    solve_with_strategy(kind, model, VirtualValueStrategy::Symmetry)
}

pub fn solve_with_strategy(kind: &str, model: &Model, strategy: VirtualValueStrategy) -> Result<Output> {
    let system = assembly::assemble(model, strategy)?;
    let backend = NativeBackend;

    let x = match kind {
        "linear_system_of_equations" => backend.solve_linear(&system.a, &system.b)?,
        "eigenproblem" => backend.solve_eigen(&system.a, &system.b)?,
        other => return Err(SolverError::UnknownStrategy(format!("solver kind {other:?}"))),
    };

    Ok(Output::new(x, system.real_count, system.address_forwarder))
}
