//! The equation template / boundary condition / model triple that the
//! assembler consumes (ported from `model.py`).

use std::rc::Rc;

use fdm_core::{Element, Stencil};
use fdm_geometry::Grid;

/// `(weights, free_value)`: `weights` is expanded at a node address to a
/// `Scheme` (or bare scalar), `free_value` is sampled at the same address
/// to give the equation's right-hand side.
#[derive(Clone)]
pub struct EquationTemplate {
    pub weights: Element,
    free_value: Rc<dyn Fn(f64) -> f64>,
}

impl EquationTemplate {
    pub fn new(weights: Element, free_value: impl Fn(f64) -> f64 + 'static) -> Self {
        Self {
            weights,
            free_value: Rc::new(free_value),
        }
    }

    pub fn free_value_at(&self, address: f64) -> f64 {
        (self.free_value)(address)
    }
}

/// A boundary condition pairs coefficients (interpreted as a `Stencil`
/// already, since BCs never compose with an inner operator) with a free
/// value sampled at the boundary node.
#[derive(Clone)]
pub struct BoundaryCondition {
    pub coefficients: Stencil,
    free_value: Rc<dyn Fn(f64) -> f64>,
}

impl BoundaryCondition {
    /// `u(address) = value`.
    pub fn dirichlet(value: f64) -> Self {
        Self {
            coefficients: Stencil::new([(0.0, 1.0)]),
            free_value: Rc::new(move |_address| value),
        }
    }

    /// A derivative condition over `stencil`, free value fixed at 0.
    pub fn neumann(stencil: Stencil) -> Self {
        Self {
            coefficients: stencil,
            free_value: Rc::new(|_address| 0.0),
        }
    }

    pub fn free_value_at(&self, address: f64) -> f64 {
        (self.free_value)(address)
    }
}

/// `(equation, domain, bcs)`. `bc_no_for_free` mirrors the legacy
/// `--bc-no-for-free` CLI flag: when set, a boundary node's free value
/// comes from the interior equation template instead of the boundary
/// condition itself.
#[derive(Clone)]
pub struct Model {
    pub equation: EquationTemplate,
    pub domain: Grid,
    pub bcs: std::collections::BTreeMap<usize, BoundaryCondition>,
    pub bc_no_for_free: bool,
}

impl Model {
    pub fn new(
        equation: EquationTemplate,
        domain: Grid,
        bcs: std::collections::BTreeMap<usize, BoundaryCondition>,
    ) -> Self {
        Self {
            equation,
            domain,
            bcs,
            bc_no_for_free: false,
        }
    }

    pub fn with_bc_no_for_free(mut self, flag: bool) -> Self {
        self.bc_no_for_free = flag;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirichlet_pins_to_value() {
        let bc = BoundaryCondition::dirichlet(3.0);
        assert_eq!(bc.coefficients.weights().to_vec(), vec![(0.0, 1.0)]);
        assert_eq!(bc.free_value_at(0.0), 3.0);
    }

    #[test]
    fn neumann_keeps_stencil_and_zero_free_value() {
        let stencil = Stencil::backward(1.0);
        let bc = BoundaryCondition::neumann(stencil.clone());
        assert_eq!(bc.coefficients, stencil);
        assert_eq!(bc.free_value_at(5.0), 0.0);
    }
}
