//! The operator algebra core: `Scheme`/`Coefficients` weighted-address
//! maps, the lazy `Element` expression tree and its `operate` expansion,
//! and `NodeFunction` for sampling assembled solutions at virtual
//! addresses.

mod element;
mod error;
mod node_function;
mod scheme;

pub use element::{operate, Element, ElementValue, NumberValue, Op, Stencil};
pub use error::{ElementError, Result};
pub use node_function::{linear_interpolator, Interpolator, NodeFunction};
pub use scheme::{Coefficients, NodalOutput, Scheme, NODE_TOLERANCE};

/// Grid spacing between consecutive integer node addresses. Kept as a
/// named type (rather than a bare `f64` parameter) since it flows through
/// the whole assembly pipeline from `Grid1DBuilder` down to
/// `Scheme::to_coefficients`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta(pub f64);

impl Delta {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Arithmetic mean of a node's connection lengths (1 on a boundary, 2
    /// everywhere else). Takes plain lengths rather than vectors since
    /// `fdm-core` doesn't depend on the geometry crate that produces them.
    pub fn from_connections(lengths: &[f64]) -> Delta {
        Delta(lengths.iter().sum::<f64>() / lengths.len() as f64)
    }
}

impl From<f64> for Delta {
    fn from(value: f64) -> Self {
        Delta(value)
    }
}
