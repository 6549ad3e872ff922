//! Equation assembly: per-node equation expansion, virtual-node
//! extraction for stencils reaching past the grid boundary, and the row
//! writers that lay both into a dense system (ported from `system.py`).

use std::collections::{BTreeMap, HashMap};

use fdm_core::Coefficients;
use fdm_model::Model;

use crate::error::{Result, SolverError};

/// One assembled equation: a sparse-by-construction coefficient row plus
/// its right-hand side.
#[derive(Debug, Clone)]
pub struct LinearEquation {
    pub coefficients: Coefficients,
    pub free_value: f64,
}

/// How a stencil reaching past the grid boundary is resolved to a real
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualValueStrategy {
    /// Mirror the out-of-range address about the nearest boundary.
    Symmetry,
    /// Clamp the out-of-range address to the nearest boundary node.
    AsInBorder,
}

impl std::str::FromStr for VirtualValueStrategy {
    type Err = SolverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "symmetry" => Ok(VirtualValueStrategy::Symmetry),
            "as_in_border" => Ok(VirtualValueStrategy::AsInBorder),
            other => Err(SolverError::UnknownStrategy(other.to_string())),
        }
    }
}

/// A phantom unknown outside `[0, N-1]`, tied back to a real node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualNode {
    pub address: i64,
    pub corresponding_address: i64,
}

fn find_corresponding_node(
    address: i64,
    last_node_index: i64,
    strategy: VirtualValueStrategy,
) -> i64 {
    match strategy {
        VirtualValueStrategy::Symmetry => {
            if address < 0 {
                address.abs()
            } else {
                last_node_index - (address - last_node_index)
            }
        }
        VirtualValueStrategy::AsInBorder => {
            if address < 0 {
                0
            } else {
                last_node_index
            }
        }
    }
}

/// Addresses referenced by `equation` that fall outside `[0, N-1]`,
/// paired with the real node they are tied to.
pub fn extract_virtual_nodes(
    equation: &LinearEquation,
    nodes_number: usize,
    strategy: VirtualValueStrategy,
) -> Vec<VirtualNode> {
    let last_node_index = nodes_number as i64 - 1;
    equation
        .coefficients
        .iter()
        .filter_map(|(address, _weight)| {
            if address < 0 || address > last_node_index {
                Some(VirtualNode {
                    address,
                    corresponding_address: find_corresponding_node(address, last_node_index, strategy),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Expand the model's equation (or applicable boundary condition) at
/// every node address, in index order (ported from `model_to_equations`).
pub fn model_to_equations(model: &Model) -> Result<Vec<LinearEquation>> {
    model
        .domain
        .nodes
        .iter()
        .enumerate()
        .map(|(i, _node)| {
            let address = i as f64;
            if let Some(bc) = model.bcs.get(&i) {
                let free_value = if model.bc_no_for_free {
                    model.equation.free_value_at(address)
                } else {
                    bc.free_value_at(address)
                };
                let coefficients = bc.coefficients.expand(address).to_coefficients(1.0);
                Ok(LinearEquation { coefficients, free_value })
            } else {
                let connections = model.domain.get_connections(i);
                let lengths: Vec<f64> = connections.iter().map(|c| c.length()).collect();
                let delta = fdm_core::Delta::from_connections(&lengths);
                let expanded = model.equation.weights.expand(address)?;
                let scheme = expanded.into_scheme(address);
                let coefficients = scheme.to_coefficients(delta.value());
                let free_value = model.equation.free_value_at(address);
                Ok(LinearEquation { coefficients, free_value })
            }
        })
        .collect()
}

/// Writes one equation's coefficients into a dense row, renumbering
/// out-of-range addresses into their appended virtual slots.
pub struct EquationWriter<'a> {
    equation: &'a LinearEquation,
    renumerator: &'a HashMap<i64, usize>,
}

impl<'a> EquationWriter<'a> {
    pub fn new(equation: &'a LinearEquation, renumerator: &'a HashMap<i64, usize>) -> Self {
        Self { equation, renumerator }
    }

    pub fn write_row(&self, row: &mut [f64]) {
        for (address, coefficient) in self.equation.coefficients.iter() {
            let column = self.renumerator.get(&address).copied().unwrap_or(address as usize);
            row[column] = coefficient;
        }
    }

    pub fn free_value(&self) -> f64 {
        self.equation.free_value
    }
}

/// Writes the constraint row for one virtual node: `x_virtual -
/// x_corresponding = 0`.
pub struct VirtualNodeWriter {
    pub virtual_node: VirtualNode,
    pub virtual_column: usize,
}

impl VirtualNodeWriter {
    pub fn write_row(&self, row: &mut [f64]) {
        row[self.virtual_column] = 1.0;
        row[self.virtual_node.corresponding_address as usize] = -1.0;
    }

    pub fn free_value(&self) -> f64 {
        0.0
    }
}

/// Assembled dense system plus enough bookkeeping to build an `Output`.
pub struct AssembledSystem {
    pub a: nalgebra::DMatrix<f64>,
    pub b: nalgebra::DVector<f64>,
    pub real_count: usize,
    pub address_forwarder: HashMap<i64, usize>,
}

/// Build the dense `(R+V) x (R+V)` system from a model, extracting
/// virtual nodes for every equation whose stencil reaches past the grid.
pub fn assemble(model: &Model, strategy: VirtualValueStrategy) -> Result<AssembledSystem> {
    let equations = model_to_equations(model)?;
    let real_count = equations.len();

    let mut virtual_nodes = Vec::new();
    for equation in &equations {
        virtual_nodes.extend(extract_virtual_nodes(equation, real_count, strategy));
    }

    // Stable de-duplication: a virtual address referenced by more than one
    // row must still get exactly one appended slot.
    let mut seen = BTreeMap::new();
    let mut unique_virtual_nodes = Vec::new();
    for vn in virtual_nodes {
        seen.entry(vn.address).or_insert_with(|| {
            unique_virtual_nodes.push(vn);
            unique_virtual_nodes.len() - 1
        });
    }

    let address_forwarder: HashMap<i64, usize> = unique_virtual_nodes
        .iter()
        .enumerate()
        .map(|(i, vn)| (vn.address, real_count + i))
        .collect();

    let size = real_count + unique_virtual_nodes.len();
    let mut a = nalgebra::DMatrix::zeros(size, size);
    let mut b = nalgebra::DVector::zeros(size);

    for (i, equation) in equations.iter().enumerate() {
        let writer = EquationWriter::new(equation, &address_forwarder);
        let mut row = vec![0.0; size];
        writer.write_row(&mut row);
        a.set_row(i, &nalgebra::RowDVector::from_vec(row));
        b[i] = writer.free_value();
    }

    for (i, vn) in unique_virtual_nodes.iter().enumerate() {
        let writer = VirtualNodeWriter {
            virtual_node: *vn,
            virtual_column: real_count + i,
        };
        let mut row = vec![0.0; size];
        writer.write_row(&mut row);
        a.set_row(real_count + i, &nalgebra::RowDVector::from_vec(row));
        b[real_count + i] = writer.free_value();
    }

    Ok(AssembledSystem {
        a,
        b,
        real_count,
        address_forwarder,
    })
}
