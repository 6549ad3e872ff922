//! Weighted node-address maps carrying a differential order (spec §3/§4.A).

use std::collections::BTreeMap;

use crate::error::{ElementError, Result};

/// Addresses within this distance of each other are treated as the same
/// node (design note: "quantize to a grid of 1e-4" to absorb floating
/// point drift in composed addresses).
pub const NODE_TOLERANCE: f64 = 1e-4;

fn quantize(address: f64) -> i64 {
    (address / NODE_TOLERANCE).round() as i64
}

/// A weighted map from (real-valued) node address to weight, with an
/// associated differential order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheme {
    // keyed by quantized address to absorb float drift; value keeps the
    // un-quantized address so shifts/redistribution stay precise.
    weights: BTreeMap<i64, (f64, f64)>,
    order: f64,
}

impl Scheme {
    pub fn new<I: IntoIterator<Item = (f64, f64)>>(weights: I, order: f64) -> Self {
        let mut map = BTreeMap::new();
        for (address, weight) in weights {
            let key = quantize(address);
            let entry = map.entry(key).or_insert((address, 0.0));
            entry.1 += weight;
        }
        Self { weights: map, order }
    }

    pub fn from_number(address: f64, value: f64) -> Self {
        Self::new([(address, value)], 0.0)
    }

    pub fn empty(order: f64) -> Self {
        Self {
            weights: BTreeMap::new(),
            order,
        }
    }

    pub fn order(&self) -> f64 {
        self.order
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.weights.values().copied()
    }

    /// `S1 + S2`: fails unless both carry the same order; colliding
    /// addresses (within tolerance) sum their weights.
    pub fn add(&self, other: &Scheme) -> Result<Scheme> {
        if self.order != other.order {
            return Err(ElementError::OrderMismatch {
                left: self.order,
                right: other.order,
            });
        }
        let mut merged = self.weights.clone();
        for (key, (address, weight)) in &other.weights {
            let entry = merged.entry(*key).or_insert((*address, 0.0));
            entry.1 += weight;
        }
        Ok(Scheme {
            weights: merged,
            order: self.order,
        })
    }

    /// `S + c`: defined as `shift(c)` (spec §3).
    pub fn add_scalar(&self, value: f64) -> Scheme {
        self.shift(value)
    }

    /// `S * scalar`: scales every weight, order unchanged.
    pub fn mul(&self, scalar: f64) -> Scheme {
        let weights = self
            .weights
            .values()
            .map(|(address, weight)| (*address, weight * scalar));
        Scheme::new(weights, self.order)
    }

    /// Translate every address key by `delta`; order unchanged.
    pub fn shift(&self, delta: f64) -> Scheme {
        let weights = self
            .weights
            .values()
            .map(|(address, weight)| (*address + delta, *weight));
        Scheme::new(weights, self.order)
    }

    /// Divide by `delta^order` and redistribute non-integer addresses
    /// onto their two surrounding integers (spec §3/§4.A).
    pub fn to_coefficients(&self, delta: f64) -> Coefficients {
        let scale = if self.order == 0.0 {
            1.0
        } else {
            delta.powf(self.order)
        };

        let mut coefficients: BTreeMap<i64, f64> = BTreeMap::new();
        for (address, weight) in self.iter() {
            let value = weight / scale;
            // `%` on f64 mirrors C's fmod: the result keeps the sign of `address`.
            let modulo = address % 1.0;
            let abs_modulo = modulo.abs();

            if abs_modulo > NODE_TOLERANCE {
                let (floor_weight, ceil_weight) = if modulo > 0.0 {
                    (1.0 - abs_modulo, abs_modulo)
                } else {
                    (abs_modulo, 1.0 - abs_modulo)
                };
                let floor_index = address.floor() as i64;
                let ceil_index = address.ceil() as i64;
                *coefficients.entry(floor_index).or_insert(0.0) += floor_weight * value;
                *coefficients.entry(ceil_index).or_insert(0.0) += ceil_weight * value;
            } else {
                *coefficients.entry(address.round() as i64).or_insert(0.0) += value;
            }
        }

        Coefficients(coefficients)
    }
}

/// An integer-indexed weight map produced by `Scheme::to_coefficients`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Coefficients(BTreeMap<i64, f64>);

impl Coefficients {
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn get(&self, index: i64) -> f64 {
        self.0.get(&index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot product of these coefficients against an indexable nodal output.
    pub fn to_value<O: NodalOutput>(&self, output: &O) -> f64 {
        self.0
            .iter()
            .map(|(index, weight)| weight * output.value_at(*index))
            .sum()
    }
}

/// Anything that can be indexed by an (possibly out-of-grid) integer
/// address; implemented by the assembler's `Output` type.
pub trait NodalOutput {
    fn value_at(&self, index: i64) -> f64;
}
