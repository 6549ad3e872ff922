//! Wraps the assembled-and-solved vector so callers can index it by real
//! node address (`0..N-1`) or by a virtual address that was appended
//! during assembly (ported from `system.py::Output`).

use std::collections::HashMap;

use fdm_core::NodalOutput;
use nalgebra::DVector;

pub struct Output {
    full: DVector<f64>,
    real_count: usize,
    address_forwarder: HashMap<i64, usize>,
}

impl Output {
    pub fn new(full: DVector<f64>, real_count: usize, address_forwarder: HashMap<i64, usize>) -> Self {
        Self {
            full,
            real_count,
            address_forwarder,
        }
    }

    /// The real-node slice, in index order.
    pub fn real(&self) -> &[f64] {
        &self.full.as_slice()[..self.real_count]
    }

    pub fn len(&self) -> usize {
        self.real_count
    }

    pub fn is_empty(&self) -> bool {
        self.real_count == 0
    }

    /// Value at `address`: a real index reads straight through, a
    /// virtual one is forwarded to its appended slot.
    pub fn get(&self, address: i64) -> f64 {
        if address >= 0 && (address as usize) < self.real_count {
            self.full[address as usize]
        } else {
            let slot = *self
                .address_forwarder
                .get(&address)
                .unwrap_or_else(|| panic!("address {address} has no virtual slot"));
            self.full[slot]
        }
    }
}

impl NodalOutput for Output {
    fn value_at(&self, index: i64) -> f64 {
        self.get(index)
    }
}
