//! Error types for the operator algebra core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElementError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("cannot add schemes of order {left} and {right}")]
    OrderMismatch { left: f64, right: f64 },

    #[error("operate() was called with an empty scheme or element expansion")]
    EmptyOperand,

    #[error("unsupported arithmetic between element variants: {0}")]
    UnsupportedArithmetic(&'static str),
}
