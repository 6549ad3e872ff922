//! The lazy operator expression tree (spec §3/§4.B) and its expansion
//! engine (§4.C).

use std::rc::Rc;

use crate::error::{ElementError, Result};
use crate::scheme::Scheme;

/// A local weighted kernel anchored at offsets relative to a node address.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    weights: Vec<(f64, f64)>,
    axis: i32,
    order: f64,
}

impl Stencil {
    pub fn new<I: IntoIterator<Item = (f64, f64)>>(weights: I) -> Self {
        Self {
            weights: weights.into_iter().collect(),
            axis: 1,
            order: 1.0,
        }
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn with_axis(mut self, axis: i32) -> Self {
        self.axis = axis;
        self
    }

    pub fn order(&self) -> f64 {
        self.order
    }

    pub fn axis(&self) -> i32 {
        self.axis
    }

    pub fn weights(&self) -> &[(f64, f64)] {
        &self.weights
    }

    pub fn forward(span: f64) -> Self {
        Self::by_addresses(0.0, span)
    }

    pub fn backward(span: f64) -> Self {
        Self::by_addresses(-span, 0.0)
    }

    pub fn central(span: f64) -> Self {
        Self::by_addresses(-span / 2.0, span / 2.0)
    }

    pub fn by_addresses(address_1: f64, address_2: f64) -> Self {
        let range = address_2 - address_1;
        let weight = 1.0 / range;
        Self::new([(address_1, -weight), (address_2, weight)])
    }

    /// Build a stencil over `resolution + 1` uniformly spaced points
    /// spanning `[-left_range, right_range]`, weighted by `weights_provider(i,
    /// address)`.
    pub fn uniform<F>(left_range: f64, right_range: f64, resolution: usize, weights_provider: F) -> Self
    where
        F: Fn(usize, f64) -> f64,
    {
        let span = right_range + left_range;
        let delta = span / resolution as f64;
        let weights = (0..=resolution).map(|i| {
            let address = -left_range + i as f64 * delta;
            (address, weights_provider(i, address))
        });
        Self::new(weights)
    }

    /// Anchor this stencil at `address`, producing a `Scheme`.
    pub fn expand(&self, address: f64) -> Scheme {
        Scheme::new(self.weights.iter().copied(), self.order).shift(address)
    }
}

/// `Number` carries either a constant or a function of node address
/// (REDESIGN FLAG in spec §9: an explicit sum type, not a dynamically
/// typed callable-or-value).
#[derive(Clone)]
pub enum NumberValue {
    Constant(f64),
    PointFunction(Rc<dyn Fn(f64) -> f64>),
}

impl std::fmt::Debug for NumberValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberValue::Constant(v) => write!(f, "Constant({v})"),
            NumberValue::PointFunction(_) => write!(f, "PointFunction(..)"),
        }
    }
}

impl NumberValue {
    pub fn eval(&self, address: f64) -> f64 {
        match self {
            NumberValue::Constant(v) => *v,
            NumberValue::PointFunction(f) => f(address),
        }
    }
}

impl From<f64> for NumberValue {
    fn from(value: f64) -> Self {
        NumberValue::Constant(value)
    }
}

/// The four arithmetic combinators available to `LazyOperation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// Result of expanding an `Element` at a node address: either it reduced
/// all the way to a scalar (a bare `Number`), or it produced a `Scheme`.
#[derive(Debug, Clone)]
pub enum ElementValue {
    Scalar(f64),
    Scheme(Scheme),
}

impl ElementValue {
    pub fn into_scheme(self, anchor_address: f64) -> Scheme {
        match self {
            ElementValue::Scheme(s) => s,
            ElementValue::Scalar(v) => Scheme::from_number(anchor_address, v),
        }
    }

    fn apply(op: Op, left: ElementValue, right: ElementValue) -> Result<ElementValue> {
        use ElementValue::*;
        match (op, left, right) {
            (Op::Add, Scalar(a), Scalar(b)) => Ok(Scalar(a + b)),
            (Op::Add, Scheme(s), Scalar(c)) | (Op::Add, Scalar(c), Scheme(s)) => {
                Ok(Scheme(s.add_scalar(c)))
            }
            (Op::Add, Scheme(a), Scheme(b)) => Ok(Scheme(a.add(&b)?)),

            (Op::Sub, Scalar(a), Scalar(b)) => Ok(Scalar(a - b)),
            (Op::Sub, Scheme(s), Scalar(c)) => Ok(Scheme(s.add_scalar(-c))),
            (Op::Sub, Scalar(c), Scheme(s)) => Ok(Scheme(s.mul(-1.0).add_scalar(c))),
            (Op::Sub, Scheme(a), Scheme(b)) => Ok(Scheme(a.add(&b.mul(-1.0))?)),

            (Op::Mul, Scalar(a), Scalar(b)) => Ok(Scalar(a * b)),
            (Op::Mul, Scheme(s), Scalar(c)) | (Op::Mul, Scalar(c), Scheme(s)) => {
                Ok(Scheme(s.mul(c)))
            }
            (Op::Mul, Scheme(_), Scheme(_)) => {
                Err(ElementError::UnsupportedArithmetic("scheme * scheme"))
            }

            (Op::Div, Scalar(a), Scalar(b)) => Ok(Scalar(a / b)),
            (Op::Div, Scheme(s), Scalar(c)) => Ok(Scheme(s.mul(1.0 / c))),
            (Op::Div, Scalar(_), Scheme(_)) => {
                Err(ElementError::UnsupportedArithmetic("scalar / scheme"))
            }
            (Op::Div, Scheme(_), Scheme(_)) => {
                Err(ElementError::UnsupportedArithmetic("scheme / scheme"))
            }
        }
    }
}

/// The sum type over the four leaf/combinator shapes described in spec §3.
#[derive(Debug, Clone)]
pub enum Element {
    Stencil(Stencil),
    Number(NumberValue),
    Operator(Stencil, Option<Box<Element>>),
    Lazy(Op, Box<Element>, Box<Element>),
}

impl Element {
    pub fn number(value: f64) -> Self {
        Element::Number(NumberValue::Constant(value))
    }

    pub fn point_function<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Element::Number(NumberValue::PointFunction(Rc::new(f)))
    }

    pub fn operator(stencil: Stencil, inner: Option<Element>) -> Self {
        Element::Operator(stencil, inner.map(Box::new))
    }

    pub fn add(self, other: Element) -> Self {
        Element::Lazy(Op::Add, Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: Element) -> Self {
        Element::Lazy(Op::Sub, Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: Element) -> Self {
        Element::Lazy(Op::Mul, Box::new(self), Box::new(other))
    }

    pub fn div(self, other: Element) -> Self {
        Element::Lazy(Op::Div, Box::new(self), Box::new(other))
    }

    /// Expand this element at `address`, producing either a scalar or a
    /// `Scheme` (spec §4.B).
    pub fn expand(&self, address: f64) -> Result<ElementValue> {
        match self {
            Element::Stencil(stencil) => Ok(ElementValue::Scheme(stencil.expand(address))),
            Element::Number(value) => Ok(ElementValue::Scalar(value.eval(address))),
            Element::Operator(stencil, inner) => {
                let scheme = stencil.expand(address);
                let result = operate(&scheme, inner.as_deref())?;
                Ok(ElementValue::Scheme(result))
            }
            Element::Lazy(op, left, right) => {
                let left = left.expand(address)?;
                let right = right.expand(address)?;
                ElementValue::apply(*op, left, right)
            }
        }
    }
}

/// Revolve `scheme` by substituting each weighted address with `element`'s
/// expansion at that address (spec §4.B/§4.C).
pub fn operate(scheme: &Scheme, element: Option<&Element>) -> Result<Scheme> {
    let Some(element) = element else {
        return Ok(scheme.clone());
    };

    if scheme.is_empty() {
        return Err(ElementError::EmptyOperand);
    }

    let mut result: Option<Scheme> = None;
    for (address, weight) in scheme.iter() {
        let inner = element.expand(address)?;
        let inner_scheme = inner.into_scheme(address);
        if inner_scheme.is_empty() {
            return Err(ElementError::EmptyOperand);
        }
        let scaled = inner_scheme
            .mul(weight)
            .with_order(inner_scheme.order() + scheme.order());
        result = Some(match result {
            None => scaled,
            Some(acc) => acc.add(&scaled)?,
        });
    }

    result.ok_or(ElementError::EmptyOperand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_first_order_stencil() {
        let s = Stencil::central(1.0).expand(0.0);
        let got: std::collections::BTreeMap<i64, f64> = s
            .iter()
            .map(|(a, w)| ((a * 10.0).round() as i64, w))
            .collect();
        let mut expected = std::collections::BTreeMap::new();
        expected.insert(-5, -1.0);
        expected.insert(5, 1.0);
        assert_eq!(got, expected);
    }

    #[test]
    fn central_second_span_stencil() {
        let s = Stencil::central(2.0).expand(0.0);
        let got: std::collections::BTreeMap<i64, f64> = s
            .iter()
            .map(|(a, w)| ((a * 10.0).round() as i64, w))
            .collect();
        let mut expected = std::collections::BTreeMap::new();
        expected.insert(-10, -0.5);
        expected.insert(10, 0.5);
        assert_eq!(got, expected);
    }

    #[test]
    fn operate_with_number_preserves_order() {
        let scheme = Stencil::central(1.0).expand(0.0);
        let number = Element::number(3.0);
        let result = operate(&scheme, Some(&number)).unwrap();
        assert_eq!(result.order(), scheme.order());
    }

    #[test]
    fn operate_empty_scheme_errors() {
        let empty = Scheme::empty(1.0);
        let number = Element::number(1.0);
        assert!(matches!(
            operate(&empty, Some(&number)),
            Err(ElementError::EmptyOperand)
        ));
    }

    #[test]
    fn operator_composition_matches_stencil_times_number() {
        let inner = Element::Stencil(Stencil::central(1.0));
        let outer = Element::operator(Stencil::central(1.0), Some(inner));
        let scheme = outer.expand(0.0).unwrap();
        let weights: Vec<(f64, f64)> = match scheme {
            ElementValue::Scheme(s) => s.iter().collect(),
            _ => panic!("expected scheme"),
        };
        assert_eq!(weights.len(), 2);
        assert!(weights.iter().any(|(a, _)| (*a - (-1.0)).abs() < 1e-9));
        assert!(weights.iter().any(|(a, _)| (*a - 1.0).abs() < 1e-9));
    }

    #[test]
    fn scalar_times_scheme_scales_weights() {
        let scheme_el = Element::Stencil(Stencil::central(1.0));
        let number = Element::number(2.0);
        let product = number.mul(scheme_el);
        match product.expand(0.0).unwrap() {
            ElementValue::Scheme(s) => {
                let map: std::collections::BTreeMap<i64, f64> = s
                    .iter()
                    .map(|(a, w)| ((a * 10.0).round() as i64, w))
                    .collect();
                assert!((map[&-5] - -2.0).abs() < 1e-9);
                assert!((map[&5] - 2.0).abs() < 1e-9);
            }
            _ => panic!("expected scheme"),
        }
    }

    #[test]
    fn scheme_times_scheme_is_unsupported() {
        let a = Element::Stencil(Stencil::central(1.0));
        let b = Element::Stencil(Stencil::central(1.0));
        let product = a.mul(b);
        assert!(matches!(
            product.expand(0.0),
            Err(ElementError::UnsupportedArithmetic(_))
        ));
    }
}
