//! End-to-end truss equation scenarios `(A*E*u')' = f`, ported from
//! `fractulus/test/integration/test_truss.py`.

use std::collections::BTreeMap;

use fdm_core::{Element, Stencil};
use fdm_fractional::{create_fractional_deformation_operator, CaputoSettings};
use fdm_geometry::Grid1DBuilder;
use fdm_model::{BoundaryCondition, EquationTemplate, Model};
use fdm_solver::solve;

fn domain(length: f64, node_number: usize) -> fdm_geometry::Grid {
    Grid1DBuilder::new(length)
        .add_uniformly_distributed_nodes(node_number)
        .unwrap()
        .build()
}

fn linear_function(length: f64, node_number: usize, a: f64, b: f64) -> impl Fn(f64) -> f64 {
    move |address: f64| {
        let x = address / (node_number - 1) as f64 * length;
        a * x + b
    }
}

fn fixed_free_bc(node_number: usize) -> BTreeMap<usize, BoundaryCondition> {
    let mut bcs = BTreeMap::new();
    bcs.insert(0, BoundaryCondition::dirichlet(0.0));
    bcs.insert(node_number - 1, BoundaryCondition::neumann(Stencil::backward(1.0)));
    bcs
}

fn fixed_fixed_bc(node_number: usize) -> BTreeMap<usize, BoundaryCondition> {
    let mut bcs = BTreeMap::new();
    bcs.insert(0, BoundaryCondition::dirichlet(0.0));
    bcs.insert(node_number - 1, BoundaryCondition::dirichlet(0.0));
    bcs
}

/// `Operator(Stencil.central(1.), Number(A) * Number(E) * fractional_operator)`.
fn fractional_truss_operator(section: f64, young: f64, settings: CaputoSettings) -> Element {
    let inner = Element::number(section)
        .mul(Element::number(young))
        .mul(create_fractional_deformation_operator(settings).unwrap());
    Element::operator(Stencil::central(1.0), Some(inner))
}

/// The non-fractional `(A*E*u')'` built straight from two central-difference
/// stencils, used for the eigenproblem scenario (the only one the source
/// left unverified, so it is grounded directly in the classical operator
/// rather than a near-1 fractional approximation of it).
fn classic_truss_operator(section: f64, young: f64) -> Element {
    let inner = Element::number(section)
        .mul(Element::number(young))
        .mul(Element::Stencil(Stencil::central(1.0)));
    Element::operator(Stencil::central(1.0), Some(inner))
}

fn assert_close(actual: &[f64], expected: &[f64], atol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < atol, "index {i}: expected {e}, got {a}");
    }
}

#[test]
fn constant_section_fixed_free_near_classic_operator() {
    let length = 1.0;
    let node_number = 6;
    let settings = CaputoSettings::new(0.99999, 0.5, 5);

    let equation = EquationTemplate::new(
        fractional_truss_operator(1.0, 1.0, settings),
        linear_function(length, node_number, -1.0, 0.0),
    );
    let model = Model::new(equation, domain(length, node_number), fixed_free_bc(node_number));

    let output = solve("linear_system_of_equations", &model).unwrap();
    assert_close(
        output.real(),
        &[0.0, 0.08, 0.152, 0.208, 0.24, 0.24],
        1e-4,
    );
}

#[test]
fn varied_section_fixed_free() {
    let length = 1.0;
    let node_number = 6;
    let settings = CaputoSettings::new(0.9999, 0.5, 5);

    let section = fdm_core::NodeFunction::new(move |i| 2.0 - (i as f64) / (node_number - 1) as f64)
        .with_linear_interpolator();
    let section_element = Element::point_function(move |address| section.value_at(address));

    let inner = section_element
        .mul(Element::number(1.0))
        .mul(create_fractional_deformation_operator(settings).unwrap());
    let weights = Element::operator(Stencil::central(1.0), Some(inner));

    let equation = EquationTemplate::new(weights, linear_function(length, node_number, 0.0, -1.0));
    let model = Model::new(equation, domain(length, node_number), fixed_free_bc(node_number));

    let output = solve("linear_system_of_equations", &model).unwrap();
    assert_close(
        output.real(),
        &[0.0, 0.0842105263, 0.154798762, 0.208132095, 0.238901326, 0.238901326],
        1e-4,
    );
}

#[test]
fn fractional_fixed_ends_alpha_0_5() {
    let length = 1.0;
    let node_number = 6;
    let settings = CaputoSettings::new(0.5, 3.0, 3);

    let equation = EquationTemplate::new(
        fractional_truss_operator(1.0, 1.0, settings),
        linear_function(length, node_number, 0.0, -1.0),
    );
    let model = Model::new(equation, domain(length, node_number), fixed_fixed_bc(node_number));

    let output = solve("linear_system_of_equations", &model).unwrap();
    assert_close(
        output.real(),
        &[0.0, 0.34717, 0.49952, 0.49952, 0.34717, 0.0],
        1e-4,
    );
}

#[test]
fn fractional_fixed_ends_alpha_almost_one() {
    let length = 1.0;
    let node_number = 6;
    let settings = CaputoSettings::new(0.9999, 3.0, 3);

    let equation = EquationTemplate::new(
        fractional_truss_operator(1.0, 1.0, settings),
        linear_function(length, node_number, 0.0, -1.0),
    );
    let model = Model::new(equation, domain(length, node_number), fixed_fixed_bc(node_number));

    let output = solve("linear_system_of_equations", &model).unwrap();
    assert_close(
        output.real(),
        &[0.0, 0.08002, 0.12003, 0.12003, 0.08002, 0.0],
        1e-4,
    );
}

#[test]
fn classic_eigenproblem_fixed_fixed() {
    let length = 1.0;
    let node_number = 6;
    let rho = 2.0;

    let equation = EquationTemplate::new(
        classic_truss_operator(1.0, 1.0),
        linear_function(length, node_number, 0.0, -rho),
    );
    let model = Model::new(equation, domain(length, node_number), fixed_fixed_bc(node_number));

    let output = solve("eigenproblem", &model).unwrap();

    // Sign of an eigenvector is arbitrary; compare magnitude against the
    // expected mode shape.
    let expected = [0.0, 0.3717, 0.6015, 0.6015, 0.3717, 0.0];
    let actual: Vec<f64> = output.real().iter().map(|v| v.abs()).collect();
    assert_close(&actual, &expected, 1e-3);
}

#[test]
fn left_caputo_near_alpha_one_collapses_to_identity() {
    let settings = CaputoSettings::new(0.99999, 1.0, 1);
    let stencil = fdm_fractional::create_left_caputo_stencil(settings);
    let coefficients = stencil.expand(0.0).to_coefficients(1.0);
    assert!((coefficients.get(0) - 1.0).abs() < 1e-4);
}
