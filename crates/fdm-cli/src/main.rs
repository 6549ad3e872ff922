use std::collections::BTreeMap;
use std::process::ExitCode;

use fdm_core::{Element, Stencil};
use fdm_fractional::{create_fractional_deformation_operator, CaputoSettings};
use fdm_geometry::{Grid, Grid1DBuilder};
use fdm_model::{BoundaryCondition, EquationTemplate, Model};
use fdm_solver::solve;

fn usage() {
    eprintln!("usage:");
    eprintln!("  fdm-cli truss <fixed-free|fixed-fixed> <nodes> <length> <alpha> <lf> <resolution> [--bc-no-for-free]");
    eprintln!("  fdm-cli eigen <nodes> <length> <rho>");
    eprintln!("  fdm-cli --help");
    eprintln!("  fdm-cli --version");
    eprintln!();
    eprintln!("examples:");
    eprintln!("  fdm-cli truss fixed-free 6 1.0 0.5 3.0 3");
    eprintln!("  fdm-cli truss fixed-fixed 6 1.0 0.9999 3.0 3 --bc-no-for-free");
    eprintln!("  fdm-cli eigen 6 1.0 2.0");
}

fn domain(length: f64, node_number: usize) -> Result<Grid, String> {
    Grid1DBuilder::new(length)
        .add_uniformly_distributed_nodes(node_number)
        .map_err(|err| err.to_string())
        .map(|builder| builder.build())
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
fn fractional_truss_operator(section: f64, young: f64, settings: CaputoSettings) -> Result<Element, String> {
    let fractional = create_fractional_deformation_operator(settings).map_err(|err| err.to_string())?;
    let inner = Element::number(section).mul(Element::number(young)).mul(fractional);
    Ok(Element::operator(Stencil::central(1.0), Some(inner)))
}

/// Plain `(A*E*u')'`, used for the eigenproblem where there is no
/// fractional order to approximate.
fn classic_truss_operator(section: f64, young: f64) -> Element {
    let inner = Element::number(section)
        .mul(Element::number(young))
        .mul(Element::Stencil(Stencil::central(1.0)));
    Element::operator(Stencil::central(1.0), Some(inner))
}

fn print_displacements(values: &[f64]) {
    for (i, v) in values.iter().enumerate() {
        println!("u[{i}] = {v:.6}");
    }
}

fn parse_usize(raw: &str, what: &str) -> Result<usize, String> {
    raw.parse().map_err(|_| format!("invalid {what}: {raw:?}"))
}

fn parse_f64(raw: &str, what: &str) -> Result<f64, String> {
    raw.parse().map_err(|_| format!("invalid {what}: {raw:?}"))
}

fn run_truss(args: &[String]) -> Result<(), String> {
    if args.len() < 6 || args.len() > 7 {
        return Err("expected: <fixed-free|fixed-fixed> <nodes> <length> <alpha> <lf> <resolution> [--bc-no-for-free]".to_string());
    }

    let bc_no_for_free = match args.get(6).map(String::as_str) {
        None => false,
        Some("--bc-no-for-free") => true,
        Some(other) => return Err(format!("unknown flag {other:?}")),
    };

    let node_number = parse_usize(&args[1], "nodes")?;
    let length = parse_f64(&args[2], "length")?;
    let alpha = parse_f64(&args[3], "alpha")?;
    let lf = parse_f64(&args[4], "lf")?;
    let resolution = parse_usize(&args[5], "resolution")?;

    let settings = CaputoSettings::new(alpha, lf, resolution);
    let equation = EquationTemplate::new(
        fractional_truss_operator(1.0, 1.0, settings)?,
        linear_function(length, node_number, 0.0, -1.0),
    );

    let grid = domain(length, node_number)?;
    let bcs = match args[0].as_str() {
        "fixed-free" => fixed_free_bc(node_number),
        "fixed-fixed" => fixed_fixed_bc(node_number),
        other => return Err(format!("unknown boundary kind {other:?}")),
    };

    let mut model = Model::new(equation, grid, bcs);
    if bc_no_for_free {
        model = model.with_bc_no_for_free(true);
    }

    let output = solve("linear_system_of_equations", &model).map_err(|err| err.to_string())?;
    print_displacements(output.real());
    Ok(())
}

fn run_eigen(args: &[String]) -> Result<(), String> {
    if args.len() != 3 {
        return Err("expected: <nodes> <length> <rho>".to_string());
    }

    let node_number = parse_usize(&args[0], "nodes")?;
    let length = parse_f64(&args[1], "length")?;
    let rho = parse_f64(&args[2], "rho")?;

    let equation = EquationTemplate::new(
        classic_truss_operator(1.0, 1.0),
        linear_function(length, node_number, 0.0, -rho),
    );
    let grid = domain(length, node_number)?;
    let model = Model::new(equation, grid, fixed_fixed_bc(node_number));

    let output = solve("eigenproblem", &model).map_err(|err| err.to_string())?;
    print_displacements(output.real());
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("help") | Some("-h") | Some("--help") => {
            usage();
            ExitCode::SUCCESS
        }
        Some("--version") | Some("-V") => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some("truss") => match run_truss(&args[2..]) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("truss error: {err}");
                usage();
                ExitCode::from(2)
            }
        },
        Some("eigen") => match run_eigen(&args[2..]) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("eigen error: {err}");
                usage();
                ExitCode::from(2)
            }
        },
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}
