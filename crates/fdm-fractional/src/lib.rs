//! Fractional (Riesz–Caputo and quadrature-based) stencil factories.
//!
//! The Caputo weight formulas are ported from `create_left_caputo_stencil`
//! / `create_right_caputo_stencil` / `create_riesz_caputo_stencil`. The
//! rectangle and trapezoidal quadrature rules have no upstream
//! implementation to port; their closed forms come straight from the
//! distilled weight tables. The Simpson rule is built from its own
//! closed form: a composite rule that interpolates each consecutive pair
//! of subintervals with a quadratic and integrates that quadratic
//! exactly against the `s^(-alpha)` kernel, term by term in `s^(1-alpha)`,
//! `s^(2-alpha)`, `s^(3-alpha)`. For odd `resolution` the trailing
//! subinterval cannot form a full pair, so it gets a one-subinterval
//! correction quadrature anchored on a virtual node one step past the
//! stencil's domain.

use fdm_core::{Element, Result, Stencil};
use statrs::function::gamma::gamma;

/// Parameters shared by every fractional stencil factory in this crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaputoSettings {
    pub alpha: f64,
    pub lf: f64,
    pub resolution: usize,
}

impl CaputoSettings {
    pub fn new(alpha: f64, lf: f64, resolution: usize) -> Self {
        Self { alpha, lf, resolution }
    }
}

fn caputo_order(alpha: f64) -> f64 {
    let n = alpha.floor() + 1.0;
    -(n - alpha)
}

/// Shared skeleton for the left/right Caputo stencils (ported from
/// `create_side_caputo_stencil`): evaluate `left`/`right`/`interior`
/// weight providers over a uniform grid, scale by the shared multiplier.
#[allow(clippy::too_many_arguments)]
fn side_caputo_stencil(
    alpha: f64,
    p: usize,
    left_range: f64,
    right_range: f64,
    left_fn: impl Fn(f64, f64, f64, f64) -> f64,
    right_fn: impl Fn(f64, f64, f64, f64) -> f64,
    interior_fn: impl Fn(f64, f64, f64) -> f64,
    sign_fn: impl Fn(f64) -> f64,
) -> Stencil {
    let n = alpha.floor() + 1.0;
    let idx = n - alpha + 1.0;
    let multiplier = sign_fn(n) * (1.0 / gamma(n - alpha + 2.0));
    let pf = p as f64;

    Stencil::uniform(left_range, right_range, p, move |i, _address| {
        let raw = if i == 0 {
            left_fn(pf, n, idx, alpha)
        } else if i == p {
            right_fn(pf, n, idx, alpha)
        } else {
            interior_fn(pf, i as f64, idx)
        };
        multiplier * raw
    })
    .with_order(caputo_order(alpha))
}

pub fn create_left_caputo_stencil(settings: CaputoSettings) -> Stencil {
    let CaputoSettings { alpha, lf, resolution } = settings;
    side_caputo_stencil(
        alpha,
        resolution,
        lf,
        0.0,
        |p, n, idx, alpha| (p - 1.0).powf(idx) - (p - n + alpha - 1.0) * p.powf(n - alpha),
        |_p, _n, _idx, _alpha| 1.0,
        |p, j, idx| (p - j + 1.0).powf(idx) - 2.0 * (p - j).powf(idx) + (p - j - 1.0).powf(idx),
        |_n| 1.0,
    )
}

pub fn create_right_caputo_stencil(settings: CaputoSettings) -> Stencil {
    let CaputoSettings { alpha, lf, resolution } = settings;
    side_caputo_stencil(
        alpha,
        resolution,
        0.0,
        lf,
        |_p, _n, _idx, _alpha| 1.0,
        |p, n, idx, alpha| (p - 1.0).powf(idx) - (p - n + alpha - 1.0) * p.powf(n - alpha),
        |p, j, idx| (j + 1.0).powf(idx) - 2.0 * j.powf(idx) + (j - 1.0).powf(idx),
        |n| (-1.0f64).powf(n),
    )
}

pub fn create_left_rectangle_stencil(settings: CaputoSettings) -> Stencil {
    let CaputoSettings { alpha, lf, resolution } = settings;
    let p = resolution as f64;
    let dx = lf / p;
    let multiplier = (lf / p).powf(1.0 - alpha) / gamma(2.0 - alpha);

    Stencil::uniform(lf - dx, 0.0, resolution - 1, move |i, _address| {
        let k = -p + i as f64;
        multiplier * ((-k).powf(1.0 - alpha) - (-k - 1.0).powf(1.0 - alpha))
    })
    .with_order(-(1.0 - alpha))
}

pub fn create_right_rectangle_stencil(settings: CaputoSettings) -> Stencil {
    mirror_and_flip(create_left_rectangle_stencil(settings), settings.alpha)
}

pub fn create_left_trapezoidal_stencil(settings: CaputoSettings) -> Stencil {
    let CaputoSettings { alpha, lf, resolution } = settings;
    let p = resolution as f64;
    let multiplier = (lf / p).powf(1.0 - alpha) / gamma(3.0 - alpha);

    Stencil::uniform(lf, 0.0, resolution, move |i, _address| {
        let raw = if i == 0 {
            (p - 1.0).powf(2.0 - alpha) + (2.0 - alpha - p) * p.powf(1.0 - alpha)
        } else if i == resolution {
            1.0
        } else {
            let k = -p + i as f64;
            (-k + 1.0).powf(2.0 - alpha) - 2.0 * (-k).powf(2.0 - alpha) + (-k - 1.0).powf(2.0 - alpha)
        };
        multiplier * raw
    })
    .with_order(-(1.0 - alpha))
}

pub fn create_right_trapezoidal_stencil(settings: CaputoSettings) -> Stencil {
    mirror_and_flip(create_left_trapezoidal_stencil(settings), settings.alpha)
}

/// Mirror a left-side stencil about 0 and apply the `(-1)^n` sign flip
/// that turns it into the matching right-side variant.
fn mirror_and_flip(stencil: Stencil, alpha: f64) -> Stencil {
    let n = alpha.floor() + 1.0;
    let sign = (-1.0f64).powf(n);
    let mirrored = stencil
        .weights()
        .iter()
        .map(|(address, weight)| (-address, weight * sign));
    Stencil::new(mirrored).with_order(stencil.order())
}

/// Combine two same-order stencils through the `Scheme` algebra (both are
/// anchored at 0 before combining, then rebuilt into a `Stencil`).
fn combine(a: &Stencil, coeff_a: f64, b: &Stencil, coeff_b: f64) -> Result<Stencil> {
    let scheme = a.expand(0.0).mul(coeff_a).add(&b.expand(0.0).mul(coeff_b))?;
    Ok(Stencil::new(scheme.iter()).with_order(scheme.order()))
}

/// Exact quadratic-interpolant weights for one Simpson pair spanning the
/// two subintervals `[k-2, k]` (in units of the grid spacing, measured as
/// distance from the stencil's anchor). Returned as `(far, mid, near)`,
/// i.e. the coefficients landing on the nodes at distance `k`, `k-1`, `k-2`
/// respectively: the quadratic interpolates the sampled function at those
/// three nodes and is integrated exactly against the `s^(-alpha)` kernel
/// over `s in [k-2, k]`.
fn simpson_pair_weights(k: f64, alpha: f64) -> (f64, f64, f64) {
    let p1 = k.powf(1.0 - alpha) - (k - 2.0).powf(1.0 - alpha);
    let p2 = k.powf(2.0 - alpha) - (k - 2.0).powf(2.0 - alpha);
    let p3 = k.powf(3.0 - alpha) - (k - 2.0).powf(3.0 - alpha);
    let d = (alpha - 3.0) * (alpha - 2.0) * (alpha - 1.0);

    let far = (-(alpha - 3.0) * (alpha - 2.0) * (k - 2.0) * (k - 1.0) * p1
        + (alpha - 3.0) * (alpha - 1.0) * (2.0 * k - 3.0) * p2
        - (alpha - 2.0) * (alpha - 1.0) * p3)
        / (2.0 * d);
    let mid = (k * (alpha - 3.0) * (alpha - 2.0) * (k - 2.0) * p1
        - 2.0 * (alpha - 3.0) * (alpha - 1.0) * (k - 1.0) * p2
        + (alpha - 2.0) * (alpha - 1.0) * p3)
        / d;
    let near = (-k * (alpha - 3.0) * (alpha - 2.0) * (k - 1.0) * p1
        + (alpha - 3.0) * (alpha - 1.0) * (2.0 * k - 1.0) * p2
        - (alpha - 2.0) * (alpha - 1.0) * p3)
        / (2.0 * d);
    (far, mid, near)
}

/// Weights for the odd-`resolution` tail correction: a quadratic through
/// the last real subinterval's two nodes plus one virtual node one step
/// past the stencil's domain, integrated only over the single real
/// subinterval `s in [0, 1]`. Unlike `simpson_pair_weights`, this has no
/// `k` dependence since it always anchors on the same last subinterval.
fn simpson_tail_correction(alpha: f64) -> (f64, f64, f64) {
    let far = (2.5 - alpha) / ((alpha - 2.0) * (alpha - 3.0));
    let mid = 2.0 / ((alpha - 1.0) * (alpha - 3.0));
    let near = -1.0 / (2.0 * (alpha - 2.0) * (alpha - 3.0));
    (far, mid, near)
}

pub fn create_left_simpson_stencil(settings: CaputoSettings) -> Stencil {
    let CaputoSettings { alpha, lf, resolution: p } = settings;
    let h = lf / p as f64;
    let multiplier = h.powf(1.0 - alpha) / gamma(1.0 - alpha);
    let odd = p % 2 != 0;

    let mut weights = vec![0.0; p + 1 + odd as usize];
    for pair in 0..p / 2 {
        let j0 = 2 * pair;
        let k = (p - j0) as f64;
        let (far, mid, near) = simpson_pair_weights(k, alpha);
        weights[j0] += far;
        weights[j0 + 1] += mid;
        weights[j0 + 2] += near;
    }
    if odd {
        let j0 = p - 1;
        let (far, mid, near) = simpson_tail_correction(alpha);
        weights[j0] += far;
        weights[j0 + 1] += mid;
        weights[j0 + 2] += near;
    }

    let entries = weights
        .into_iter()
        .enumerate()
        .map(move |(j, w)| (-lf + j as f64 * h, multiplier * w));
    Stencil::new(entries).with_order(-(1.0 - alpha))
}

pub fn create_right_simpson_stencil(settings: CaputoSettings) -> Stencil {
    mirror_and_flip(create_left_simpson_stencil(settings), settings.alpha)
}

fn riesz_stencil(left: Stencil, right: Stencil, alpha: f64) -> Result<Stencil> {
    let n = alpha.floor() + 1.0;
    let sign = (-1.0f64).powf(n);
    let coeff = gamma(2.0 - alpha) / (2.0 * gamma(2.0));
    combine(&left, coeff, &right, coeff * sign)
}

pub fn create_riesz_caputo_stencil(settings: CaputoSettings) -> Result<Stencil> {
    riesz_stencil(
        create_left_caputo_stencil(settings),
        create_right_caputo_stencil(settings),
        settings.alpha,
    )
}

pub fn create_riesz_rectangle_stencil(settings: CaputoSettings) -> Result<Stencil> {
    riesz_stencil(
        create_left_rectangle_stencil(settings),
        create_right_rectangle_stencil(settings),
        settings.alpha,
    )
}

pub fn create_riesz_trapezoidal_stencil(settings: CaputoSettings) -> Result<Stencil> {
    riesz_stencil(
        create_left_trapezoidal_stencil(settings),
        create_right_trapezoidal_stencil(settings),
        settings.alpha,
    )
}

pub fn create_riesz_simpson_stencil(settings: CaputoSettings) -> Result<Stencil> {
    riesz_stencil(
        create_left_simpson_stencil(settings),
        create_right_simpson_stencil(settings),
        settings.alpha,
    )
}

/// The fractional deformation operator used by the truss equation: a bare
/// `Operator` wrapping the Riesz–Caputo stencil, with no inner element —
/// when composed into a larger expression it simply contributes its
/// anchored `Scheme` (ported from `_build_fractional_operator`,
/// generalized out of the test helper into a library entry point).
pub fn create_fractional_deformation_operator(settings: CaputoSettings) -> Result<Element> {
    Ok(Element::operator(create_riesz_caputo_stencil(settings)?, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_near(stencil: &Stencil, address: f64, expected: f64, tol: f64) {
        let got = stencil
            .weights()
            .iter()
            .find(|(a, _)| (*a - address).abs() < 1e-6)
            .unwrap_or_else(|| panic!("no weight at address {address} in {:?}", stencil.weights()));
        assert!(
            (got.1 - expected).abs() < tol,
            "address {address}: expected {expected}, got {}",
            got.1
        );
    }

    #[test]
    fn left_caputo_matches_reference_weights() {
        let settings = CaputoSettings::new(0.5, 0.6, 4);
        let stencil = create_left_caputo_stencil(settings);
        weight_near(&stencil, -0.6, 0.057148272422657305, 1e-9);
        weight_near(&stencil, -0.45, 0.12706258982171437, 1e-9);
        weight_near(&stencil, -0.3, 0.1571224994043748, 1e-9);
        weight_near(&stencil, -0.15, 0.24135913466702896, 1e-9);
        weight_near(&stencil, 0.0, 0.29134624815788773, 1e-9);
    }

    #[test]
    fn right_caputo_matches_reference_weights() {
        let settings = CaputoSettings::new(0.5, 4.0, 4);
        let stencil = create_right_caputo_stencil(settings);
        weight_near(&stencil, 0.0, -0.752252778063675, 1e-9);
        weight_near(&stencil, 1.0, -0.6231866060136243, 1e-9);
        weight_near(&stencil, 2.0, -0.4056885490050856, 1e-9);
        weight_near(&stencil, 3.0, -0.3280741962036558, 1e-9);
        weight_near(&stencil, 4.0, -0.14755620490498422, 1e-9);
    }

    #[test]
    fn right_caputo_mirrors_left() {
        let settings = CaputoSettings::new(0.5, 3.0, 3);
        let left = create_left_caputo_stencil(settings);
        let right = create_right_caputo_stencil(settings);
        let n = settings.alpha.floor() + 1.0;
        let sign = (-1.0f64).powf(n);
        for (address, weight) in left.weights() {
            weight_near(&right, -address, weight * sign, 1e-9);
        }
    }

    #[test]
    fn riesz_collapses_near_order_one() {
        let settings = CaputoSettings::new(0.99999, 1.0, 1);
        let stencil = create_riesz_caputo_stencil(settings).unwrap();
        let scheme = stencil.expand(0.0).to_coefficients(1.0);
        assert!((scheme.get(0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn left_simpson_matches_reference_weights_even_resolution() {
        let settings = CaputoSettings::new(0.5, 0.8, 4);
        let stencil = create_left_simpson_stencil(settings);
        weight_near(&stencil, -0.8, 0.04139442395762801, 1e-9);
        weight_near(&stencil, -0.6, 0.19590867482751353, 1e-9);
        weight_near(&stencil, -0.4, 0.10587690665922159, 1e-9);
        weight_near(&stencil, -0.2, 0.38061314477925734, 1e-9);
        weight_near(&stencil, 0.0, 0.28545985858444356, 1e-9);
    }

    #[test]
    fn left_simpson_matches_reference_weights_odd_resolution() {
        let settings = CaputoSettings::new(0.5, 1.0, 5);
        let stencil = create_left_simpson_stencil(settings);
        weight_near(&stencil, -1.0, 0.03727938104424598, 1e-9);
        weight_near(&stencil, -0.8, 0.1690131707314828, 1e-9);
        weight_near(&stencil, -0.6, 0.09488746599316666, 1e-9);
        weight_near(&stencil, -0.4, 0.24273847930859488, 1e-9);
        weight_near(&stencil, -0.2, 0.214401233455065, 1e-9);
        weight_near(&stencil, 0.0, 0.40370120352322564, 1e-9);
        weight_near(&stencil, 0.2, -0.033641766960268805, 1e-9);
    }

    #[test]
    fn right_simpson_mirrors_left() {
        let settings = CaputoSettings::new(0.5, 1.0, 5);
        let left = create_left_simpson_stencil(settings);
        let right = create_right_simpson_stencil(settings);
        let n = settings.alpha.floor() + 1.0;
        let sign = (-1.0f64).powf(n);
        for (address, weight) in left.weights() {
            weight_near(&right, -address, weight * sign, 1e-9);
        }
    }
}
