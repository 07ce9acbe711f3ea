//! Quadratic costs from integrals of curve products.

use tracing::debug;

use super::data::ProblemData;
use crate::curve::{binomial, binomial_f64};
use crate::error::{OptError, Result};
use crate::expr::{real, AffineVariable, QuadraticVariable, Real};

/// Integral over `[0, 1]` of the dot product of two Bezier curves with
/// symbolic control points, as a quadratic form in the unknowns.
///
/// The product of Bernstein curves of degrees `d1` and `d2` is a Bernstein
/// curve of degree `d1 + d2` whose `i`-th control point is
///
/// ```text
/// sum_j C(d1, j) C(d2, i - j) / C(d1 + d2, i) * P_j . Q_(i-j)
/// ```
///
/// and the integral of a Bernstein curve over the unit interval is the mean
/// of its control points.
pub fn bezier_product<T: Real, const D: usize>(
    first: &[AffineVariable<T, D>],
    second: &[AffineVariable<T, D>],
) -> Result<QuadraticVariable<T>> {
    if first.is_empty() || second.is_empty() {
        return Err(OptError::InvalidProblem(
            "bezier product of a curve without control points".into(),
        ));
    }
    let deg1 = first.len() - 1;
    let deg2 = second.len() - 1;
    let new_deg = deg1 + deg2;

    let mut total: Option<QuadraticVariable<T>> = None;
    for i in 0..=new_deg {
        for j in i.saturating_sub(deg2)..=deg1.min(i) {
            let ratio: T = real(product_ratio(deg1, deg2, i, j)?);
            let term = first[j].dot(&second[i - j])? * ratio;
            total = Some(match total {
                None => term,
                Some(acc) => acc.checked_add(&term)?,
            });
        }
    }

    debug!(deg1, deg2, "integrated bezier product");
    let total = total.ok_or_else(|| OptError::InvalidProblem("empty bezier product".into()))?;
    Ok(total / real::<T>((new_deg + 1) as f64))
}

/// `C(d1, j) C(d2, i - j) / C(d1 + d2, i)`, exact while the coefficients fit
/// in a `u128`.
fn product_ratio(deg1: usize, deg2: usize, i: usize, j: usize) -> Result<f64> {
    let (d1, d2, i, j) = (deg1 as u64, deg2 as u64, i as u64, j as u64);
    let exact = binomial(d1, j)
        .zip(binomial(d2, i - j))
        .and_then(|(a, b)| a.checked_mul(b))
        .zip(binomial(d1 + d2, i));
    if let Some((numerator, denominator)) = exact {
        return Ok(numerator as f64 / denominator as f64);
    }
    let ratio = binomial_f64(d1, j) * binomial_f64(d2, i - j) / binomial_f64(d1 + d2, i);
    if !ratio.is_finite() {
        return Err(OptError::InvalidProblem(format!(
            "bezier product of degrees {} and {} is out of floating point range",
            deg1, deg2
        )));
    }
    Ok(ratio)
}

/// `integral_0^T |B^(k)(t)|^2 dt` for the problem curve, as a quadratic form.
pub fn derivative_cost<T: Real, const D: usize>(
    data: &ProblemData<T, D>,
    order: usize,
) -> Result<QuadraticVariable<T>> {
    let derivative = data.curve().derivative(order);
    let points = derivative.waypoints();
    Ok(bezier_product(points, points)? * data.curve().duration())
}
