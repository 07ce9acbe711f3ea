//! Trajectory problem definition and its reduction to a QP.
//!
//! The pipeline is:
//!
//! ```text
//! ProblemDefinition -> eliminate_boundaries -> ProblemData
//!                   -> assemble_inequalities -> (A, b)
//!                   -> derivative_cost        -> x' Q x + q' x + r
//! ```
//!
//! `generate_problem` runs all of it and returns a `Problem` ready to be
//! handed to a QP solver.

pub mod assembly;
pub mod cost;
pub mod data;
pub mod definition;
pub mod flags;
pub mod loader;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{OptError, Result};
use crate::expr::{QuadraticVariable, Real};

pub use assembly::{assemble_inequalities, count_inequality_rows, split_segments};
pub use cost::{bezier_product, derivative_cost};
pub use data::{eliminate_boundaries, ProblemData};
pub use definition::{CurveConstraints, LinearInequality, ProblemDefinition};
pub use flags::{BoundaryCondition, BoundaryFlags};
pub use loader::{load_problem, parse_problem, write_problem};

/// How boundary flags that are not prefix-closed are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Reject them with `OptError::BoundaryOrder`.
    #[default]
    Strict,
    /// Drop the conditions missing a lower order and log a warning.
    Truncate,
}

/// Integrated squared derivative used as the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostKind {
    /// Squared position.
    Distance,
    /// Squared velocity.
    Velocity,
    /// Squared acceleration.
    #[default]
    Acceleration,
    /// Squared jerk.
    Jerk,
}

impl CostKind {
    pub fn derivative_order(self) -> usize {
        match self {
            CostKind::Distance => 0,
            CostKind::Velocity => 1,
            CostKind::Acceleration => 2,
            CostKind::Jerk => 3,
        }
    }
}

/// Problem generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    /// Objective to minimize.
    pub cost: CostKind,
    /// Treatment of boundary flags without their lower orders.
    pub boundary_policy: BoundaryPolicy,
}

/// A quadratic program over the reduced unknowns:
///
/// ```text
/// minimize    x' A x + b' x + c
/// subject to  ineq_matrix x <= ineq_vector
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Problem<T: Real> {
    pub ineq_matrix: DMatrix<T>,
    pub ineq_vector: DVector<T>,
    pub cost: QuadraticVariable<T>,
}

impl<T: Real> Problem<T> {
    /// Length of the unknown vector.
    pub fn num_unknowns(&self) -> usize {
        self.cost.size()
    }

    /// Number of scalar inequalities.
    pub fn num_inequalities(&self) -> usize {
        self.ineq_vector.len()
    }

    /// Objective value at `x`.
    pub fn objective(&self, x: &DVector<T>) -> Result<T> {
        self.cost.evaluate(x)
    }

    /// Largest violation `max_i (A x - b)_i`, clamped at zero.
    pub fn max_violation(&self, x: &DVector<T>) -> Result<T> {
        if x.len() != self.ineq_matrix.ncols() {
            return Err(OptError::shape(
                format!("vector of length {}", self.ineq_matrix.ncols()),
                format!("length {}", x.len()),
            ));
        }
        let residual = &self.ineq_matrix * x - &self.ineq_vector;
        Ok(residual.iter().fold(T::zero(), |acc, &r| acc.max(r)))
    }

    /// Whether `x` satisfies every inequality up to `tol`.
    pub fn is_feasible(&self, x: &DVector<T>, tol: T) -> Result<bool> {
        Ok(self.max_violation(x)? <= tol)
    }
}

/// Reduce a problem definition to a QP.
pub fn generate_problem<T: Real, const D: usize>(
    def: &ProblemDefinition<T, D>,
    settings: &Settings,
) -> Result<Problem<T>> {
    def.validate()?;
    let data = eliminate_boundaries(def, settings.boundary_policy)?;
    build_problem(def, &data, settings.cost)
}

/// Assemble the QP for already eliminated problem data.
pub fn build_problem<T: Real, const D: usize>(
    def: &ProblemDefinition<T, D>,
    data: &ProblemData<T, D>,
    cost: CostKind,
) -> Result<Problem<T>> {
    let (ineq_matrix, ineq_vector) = assemble_inequalities(def, data)?;
    let cost = derivative_cost(data, cost.derivative_order())?;
    debug!(
        unknowns = cost.size(),
        inequalities = ineq_vector.len(),
        "generated problem"
    );
    Ok(Problem {
        ineq_matrix,
        ineq_vector,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn unit_box() -> (DMatrix<f64>, DVector<f64>) {
        let m = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0]);
        (m, DVector::from_vec(vec![1.0, 0.0, 1.0, 0.0]))
    }

    fn line_problem() -> ProblemDefinition<f64, 2> {
        let (m, v) = unit_box();
        ProblemDefinition::new(3, 1.0)
            .with_flags(BoundaryFlags::INIT_POS | BoundaryFlags::END_POS)
            .with_start(Vector2::new(0.0, 0.0))
            .with_end(Vector2::new(1.0, 1.0))
            .with_inequality(m, v)
            .unwrap()
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.cost, CostKind::Acceleration);
        assert_eq!(settings.boundary_policy, BoundaryPolicy::Strict);
        assert_eq!(CostKind::Jerk.derivative_order(), 3);
    }

    #[test]
    fn test_generate_problem_shapes() {
        let problem = generate_problem(&line_problem(), &Settings::default()).unwrap();
        assert_eq!(problem.num_unknowns(), 4);
        assert_eq!(problem.num_inequalities(), 16);
        assert_eq!(problem.ineq_matrix.shape(), (16, 4));
    }

    #[test]
    fn test_straight_line_is_feasible_and_zero_acceleration() {
        let problem = generate_problem(&line_problem(), &Settings::default()).unwrap();
        let third = 1.0 / 3.0;
        let x = DVector::from_vec(vec![third, third, 2.0 * third, 2.0 * third]);
        assert!(problem.is_feasible(&x, 1e-12).unwrap());
        assert!(problem.objective(&x).unwrap().abs() < 1e-12);

        let outside = DVector::from_vec(vec![2.0, 0.0, 0.5, 0.5]);
        assert!((problem.max_violation(&outside).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_generate_problem_validates() {
        let def = line_problem().with_split_times(vec![0.5]).unwrap();
        assert!(matches!(
            generate_problem(&def, &Settings::default()),
            Err(OptError::InvalidProblem(_))
        ));
    }
}
