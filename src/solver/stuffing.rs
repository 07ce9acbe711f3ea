//! Matrix stuffing: converts a generated problem into the QP data layout
//! expected by conic solvers.
//!
//! The target form is
//!
//! ```text
//! minimize    (1/2) x' P x + q' x
//! subject to  A x + s = b,  s >= 0
//! ```
//!
//! with `P` stored as its upper triangle.

use nalgebra::DVector;
use nalgebra_sparse::CscMatrix;
use tracing::debug;

use crate::error::{OptError, Result};
use crate::problem::Problem;
use crate::sparse::{csc_scale, dense_to_csc, dense_upper_to_csc};

/// Stuffed problem ready for Clarabel.
#[derive(Debug)]
pub struct StuffedProblem {
    /// Quadratic cost matrix P (n x n, upper triangle).
    pub p: CscMatrix<f64>,
    /// Linear cost vector q (n).
    pub q: Vec<f64>,
    /// Constraint matrix A (m x n).
    pub a: CscMatrix<f64>,
    /// Constraint vector b (m).
    pub b: Vec<f64>,
    /// Number of rows in the nonnegative cone (all of them).
    pub nonneg: usize,
    /// Constant offset in objective.
    pub objective_offset: f64,
}

impl StuffedProblem {
    /// Number of unknowns.
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Objective value `(1/2) x' P x + q' x + offset` at `x`.
    pub fn objective(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.num_vars() {
            return Err(OptError::shape(
                format!("vector of length {}", self.num_vars()),
                format!("length {}", x.len()),
            ));
        }
        Ok(compute_objective(x, &self.p, &self.q) + self.objective_offset)
    }
}

/// Build the stuffed problem from a generated problem.
pub fn stuff_problem(problem: &Problem<f64>) -> StuffedProblem {
    let cost = &problem.cost;

    // Clarabel uses objective (1/2) x' P x + q' x, so we scale P by 2
    // to get our intended objective x' P x + q' x
    let p = csc_scale(&dense_upper_to_csc(cost.a()), 2.0);
    let q = cost.b().iter().copied().collect();
    let a = dense_to_csc(&problem.ineq_matrix);
    let b = problem.ineq_vector.iter().copied().collect::<Vec<_>>();

    debug!(
        vars = problem.num_unknowns(),
        rows = b.len(),
        p_nnz = p.nnz(),
        a_nnz = a.nnz(),
        "stuffed problem"
    );

    StuffedProblem {
        p,
        q,
        nonneg: b.len(),
        a,
        b,
        objective_offset: cost.c(),
    }
}

/// Compute objective value: (1/2) x' P x + q' x.
fn compute_objective(x: &[f64], p: &CscMatrix<f64>, q: &[f64]) -> f64 {
    let linear: f64 = q.iter().zip(x.iter()).map(|(qi, xi)| qi * xi).sum();

    let mut quadratic = 0.0;
    for (row, col, val) in p.triplet_iter() {
        if row == col {
            quadratic += 0.5 * *val * x[row] * x[col];
        } else {
            // Off-diagonal (stored as upper triangle, so count once)
            quadratic += *val * x[row] * x[col];
        }
    }

    linear + quadratic
}

/// Slack `b - A x` of the stuffed constraints.
pub fn slack(problem: &StuffedProblem, x: &[f64]) -> DVector<f64> {
    let mut s = DVector::from_column_slice(&problem.b);
    for (row, col, val) in problem.a.triplet_iter() {
        s[row] -= *val * x[col];
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::QuadraticVariable;
    use nalgebra::{DMatrix, DVector};

    fn small_problem() -> Problem<f64> {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        Problem {
            ineq_matrix: DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
            ineq_vector: DVector::from_vec(vec![1.0]),
            cost: QuadraticVariable::new(a, DVector::from_vec(vec![1.0, -1.0]), 3.0),
        }
    }

    #[test]
    fn test_objective_matches_quadratic_form() {
        let problem = small_problem();
        let stuffed = stuff_problem(&problem);
        let x = vec![0.3, -1.2];
        let expected = problem.objective(&DVector::from_vec(x.clone())).unwrap();
        assert!((stuffed.objective(&x).unwrap() - expected).abs() < 1e-12);
        assert!(stuffed.objective(&[1.0]).is_err());
    }

    #[test]
    fn test_p_is_upper_triangle() {
        let stuffed = stuff_problem(&small_problem());
        assert_eq!(stuffed.p.nnz(), 3);
        assert!(stuffed.p.triplet_iter().all(|(r, c, _)| r <= c));
        assert_eq!(stuffed.nonneg, 1);
        assert_eq!(stuffed.objective_offset, 3.0);
    }

    #[test]
    fn test_slack() {
        let stuffed = stuff_problem(&small_problem());
        let s = slack(&stuffed, &[0.25, 0.25]);
        assert!((s[0] - 0.5).abs() < 1e-12);
    }
}
