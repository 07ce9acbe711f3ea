//! Clarabel data hand-off.
//!
//! Converts a stuffed problem into the matrices and cone list taken by
//! `clarabel::solver::DefaultSolver::new`. Running the solver is left to the
//! caller.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::SupportedConeT;

use super::stuffing::StuffedProblem;

/// Problem data in Clarabel's own types.
#[derive(Debug)]
pub struct ClarabelData {
    pub p: ClarabelCsc<f64>,
    pub q: Vec<f64>,
    pub a: ClarabelCsc<f64>,
    pub b: Vec<f64>,
    pub cones: Vec<SupportedConeT<f64>>,
}

impl From<&StuffedProblem> for ClarabelData {
    fn from(problem: &StuffedProblem) -> Self {
        ClarabelData {
            p: to_clarabel_csc(&problem.p),
            q: problem.q.clone(),
            a: to_clarabel_csc(&problem.a),
            b: problem.b.clone(),
            cones: to_clarabel_cones(problem.nonneg),
        }
    }
}

/// Convert nalgebra CSC to Clarabel CSC.
pub fn to_clarabel_csc(m: &nalgebra_sparse::CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        m.nrows(),
        m.ncols(),
        m.col_offsets().to_vec(),
        m.row_indices().to_vec(),
        m.values().to_vec(),
    )
}

fn to_clarabel_cones(nonneg: usize) -> Vec<SupportedConeT<f64>> {
    let mut cones = Vec::new();
    if nonneg > 0 {
        cones.push(SupportedConeT::NonnegativeConeT(nonneg));
    }
    cones
}
