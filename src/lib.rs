//! # bezier_qp
//!
//! Formulation of constrained Bezier trajectory optimization as quadratic
//! programs.
//!
//! A trajectory is a single Bezier curve of a chosen degree over
//! `[0, total_time]`. Boundary conditions (position, velocity, acceleration
//! and jerk at either end) fix the leading and trailing control points; the
//! remaining control points become the unknowns of a QP whose constraints
//! keep each curve segment inside a user-supplied polytope and whose
//! objective is an integrated squared derivative.
//!
//! ## Quick Start
//!
//! ```
//! use bezier_qp::prelude::*;
//! use nalgebra::{DMatrix, DVector, Vector2};
//!
//! // Stay inside the unit box [0, 1]^2
//! let walls = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, -1.0, 0.0, 0.0, 1.0, 0.0, -1.0]);
//! let bounds = DVector::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
//!
//! let def = ProblemDefinition::<f64, 2>::new(5, 1.0)
//!     .with_flags(BoundaryFlags::INIT_POS | BoundaryFlags::INIT_VEL | BoundaryFlags::END_POS)
//!     .with_start(Vector2::new(0.0, 0.0))
//!     .with_end(Vector2::new(1.0, 1.0))
//!     .with_inequality(walls, bounds)?;
//!
//! let problem = generate_problem(&def, &Settings::default())?;
//! assert_eq!(problem.num_unknowns(), 6);
//! # Ok::<(), bezier_qp::OptError>(())
//! ```
//!
//! ## Architecture
//!
//! - **Affine variables** `B x + c` keep control points symbolic
//! - **Boundary elimination** fixes control points from endpoint derivatives
//! - **Assembly** splits the curve and substitutes each segment's control
//!   points into its inequality
//! - **Bezier products** integrate squared derivatives into a quadratic form
//! - **Stuffing** hands the result to Clarabel in its native layout

pub mod curve;
pub mod error;
pub mod expr;
pub mod problem;
pub mod solver;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```
/// use bezier_qp::prelude::*;
/// ```
pub mod prelude {
    // Expressions
    pub use crate::expr::{AffineVariable, Point, QuadraticVariable, Real};

    // Curves
    pub use crate::curve::{BezierCurve, SymbolicCurve};

    // Problem
    pub use crate::problem::{
        generate_problem, load_problem, BoundaryCondition, BoundaryFlags, BoundaryPolicy,
        CostKind, CurveConstraints, Problem, ProblemData, ProblemDefinition, Settings,
    };

    // Solver
    pub use crate::solver::{stuff_problem, ClarabelData, StuffedProblem};

    // Errors
    pub use crate::error::{OptError, Result};
}

// Re-export main types at crate root
pub use error::{OptError, Result};
pub use problem::{generate_problem, Problem, ProblemDefinition, Settings};
