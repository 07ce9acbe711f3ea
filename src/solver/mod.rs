//! Solver hand-off for bezier_qp.
//!
//! This module provides:
//! - Matrix stuffing to convert generated problems to solver format
//! - Conversion of the stuffed data to Clarabel types

pub mod clarabel;
pub mod stuffing;

pub use self::clarabel::{to_clarabel_csc, ClarabelData};
pub use stuffing::{slack, stuff_problem, StuffedProblem};
