//! Symbolic expressions over the unknown vector of a problem.
//!
//! - `AffineVariable` - a point `B x + c`
//! - `QuadraticVariable` - a scalar `x' A x + b' x + c`

pub mod affine;
pub mod quadratic;

use nalgebra::RealField;

pub use affine::{AffineVariable, CoeffMatrix, Point};
pub use quadratic::QuadraticVariable;

/// Scalar type accepted throughout the crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Convert an `f64` literal into the working scalar.
pub(crate) fn real<T: Real>(value: f64) -> T {
    nalgebra::convert(value)
}

/// Convert a working scalar back to `f64` (used for error reporting).
pub(crate) fn to_f64<T: Real>(value: T) -> f64 {
    nalgebra::try_convert::<T, f64>(value).unwrap_or(f64::NAN)
}
