//! Bezier curves over concrete and symbolic control points.
//!
//! - `BezierCurve` - evaluation, de Casteljau splitting and derivatives for any
//!   control point type closed under `+`, `-` and scaling
//! - `SymbolicCurve` - a Bezier curve whose control points are `AffineVariable`s
//!   over one shared unknown vector
//! - `bernstein` - exact binomial coefficients and the Bernstein basis

pub mod bernstein;
pub mod bezier;
pub mod symbolic;

pub use bernstein::{bernstein, binomial, binomial_f64};
pub use bezier::{BezierCurve, ControlPoint};
pub use symbolic::SymbolicCurve;
