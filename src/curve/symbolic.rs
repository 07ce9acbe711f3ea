//! Bezier curves with symbolic control points.

use nalgebra::DVector;

use super::bezier::BezierCurve;
use crate::error::{OptError, Result};
use crate::expr::{to_f64, AffineVariable, Point, Real};

/// A Bezier curve whose control points are affine in one shared unknown vector.
///
/// Every control point has the same coefficient width, so any two points (and
/// anything derived from them by splitting or differentiating) can be combined
/// and evaluated against the same `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicCurve<T: Real, const D: usize> {
    curve: BezierCurve<T, AffineVariable<T, D>>,
    num_unknowns: usize,
}

impl<T: Real, const D: usize> SymbolicCurve<T, D> {
    /// Create a symbolic curve; all control points must share one width.
    pub fn new(points: Vec<AffineVariable<T, D>>, duration: T) -> Result<Self> {
        let width = points.first().map(|p| p.width()).unwrap_or(0);
        if let Some(p) = points.iter().find(|p| p.width() != width) {
            return Err(OptError::shape(
                format!("control points over {} unknowns", width),
                format!("a control point over {} unknowns", p.width()),
            ));
        }
        let curve = BezierCurve::new(points, duration)?;
        Ok(SymbolicCurve {
            curve,
            num_unknowns: width,
        })
    }

    /// Length of the unknown vector the control points are expressed over.
    pub fn num_unknowns(&self) -> usize {
        self.num_unknowns
    }

    pub fn degree(&self) -> usize {
        self.curve.degree()
    }

    pub fn duration(&self) -> T {
        self.curve.duration()
    }

    pub fn waypoints(&self) -> &[AffineVariable<T, D>] {
        self.curve.waypoints()
    }

    /// The underlying generic curve.
    pub fn curve(&self) -> &BezierCurve<T, AffineVariable<T, D>> {
        &self.curve
    }

    /// Split at local time `t`; both halves keep the same unknown vector.
    pub fn split(&self, t: T) -> Result<(Self, Self)> {
        let (first, second) = self.curve.split(t)?;
        Ok((self.wrap(first), self.wrap(second)))
    }

    /// Split at a strictly increasing sequence of absolute times in `(0, duration)`.
    ///
    /// Returns `times.len() + 1` contiguous segments.
    pub fn split_at(&self, times: &[T]) -> Result<Vec<Self>> {
        let mut segments = Vec::with_capacity(times.len() + 1);
        let mut current = self.clone();
        let mut elapsed = T::zero();
        for &t in times {
            if t <= elapsed {
                return Err(OptError::InvalidProblem(format!(
                    "split times must be strictly increasing, got {} after {}",
                    to_f64(t),
                    to_f64(elapsed)
                )));
            }
            let (first, second) = current.split(t - elapsed)?;
            segments.push(first);
            current = second;
            elapsed = t;
        }
        segments.push(current);
        Ok(segments)
    }

    /// The `order`-th time derivative, still symbolic.
    pub fn derivative(&self, order: usize) -> Self {
        self.wrap(self.curve.derivative(order))
    }

    /// Evaluate at time `t` for a concrete unknown vector.
    pub fn evaluate(&self, t: T, x: &DVector<T>) -> Result<Point<T, D>> {
        self.curve.evaluate(t)?.evaluate(x)
    }

    /// Substitute a concrete unknown vector into every control point.
    pub fn instantiate(&self, x: &DVector<T>) -> Result<BezierCurve<T, Point<T, D>>> {
        let points = self
            .waypoints()
            .iter()
            .map(|p| p.evaluate(x))
            .collect::<Result<Vec<_>>>()?;
        BezierCurve::new(points, self.duration())
    }

    fn wrap(&self, curve: BezierCurve<T, AffineVariable<T, D>>) -> Self {
        SymbolicCurve {
            curve,
            num_unknowns: self.num_unknowns,
        }
    }
}
