//! Generic Bezier curves defined on `[0, duration]`.

use std::ops::{Add, Mul, Sub};

use crate::error::{OptError, Result};
use crate::expr::{real, to_f64, Real};

/// Anything that can serve as a control point: closed under sums,
/// differences and scaling by the curve scalar.
pub trait ControlPoint<T>: Clone + Add<Output = Self> + Sub<Output = Self> + Mul<T, Output = Self> {}

impl<T, P> ControlPoint<T> for P where P: Clone + Add<Output = P> + Sub<Output = P> + Mul<T, Output = P> {}

/// A Bezier curve of degree `waypoints.len() - 1` over `[0, duration]`.
///
/// Control points are combined with their own operators, which for
/// `AffineVariable` panic on mismatched widths. Curves over symbolic points
/// should be built through `SymbolicCurve::new`, which checks widths up front.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve<T: Real, P> {
    points: Vec<P>,
    duration: T,
}

impl<T: Real, P: ControlPoint<T>> BezierCurve<T, P> {
    /// Create a curve from its control points.
    pub fn new(points: Vec<P>, duration: T) -> Result<Self> {
        if points.is_empty() {
            return Err(OptError::InvalidProblem(
                "a Bezier curve needs at least one control point".into(),
            ));
        }
        if !(duration > T::zero()) {
            return Err(OptError::InvalidProblem(format!(
                "curve duration must be positive, got {}",
                duration
            )));
        }
        Ok(BezierCurve { points, duration })
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    pub fn duration(&self) -> T {
        self.duration
    }

    /// Control points, first to last.
    pub fn waypoints(&self) -> &[P] {
        &self.points
    }

    pub fn into_waypoints(self) -> Vec<P> {
        self.points
    }

    /// Evaluate the curve at time `t` in `[0, duration]`.
    ///
    /// # Panics
    ///
    /// Panics if the control point operators do, e.g. affine points of
    /// different widths.
    pub fn evaluate(&self, t: T) -> Result<P> {
        self.check_time(t, true)?;
        let (left, _) = self.de_casteljau(t / self.duration);
        Ok(left[self.degree()].clone())
    }

    /// Split at local time `t` in `(0, duration)`.
    ///
    /// The first curve covers `[0, t]`, the second `[t, duration]` shifted to
    /// start at zero. Control points of both halves are linear combinations of
    /// the input ones.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`BezierCurve::evaluate`].
    pub fn split(&self, t: T) -> Result<(Self, Self)> {
        self.check_time(t, false)?;
        let (left, right) = self.de_casteljau(t / self.duration);
        Ok((
            BezierCurve {
                points: left,
                duration: t,
            },
            BezierCurve {
                points: right,
                duration: self.duration - t,
            },
        ))
    }

    /// The `order`-th time derivative.
    ///
    /// Each step maps `P_i` to `n (P_{i+1} - P_i) / duration`. Differentiating
    /// a constant curve yields the single zero point.
    pub fn derivative(&self, order: usize) -> Self {
        let mut points = self.points.clone();
        for _ in 0..order {
            if points.len() == 1 {
                let p = points[0].clone();
                points = vec![p.clone() - p];
                break;
            }
            let scale = real::<T>((points.len() - 1) as f64) / self.duration;
            points = points
                .windows(2)
                .map(|w| (w[1].clone() - w[0].clone()) * scale)
                .collect();
        }
        BezierCurve {
            points,
            duration: self.duration,
        }
    }

    fn check_time(&self, t: T, closed: bool) -> Result<()> {
        let inside = if closed {
            t >= T::zero() && t <= self.duration
        } else {
            t > T::zero() && t < self.duration
        };
        if inside {
            Ok(())
        } else {
            Err(OptError::TimeOutOfRange {
                time: to_f64(t),
                duration: to_f64(self.duration),
            })
        }
    }

    /// Run de Casteljau at normalized parameter `u`, returning the control
    /// points of the left and right sub-curves.
    fn de_casteljau(&self, u: T) -> (Vec<P>, Vec<P>) {
        let n = self.degree();
        let one_minus_u = T::one() - u;
        let mut level = self.points.clone();
        let mut left = Vec::with_capacity(n + 1);
        let mut right = Vec::with_capacity(n + 1);
        left.push(level[0].clone());
        right.push(level[n].clone());
        for _ in 0..n {
            level = level
                .windows(2)
                .map(|w| w[0].clone() * one_minus_u + w[1].clone() * u)
                .collect();
            left.push(level[0].clone());
            right.push(level[level.len() - 1].clone());
        }
        right.reverse();
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::bernstein;
    use nalgebra::Vector2;

    fn sample() -> BezierCurve<f64, Vector2<f64>> {
        BezierCurve::new(
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 2.0),
                Vector2::new(3.0, 3.0),
                Vector2::new(4.0, 0.0),
            ],
            2.0,
        )
        .unwrap()
    }

    fn by_basis(curve: &BezierCurve<f64, Vector2<f64>>, t: f64) -> Vector2<f64> {
        let n = curve.degree();
        let u = t / curve.duration();
        curve
            .waypoints()
            .iter()
            .enumerate()
            .fold(Vector2::zeros(), |acc, (i, p)| acc + p * bernstein(i, n, u))
    }

    #[test]
    fn test_evaluate_matches_basis() {
        let curve = sample();
        for &t in &[0.0, 0.3, 1.0, 1.7, 2.0] {
            let diff = curve.evaluate(t).unwrap() - by_basis(&curve, t);
            assert!(diff.norm() < 1e-12);
        }
        assert!(curve.evaluate(2.5).is_err());
    }

    #[test]
    fn test_split_halves_agree() {
        let curve = sample();
        let (first, second) = curve.split(0.8).unwrap();
        assert!((first.duration() - 0.8).abs() < 1e-12);
        assert!((second.duration() - 1.2).abs() < 1e-12);
        for &t in &[0.0, 0.25, 0.8] {
            let diff = first.evaluate(t).unwrap() - curve.evaluate(t).unwrap();
            assert!(diff.norm() < 1e-12);
        }
        for &t in &[0.0, 0.6, 1.2] {
            let diff = second.evaluate(t).unwrap() - curve.evaluate(t + 0.8).unwrap();
            assert!(diff.norm() < 1e-12);
        }
    }

    #[test]
    fn test_split_rejects_endpoints() {
        let curve = sample();
        assert!(matches!(curve.split(0.0), Err(OptError::TimeOutOfRange { .. })));
        assert!(curve.split(2.0).is_err());
    }

    #[test]
    fn test_derivative_finite_difference() {
        let curve = sample();
        let vel = curve.derivative(1);
        assert_eq!(vel.degree(), 2);
        let h = 1e-6;
        let t = 0.9;
        let fd = (curve.evaluate(t + h).unwrap() - curve.evaluate(t - h).unwrap()) / (2.0 * h);
        assert!((vel.evaluate(t).unwrap() - fd).norm() < 1e-6);
    }

    #[test]
    fn test_derivative_past_degree_is_zero() {
        let curve = sample();
        let d = curve.derivative(5);
        assert_eq!(d.degree(), 0);
        assert_eq!(d.waypoints()[0], Vector2::zeros());
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(BezierCurve::<f64, Vector2<f64>>::new(vec![], 1.0).is_err());
        assert!(BezierCurve::new(vec![Vector2::new(1.0, 1.0)], 0.0).is_err());
    }

    #[test]
    #[should_panic]
    fn test_mixed_width_affine_points_panic() {
        use crate::expr::AffineVariable;
        let curve = BezierCurve::new(
            vec![
                AffineVariable::<f64, 2>::unknown(0, 1).unwrap(),
                AffineVariable::<f64, 2>::unknown(0, 2).unwrap(),
            ],
            1.0,
        )
        .unwrap();
        let _ = curve.evaluate(0.5);
    }
}
