//! User-facing description of a trajectory problem.

use nalgebra::{DMatrix, DVector};

use super::flags::BoundaryFlags;
use crate::error::{OptError, Result};
use crate::expr::{to_f64, Point, Real};

/// Derivative values imposed at the curve endpoints.
///
/// Only the entries whose boundary flag is set are used.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveConstraints<T: Real, const D: usize> {
    pub init_vel: Point<T, D>,
    pub init_acc: Point<T, D>,
    pub init_jerk: Point<T, D>,
    pub end_vel: Point<T, D>,
    pub end_acc: Point<T, D>,
    pub end_jerk: Point<T, D>,
}

impl<T: Real, const D: usize> Default for CurveConstraints<T, D> {
    fn default() -> Self {
        CurveConstraints {
            init_vel: Point::zeros(),
            init_acc: Point::zeros(),
            init_jerk: Point::zeros(),
            end_vel: Point::zeros(),
            end_acc: Point::zeros(),
            end_jerk: Point::zeros(),
        }
    }
}

/// The constraint `matrix * p <= vector` on a point `p`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInequality<T: Real> {
    matrix: DMatrix<T>,
    vector: DVector<T>,
}

impl<T: Real> LinearInequality<T> {
    /// Pair a matrix with its right-hand side; row counts must agree.
    pub fn new(matrix: DMatrix<T>, vector: DVector<T>) -> Result<Self> {
        if matrix.nrows() != vector.len() {
            return Err(OptError::shape(
                format!("inequality vector with {} rows", matrix.nrows()),
                format!("{} rows", vector.len()),
            ));
        }
        Ok(LinearInequality { matrix, vector })
    }

    pub fn matrix(&self) -> &DMatrix<T> {
        &self.matrix
    }

    pub fn vector(&self) -> &DVector<T> {
        &self.vector
    }

    /// Number of scalar inequalities.
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Dimension of the constrained point.
    pub fn cols(&self) -> usize {
        self.matrix.ncols()
    }
}

/// A constrained trajectory problem over one Bezier curve.
///
/// The curve of degree `degree` spans `[0, total_time]`. It is cut at
/// `split_times` into `split_times.len() + 1` segments, and every control
/// point of segment `i` must satisfy the `i`-th linear inequality.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemDefinition<T: Real, const D: usize> {
    degree: usize,
    total_time: T,
    flags: BoundaryFlags,
    start: Point<T, D>,
    end: Point<T, D>,
    curve_constraints: CurveConstraints<T, D>,
    split_times: Vec<T>,
    inequalities: Vec<LinearInequality<T>>,
}

impl<T: Real, const D: usize> ProblemDefinition<T, D> {
    /// A problem with no boundary conditions, no splits and no inequalities.
    pub fn new(degree: usize, total_time: T) -> Self {
        ProblemDefinition {
            degree,
            total_time,
            flags: BoundaryFlags::NONE,
            start: Point::zeros(),
            end: Point::zeros(),
            curve_constraints: CurveConstraints::default(),
            split_times: Vec::new(),
            inequalities: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: BoundaryFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_start(mut self, start: Point<T, D>) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: Point<T, D>) -> Self {
        self.end = end;
        self
    }

    pub fn with_curve_constraints(mut self, constraints: CurveConstraints<T, D>) -> Self {
        self.curve_constraints = constraints;
        self
    }

    pub fn with_split_times(mut self, times: Vec<T>) -> Result<Self> {
        self.set_split_times(times)?;
        Ok(self)
    }

    pub fn with_inequality(mut self, matrix: DMatrix<T>, vector: DVector<T>) -> Result<Self> {
        self.add_inequality(matrix, vector)?;
        Ok(self)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn set_degree(&mut self, degree: usize) {
        self.degree = degree;
    }

    /// Number of control points, `degree + 1`, saturating at `usize::MAX`.
    pub fn num_control_points(&self) -> usize {
        self.degree.saturating_add(1)
    }

    pub fn total_time(&self) -> T {
        self.total_time
    }

    pub fn set_total_time(&mut self, total_time: T) {
        self.total_time = total_time;
    }

    pub fn flags(&self) -> BoundaryFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: BoundaryFlags) {
        self.flags = flags;
    }

    pub fn start(&self) -> &Point<T, D> {
        &self.start
    }

    pub fn set_start(&mut self, start: Point<T, D>) {
        self.start = start;
    }

    pub fn end(&self) -> &Point<T, D> {
        &self.end
    }

    pub fn set_end(&mut self, end: Point<T, D>) {
        self.end = end;
    }

    pub fn curve_constraints(&self) -> &CurveConstraints<T, D> {
        &self.curve_constraints
    }

    pub fn set_curve_constraints(&mut self, constraints: CurveConstraints<T, D>) {
        self.curve_constraints = constraints;
    }

    pub fn split_times(&self) -> &[T] {
        &self.split_times
    }

    /// Replace the split times; they must be strictly increasing inside `(0, total_time)`.
    pub fn set_split_times(&mut self, times: Vec<T>) -> Result<()> {
        check_split_times(&times, self.total_time)?;
        self.split_times = times;
        Ok(())
    }

    /// Number of curve segments, `split_times.len() + 1`.
    pub fn num_segments(&self) -> usize {
        self.split_times.len() + 1
    }

    pub fn inequalities(&self) -> &[LinearInequality<T>] {
        &self.inequalities
    }

    /// The inequality of segment `index`.
    pub fn inequality(&self, index: usize) -> Result<&LinearInequality<T>> {
        self.inequalities.get(index).ok_or(OptError::IndexOutOfRange {
            index,
            len: self.inequalities.len(),
        })
    }

    /// Remove and return the inequality at `index`.
    pub fn remove_inequality(&mut self, index: usize) -> Result<LinearInequality<T>> {
        if index >= self.inequalities.len() {
            return Err(OptError::IndexOutOfRange {
                index,
                len: self.inequalities.len(),
            });
        }
        Ok(self.inequalities.remove(index))
    }

    /// Append the inequality of the next segment.
    ///
    /// The matrix must have one column per spatial dimension and as many rows
    /// as the vector.
    pub fn add_inequality(&mut self, matrix: DMatrix<T>, vector: DVector<T>) -> Result<()> {
        if matrix.ncols() != D {
            return Err(OptError::shape(
                format!("inequality matrix with {} columns", D),
                format!("{} columns", matrix.ncols()),
            ));
        }
        self.inequalities.push(LinearInequality::new(matrix, vector)?);
        Ok(())
    }

    /// Check the whole definition before building a problem from it.
    pub fn validate(&self) -> Result<()> {
        check_degree(self.degree)?;
        if !(self.total_time > T::zero()) {
            return Err(OptError::InvalidProblem(format!(
                "total time must be positive, got {}",
                to_f64(self.total_time)
            )));
        }
        check_split_times(&self.split_times, self.total_time)?;
        if self.inequalities.len() != self.num_segments() {
            return Err(OptError::InvalidProblem(format!(
                "{} segments but {} inequality blocks",
                self.num_segments(),
                self.inequalities.len()
            )));
        }
        Ok(())
    }
}

/// Control-point count for `degree`, rejecting degrees with no representable count.
pub(crate) fn check_degree(degree: usize) -> Result<usize> {
    degree
        .checked_add(1)
        .ok_or_else(|| OptError::InvalidProblem(format!("degree {} is too large", degree)))
}

fn check_split_times<T: Real>(times: &[T], total_time: T) -> Result<()> {
    let mut previous = T::zero();
    for &t in times {
        if !(t > previous && t < total_time) {
            return Err(OptError::InvalidProblem(format!(
                "split time {} must be greater than {} and less than {}",
                to_f64(t),
                to_f64(previous),
                to_f64(total_time)
            )));
        }
        previous = t;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn box_constraint() -> (DMatrix<f64>, DVector<f64>) {
        let mut m = DMatrix::zeros(6, 3);
        for i in 0..3 {
            m[(2 * i, i)] = 1.0;
            m[(2 * i + 1, i)] = -1.0;
        }
        (m, DVector::from_element(6, 2.0))
    }

    #[test]
    fn test_accessors() {
        let mut def = ProblemDefinition::<f64, 3>::new(5, 1.0)
            .with_start(Vector3::new(1.0, 2.0, 3.0))
            .with_flags(BoundaryFlags::INIT_POS);
        def.set_end(Vector3::new(0.0, 0.0, 1.0));
        def.set_degree(6);
        def.set_total_time(2.0);
        assert_eq!(def.start(), &Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(def.end(), &Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(def.num_control_points(), 7);
        assert_eq!(def.total_time(), 2.0);
        assert_eq!(def.flags(), BoundaryFlags::INIT_POS);
    }

    #[test]
    fn test_split_times_validation() {
        let mut def = ProblemDefinition::<f64, 3>::new(5, 2.0);
        assert!(def.set_split_times(vec![0.5, 1.5]).is_ok());
        assert_eq!(def.num_segments(), 3);
        assert!(def.set_split_times(vec![1.5, 0.5]).is_err());
        assert!(def.set_split_times(vec![0.0]).is_err());
        assert!(def.set_split_times(vec![2.0]).is_err());
        assert_eq!(def.split_times(), &[0.5, 1.5]);
    }

    #[test]
    fn test_inequality_accessors() {
        let (m, v) = box_constraint();
        let mut def = ProblemDefinition::<f64, 3>::new(5, 1.0);
        def.add_inequality(m.clone(), v.clone()).unwrap();
        def.add_inequality(m.clone() * 2.0, v.clone()).unwrap();
        assert_eq!(def.inequality(1).unwrap().matrix(), &(m.clone() * 2.0));
        assert!(matches!(
            def.inequality(2),
            Err(OptError::IndexOutOfRange { index: 2, len: 2 })
        ));

        let removed = def.remove_inequality(0).unwrap();
        assert_eq!(removed.matrix(), &m);
        assert_eq!(def.inequalities().len(), 1);
        assert!(def.remove_inequality(1).is_err());
    }

    #[test]
    fn test_add_inequality_shape_errors() {
        let mut def = ProblemDefinition::<f64, 3>::new(5, 1.0);
        let bad_rows = def.add_inequality(DMatrix::zeros(4, 3), DVector::zeros(3));
        assert!(matches!(bad_rows, Err(OptError::ShapeMismatch { .. })));
        let bad_cols = def.add_inequality(DMatrix::zeros(4, 2), DVector::zeros(4));
        assert!(matches!(bad_cols, Err(OptError::ShapeMismatch { .. })));
        assert!(def.inequalities().is_empty());
    }

    #[test]
    fn test_validate_segment_count() {
        let (m, v) = box_constraint();
        let def = ProblemDefinition::<f64, 3>::new(5, 1.0)
            .with_split_times(vec![0.5])
            .unwrap()
            .with_inequality(m.clone(), v.clone())
            .unwrap();
        assert!(matches!(def.validate(), Err(OptError::InvalidProblem(_))));
        let def = def.with_inequality(m, v).unwrap();
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_validate_total_time() {
        let def = ProblemDefinition::<f64, 3>::new(5, 0.0);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_degree_without_control_point_count() {
        let def = ProblemDefinition::<f64, 3>::new(usize::MAX, 1.0)
            .with_inequality(DMatrix::zeros(1, 3), DVector::zeros(1))
            .unwrap();
        assert_eq!(def.num_control_points(), usize::MAX);
        assert!(matches!(def.validate(), Err(OptError::InvalidProblem(_))));
    }
}
