//! Assembly of the global inequality system.
//!
//! Each segment's constraint `C p <= d` is imposed on every control point of
//! that segment. By the convex hull property of Bezier curves this keeps the
//! whole segment inside the polytope. Substituting `p = B x + c` gives the
//! rows `C B x <= d - C c`, linear in the reduced unknowns.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::data::ProblemData;
use super::definition::ProblemDefinition;
use crate::curve::SymbolicCurve;
use crate::error::Result;
use crate::expr::Real;

/// Cut the problem curve at the declared split times.
pub fn split_segments<T: Real, const D: usize>(
    def: &ProblemDefinition<T, D>,
    data: &ProblemData<T, D>,
) -> Result<Vec<SymbolicCurve<T, D>>> {
    data.curve().split_at(def.split_times())
}

/// Number of rows of the assembled system.
///
/// Splitting never changes the degree, so every segment has
/// `num_control_points` control points.
pub fn count_inequality_rows<T: Real, const D: usize>(
    def: &ProblemDefinition<T, D>,
    data: &ProblemData<T, D>,
) -> usize {
    def.inequalities()
        .iter()
        .map(|ineq| ineq.rows() * data.num_control_points())
        .sum()
}

/// Build `(A, b)` such that `A x <= b` holds exactly when every control point
/// of every segment satisfies its segment's inequality.
///
/// Rows are ordered by segment, then by control point within the segment.
///
/// # Panics
///
/// Panics if the number of inequality blocks does not match the number of
/// segments; `ProblemDefinition::validate` reports this as an error first.
pub fn assemble_inequalities<T: Real, const D: usize>(
    def: &ProblemDefinition<T, D>,
    data: &ProblemData<T, D>,
) -> Result<(DMatrix<T>, DVector<T>)> {
    let segments = split_segments(def, data)?;
    assert_eq!(
        segments.len(),
        def.inequalities().len(),
        "one inequality block per curve segment"
    );

    let rows = count_inequality_rows(def, data);
    let cols = data.num_unknowns();
    let mut matrix = DMatrix::zeros(rows, cols);
    let mut vector = DVector::zeros(rows);

    let mut row = 0;
    for (segment, ineq) in segments.iter().zip(def.inequalities()) {
        let c = ineq.matrix();
        let n = ineq.rows();
        for point in segment.waypoints() {
            let block: DMatrix<T> = c * point.b();
            matrix.view_mut((row, 0), (n, cols)).copy_from(&block);
            let rhs: DVector<T> = ineq.vector() - c * point.c();
            vector.rows_mut(row, n).copy_from(&rhs);
            row += n;
        }
    }
    assert_eq!(row, rows, "assembled rows must fill the inequality system");

    debug!(
        segments = segments.len(),
        rows, cols, "assembled inequality system"
    );
    Ok((matrix, vector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::flags::BoundaryFlags;
    use nalgebra::Vector2;

    fn half_plane() -> (DMatrix<f64>, DVector<f64>) {
        // x + y <= 1
        (DMatrix::from_row_slice(1, 2, &[1.0, 1.0]), DVector::from_vec(vec![1.0]))
    }

    #[test]
    fn test_single_segment_rows() {
        let (m, v) = half_plane();
        let def = ProblemDefinition::<f64, 2>::new(2, 1.0)
            .with_flags(BoundaryFlags::INIT_POS)
            .with_start(Vector2::new(0.25, 0.25))
            .with_inequality(m, v)
            .unwrap();
        let data = ProblemData::new(&def).unwrap();
        let (a, b) = assemble_inequalities(&def, &data).unwrap();
        assert_eq!(a.shape(), (3, 4));
        // constant first point: no dependence on x, rhs 1 - 0.5
        assert_eq!(a.row(0).iter().copied().collect::<Vec<_>>(), vec![0.0; 4]);
        assert!((b[0] - 0.5).abs() < 1e-12);
        // free points map straight through
        assert_eq!(a.row(1).iter().copied().collect::<Vec<_>>(), vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(a.row(2).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(b[1], 1.0);
    }

    #[test]
    fn test_row_count_with_splits() {
        let (m, v) = half_plane();
        let def = ProblemDefinition::<f64, 2>::new(3, 1.0)
            .with_split_times(vec![0.4])
            .unwrap()
            .with_inequality(m.clone(), v.clone())
            .unwrap()
            .with_inequality(DMatrix::identity(2, 2), DVector::from_element(2, 3.0))
            .unwrap();
        let data = ProblemData::new(&def).unwrap();
        assert_eq!(count_inequality_rows(&def, &data), 4 + 8);
        let (a, b) = assemble_inequalities(&def, &data).unwrap();
        assert_eq!(a.nrows(), 12);
        assert_eq!(b.len(), 12);
        assert_eq!(a.ncols(), 8);
    }

    #[test]
    #[should_panic(expected = "one inequality block per curve segment")]
    fn test_segment_count_mismatch_panics() {
        let (m, v) = half_plane();
        let def = ProblemDefinition::<f64, 2>::new(3, 1.0)
            .with_split_times(vec![0.4])
            .unwrap()
            .with_inequality(m, v)
            .unwrap();
        let data = ProblemData::new(&def).unwrap();
        let _ = assemble_inequalities(&def, &data);
    }
}
