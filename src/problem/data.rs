//! Boundary elimination: fixing the control points pinned down by the
//! boundary conditions and expressing the rest as free unknowns.
//!
//! For a curve of degree `n` on `[0, T]`, the `k`-th derivative at the start
//! only involves the first `k + 1` control points:
//!
//! ```text
//! B^(k)(0) = n (n-1) ... (n-k+1) / T^k * sum_i (-1)^(k-i) C(k, i) P_i
//! ```
//!
//! so each derivative condition fixes one more control point from the ones
//! before it. The end side is the mirror image with the sign of odd orders
//! flipped.

use tracing::{debug, warn};

use super::definition::{check_degree, ProblemDefinition};
use super::flags::BoundaryFlags;
use super::BoundaryPolicy;
use crate::curve::{binomial_f64, SymbolicCurve};
use crate::error::{OptError, Result};
use crate::expr::{real, AffineVariable, Point, Real};

/// Control points of a problem after boundary elimination.
///
/// Every control point is an `AffineVariable` over the reduced unknown vector
/// of length `num_variables * D`. Cloning deep-copies the curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemData<T: Real, const D: usize> {
    variables: Vec<AffineVariable<T, D>>,
    num_variables: usize,
    num_control_points: usize,
    start_variable_index: usize,
    num_state_constraints: usize,
    curve: SymbolicCurve<T, D>,
}

impl<T: Real, const D: usize> ProblemData<T, D> {
    /// Eliminate boundary control points, rejecting flags that are not prefix-closed.
    pub fn new(def: &ProblemDefinition<T, D>) -> Result<Self> {
        eliminate_boundaries(def, BoundaryPolicy::Strict)
    }

    /// One affine variable per control point, constants included.
    pub fn variables(&self) -> &[AffineVariable<T, D>] {
        &self.variables
    }

    /// Number of free control points.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Number of control points fixed by boundary conditions.
    pub fn num_constants(&self) -> usize {
        self.num_control_points - self.num_variables
    }

    pub fn num_control_points(&self) -> usize {
        self.num_control_points
    }

    /// Index of the first free control point.
    pub fn start_variable_index(&self) -> usize {
        self.start_variable_index
    }

    /// Active boundary conditions in excess of the free control points.
    pub fn num_state_constraints(&self) -> usize {
        self.num_state_constraints
    }

    /// Length of the reduced unknown vector.
    pub fn num_unknowns(&self) -> usize {
        self.num_variables * D
    }

    pub fn curve(&self) -> &SymbolicCurve<T, D> {
        &self.curve
    }
}

/// Build the reduced variable set for a problem definition.
pub fn eliminate_boundaries<T: Real, const D: usize>(
    def: &ProblemDefinition<T, D>,
    policy: BoundaryPolicy,
) -> Result<ProblemData<T, D>> {
    let flags = resolve_flags(def.flags(), policy)?;
    let num_control_points = check_degree(def.degree())?;
    let active = flags.active_count();
    if active >= num_control_points {
        return Err(OptError::TooManyConstraints {
            active,
            control_points: num_control_points,
        });
    }

    let constraints = def.curve_constraints();
    let head = boundary_points(
        *def.start(),
        [&constraints.init_vel, &constraints.init_acc, &constraints.init_jerk],
        flags.start_order(),
        def.degree(),
        def.total_time(),
        false,
    );
    let mut tail = boundary_points(
        *def.end(),
        [&constraints.end_vel, &constraints.end_acc, &constraints.end_jerk],
        flags.end_order(),
        def.degree(),
        def.total_time(),
        true,
    );
    tail.reverse();

    let start_variable_index = head.len();
    let num_variables = num_control_points - head.len() - tail.len();
    let width = num_variables * D;

    let local = head
        .into_iter()
        .map(AffineVariable::constant)
        .chain((0..num_variables).map(|_| AffineVariable::identity()))
        .chain(tail.into_iter().map(AffineVariable::constant));
    let variables = local
        .enumerate()
        .map(|(i, var)| {
            let offset = if var.is_zero() {
                0
            } else {
                (i - start_variable_index) * D
            };
            var.pad(offset, width)
        })
        .collect::<Result<Vec<_>>>()?;

    let curve = SymbolicCurve::new(variables.clone(), def.total_time())?;
    let num_state_constraints = active.saturating_sub(num_variables);

    debug!(
        num_control_points,
        num_variables,
        start_variable_index,
        num_state_constraints,
        "eliminated boundary control points"
    );

    Ok(ProblemData {
        variables,
        num_variables,
        num_control_points,
        start_variable_index,
        num_state_constraints,
        curve,
    })
}

fn resolve_flags(flags: BoundaryFlags, policy: BoundaryPolicy) -> Result<BoundaryFlags> {
    match policy {
        BoundaryPolicy::Strict => {
            flags.validate()?;
            Ok(flags)
        }
        BoundaryPolicy::Truncate => {
            let effective = flags.effective();
            if effective != flags {
                warn!(?flags, ?effective, "ignoring boundary conditions without lower orders");
            }
            Ok(effective)
        }
    }
}

/// Control points fixed by the first `order` conditions at one end, nearest first.
///
/// `derivatives` holds the imposed velocity, acceleration and jerk. With
/// `from_end` set, odd derivatives change sign since the points are walked
/// against the curve direction.
fn boundary_points<T: Real, const D: usize>(
    anchor: Point<T, D>,
    derivatives: [&Point<T, D>; 3],
    order: usize,
    degree: usize,
    duration: T,
    from_end: bool,
) -> Vec<Point<T, D>> {
    let mut points = Vec::with_capacity(order);
    if order == 0 {
        return points;
    }
    points.push(anchor);
    let mut falling = T::one();
    let mut time_power = T::one();
    for k in 1..order.min(4) {
        falling *= real::<T>((degree + 1 - k) as f64);
        time_power *= duration;
        let sign = if from_end && k % 2 == 1 {
            -T::one()
        } else {
            T::one()
        };
        let mut p = derivatives[k - 1] * (sign * time_power / falling);
        for (i, prev) in points.iter().enumerate() {
            let weight: T = real(binomial_f64(k as u64, i as u64));
            if (k - i) % 2 == 0 {
                p -= prev * weight;
            } else {
                p += prev * weight;
            }
        }
        points.push(p);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::flags::BoundaryFlags as F;
    use nalgebra::{DVector, Vector3};

    fn def(degree: usize, flags: F) -> ProblemDefinition<f64, 3> {
        ProblemDefinition::new(degree, 2.0)
            .with_flags(flags)
            .with_start(Vector3::new(1.0, 2.0, 3.0))
            .with_end(Vector3::new(4.0, 5.0, 6.0))
    }

    #[test]
    fn test_no_flags_all_free() {
        let data = ProblemData::new(&def(3, F::NONE)).unwrap();
        assert_eq!(data.num_variables(), 4);
        assert_eq!(data.start_variable_index(), 0);
        assert_eq!(data.num_unknowns(), 12);
        assert!(data.variables().iter().all(|v| !v.is_zero()));
    }

    #[test]
    fn test_positions_only() {
        let data = ProblemData::new(&def(3, F::INIT_POS | F::END_POS)).unwrap();
        assert_eq!(data.num_variables(), 2);
        assert_eq!(data.num_constants(), 2);
        let vars = data.variables();
        assert!(vars[0].is_zero() && vars[3].is_zero());
        assert_eq!(vars[0].c(), &Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(vars[3].c(), &Vector3::new(4.0, 5.0, 6.0));
        let x = DVector::from_fn(6, |i, _| i as f64);
        assert_eq!(vars[1].evaluate(&x).unwrap(), Vector3::new(0.0, 1.0, 2.0));
        assert_eq!(vars[2].evaluate(&x).unwrap(), Vector3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_too_many_constraints() {
        let err = ProblemData::new(&def(3, F::ALL)).unwrap_err();
        assert!(matches!(
            err,
            OptError::TooManyConstraints {
                active: 8,
                control_points: 4
            }
        ));
        let full = F::INIT_POS | F::INIT_VEL | F::END_POS | F::END_VEL;
        assert!(ProblemData::new(&def(3, full)).is_err());
        assert!(ProblemData::new(&def(4, full)).is_ok());
    }

    #[test]
    fn test_unrepresentable_degree_rejected() {
        let def = ProblemDefinition::<f64, 3>::new(usize::MAX, 1.0);
        assert!(matches!(
            ProblemData::new(&def),
            Err(OptError::InvalidProblem(_))
        ));
    }

    #[test]
    fn test_strict_policy_rejects_gaps() {
        let gap = F::INIT_POS | F::INIT_ACC;
        assert!(matches!(
            ProblemData::new(&def(5, gap)),
            Err(OptError::BoundaryOrder(_))
        ));
        let data = eliminate_boundaries(&def(5, gap), BoundaryPolicy::Truncate).unwrap();
        assert_eq!(data.num_constants(), 1);
    }

    #[test]
    fn test_boundary_points_recurrence() {
        let zero = Vector3::zeros();
        let d = Vector3::new(6.0, 0.0, 0.0);
        // degree 3 on [0, 1]: third control point from acceleration alone
        let pts = boundary_points(zero, [&zero, &d, &zero], 3, 3, 1.0, false);
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[1], zero);
        assert_eq!(pts[2], Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_state_constraint_count() {
        let flags = F::INIT_POS | F::INIT_VEL | F::END_POS | F::END_VEL;
        let data = ProblemData::new(&def(5, flags)).unwrap();
        assert_eq!(data.num_variables(), 2);
        assert_eq!(data.num_state_constraints(), 2);
        let data = ProblemData::new(&def(9, flags)).unwrap();
        assert_eq!(data.num_state_constraints(), 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let data = ProblemData::new(&def(4, F::INIT_POS)).unwrap();
        let copy = data.clone();
        assert_eq!(copy, data);
        assert_eq!(copy.curve().waypoints().len(), 5);
    }
}
