//! Affine points `p = B x + c` over the unknown vector `x`.
//!
//! A control point whose position is still to be chosen by the optimizer is
//! carried around as an `AffineVariable`. Curve algebra (sums, scaling, de
//! Casteljau splits, derivatives) only ever forms linear combinations of
//! control points, so the affine structure survives every operation and the
//! final inequalities stay linear in `x`.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use nalgebra::{Const, DMatrix, DVector, Dyn, OMatrix, SVector};

use super::quadratic::QuadraticVariable;
use super::Real;
use crate::error::{OptError, Result};

/// Coefficient matrix of an affine point: `D` rows, one column per unknown scalar.
pub type CoeffMatrix<T, const D: usize> = OMatrix<T, Const<D>, Dyn>;

/// A concrete point in `D` dimensions.
pub type Point<T, const D: usize> = SVector<T, D>;

/// A symbolic point `B x + c`.
///
/// The zero flag is derived from `B` by every constructor and operation, so it
/// always reports whether the point depends on the unknowns at all.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineVariable<T: Real, const D: usize> {
    b: CoeffMatrix<T, D>,
    c: Point<T, D>,
    zero: bool,
}

impl<T: Real, const D: usize> AffineVariable<T, D> {
    /// Create a point from an explicit coefficient matrix and offset.
    pub fn new(b: CoeffMatrix<T, D>, c: Point<T, D>) -> Self {
        let zero = b.iter().all(|v| *v == T::zero());
        AffineVariable { b, c, zero }
    }

    /// A free unknown in local form: `B = I` (`D x D`), `c = 0`.
    pub fn identity() -> Self {
        let mut b = Self::zero_coefficients(D);
        b.fill_with_identity();
        Self::new(b, Point::zeros())
    }

    /// A free unknown occupying `slot` among `num_unknowns` point-sized unknowns.
    ///
    /// The coefficient matrix is `D x (num_unknowns * D)` with the identity
    /// block at columns `slot * D .. (slot + 1) * D`.
    pub fn unknown(slot: usize, num_unknowns: usize) -> Result<Self> {
        if slot >= num_unknowns {
            return Err(OptError::IndexOutOfRange {
                index: slot,
                len: num_unknowns,
            });
        }
        Self::identity().pad(slot * D, num_unknowns * D)
    }

    /// A fixed point: `B = 0` (`D x D`), `c = value`.
    pub fn constant(value: Point<T, D>) -> Self {
        Self::new(Self::zero_coefficients(D), value)
    }

    /// The neutral element: evaluates to the origin for every `x` of length `width`.
    pub fn zero(width: usize) -> Self {
        Self::new(Self::zero_coefficients(width), Point::zeros())
    }

    fn zero_coefficients(width: usize) -> CoeffMatrix<T, D> {
        CoeffMatrix::<T, D>::zeros_generic(Const::<D>, Dyn(width))
    }

    /// Coefficient matrix `B`.
    pub fn b(&self) -> &CoeffMatrix<T, D> {
        &self.b
    }

    /// Constant offset `c`.
    pub fn c(&self) -> &Point<T, D> {
        &self.c
    }

    /// True when the point does not depend on the unknowns.
    pub fn is_zero(&self) -> bool {
        self.zero
    }

    /// Number of unknown scalars this point is expressed over.
    pub fn width(&self) -> usize {
        self.b.ncols()
    }

    /// Evaluate the point for a given unknown vector.
    pub fn evaluate(&self, x: &DVector<T>) -> Result<Point<T, D>> {
        if self.zero {
            return Ok(self.c);
        }
        if x.len() != self.width() {
            return Err(OptError::shape(
                format!("unknown vector of length {}", self.width()),
                format!("length {}", x.len()),
            ));
        }
        Ok(&self.b * x + self.c)
    }

    /// Embed the local coefficients into a wider unknown vector.
    ///
    /// The current `B` is copied at column `offset` of a zero `D x width`
    /// matrix. Points that do not depend on the unknowns get an all-zero block.
    pub fn pad(&self, offset: usize, width: usize) -> Result<Self> {
        let mut b = Self::zero_coefficients(width);
        if !self.zero {
            let cols = self.width();
            if offset + cols > width {
                return Err(OptError::shape(
                    format!("at most {} columns", width.saturating_sub(offset)),
                    format!("{} columns at offset {}", cols, offset),
                ));
            }
            b.columns_mut(offset, cols).copy_from(&self.b);
        }
        Ok(Self::new(b, self.c))
    }

    /// Add two points, failing if both depend on unknown vectors of different width.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        let (b1, b2) = self.aligned_coefficients(other)?;
        Ok(Self::new(b1 + b2, self.c + other.c))
    }

    /// Subtract two points, failing if both depend on unknown vectors of different width.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        let (b1, b2) = self.aligned_coefficients(other)?;
        Ok(Self::new(b1 - b2, self.c - other.c))
    }

    /// Bilinear product `(B1 x + c1) . (B2 x + c2)` as a quadratic form in `x`.
    ///
    /// The quadratic term is symmetrised: `A = (B1' B2 + B2' B1) / 2`.
    pub fn dot(&self, other: &Self) -> Result<QuadraticVariable<T>> {
        let (b1, b2) = self.aligned_coefficients(other)?;
        let cross: DMatrix<T> = b1.transpose() * &b2;
        let half: T = super::real(0.5);
        let quadratic = (&cross + cross.transpose()) * half;
        let linear: DVector<T> = b1.transpose() * other.c + b2.transpose() * self.c;
        Ok(QuadraticVariable::new(quadratic, linear, self.c.dot(&other.c)))
    }

    fn common_width(&self, other: &Self) -> Result<usize> {
        match (self.zero, other.zero) {
            (false, false) if self.width() != other.width() => Err(OptError::shape(
                format!("{} unknowns", self.width()),
                format!("{} unknowns", other.width()),
            )),
            (false, _) => Ok(self.width()),
            (true, false) => Ok(other.width()),
            (true, true) => Ok(self.width().max(other.width())),
        }
    }

    fn coefficients_at(&self, width: usize) -> CoeffMatrix<T, D> {
        if self.width() == width {
            self.b.clone()
        } else {
            Self::zero_coefficients(width)
        }
    }

    fn aligned_coefficients(&self, other: &Self) -> Result<(CoeffMatrix<T, D>, CoeffMatrix<T, D>)> {
        let width = self.common_width(other)?;
        Ok((self.coefficients_at(width), other.coefficients_at(width)))
    }
}

fn unwrap_op<V>(result: Result<V>) -> V {
    match result {
        Ok(v) => v,
        Err(e) => panic!("affine arithmetic: {}", e),
    }
}

impl<'a, T: Real, const D: usize> Add<&'a AffineVariable<T, D>> for &'a AffineVariable<T, D> {
    type Output = AffineVariable<T, D>;

    fn add(self, rhs: &'a AffineVariable<T, D>) -> AffineVariable<T, D> {
        unwrap_op(self.checked_add(rhs))
    }
}

impl<'a, T: Real, const D: usize> Sub<&'a AffineVariable<T, D>> for &'a AffineVariable<T, D> {
    type Output = AffineVariable<T, D>;

    fn sub(self, rhs: &'a AffineVariable<T, D>) -> AffineVariable<T, D> {
        unwrap_op(self.checked_sub(rhs))
    }
}

impl<T: Real, const D: usize> Add for AffineVariable<T, D> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        &self + &rhs
    }
}

impl<T: Real, const D: usize> Sub for AffineVariable<T, D> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        &self - &rhs
    }
}

impl<T: Real, const D: usize> AddAssign<&AffineVariable<T, D>> for AffineVariable<T, D> {
    fn add_assign(&mut self, rhs: &AffineVariable<T, D>) {
        *self = &*self + rhs;
    }
}

impl<T: Real, const D: usize> SubAssign<&AffineVariable<T, D>> for AffineVariable<T, D> {
    fn sub_assign(&mut self, rhs: &AffineVariable<T, D>) {
        *self = &*self - rhs;
    }
}

impl<T: Real, const D: usize> Neg for AffineVariable<T, D> {
    type Output = Self;

    fn neg(self) -> Self {
        AffineVariable {
            b: -self.b,
            c: -self.c,
            zero: self.zero,
        }
    }
}

impl<T: Real, const D: usize> Mul<T> for AffineVariable<T, D> {
    type Output = Self;

    fn mul(mut self, k: T) -> Self {
        self *= k;
        self
    }
}

impl<T: Real, const D: usize> Mul<T> for &AffineVariable<T, D> {
    type Output = AffineVariable<T, D>;

    fn mul(self, k: T) -> AffineVariable<T, D> {
        AffineVariable::new(&self.b * k, self.c * k)
    }
}

impl<T: Real, const D: usize> Div<T> for AffineVariable<T, D> {
    type Output = Self;

    fn div(mut self, k: T) -> Self {
        self /= k;
        self
    }
}

impl<T: Real, const D: usize> MulAssign<T> for AffineVariable<T, D> {
    fn mul_assign(&mut self, k: T) {
        self.b *= k;
        self.c *= k;
        self.zero = self.b.iter().all(|v| *v == T::zero());
    }
}

impl<T: Real, const D: usize> DivAssign<T> for AffineVariable<T, D> {
    fn div_assign(&mut self, k: T) {
        self.b /= k;
        self.c /= k;
        self.zero = self.b.iter().all(|v| *v == T::zero());
    }
}
