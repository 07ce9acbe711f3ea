//! Scalar quadratic forms `x' A x + b' x + c`.
//!
//! Costs are accumulated additively from bilinear products of affine points,
//! the same way the canonical `QuadExpr` of a conic modelling layer is built.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign};

use nalgebra::{DMatrix, DVector};

use super::Real;
use crate::error::{OptError, Result};

/// A quadratic form over an unknown vector of fixed length.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticVariable<T: Real> {
    /// Symmetric bilinear term.
    a: DMatrix<T>,
    /// Linear term.
    b: DVector<T>,
    /// Constant term.
    c: T,
}

impl<T: Real> QuadraticVariable<T> {
    /// Create a quadratic form from its parts.
    ///
    /// # Panics
    ///
    /// Panics if `a` is not square or does not match the length of `b`.
    pub fn new(a: DMatrix<T>, b: DVector<T>, c: T) -> Self {
        assert!(
            a.nrows() == a.ncols() && a.nrows() == b.len(),
            "quadratic term is {}x{} but linear term has length {}",
            a.nrows(),
            a.ncols(),
            b.len()
        );
        QuadraticVariable { a, b, c }
    }

    /// The zero form over `n` unknowns.
    pub fn zeros(n: usize) -> Self {
        Self::constant(T::zero(), n)
    }

    /// A constant form over `n` unknowns.
    pub fn constant(c: T, n: usize) -> Self {
        QuadraticVariable {
            a: DMatrix::zeros(n, n),
            b: DVector::zeros(n),
            c,
        }
    }

    pub fn a(&self) -> &DMatrix<T> {
        &self.a
    }

    pub fn b(&self) -> &DVector<T> {
        &self.b
    }

    pub fn c(&self) -> T {
        self.c
    }

    /// Number of unknown scalars.
    pub fn size(&self) -> usize {
        self.b.len()
    }

    /// Check if there is no quadratic term.
    pub fn is_linear(&self) -> bool {
        self.a.iter().all(|v| *v == T::zero())
    }

    /// Evaluate the form at `x`.
    pub fn evaluate(&self, x: &DVector<T>) -> Result<T> {
        if x.len() != self.size() {
            return Err(OptError::shape(
                format!("unknown vector of length {}", self.size()),
                format!("length {}", x.len()),
            ));
        }
        Ok(x.dot(&(&self.a * x)) + self.b.dot(x) + self.c)
    }

    /// Add two forms over the same unknowns.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        if self.size() != other.size() {
            return Err(OptError::shape(
                format!("{} unknowns", self.size()),
                format!("{} unknowns", other.size()),
            ));
        }
        Ok(QuadraticVariable {
            a: &self.a + &other.a,
            b: &self.b + &other.b,
            c: self.c + other.c,
        })
    }
}

impl<T: Real> AddAssign<&QuadraticVariable<T>> for QuadraticVariable<T> {
    fn add_assign(&mut self, rhs: &QuadraticVariable<T>) {
        assert_eq!(
            self.size(),
            rhs.size(),
            "cannot add quadratic forms over different unknowns"
        );
        self.a += &rhs.a;
        self.b += &rhs.b;
        self.c += rhs.c;
    }
}

impl<T: Real> AddAssign for QuadraticVariable<T> {
    fn add_assign(&mut self, rhs: QuadraticVariable<T>) {
        *self += &rhs;
    }
}

impl<T: Real> Add for QuadraticVariable<T> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

impl<T: Real> MulAssign<T> for QuadraticVariable<T> {
    fn mul_assign(&mut self, k: T) {
        self.a *= k;
        self.b *= k;
        self.c *= k;
    }
}

impl<T: Real> DivAssign<T> for QuadraticVariable<T> {
    fn div_assign(&mut self, k: T) {
        self.a /= k;
        self.b /= k;
        self.c /= k;
    }
}

impl<T: Real> Mul<T> for QuadraticVariable<T> {
    type Output = Self;

    fn mul(mut self, k: T) -> Self {
        self *= k;
        self
    }
}

impl<T: Real> Div<T> for QuadraticVariable<T> {
    type Output = Self;

    fn div(mut self, k: T) -> Self {
        self /= k;
        self
    }
}
