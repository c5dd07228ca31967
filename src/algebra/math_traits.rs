use super::FloatT;

// All internal math should go through these core traits, which are
// implemented generically for floats of type FloatT.

/// Scalar operations on [`FloatT`](crate::algebra::FloatT)

pub trait ScalarMath {
    type T: FloatT;

    /// Saturate a value into `[lo, hi]`.
    ///
    /// Used to stop overflow propagating out of ill-conditioned
    /// triangular solves; see
    /// [`saturation_bound`](crate::solver::Settings::saturation_bound).
    fn clip(&self, lo: Self::T, hi: Self::T) -> Self::T;
}

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)

pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Apply an elementwise operation on a vector.
    fn scalarop(&mut self, op: impl Fn(Self::T) -> Self::T) -> &mut Self;

    /// Apply an elementwise operation to `v` and assign the
    /// results to `self`.
    fn scalarop_from(&mut self, op: impl Fn(Self::T) -> Self::T, v: &Self) -> &mut Self;

    /// set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise negation of entries.
    fn negate(&mut self) -> &mut Self;

    /// Elementwise scaling by another vector. Produces `self[i] = self[i] * y[i]`
    fn hadamard(&mut self, y: &Self) -> &mut Self;

    /// Dot product
    fn dot(&self, y: &Self) -> Self::T;

    /// computes dot(l + αdl, s + αds) without intermediate allocation
    fn dot_shifted(
        l: &[Self::T],
        s: &[Self::T],
        dl: &[Self::T],
        ds: &[Self::T],
        α: Self::T,
    ) -> Self::T;

    /// Standard Euclidian or 2-norm distance from `self` to `y`
    fn dist(&self, y: &Self) -> Self::T;

    /// Sum of elements.
    fn sum(&self) -> Self::T;

    /// Sum of squares of the elements.
    fn sumsq(&self) -> Self::T;

    /// 2-norm
    fn norm(&self) -> Self::T;

    /// Infinity norm
    fn norm_inf(&self) -> Self::T;

    /// Minimum value in vector
    fn minimum(&self) -> Self::T;

    /// true if all elements are finite
    fn is_finite(&self) -> bool;

    /// Elementwise operation `self[i] = a * x[i] + b * self[i]`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// Elementwise operation `self[i] = a * x[i] + b * y[i]`
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;
}
