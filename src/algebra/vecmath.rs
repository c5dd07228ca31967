use super::{FloatT, VectorMath};
use itertools::izip;
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        for x in &mut *self {
            *x = op(*x);
        }
        self
    }

    fn scalarop_from(&mut self, op: impl Fn(T) -> T, v: &[T]) -> &mut Self {
        for (x, v) in zip(&mut *self, v) {
            *x = op(*v);
        }
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.scalarop(|_x| c)
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.scalarop(|x| x * c)
    }

    fn negate(&mut self) -> &mut Self {
        self.scalarop(|x| -x)
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        zip(&mut *self, y).for_each(|(x, y)| *x *= *y);
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        accumulate_pairwise(self.len(), &|i| self[i] * y[i])
    }

    fn dot_shifted(l: &[T], s: &[T], dl: &[T], ds: &[T], α: T) -> T {
        assert_eq!(l.len(), s.len());
        assert_eq!(l.len(), dl.len());
        assert_eq!(s.len(), ds.len());

        accumulate_pairwise(l.len(), &|i| (l[i] + α * dl[i]) * (s[i] + α * ds[i]))
    }

    fn dist(&self, y: &Self) -> T {
        assert_eq!(self.len(), y.len());
        let dist2 = accumulate_pairwise(self.len(), &|i| T::powi(self[i] - y[i], 2));
        T::sqrt(dist2)
    }

    fn sum(&self) -> T {
        accumulate_pairwise(self.len(), &|i| self[i])
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn norm(&self) -> T {
        T::sqrt(self.sumsq())
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = if v > out { v } else { out };
        }
        out
    }

    fn minimum(&self) -> T {
        self.iter().fold(T::infinity(), |r, &s| T::min(r, s))
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|&x| T::is_finite(x))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());

        zip(&mut *self, x).for_each(|(y, x)| *y = a * (*x) + b * (*y));
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());

        for (w, (x, y)) in zip(&mut *self, zip(x, y)) {
            *w = a * (*x) + b * (*y);
        }
        self
    }
}

/// Diagonal quadratic form evaluation for one stage.
///
/// Writes `grad = h ⊙ z + f` and returns `½ zᵀ diag(h) z + fᵀ z`.
pub fn quad_form_diag<T: FloatT>(grad: &mut [T], h: &[T], z: &[T], f: &[T]) -> T {
    assert_eq!(grad.len(), h.len());
    assert_eq!(grad.len(), z.len());
    assert_eq!(grad.len(), f.len());

    let half = T::recip(T::one() + T::one());
    let mut value = T::zero();
    for (g, (&h, (&z, &f))) in zip(&mut *grad, zip(h, zip(z, f))) {
        let hz = h * z;
        *g = hz + f;
        value += (half * hz + f) * z;
    }
    value
}

/// True if any entry of `x + α dx` is negative.  Used by the
/// fraction-to-boundary line search on the multiplier/slack pairs.
pub(crate) fn any_negative_shifted<T: FloatT>(x: &[T], dx: &[T], α: T) -> bool {
    izip!(x, dx).any(|(&x, &dx)| x + α * dx < T::zero())
}

// ---------------------------------------------------------------------
// pairwise accumulator for sums and dot products.  Deterministic for a
// fixed input and considerably more accurate than a running sum when
// horizons get long.

fn accumulate_pairwise<T, F>(n: usize, f: &F) -> T
where
    T: FloatT,
    F: Fn(usize) -> T,
{
    const BASE_CASE_DIM: usize = 16;

    return if n == 0 {
        T::zero()
    } else {
        accumulate_pairwise_inner(f, 0, n)
    };

    fn accumulate_pairwise_inner<T, F>(f: &F, i0: usize, n: usize) -> T
    where
        T: FloatT,
        F: Fn(usize) -> T,
    {
        if n <= BASE_CASE_DIM {
            (i0..(i0 + n)).fold(T::zero(), |acc, i| acc + f(i))
        } else {
            let n2 = n / 2;
            accumulate_pairwise_inner(f, i0, n2) + accumulate_pairwise_inner(f, i0 + n2, n - n2)
        }
    }
}

#[test]
fn test_dot_product() {
    let x = vec![1., 2., 3., 4.];
    let y = vec![4., 5., 6., 7.];
    assert_eq!(x.dot(&y), 60.);
}

#[test]
fn test_sum() {
    let maxlen = 16 * 7 + 1; //awkward length to test base case
    let x: Vec<f64> = (1..=maxlen).map(|x| x as f64).collect();

    for i in 0..=x.len() {
        let z = &x[0..i];
        let sum1 = z.iter().fold(0.0, |acc, &z| acc + z);
        let sum2 = z.sum();
        assert_eq!(sum1, sum2);
    }
}

#[test]
fn test_dot_shifted() {
    let l = vec![1.0, 2.0, 3.0];
    let s = vec![0.5, 1.0, 2.0];
    let dl = vec![1.0, -1.0, 0.5];
    let ds = vec![-0.25, 0.5, 1.0];
    let α = 0.5;

    let dot1 = <[f64] as VectorMath>::dot_shifted(&l, &s, &dl, &ds, α);
    let dot2 = zip(&l, &dl)
        .zip(zip(&s, &ds))
        .fold(0.0, |acc, ((&l, &dl), (&s, &ds))| {
            acc + (l + α * dl) * (s + α * ds)
        });
    assert!((dot1 - dot2).abs() < 1e-15);
}

#[test]
fn test_quad_form_diag() {
    let h = vec![2.0, 4.0];
    let z = vec![1.0, -1.0];
    let f = vec![3.0, 0.5];
    let mut grad = vec![0.0f64; 2];

    let value = quad_form_diag(&mut grad, &h, &z, &f);
    assert_eq!(grad, vec![5.0, -3.5]);
    // ½(2·1 + 4·1) + (3·1 + 0.5·(-1)) = 3 + 2.5
    assert!((value - 5.5).abs() < 1e-15);
}
