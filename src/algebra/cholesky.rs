#![allow(non_snake_case)]
use super::matrix::DenseMatrix;
use super::FloatT;
use crate::algebra::ScalarMath;

/// Lower-triangular Cholesky factor of a symmetric block, with pivot
/// flooring so the factorization always completes.  Pivots that fall
/// below `pivot_floor_eps` are replaced by `pivot_floor_value` before
/// the square root, which regularizes blocks made singular by (nearly)
/// redundant equality rows.
#[derive(Debug, Clone)]
pub struct CholeskyFactor<T = f64> {
    /// lower triangle, column-major, size n x n
    pub L: DenseMatrix<T>,
    pivot_floor_eps: T,
    pivot_floor_value: T,
    saturation_bound: T,
}

impl<T: FloatT> CholeskyFactor<T> {
    pub fn new(n: usize, pivot_floor_eps: T, pivot_floor_value: T, saturation_bound: T) -> Self {
        Self {
            L: DenseMatrix::zeros(n, n),
            pivot_floor_eps,
            pivot_floor_value,
            saturation_bound,
        }
    }

    pub fn n(&self) -> usize {
        self.L.m
    }

    /// Factor the lower triangle of `M` in place into `self.L`.
    /// Never fails; indefinite or singular blocks are floored.
    pub fn factor(&mut self, M: &DenseMatrix<T>) {
        let n = self.n();
        assert_eq!(M.m, n);
        self.L.fill(T::zero());

        for j in 0..n {
            let mut d = M[(j, j)];
            for k in 0..j {
                d -= self.L[(j, k)] * self.L[(j, k)];
            }
            if d < self.pivot_floor_eps {
                d = self.pivot_floor_value;
            }
            let dj = d.sqrt();
            self.L[(j, j)] = dj;

            for i in (j + 1)..n {
                let mut s = M[(i, j)];
                for k in 0..j {
                    s -= self.L[(i, k)] * self.L[(j, k)];
                }
                self.L[(i, j)] = s / dj;
            }
        }
    }

    /// x <- L⁻¹ x, with intermediates clipped to the saturation bound so a
    /// floored pivot cannot launch the iterate to infinity.
    pub fn solve_fwd(&self, x: &mut [T]) {
        let n = self.n();
        assert_eq!(x.len(), n);
        let b = self.saturation_bound;
        for i in 0..n {
            let mut s = x[i];
            for k in 0..i {
                s -= self.L[(i, k)] * x[k];
            }
            x[i] = (s / self.L[(i, i)]).clip(-b, b);
        }
    }

    /// x <- L⁻ᵀ x, clipped like the forward solve.
    pub fn solve_bwd(&self, x: &mut [T]) {
        let n = self.n();
        assert_eq!(x.len(), n);
        let b = self.saturation_bound;
        for i in (0..n).rev() {
            let mut s = x[i];
            for k in (i + 1)..n {
                s -= self.L[(k, i)] * x[k];
            }
            x[i] = (s / self.L[(i, i)]).clip(-b, b);
        }
    }

    /// x <- (L Lᵀ)⁻¹ x
    pub fn solve(&self, x: &mut [T]) {
        self.solve_fwd(x);
        self.solve_bwd(x);
    }

    /// X <- X L⁻ᵀ, solving one row at a time against this factor.  This is
    /// the sub-diagonal update of a block factorization: given the raw
    /// coupling block B it produces Lsd = B L⁻ᵀ.
    pub fn solve_rows(&self, X: &mut DenseMatrix<T>) {
        let n = self.n();
        assert_eq!(X.n, n);
        let b = self.saturation_bound;
        for i in 0..X.m {
            // row i of X plays the role of x in L y = x
            for j in 0..n {
                let mut s = X[(i, j)];
                for k in 0..j {
                    s -= self.L[(j, k)] * X[(i, k)];
                }
                X[(i, j)] = (s / self.L[(j, j)]).clip(-b, b);
            }
        }
    }
}

/// Apply the pivot flooring rule entrywise to a diagonal block.  Sharing
/// the rule with the dense factor keeps degenerate stages (for example a
/// variable pinned by equal bounds) finite throughout the solve.
pub(crate) fn floor_diagonal<T: FloatT>(d: &mut [T], floor_eps: T, floor_value: T) {
    for di in d.iter_mut() {
        if *di < floor_eps {
            *di = floor_value;
        }
    }
}
