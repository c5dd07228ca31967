#![allow(non_snake_case)]
use super::FloatT;
use enum_dispatch::*;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Dense column-major matrix, sized for a single stage block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct DenseMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column-major entries, length m * n
    pub data: Vec<T>,
}

impl<T: FloatT> DenseMatrix<T> {
    /// Build from column-major data.  Panics on a length mismatch since
    /// this is a programming error, not a data error.
    pub fn new(m: usize, n: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), m * n);
        Self { m, n, data }
    }

    pub fn zeros(m: usize, n: usize) -> Self {
        Self {
            m,
            n,
            data: vec![T::zero(); m * n],
        }
    }

    /// Build from a row-major array of rows, which reads like the
    /// mathematical notation in examples and tests.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self {
        let m = rows.len();
        let n = if m == 0 { 0 } else { rows[0].as_ref().len() };
        let mut out = Self::zeros(m, n);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(row.len(), n);
            for (j, &v) in row.iter().enumerate() {
                out[(i, j)] = v;
            }
        }
        out
    }

    pub fn fill(&mut self, v: T) {
        self.data.iter_mut().for_each(|x| *x = v);
    }

    /// y += α A x
    pub fn gemv(&self, y: &mut [T], x: &[T], α: T) {
        assert_eq!(y.len(), self.m);
        assert_eq!(x.len(), self.n);
        for j in 0..self.n {
            let c = α * x[j];
            let col = &self.data[j * self.m..(j + 1) * self.m];
            for (yi, &aij) in y.iter_mut().zip(col) {
                *yi += aij * c;
            }
        }
    }

    /// y += α Aᵀ x
    pub fn gemv_t(&self, y: &mut [T], x: &[T], α: T) {
        assert_eq!(y.len(), self.n);
        assert_eq!(x.len(), self.m);
        for (j, yj) in y.iter_mut().enumerate() {
            let col = &self.data[j * self.m..(j + 1) * self.m];
            let mut acc = T::zero();
            for (&aij, &xi) in col.iter().zip(x) {
                acc += aij * xi;
            }
            *yj += α * acc;
        }
    }
}

impl<T> std::ops::Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[j * self.m + i]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for DenseMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[j * self.m + i]
    }
}

/// Diagonal-zero matrix: a diagonal block on the leading columns and zeros
/// elsewhere.  This is the shape of the typical MPC linking matrix
/// `D = [-I 0]` that selects the carried-forward state out of the next
/// stage's (state, control, auxiliary) variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct DiagonalMatrix<T = f64> {
    /// the diagonal entries; the row count of the block
    pub diag: Vec<T>,
    /// number of columns (≥ diag.len(); trailing columns are zero)
    pub ncols: usize,
}

impl<T: FloatT> DiagonalMatrix<T> {
    pub fn new(diag: Vec<T>, ncols: usize) -> Self {
        assert!(ncols >= diag.len());
        Self { diag, ncols }
    }

    /// The negated identity selector `[-I 0]` with `nrows` rows.
    pub fn minus_identity(nrows: usize, ncols: usize) -> Self {
        Self::new(vec![-T::one(); nrows], ncols)
    }

    /// The identity selector `[I 0]` with `nrows` rows.
    pub fn identity(nrows: usize, ncols: usize) -> Self {
        Self::new(vec![T::one(); nrows], ncols)
    }
}

/// Operations required of a stage linking matrix.  Implementations exploit
/// the diagonal-zero pattern where the data allows it.
#[enum_dispatch]
pub trait StageMatrixOps<T>
where
    T: FloatT,
{
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;

    /// entry (i, j), zeros included
    fn at(&self, i: usize, j: usize) -> T;

    /// y += α A x
    fn gemv(&self, y: &mut [T], x: &[T], α: T);

    /// y += α Aᵀ x
    fn gemv_t(&self, y: &mut [T], x: &[T], α: T);

    /// M += A diag(d) Aᵀ, with M square of size nrows
    fn gram_scaled(&self, d: &[T], M: &mut DenseMatrix<T>);
}

impl<T: FloatT> StageMatrixOps<T> for DenseMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn at(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
    fn gemv(&self, y: &mut [T], x: &[T], α: T) {
        DenseMatrix::gemv(self, y, x, α);
    }
    fn gemv_t(&self, y: &mut [T], x: &[T], α: T) {
        DenseMatrix::gemv_t(self, y, x, α);
    }
    fn gram_scaled(&self, d: &[T], M: &mut DenseMatrix<T>) {
        assert_eq!(d.len(), self.n);
        assert_eq!(M.m, self.m);
        for i in 0..self.m {
            for j in 0..=i {
                let mut acc = T::zero();
                for (k, &dk) in d.iter().enumerate() {
                    acc += self[(i, k)] * dk * self[(j, k)];
                }
                M[(i, j)] += acc;
                if i != j {
                    M[(j, i)] += acc;
                }
            }
        }
    }
}

impl<T: FloatT> StageMatrixOps<T> for DiagonalMatrix<T> {
    fn nrows(&self) -> usize {
        self.diag.len()
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn at(&self, i: usize, j: usize) -> T {
        if i == j {
            self.diag[i]
        } else {
            T::zero()
        }
    }
    fn gemv(&self, y: &mut [T], x: &[T], α: T) {
        assert_eq!(y.len(), self.diag.len());
        assert_eq!(x.len(), self.ncols);
        for (yi, (&di, &xi)) in y.iter_mut().zip(self.diag.iter().zip(x)) {
            *yi += α * di * xi;
        }
    }
    fn gemv_t(&self, y: &mut [T], x: &[T], α: T) {
        assert_eq!(y.len(), self.ncols);
        assert_eq!(x.len(), self.diag.len());
        for ((yj, &dj), &xj) in y.iter_mut().zip(self.diag.iter()).zip(x) {
            *yj += α * dj * xj;
        }
    }
    fn gram_scaled(&self, d: &[T], M: &mut DenseMatrix<T>) {
        assert_eq!(d.len(), self.ncols);
        assert_eq!(M.m, self.diag.len());
        for (i, &di) in self.diag.iter().enumerate() {
            M[(i, i)] += di * di * d[i];
        }
    }
}

/// A stage linking matrix: dense, or diagonal with trailing zero columns.
#[allow(clippy::large_enum_variant)]
#[enum_dispatch(StageMatrixOps<T>)]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub enum StageMatrix<T>
where
    T: FloatT,
{
    Dense(DenseMatrix<T>),
    Diagonal(DiagonalMatrix<T>),
}

/// M = A diag(d) Bᵀ for two linking matrices sharing a stage, i.e. with
/// equal column counts.  Collapses the sum when either side is diagonal.
pub(crate) fn cross_scaled<T: FloatT>(
    A: &StageMatrix<T>,
    d: &[T],
    B: &StageMatrix<T>,
    M: &mut DenseMatrix<T>,
) {
    assert_eq!(A.ncols(), B.ncols());
    assert_eq!(d.len(), A.ncols());
    assert_eq!(M.m, A.nrows());
    assert_eq!(M.n, B.nrows());

    M.fill(T::zero());
    match (A, B) {
        (StageMatrix::Diagonal(a), StageMatrix::Diagonal(b)) => {
            let r = a.diag.len().min(b.diag.len());
            for i in 0..r {
                M[(i, i)] = a.diag[i] * d[i] * b.diag[i];
            }
        }
        (StageMatrix::Diagonal(a), _) => {
            for (i, &ai) in a.diag.iter().enumerate() {
                for j in 0..M.n {
                    M[(i, j)] = ai * d[i] * B.at(j, i);
                }
            }
        }
        (_, StageMatrix::Diagonal(b)) => {
            for (j, &bj) in b.diag.iter().enumerate() {
                for i in 0..M.m {
                    M[(i, j)] = A.at(i, j) * d[j] * bj;
                }
            }
        }
        (_, _) => {
            for i in 0..M.m {
                for j in 0..M.n {
                    let mut acc = T::zero();
                    for (k, &dk) in d.iter().enumerate() {
                        acc += A.at(i, k) * dk * B.at(j, k);
                    }
                    M[(i, j)] = acc;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_gemv() {
        //A = [1 3; 2 4]
        let A = DenseMatrix::new(2, 2, vec![1., 2., 3., 4.]);
        let x = [1., -1.];
        let mut y = vec![0.0; 2];
        A.gemv(&mut y, &x, 1.0);
        assert_eq!(y, vec![-2., -2.]);

        let mut yt = vec![0.0; 2];
        A.gemv_t(&mut yt, &x, 2.0);
        assert_eq!(yt, vec![-2., -2.]);
    }

    #[test]
    fn test_diagonal_zero_block() {
        // D = [2 0 0; 0 3 0]
        let D = DiagonalMatrix::new(vec![2., 3.], 3);
        let x = [1., 1., 5.];
        let mut y = vec![0.0; 2];
        StageMatrixOps::gemv(&D, &mut y, &x, 1.0);
        assert_eq!(y, vec![2., 3.]); //zero block ignored

        let mut yt = vec![0.0; 3];
        StageMatrixOps::gemv_t(&D, &mut yt, &[1., 1.], 1.0);
        assert_eq!(yt, vec![2., 3., 0.]);
    }

    #[test]
    fn test_gram_and_cross() {
        let C = StageMatrix::Dense(DenseMatrix::from_rows(&[&[1., 2.], &[0., 1.]]));
        let D = StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2));
        let d = [0.5, 0.25];

        // C diag(d) Cᵀ = [1 2; 0 1][.5 0;0 .25][1 0;2 1]
        let mut M = DenseMatrix::zeros(2, 2);
        C.gram_scaled(&d, &mut M);
        assert_eq!(M.data, vec![1.5, 0.5, 0.5, 0.25]);

        // C diag(d) Dᵀ = -C diag(d)
        let mut X = DenseMatrix::zeros(2, 2);
        cross_scaled(&C, &d, &D, &mut X);
        assert_eq!(X[(0, 0)], -0.5);
        assert_eq!(X[(0, 1)], -0.5);
        assert_eq!(X[(1, 0)], 0.0);
        assert_eq!(X[(1, 1)], -0.25);
    }
}
