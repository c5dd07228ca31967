use crate::algebra::*;
use crate::solver::utils::infbounds::get_infinity;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned on bad problem data
#[derive(Error, Debug)]
pub enum DataError {
    /// The problem has no stages at all
    #[error("problem has no stages")]
    Empty,
    /// Wrong number of linking constraints for the stage count
    #[error("expected {expected} linking constraints for {nstages} stages, got {got}")]
    LinkCount {
        expected: usize,
        nstages: usize,
        got: usize,
    },
    /// Gradient length does not match the Hessian diagonal
    #[error("stage {0}: cost gradient length does not match the Hessian diagonal")]
    CostDims(usize),
    /// Cost data contains NaN or infinite values
    #[error("stage {0}: cost data contains non-finite values")]
    NonFiniteCost(usize),
    /// Bound values and index set have different lengths
    #[error("stage {0}: bound values and index set have different lengths")]
    BoundDims(usize),
    /// Bound index set is unsorted, repeated or out of range
    #[error("stage {0}: bound index set must be strictly increasing and in range")]
    BadBoundIndex(usize),
    /// Bound values contain NaN
    #[error("stage {0}: bound values contain NaN")]
    NanBound(usize),
    /// Linking matrix shapes do not match the adjacent stages
    #[error("link {0}: matrix shapes do not match the adjacent stages")]
    LinkDims(usize),
    /// Linking right-hand side contains NaN or infinite values
    #[error("link {0}: right-hand side contains non-finite values")]
    NonFiniteLink(usize),
}

/// One stage of the horizon: a diagonal quadratic cost
/// ½ zᵀ diag(h) z + fᵀ z over the stage variable z, with box bounds on
/// the components named by the index sets.  Components outside the index
/// sets (covariance or other auxiliary augmentations, typically) are
/// unconstrained.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Stage<T = f64> {
    /// Hessian diagonal
    pub h: Vec<T>,
    /// cost gradient
    pub f: Vec<T>,
    /// lower bound values, one per entry of `lb_index`
    pub lb: Vec<T>,
    /// indices of the lower-bounded components, strictly increasing
    pub lb_index: Vec<usize>,
    /// upper bound values, one per entry of `ub_index`
    pub ub: Vec<T>,
    /// indices of the upper-bounded components, strictly increasing
    pub ub_index: Vec<usize>,
}

impl<T: FloatT> Stage<T> {
    /// An unconstrained stage with the given cost.
    pub fn new(h: Vec<T>, f: Vec<T>) -> Self {
        Self {
            h,
            f,
            lb: vec![],
            lb_index: vec![],
            ub: vec![],
            ub_index: vec![],
        }
    }

    pub fn with_lower_bounds(mut self, index: Vec<usize>, values: Vec<T>) -> Self {
        self.lb_index = index;
        self.lb = values;
        self
    }

    pub fn with_upper_bounds(mut self, index: Vec<usize>, values: Vec<T>) -> Self {
        self.ub_index = index;
        self.ub = values;
        self
    }

    /// Box bounds on every component.
    pub fn with_box_bounds(self, lb: Vec<T>, ub: Vec<T>) -> Self {
        let n = self.nvars();
        self.with_lower_bounds((0..n).collect(), lb)
            .with_upper_bounds((0..n).collect(), ub)
    }

    pub fn nvars(&self) -> usize {
        self.h.len()
    }
}

/// The affine equality coupling stage i to stage i+1:
/// `C zᵢ + D zᵢ₊₁ = e`.  The first stage's known previous state is folded
/// into `e` by the caller.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Linking<T: FloatT = f64> {
    pub c: StageMatrix<T>,
    pub d: StageMatrix<T>,
    pub e: Vec<T>,
}

impl<T: FloatT> Linking<T> {
    pub fn new(c: StageMatrix<T>, d: StageMatrix<T>, e: Vec<T>) -> Self {
        Self { c, d, e }
    }

    /// number of equality rows
    pub fn nrows(&self) -> usize {
        self.e.len()
    }
}

/// Validated problem data for one horizon.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct ProblemData<T: FloatT = f64> {
    pub(crate) stages: Vec<Stage<T>>,
    pub(crate) links: Vec<Linking<T>>,
    /// bounds at or beyond the infinity threshold, dropped during setup
    pub(crate) presolve_dropped: usize,
}

impl<T: FloatT> ProblemData<T> {
    /// Validate and take ownership of the stage and linking data.  Bounds
    /// at or beyond the configurable infinity threshold are removed from
    /// the index sets here, so the solver never carries a slack for them.
    pub fn new(stages: Vec<Stage<T>>, links: Vec<Linking<T>>) -> Result<Self, DataError> {
        if stages.is_empty() {
            return Err(DataError::Empty);
        }
        if links.len() != stages.len() - 1 {
            return Err(DataError::LinkCount {
                expected: stages.len() - 1,
                nstages: stages.len(),
                got: links.len(),
            });
        }

        for (i, stage) in stages.iter().enumerate() {
            check_stage(i, stage)?;
        }
        for (i, link) in links.iter().enumerate() {
            let (ni, nnext) = (stages[i].nvars(), stages[i + 1].nvars());
            if link.c.ncols() != ni
                || link.d.ncols() != nnext
                || link.c.nrows() != link.nrows()
                || link.d.nrows() != link.nrows()
            {
                return Err(DataError::LinkDims(i));
            }
            if !link.e.is_finite() {
                return Err(DataError::NonFiniteLink(i));
            }
        }

        let mut data = Self {
            stages,
            links,
            presolve_dropped: 0,
        };
        data.drop_infinite_bounds();
        Ok(data)
    }

    pub fn nstages(&self) -> usize {
        self.stages.len()
    }

    fn drop_infinite_bounds(&mut self) {
        let infbound: T = get_infinity().as_T();
        let mut dropped = 0;

        for stage in self.stages.iter_mut() {
            dropped += retain_finite(&mut stage.lb, &mut stage.lb_index, |v| v > -infbound);
            dropped += retain_finite(&mut stage.ub, &mut stage.ub_index, |v| v < infbound);
        }
        self.presolve_dropped = dropped;
    }
}

fn check_stage<T: FloatT>(i: usize, stage: &Stage<T>) -> Result<(), DataError> {
    let n = stage.nvars();
    if stage.f.len() != n {
        return Err(DataError::CostDims(i));
    }
    if !stage.h.is_finite() || !stage.f.is_finite() {
        return Err(DataError::NonFiniteCost(i));
    }
    if stage.lb.len() != stage.lb_index.len() || stage.ub.len() != stage.ub_index.len() {
        return Err(DataError::BoundDims(i));
    }
    for index in [&stage.lb_index, &stage.ub_index] {
        let sorted = index.windows(2).all(|w| w[0] < w[1]);
        if !sorted || index.last().is_some_and(|&k| k >= n) {
            return Err(DataError::BadBoundIndex(i));
        }
    }
    if stage.lb.iter().any(|v| v.is_nan()) || stage.ub.iter().any(|v| v.is_nan()) {
        return Err(DataError::NanBound(i));
    }
    Ok(())
}

// retain the (value, index) pairs passing the predicate, returning the
// number removed
fn retain_finite<T: FloatT>(
    values: &mut Vec<T>,
    index: &mut Vec<usize>,
    keep: impl Fn(T) -> bool,
) -> usize {
    let before = values.len();
    let mut kept = index.iter().copied();
    let mut new_index = Vec::with_capacity(before);
    values.retain(|&v| {
        let k = kept.next();
        let ok = keep(v);
        if ok {
            if let Some(k) = k {
                new_index.push(k);
            }
        }
        ok
    });
    *index = new_index;
    before - values.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stage_links() -> Vec<Linking<f64>> {
        let c = StageMatrix::Diagonal(DiagonalMatrix::identity(2, 2));
        let d = StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2));
        vec![Linking::new(c, d, vec![0., 0.])]
    }

    #[test]
    fn test_accepts_well_formed() {
        let stages = vec![
            Stage::new(vec![1., 1.], vec![0., 0.]),
            Stage::new(vec![1., 1.], vec![0., 0.]),
        ];
        assert!(ProblemData::new(stages, two_stage_links()).is_ok());
    }

    #[test]
    fn test_rejects_bad_dims() {
        let stages = vec![Stage::new(vec![1., 1.], vec![0.])];
        assert!(matches!(
            ProblemData::new(stages, vec![]),
            Err(DataError::CostDims(0))
        ));

        // link rows disagree with e
        let stages = vec![
            Stage::new(vec![1., 1.], vec![0., 0.]),
            Stage::new(vec![1., 1.], vec![0., 0.]),
        ];
        let c = StageMatrix::Diagonal(DiagonalMatrix::identity(2, 2));
        let d = StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2));
        let links = vec![Linking::new(c, d, vec![0.])];
        assert!(matches!(
            ProblemData::new(stages, links),
            Err(DataError::LinkDims(0))
        ));
    }

    #[test]
    fn test_rejects_bad_bound_index() {
        let stage =
            Stage::new(vec![1., 1.], vec![0., 0.]).with_lower_bounds(vec![1, 0], vec![0., 0.]);
        assert!(matches!(
            ProblemData::new(vec![stage], vec![]),
            Err(DataError::BadBoundIndex(0))
        ));

        let stage = Stage::new(vec![1., 1.], vec![0., 0.]).with_upper_bounds(vec![2], vec![0.]);
        assert!(matches!(
            ProblemData::new(vec![stage], vec![]),
            Err(DataError::BadBoundIndex(0))
        ));
    }

    #[test]
    fn test_presolve_drops_infinite_bounds() {
        let stage = Stage::new(vec![1., 1.], vec![0., 0.])
            .with_lower_bounds(vec![0, 1], vec![-1e30, 0.])
            .with_upper_bounds(vec![0, 1], vec![1., 1e30]);
        let data = ProblemData::new(vec![stage], vec![]).unwrap();

        assert_eq!(data.presolve_dropped, 2);
        assert_eq!(data.stages[0].lb_index, vec![1]);
        assert_eq!(data.stages[0].lb, vec![0.]);
        assert_eq!(data.stages[0].ub_index, vec![0]);
        assert_eq!(data.stages[0].ub, vec![1.]);
    }
}
