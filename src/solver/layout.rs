use crate::algebra::StageMatrixOps;
use crate::solver::problem::ProblemData;
use crate::algebra::FloatT;
use std::ops::Range;

/// Offset table mapping each stage's primal block, each link's multiplier
/// block, and each stage's lower/upper bound blocks into the flat solver
/// buffers.  Computed once per solve from the stage dimensions, so the
/// rest of the solver never does offset arithmetic.
#[derive(Debug, Clone)]
pub(crate) struct StageLayout {
    z: Vec<Range<usize>>,
    v: Vec<Range<usize>>,
    lb: Vec<Range<usize>>,
    ub: Vec<Range<usize>>,
    /// total primal dimension
    pub nz: usize,
    /// total equality multiplier dimension
    pub nv: usize,
    /// total bound (multiplier/slack pair) count
    pub nb: usize,
}

impl StageLayout {
    pub fn new<T: FloatT>(data: &ProblemData<T>) -> Self {
        let mut z = Vec::with_capacity(data.stages.len());
        let mut lb = Vec::with_capacity(data.stages.len());
        let mut ub = Vec::with_capacity(data.stages.len());
        let mut v = Vec::with_capacity(data.links.len());

        let mut nz = 0;
        let mut nb = 0;
        for stage in data.stages.iter() {
            z.push(nz..nz + stage.nvars());
            nz += stage.nvars();

            lb.push(nb..nb + stage.lb_index.len());
            nb += stage.lb_index.len();
            ub.push(nb..nb + stage.ub_index.len());
            nb += stage.ub_index.len();
        }

        let mut nv = 0;
        for link in data.links.iter() {
            v.push(nv..nv + link.c.nrows());
            nv += link.c.nrows();
        }

        Self {
            z,
            v,
            lb,
            ub,
            nz,
            nv,
            nb,
        }
    }

    /// primal block of stage i
    pub fn z(&self, i: usize) -> Range<usize> {
        self.z[i].clone()
    }

    /// multiplier block of link i
    pub fn v(&self, i: usize) -> Range<usize> {
        self.v[i].clone()
    }

    /// lower-bound pair block of stage i
    pub fn lb(&self, i: usize) -> Range<usize> {
        self.lb[i].clone()
    }

    /// upper-bound pair block of stage i
    pub fn ub(&self, i: usize) -> Range<usize> {
        self.ub[i].clone()
    }

    pub fn nstages(&self) -> usize {
        self.z.len()
    }

    pub fn nlinks(&self) -> usize {
        self.v.len()
    }
}
