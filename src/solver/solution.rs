use crate::algebra::*;
use crate::solver::info::Info;
use crate::solver::layout::StageLayout;
use crate::solver::solver::SolverStatus;
use crate::solver::variables::Variables;

/// The caller-facing result of a solve: the per-stage primal vectors and
/// the headline diagnostics.  Populated when the iteration terminates;
/// for `MaxIterations` this is the last iterate, which may still violate
/// the tolerances.
#[derive(Default, Debug)]
pub struct Solution<T> {
    z: Vec<Vec<T>>,
    pub status: SolverStatus,
    pub obj_val: T,
    pub obj_val_dual: T,
    pub iterations: u32,
    pub res_eq: T,
    pub res_ineq: T,
    pub solve_time: f64,
}

impl<T> Solution<T>
where
    T: FloatT,
{
    pub(crate) fn new(layout: &StageLayout) -> Self {
        let z = (0..layout.nstages())
            .map(|i| vec![T::zero(); layout.z(i).len()])
            .collect();
        Self {
            z,
            ..Self::default()
        }
    }

    /// primal solution of stage i
    pub fn stage(&self, i: usize) -> &[T] {
        &self.z[i]
    }

    pub fn nstages(&self) -> usize {
        self.z.len()
    }

    pub(crate) fn finalize(
        &mut self,
        layout: &StageLayout,
        vars: &Variables<T>,
        info: &Info<T>,
    ) {
        for (i, zi) in self.z.iter_mut().enumerate() {
            zi.copy_from(&vars.z[layout.z(i)]);
        }
        self.status = info.status;
        self.obj_val = info.cost_primal;
        self.obj_val_dual = info.cost_dual;
        self.iterations = info.iterations;
        self.res_eq = info.res_eq;
        self.res_ineq = info.res_ineq;
        self.solve_time = info.solve_time;
    }
}
