use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::residuals::Residuals;
use crate::solver::settings::Settings;
use crate::solver::solver::SolverStatus;
use crate::solver::variables::Variables;
use crate::timers::*;

/// Solver progress and termination diagnostics, refreshed every iteration
/// and retained after the solve.
#[derive(Default, Debug)]
pub struct Info<T> {
    /// complementarity measure μ = lᵀs / nb
    pub μ: T,
    /// Mehrotra centering parameter of the last iteration
    pub sigma: T,
    /// affine step length of the last iteration
    pub step_affine: T,
    /// combined step length of the last iteration
    pub step_combined: T,
    /// backtracks taken by the affine line search
    pub ls_iters_affine: u32,
    /// backtracks taken by the combined line search
    pub ls_iters_combined: u32,
    pub iterations: u32,
    /// primal objective ½zᵀHz + fᵀz
    pub cost_primal: T,
    /// dual objective estimate, primal cost less the complementarity gap
    pub cost_dual: T,
    /// duality gap lᵀs
    pub gap_abs: T,
    /// gap relative to the primal cost magnitude
    pub gap_rel: T,
    /// equality residual: max of stationarity and linking infinity norms
    pub res_eq: T,
    /// worst raw bound violation
    pub res_ineq: T,
    pub solve_time: f64,
    pub status: SolverStatus,

    pub(crate) stream: PrintTarget,
}

impl<T> Info<T>
where
    T: FloatT,
{
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;

        timers.reset_timer("solve");
    }

    pub(crate) fn update(
        &mut self,
        vars: &Variables<T>,
        residuals: &Residuals<T>,
        timers: &Timers,
    ) {
        self.cost_primal = residuals.pobj;
        self.gap_abs = vars.gap();
        self.cost_dual = self.cost_primal - self.gap_abs;
        self.gap_rel = self.gap_abs / T::max(T::one(), T::abs(self.cost_primal));

        // stationarity folded into the equality measure so an untouched
        // cold start cannot pass the optimality test
        self.res_eq = T::max(residuals.norm_rd, residuals.norm_re);
        self.res_ineq = residuals.norm_viol;

        // solve time so far (includes setup)
        self.solve_time = timers.total_time().as_secs_f64();
    }

    /// Returns true once a terminal status is set.
    pub(crate) fn check_termination(&mut self, settings: &Settings<T>, iter: u32) -> bool {
        if self.is_converged(settings) {
            self.status = SolverStatus::Optimal;
        }

        if self.status == SolverStatus::Unsolved {
            if settings.max_iter == iter {
                self.status = SolverStatus::MaxIterations;
            } else if self.solve_time > settings.time_limit {
                self.status = SolverStatus::MaxTime;
            }
        }

        self.status != SolverStatus::Unsolved
    }

    // all four convergence criteria simultaneously
    fn is_converged(&self, settings: &Settings<T>) -> bool {
        self.μ < settings.tol_compl
            && (self.gap_rel < settings.tol_gap_rel || self.gap_abs < settings.tol_compl)
            && self.res_eq < settings.tol_eq
            && self.res_ineq < settings.tol_ineq
    }

    pub(crate) fn save_scalars(&mut self, μ: T, iter: u32) {
        self.μ = μ;
        self.iterations = iter;
    }

    pub(crate) fn save_step_lengths(&mut self, α_aff: T, α: T, σ: T, ls_aff: u32, ls: u32) {
        self.step_affine = α_aff;
        self.step_combined = α;
        self.sigma = σ;
        self.ls_iters_affine = ls_aff;
        self.ls_iters_combined = ls;
    }

    pub(crate) fn set_status(&mut self, status: SolverStatus) {
        self.status = status;
    }

    pub(crate) fn finalize(&mut self, timers: &mut Timers) {
        self.solve_time = timers.total_time().as_secs_f64();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_requires_all_criteria() {
        let settings = Settings::<f64>::default();
        let mut info = Info::<f64>::new();
        info.μ = 1e-8;
        info.gap_abs = 1e-8;
        info.gap_rel = 1e-8;
        info.res_eq = 1e-8;
        info.res_ineq = 0.0;

        assert!(info.check_termination(&settings, 3));
        assert_eq!(info.status, SolverStatus::Optimal);

        // a large equality residual alone must block optimality
        let mut info = Info::<f64>::new();
        info.res_eq = 1.0;
        assert!(!info.check_termination(&settings, 3));
        assert_eq!(info.status, SolverStatus::Unsolved);
    }

    #[test]
    fn test_iteration_cap() {
        let settings = Settings::<f64>::default();
        let mut info = Info::<f64>::new();
        info.res_eq = 1.0;

        assert!(!info.check_termination(&settings, settings.max_iter - 1));
        assert!(info.check_termination(&settings, settings.max_iter));
        assert_eq!(info.status, SolverStatus::MaxIterations);
    }
}
