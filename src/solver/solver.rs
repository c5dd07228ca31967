use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::callbacks::{Callback, SolverCallbacks};
use crate::solver::info::Info;
use crate::solver::kkt::RiccatiKKT;
use crate::solver::layout::StageLayout;
use crate::solver::problem::{DataError, Linking, ProblemData, Stage};
use crate::solver::residuals::Residuals;
use crate::solver::settings::{Settings, SettingsError};
use crate::solver::solution::Solution;
use crate::solver::variables::Variables;
use crate::timers::*;
use thiserror::Error;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Status of solver at termination
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// All four convergence criteria met simultaneously.
    Optimal,
    /// Iteration limit reached; the last iterate is returned and may
    /// violate the tolerances.
    MaxIterations,
    /// Time limit reached before convergence.
    MaxTime,
    /// A line search could not find a positive step above the minimum
    /// threshold.  Treat as solver failure.
    NoProgress,
    /// The user termination callback requested an early stop.
    CallbackTerminated,
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error type returned at solver construction.  Numerical trouble during
/// the iteration never surfaces here; it terminates through
/// [`SolverStatus`] instead.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

// ---------------------------------
// top level solver container type
// ---------------------------------

/// An interior point solver for multistage QPs implementing a Mehrotra
/// predictor-corrector scheme over the Riccati-factored KKT system.
///
/// All iterate state is owned by the solver, so independent instances may
/// solve concurrently on separate threads.  Every `solve` cold starts.
pub struct Solver<T = f64>
where
    T: FloatT,
{
    data: ProblemData<T>,
    layout: StageLayout,
    variables: Variables<T>,
    residuals: Residuals<T>,
    kkt: RiccatiKKT<T>,
    step: Variables<T>,
    step_cc: Variables<T>,
    pub info: Info<T>,
    pub solution: Solution<T>,
    pub settings: Settings<T>,
    timers: Option<Timers>,
    callbacks: SolverCallbacks<Info<T>>,
}

impl<T> Solver<T>
where
    T: FloatT,
{
    /// Validate the settings and problem data and build a solver.
    pub fn new(
        stages: Vec<Stage<T>>,
        links: Vec<Linking<T>>,
        settings: Settings<T>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;
        let data = ProblemData::new(stages, links)?;
        Ok(Self::from_data(data, settings))
    }

    pub(crate) fn from_data(data: ProblemData<T>, settings: Settings<T>) -> Self {
        let layout = StageLayout::new(&data);
        let variables = Variables::new(&layout);
        let residuals = Residuals::new(&layout);
        let kkt = RiccatiKKT::new(&data, &layout, &settings);
        let step = Variables::new(&layout);
        let step_cc = Variables::new(&layout);
        let info = Info::new();
        let solution = Solution::new(&layout);

        Self {
            data,
            layout,
            variables,
            residuals,
            kkt,
            step,
            step_cc,
            info,
            solution,
            settings,
            timers: Some(Timers::default()),
            callbacks: SolverCallbacks::default(),
        }
    }

    /// Set a termination callback, polled once per iteration.  Returning
    /// `true` stops the solve with `CallbackTerminated`.
    pub fn set_termination_callback(&mut self, callback: fn(&Info<T>) -> bool) {
        self.callbacks.termination_callback = Callback::Rust(callback);
    }

    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }

    /// the validated problem data, post presolve
    pub(crate) fn data(&self) -> &ProblemData<T> {
        &self.data
    }

    /// Print the hierarchical solve-phase timings of the last solve.
    pub fn print_timers(&self) {
        if let Some(timers) = &self.timers {
            timers.print();
        }
    }

    /// Run the solver.  Results land in `self.solution` and `self.info`.
    pub fn solve(&mut self) {
        let mut iter = 0u32;
        let mut μ;

        //timers is stored as an option so that
        //we can swap it out here and avoid
        //borrow conflicts with other fields
        let mut timers = self.timers.take().unwrap_or_default();

        notimeit! {timers; {
            let _ = self.info.print_banner(self.settings.verbose);
            let _ = self.info.print_configuration(&self.settings, &self.data, &self.layout);
            let _ = self.info.print_status_header(&self.settings);
        }}

        self.info.reset(&mut timers);

        timeit! {timers => "solve"; {

        // fixed cold start: z = 0, v = 1, l = s = 1
        self.variables.cold_start();

        timeit! {timers => "IP iteration"; {

        // ----------
        // main loop
        // ----------

        loop {
            // residuals, gap and complementarity of the current iterate
            // --------------
            self.residuals.update(&self.data, &self.layout, &self.variables);
            μ = self.variables.calc_mu();
            self.info.save_scalars(μ, iter);
            self.info.update(&self.variables, &self.residuals, &timers);

            notimeit! {timers; {
                let _ = self.info.print_status(&self.settings);
            }}

            // convergence, iteration cap, time limit
            // --------------
            if self.info.check_termination(&self.settings, iter) {
                break;
            }
            if self.callbacks.check_termination(&self.info) {
                self.info.set_status(SolverStatus::CallbackTerminated);
                break;
            }

            iter += 1;

            // refactor the KKT system for the current pair values
            // --------------
            timeit! {timers => "kkt update"; {
                self.kkt.update(&self.data, &self.layout, &self.variables);
            }}

            // affine (predictor) direction
            // --------------
            timeit! {timers => "kkt solve"; {
                self.kkt.solve_affine(
                    &mut self.step,
                    &self.data,
                    &self.layout,
                    &self.variables,
                    &self.residuals,
                );
            }}

            let (α_aff, ls_aff) = self.variables.fraction_to_boundary(
                &self.step,
                self.settings.ls_scale_affine,
                self.settings.ls_min_step,
            );
            if α_aff < self.settings.ls_min_step {
                self.info.set_status(SolverStatus::NoProgress);
                break;
            }

            // Mehrotra centering from the complementarity the affine
            // step would reach
            // --------------
            let σ = {
                if μ > T::zero() {
                    let ratio = self.variables.mu_shifted(&self.step, α_aff) / μ;
                    ratio * ratio * ratio
                } else {
                    T::zero()
                }
            };

            // corrector direction, reusing the affine factorization;
            // combined direction = affine + corrector
            // --------------
            timeit! {timers => "kkt solve"; {
                self.kkt.solve_corrector(
                    &mut self.step_cc,
                    &self.data,
                    &self.layout,
                    &self.variables,
                    &self.step,
                    σ * μ,
                );
            }}
            self.step.add(&self.step_cc);

            let (α, ls) = self.variables.fraction_to_boundary(
                &self.step,
                self.settings.ls_scale_combined,
                self.settings.ls_min_step,
            );

            // back off the boundary so the new iterate stays strictly
            // interior; with no bounds at all the full step stands
            let α = {
                if self.layout.nb == 0 {
                    T::one()
                } else {
                    α * self.settings.max_step_fraction
                }
            };
            if α < self.settings.ls_min_step {
                self.info.set_status(SolverStatus::NoProgress);
                break;
            }

            self.info.save_step_lengths(α_aff, α, σ, ls_aff, ls);

            self.variables.add_step(&self.step, α);
        } //end loop

        }} // end "IP iteration" timer

        }} // end "solve" timer

        self.info.finalize(&mut timers);
        self.solution
            .finalize(&self.layout, &self.variables, &self.info);

        let _ = self.info.print_footer(&self.settings);

        //stow the timers back into Option in the solver struct
        self.timers.replace(timers);
    }
}

impl<T> ConfigurablePrintTarget for Solver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}
