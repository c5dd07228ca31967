use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::info::Info;
use crate::solver::layout::StageLayout;
use crate::solver::problem::ProblemData;
use crate::solver::settings::Settings;
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for Info<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

const RULE: &str = "--------------------------------------------------------------------------";

impl<T> Info<T>
where
    T: FloatT,
{
    pub(crate) fn print_banner(&mut self, verbose: bool) -> std::io::Result<()> {
        if !verbose {
            return Ok(());
        }
        let out = &mut self.stream;
        writeln!(out, "{}", RULE)?;
        writeln!(
            out,
            "      stageqp v{}  -  multistage MPC QP solver\n",
            crate::VERSION
        )?;
        writeln!(out, "{}", RULE)
    }

    pub(crate) fn print_configuration(
        &mut self,
        settings: &Settings<T>,
        data: &ProblemData<T>,
        layout: &StageLayout,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        if data.presolve_dropped > 0 {
            writeln!(
                out,
                "\npresolve: removed {} unbounded limits",
                data.presolve_dropped
            )?;
        }

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  stages        = {}", layout.nstages())?;
        writeln!(out, "  variables     = {}", layout.nz)?;
        writeln!(out, "  equalities    = {}", layout.nv)?;
        writeln!(out, "  bounds        = {}", layout.nb)?;
        writeln!(out)?;

        writeln!(out, "settings:")?;
        writeln!(
            out,
            "  precision: {} bit",
            ::std::mem::size_of::<T>() * 8
        )?;

        let time_lim_str = {
            if settings.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", settings.time_limit)
            }
        };
        writeln!(
            out,
            "  max iter = {}, time limit = {}, max step = {:.3}",
            settings.max_iter, time_lim_str, settings.max_step_fraction
        )?;
        writeln!(
            out,
            "  tol_compl = {:.1e}, tol_gap_rel = {:.1e}, tol_eq = {:.1e}, tol_ineq = {:.1e}",
            settings.tol_compl, settings.tol_gap_rel, settings.tol_eq, settings.tol_ineq
        )?;
        writeln!(
            out,
            "  line search: scale aff = {:.2}, scale comb = {:.2}, min step = {:.1e}",
            settings.ls_scale_affine, settings.ls_scale_combined, settings.ls_min_step
        )?;
        writeln!(
            out,
            "  pivot floor: ϵ = {:.1e}, value = {:.1e}, saturation = {:.1e}",
            settings.pivot_floor_eps, settings.pivot_floor_value, settings.saturation_bound
        )?;
        writeln!(out)
    }

    pub(crate) fn print_status_header(&mut self, settings: &Settings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        write!(out, "iter    ")?;
        write!(out, "pcost        ")?;
        write!(out, "dcost       ")?;
        write!(out, "gap       ")?;
        write!(out, "res_eq    ")?;
        write!(out, "res_ineq  ")?;
        write!(out, " μ       ")?;
        write!(out, "step      ")?;
        writeln!(out)?;
        writeln!(out, "{}", RULE)?;
        out.flush()
    }

    pub(crate) fn print_status(&mut self, settings: &Settings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>3}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_primal))?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_dual))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.gap_abs))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_eq))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_ineq))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.μ))?;

        if self.iterations > 0 {
            write!(out, "{}  ", expformat!("{:>.2e}", self.step_combined))?;
        } else {
            write!(out, " ------   ")?;
        }

        writeln!(out)
    }

    pub(crate) fn print_footer(&mut self, settings: &Settings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "{}", RULE)?;
        writeln!(out, "Terminated with status = {}", self.status)?;
        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )
    }
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    // `thestr` is guaranteed to contain 'e' by the format strings above
    let eidx = match thestr.find('e') {
        Some(idx) => idx,
        None => return thestr,
    };
    let has_sign = thestr.chars().nth(eidx + 1) == Some('-');

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars;
    if !has_sign {
        if has_short_exp {
            chars = "+0";
        } else {
            chars = "+";
        }
    } else if has_short_exp {
        chars = "0";
    } else {
        chars = "";
    }

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}
