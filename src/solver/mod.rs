//! Main solver module for the stagewise interior-point method.

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;

mod callbacks;
mod info;
mod info_print;
mod kkt;
mod layout;
mod problem;
mod residuals;
mod settings;
mod solution;
#[allow(clippy::module_inception)]
mod solver;
mod variables;

pub mod utils;

#[cfg(feature = "serde")]
mod json;
#[cfg(feature = "serde")]
pub use json::SolverJSONReadWrite;

pub use info::Info;
pub use problem::{DataError, Linking, ProblemData, Stage};
pub use settings::{Settings, SettingsBuilder, SettingsError};
pub use solution::Solution;
pub use solver::{Solver, SolverError, SolverStatus};
pub use utils::infbounds::{default_infinity, get_infinity, set_infinity};
