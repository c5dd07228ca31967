//! Numeric traits and the small linear algebra kernels used by the solver.
//!
//! Everything here operates on plain slices or small owned buffers: the
//! per-stage blocks of an MPC problem are tiny, so there is no sparse
//! machinery, only dense column-major blocks, diagonal blocks, and the
//! regularized Cholesky kernels the Riccati sweep is built from.

mod cholesky;
mod floats;
mod math_traits;
mod matrix;
mod scalarmath;
mod vecmath;

pub use cholesky::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix::*;
pub use vecmath::*;
