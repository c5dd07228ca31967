//! __stageqp__ is a structure-exploiting interior point solver for the
//! block-structured convex quadratic programs that arise from finite-horizon
//! model predictive control, e.g. belief-space trajectory optimization and
//! state-estimation MPC.  It solves problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \sum_{i=0}^{N}\ \tfrac{1}{2}z_i^T H_i z_i + f_i^T z_i\\\\\[2ex\]
//!  \text{subject to} & C_i z_i + D_i z_{i+1} = e_i, \quad i = 0,\ldots,N-1 \\\\\[1ex\]
//!         & lb_i \le (z_i)_{\mathcal{L}_i}, \quad (z_i)_{\mathcal{U}_i} \le ub_i
//!  \end{array}
//! $$
//!
//! with per-stage decision variables $z_i$, diagonal cost Hessians
//! $H_i \succeq 0$, stage-to-stage linking matrices $C_i$ / $D_i$ and box
//! bounds on the index subsets $\mathcal{L}_i$ / $\mathcal{U}_i$.
//!
//! The solver runs a Mehrotra predictor-corrector iteration in which each KKT
//! solve is reduced, Riccati style, to a sequence of small per-stage Cholesky
//! factorizations chained by a forward/backward sweep over the horizon.  The
//! cost per iteration is linear in the horizon length rather than cubic in
//! the total variable count.
//!
//! A solve is cold started, synchronous and self-contained: all iterate
//! state lives in the solver object, so independent solvers may run
//! concurrently on separate threads.

// greek identifiers appear throughout the interior-point code
#![allow(confusable_idents)]

/// crate version, reported in the solver banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;
