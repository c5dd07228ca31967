//! Internal utility functions and helpers.

pub(crate) mod atomic;
pub mod infbounds;
