// ---------------------------------
// enum for managing callbacks
// ---------------------------------

#[derive(Default, Debug)]
pub(crate) enum Callback<I> {
    #[default]
    None,
    Rust(fn(&I) -> bool),
}

impl<I> Callback<I> {
    fn call(&self, info: &I) -> bool {
        match self {
            Callback::None => false,
            Callback::Rust(f) => f(info),
        }
    }
}

#[derive(Debug)]
pub(crate) struct SolverCallbacks<I> {
    /// callback for termination
    pub termination_callback: Callback<I>,
}

impl<I> Default for SolverCallbacks<I> {
    fn default() -> Self {
        Self {
            termination_callback: Callback::None,
        }
    }
}

impl<I> SolverCallbacks<I> {
    pub(crate) fn check_termination(&self, info: &I) -> bool {
        self.termination_callback.call(info)
    }
}
