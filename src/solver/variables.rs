use crate::algebra::*;
use crate::solver::layout::StageLayout;

/// The interior-point iterate: all stage primals `z`, all equality
/// multipliers `v`, and the bound multiplier/slack pairs `l`/`s` in flat
/// buffers sliced through the [`StageLayout`].   The same type doubles as
/// a step direction.
#[derive(Debug, Clone)]
pub(crate) struct Variables<T> {
    pub z: Vec<T>,
    pub v: Vec<T>,
    pub l: Vec<T>,
    pub s: Vec<T>,
}

impl<T> Variables<T>
where
    T: FloatT,
{
    pub fn new(layout: &StageLayout) -> Self {
        Self {
            z: vec![T::zero(); layout.nz],
            v: vec![T::zero(); layout.nv],
            l: vec![T::zero(); layout.nb],
            s: vec![T::zero(); layout.nb],
        }
    }

    /// The fixed cold start z = 0, v = 1, l = s = 1.  Every solve begins
    /// here; there is no warm start.
    pub fn cold_start(&mut self) {
        self.z.set(T::zero());
        self.v.set(T::one());
        self.l.set(T::one());
        self.s.set(T::one());
    }

    /// μ = lᵀs / nb, zero when there are no bounds.
    pub fn calc_mu(&self) -> T {
        let nb = self.l.len();
        if nb == 0 {
            T::zero()
        } else {
            self.l.dot(&self.s) / (nb).as_T()
        }
    }

    /// total complementarity lᵀs, the duality gap at a feasible pair
    pub fn gap(&self) -> T {
        self.l.dot(&self.s)
    }

    /// μ after a step of length α along the given direction
    pub fn mu_shifted(&self, step: &Variables<T>, α: T) -> T {
        let nb = self.l.len();
        if nb == 0 {
            T::zero()
        } else {
            <[T] as VectorMath>::dot_shifted(&self.l, &self.s, &step.l, &step.s, α) / (nb).as_T()
        }
    }

    /// self += α step.  The pair buffers must stay strictly positive;
    /// the line searches guarantee it, this asserts it.
    pub fn add_step(&mut self, step: &Variables<T>, α: T) {
        self.z.axpby(α, &step.z, T::one());
        self.v.axpby(α, &step.v, T::one());
        self.l.axpby(α, &step.l, T::one());
        self.s.axpby(α, &step.s, T::one());

        debug_assert!(self.l.iter().all(|&x| x > T::zero()));
        debug_assert!(self.s.iter().all(|&x| x > T::zero()));
    }

    /// self += other, used to fold the corrector into the affine direction
    pub fn add(&mut self, other: &Variables<T>) {
        self.z.axpby(T::one(), &other.z, T::one());
        self.v.axpby(T::one(), &other.v, T::one());
        self.l.axpby(T::one(), &other.l, T::one());
        self.s.axpby(T::one(), &other.s, T::one());
    }

    /// Fraction-to-boundary line search: geometric backtrack from α = 1 by
    /// `scale` until l + αΔl and s + αΔs are both nonnegative, stopping
    /// once α drops below `min_step`.  Returns the step and the number of
    /// backtracks taken; the caller treats an undersized step as failure.
    pub fn fraction_to_boundary(&self, step: &Variables<T>, scale: T, min_step: T) -> (T, u32) {
        let mut α = T::one();
        let mut iters = 0u32;

        while any_negative_shifted(&self.l, &step.l, α)
            || any_negative_shifted(&self.s, &step.s, α)
        {
            α = α * scale;
            iters += 1;
            if α < min_step {
                break;
            }
        }
        (α, iters)
    }
}
