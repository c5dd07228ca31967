#![allow(non_snake_case)]
use crate::algebra::*;
use crate::solver::layout::StageLayout;
use crate::solver::problem::ProblemData;
use crate::solver::residuals::Residuals;
use crate::solver::settings::Settings;
use crate::solver::variables::Variables;

/// Structure-exploiting KKT system for the block-tridiagonal horizon.
///
/// Eliminating the bound pairs folds them into the regularized diagonal
/// Φᵢ = Hᵢ + (l/s)ₗ + (l/s)ᵤ; eliminating the primals then leaves the
/// Schur system Y Δv = β in the equality multipliers, with
/// Yᵢᵢ = Cᵢ Φᵢ⁻¹ Cᵢᵀ + Dᵢ Φᵢ₊₁⁻¹ Dᵢᵀ and Yᵢ₊₁,ᵢ = Cᵢ₊₁ Φᵢ₊₁⁻¹ Dᵢᵀ.
/// `update` factors Y once per iteration with a stage-ordered block
/// Cholesky; the affine and corrector solves both reuse that factor.
pub(crate) struct RiccatiKKT<T> {
    /// reciprocal of the floored Φ diagonal, flat over all primals
    φinv: Vec<T>,
    /// diagonal block factors, one per link
    Ld: Vec<CholeskyFactor<T>>,
    /// sub-diagonal coupling factors; entry 0 is an empty placeholder
    Lsd: Vec<DenseMatrix<T>>,
    /// Y diagonal block assembly workspace
    Y: Vec<DenseMatrix<T>>,
    /// reduced stationarity right-hand side r̃d
    rtilde: Vec<T>,
    /// Schur right-hand side, overwritten by y then Δv during the sweep
    β: Vec<T>,

    pivot_floor_eps: T,
    pivot_floor_value: T,
}

impl<T> RiccatiKKT<T>
where
    T: FloatT,
{
    pub fn new(data: &ProblemData<T>, layout: &StageLayout, settings: &Settings<T>) -> Self {
        let mut Ld = Vec::with_capacity(data.links.len());
        let mut Lsd = Vec::with_capacity(data.links.len());
        let mut Y = Vec::with_capacity(data.links.len());

        for (i, link) in data.links.iter().enumerate() {
            let m = link.nrows();
            Ld.push(CholeskyFactor::new(
                m,
                settings.pivot_floor_eps,
                settings.pivot_floor_value,
                settings.saturation_bound,
            ));
            let mprev = if i == 0 { 0 } else { data.links[i - 1].nrows() };
            Lsd.push(DenseMatrix::zeros(m, mprev));
            Y.push(DenseMatrix::zeros(m, m));
        }

        Self {
            φinv: vec![T::zero(); layout.nz],
            Ld,
            Lsd,
            Y,
            rtilde: vec![T::zero(); layout.nz],
            β: vec![T::zero(); layout.nv],
            pivot_floor_eps: settings.pivot_floor_eps,
            pivot_floor_value: settings.pivot_floor_value,
        }
    }

    /// Rebuild Φ from the current pair values and refactor the Schur
    /// system.  Called once per iteration, before the affine solve.
    pub fn update(&mut self, data: &ProblemData<T>, layout: &StageLayout, vars: &Variables<T>) {
        // Φ = H + (l/s) over both bound sets, floored, stored inverted
        for (i, stage) in data.stages.iter().enumerate() {
            let φ = &mut self.φinv[layout.z(i)];
            φ.copy_from(&stage.h);

            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                φ[k] += vars.l[p] / vars.s[p];
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                φ[k] += vars.l[p] / vars.s[p];
            }

            floor_diagonal(φ, self.pivot_floor_eps, self.pivot_floor_value);
            φ.scalarop(T::recip);
        }

        // assemble the Y diagonal blocks
        for (i, link) in data.links.iter().enumerate() {
            self.Y[i].fill(T::zero());
            link.c.gram_scaled(&self.φinv[layout.z(i)], &mut self.Y[i]);
            link.d.gram_scaled(&self.φinv[layout.z(i + 1)], &mut self.Y[i]);
        }

        // stage-ordered block Cholesky: each Lsd needs the previous Ld
        for i in 0..data.links.len() {
            if i > 0 {
                cross_scaled(
                    &data.links[i].c,
                    &self.φinv[layout.z(i)],
                    &data.links[i - 1].d,
                    &mut self.Lsd[i],
                );
                self.Ld[i - 1].solve_rows(&mut self.Lsd[i]);
                downdate(&mut self.Y[i], &self.Lsd[i]);
            }
            let (ld, y) = (&mut self.Ld[i], &self.Y[i]);
            ld.factor(y);
        }
    }

    /// Solve for the affine (predictor) direction.
    pub fn solve_affine(
        &mut self,
        step: &mut Variables<T>,
        data: &ProblemData<T>,
        layout: &StageLayout,
        vars: &Variables<T>,
        res: &Residuals<T>,
    ) {
        // r̃d = rd + Gₗᵀ (l/s)(s − rl) − Gᵤᵀ (l/s)(s − rl)
        self.rtilde.copy_from(&res.rd);
        for (i, stage) in data.stages.iter().enumerate() {
            let zoff = layout.z(i).start;
            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                let w = vars.l[p] * (vars.s[p] - res.rl[p]) / vars.s[p];
                self.rtilde[zoff + k] += w;
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                let w = vars.l[p] * (vars.s[p] - res.rl[p]) / vars.s[p];
                self.rtilde[zoff + k] -= w;
            }
        }

        // β = re − A Φ⁻¹ r̃d
        self.β.copy_from(&res.re);
        self.sweep_and_recover(step, data, layout);

        // pair recovery: Δs from the slack rows, Δl from complementarity
        // with the affine r_C = l∘s
        for (i, stage) in data.stages.iter().enumerate() {
            let zoff = layout.z(i).start;
            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                step.s[p] = step.z[zoff + k] - res.rl[p];
                step.l[p] = -vars.l[p] - vars.l[p] / vars.s[p] * step.s[p];
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                step.s[p] = -step.z[zoff + k] - res.rl[p];
                step.l[p] = -vars.l[p] - vars.l[p] / vars.s[p] * step.s[p];
            }
        }
    }

    /// Solve for the corrector direction: zero stationarity, equality and
    /// slack residuals, complementarity right-hand side
    /// r_C = Δl_aff∘Δs_aff − σμ.  Reuses the factorization from `update`.
    pub fn solve_corrector(
        &mut self,
        step: &mut Variables<T>,
        data: &ProblemData<T>,
        layout: &StageLayout,
        vars: &Variables<T>,
        step_aff: &Variables<T>,
        σμ: T,
    ) {
        self.rtilde.set(T::zero());
        for (i, stage) in data.stages.iter().enumerate() {
            let zoff = layout.z(i).start;
            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                let rc = step_aff.l[p] * step_aff.s[p] - σμ;
                self.rtilde[zoff + k] += rc / vars.s[p];
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                let rc = step_aff.l[p] * step_aff.s[p] - σμ;
                self.rtilde[zoff + k] -= rc / vars.s[p];
            }
        }

        self.β.set(T::zero());
        self.sweep_and_recover(step, data, layout);

        for (i, stage) in data.stages.iter().enumerate() {
            let zoff = layout.z(i).start;
            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                let rc = step_aff.l[p] * step_aff.s[p] - σμ;
                step.s[p] = step.z[zoff + k];
                step.l[p] = -(rc + vars.l[p] * step.s[p]) / vars.s[p];
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                let rc = step_aff.l[p] * step_aff.s[p] - σμ;
                step.s[p] = -step.z[zoff + k];
                step.l[p] = -(rc + vars.l[p] * step.s[p]) / vars.s[p];
            }
        }
    }

    /// Shared Schur solve: on entry `rtilde` holds r̃d and `β` holds the
    /// equality residual part of the right-hand side.  On exit `step.v`
    /// holds Δv and `step.z` holds Δz = −Φ⁻¹(r̃d + AᵀΔv).
    fn sweep_and_recover(
        &mut self,
        step: &mut Variables<T>,
        data: &ProblemData<T>,
        layout: &StageLayout,
    ) {
        let nlinks = data.links.len();

        // β −= A Φ⁻¹ r̃d, using Δz as scratch for Φ⁻¹ r̃d
        step.z.copy_from(&self.rtilde);
        step.z.hadamard(&self.φinv);
        for (i, link) in data.links.iter().enumerate() {
            let βi = &mut self.β[layout.v(i)];
            link.c.gemv(βi, &step.z[layout.z(i)], -T::one());
            link.d.gemv(βi, &step.z[layout.z(i + 1)], -T::one());
        }

        // forward substitution: L y = β, stage ordered
        for i in 0..nlinks {
            if i > 0 {
                let (prev, cur) = split_two(&mut self.β, layout.v(i - 1), layout.v(i));
                self.Lsd[i].gemv(cur, prev, -T::one());
            }
            self.Ld[i].solve_fwd(&mut self.β[layout.v(i)]);
        }

        // backward substitution: Lᵀ Δv = y, reverse stage ordered
        for i in (0..nlinks).rev() {
            if i + 1 < nlinks {
                let (cur, next) = split_two(&mut self.β, layout.v(i), layout.v(i + 1));
                self.Lsd[i + 1].gemv_t(cur, next, -T::one());
            }
            self.Ld[i].solve_bwd(&mut self.β[layout.v(i)]);
        }
        step.v.copy_from(&self.β);

        // Δz = −Φ⁻¹ (r̃d + AᵀΔv)
        for (i, link) in data.links.iter().enumerate() {
            let vi = &step.v[layout.v(i)];
            link.c.gemv_t(&mut self.rtilde[layout.z(i)], vi, T::one());
            link.d.gemv_t(&mut self.rtilde[layout.z(i + 1)], vi, T::one());
        }
        step.z.copy_from(&self.rtilde);
        step.z.hadamard(&self.φinv);
        step.z.negate();
    }
}

// M −= X Xᵀ, lower and upper both updated
fn downdate<T: FloatT>(M: &mut DenseMatrix<T>, X: &DenseMatrix<T>) {
    debug_assert_eq!(M.m, X.m);
    for i in 0..M.m {
        for j in 0..=i {
            let mut acc = T::zero();
            for k in 0..X.n {
                acc += X[(i, k)] * X[(j, k)];
            }
            M[(i, j)] -= acc;
            if i != j {
                M[(j, i)] -= acc;
            }
        }
    }
}

// two disjoint subslices of one buffer; `a` must precede `b`
fn split_two<T>(
    buf: &mut [T],
    a: std::ops::Range<usize>,
    b: std::ops::Range<usize>,
) -> (&mut [T], &mut [T]) {
    debug_assert!(a.end <= b.start);
    let (head, tail) = buf.split_at_mut(b.start);
    (&mut head[a], &mut tail[..b.end - b.start])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::problem::{Linking, Stage};
    use crate::solver::settings::Settings;

    // A three-stage chain with mixed dense/diagonal links and a few bounds.
    // Stage dims 2, 3, 2; both links carry 2 rows.
    fn chain() -> ProblemData<f64> {
        let stages = vec![
            Stage::new(vec![2., 1.], vec![-1., 0.5]).with_lower_bounds(vec![0], vec![-1.]),
            Stage::new(vec![1., 3., 2.], vec![0., -2., 1.])
                .with_box_bounds(vec![-1.; 3], vec![1.; 3]),
            Stage::new(vec![4., 1.], vec![1., -1.]).with_upper_bounds(vec![1], vec![2.]),
        ];

        let c0 = StageMatrix::Dense(DenseMatrix::from_rows(&[&[1., 0.5], &[0., 1.]]));
        let d0 = StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 3));
        let c1 = StageMatrix::Dense(DenseMatrix::from_rows(&[
            &[1., 0.2, 0.],
            &[0.1, 1., -0.3],
        ]));
        let d1 = StageMatrix::Diagonal(DiagonalMatrix::new(vec![-1., -2.], 2));

        let links = vec![
            Linking::new(c0, d0, vec![0.5, -0.5]),
            Linking::new(c1, d1, vec![1., 0.]),
        ];
        ProblemData::new(stages, links).unwrap()
    }

    // An arbitrary strictly interior iterate, off the cold start so sign
    // errors cannot cancel.
    fn interior_point(layout: &StageLayout) -> Variables<f64> {
        let mut vars = Variables::new(layout);
        vars.cold_start();
        for (k, z) in vars.z.iter_mut().enumerate() {
            *z = 0.1 * (k as f64) - 0.3;
        }
        for (k, v) in vars.v.iter_mut().enumerate() {
            *v = 0.2 * (k as f64) + 0.1;
        }
        for (k, l) in vars.l.iter_mut().enumerate() {
            *l = 0.5 + 0.1 * (k as f64);
        }
        for (k, s) in vars.s.iter_mut().enumerate() {
            *s = 1.5 - 0.1 * (k as f64);
        }
        vars
    }

    // H Δz + AᵀΔv − GₗᵀΔl + GᵤᵀΔl, accumulated by hand
    fn stationarity_lhs(
        data: &ProblemData<f64>,
        layout: &StageLayout,
        step: &Variables<f64>,
    ) -> Vec<f64> {
        let mut lhs = vec![0.0; layout.nz];
        for (i, stage) in data.stages.iter().enumerate() {
            let rng = layout.z(i);
            let zoff = rng.start;
            for (k, &h) in stage.h.iter().enumerate() {
                lhs[zoff + k] = h * step.z[zoff + k];
            }
            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                lhs[zoff + k] -= step.l[p];
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                lhs[zoff + k] += step.l[p];
            }
        }
        for (i, link) in data.links.iter().enumerate() {
            let vi = &step.v[layout.v(i)];
            link.c.gemv_t(&mut lhs[layout.z(i)], vi, 1.0);
            link.d.gemv_t(&mut lhs[layout.z(i + 1)], vi, 1.0);
        }
        lhs
    }

    fn equality_lhs(
        data: &ProblemData<f64>,
        layout: &StageLayout,
        step: &Variables<f64>,
    ) -> Vec<f64> {
        let mut lhs = vec![0.0; layout.nv];
        for (i, link) in data.links.iter().enumerate() {
            link.c.gemv(&mut lhs[layout.v(i)], &step.z[layout.z(i)], 1.0);
            link.d
                .gemv(&mut lhs[layout.v(i)], &step.z[layout.z(i + 1)], 1.0);
        }
        lhs
    }

    #[test]
    fn test_affine_direction_satisfies_newton_system() {
        let data = chain();
        let layout = StageLayout::new(&data);
        let vars = interior_point(&layout);

        let mut res = Residuals::new(&layout);
        res.update(&data, &layout, &vars);

        let settings = Settings::<f64>::default();
        let mut kkt = RiccatiKKT::new(&data, &layout, &settings);
        kkt.update(&data, &layout, &vars);

        let mut step = Variables::new(&layout);
        kkt.solve_affine(&mut step, &data, &layout, &vars, &res);

        // stationarity rows
        let lhs = stationarity_lhs(&data, &layout, &step);
        for (lhs, rd) in lhs.iter().zip(res.rd.iter()) {
            assert!((lhs + rd).abs() < 1e-10);
        }

        // equality rows
        let lhs = equality_lhs(&data, &layout, &step);
        for (lhs, re) in lhs.iter().zip(res.re.iter()) {
            assert!((lhs + re).abs() < 1e-10);
        }

        // slack rows and complementarity rows
        for (i, stage) in data.stages.iter().enumerate() {
            let zoff = layout.z(i).start;
            for (p, &k) in layout.lb(i).zip(stage.lb_index.iter()) {
                assert!((step.z[zoff + k] - step.s[p] - res.rl[p]).abs() < 1e-10);
            }
            for (p, &k) in layout.ub(i).zip(stage.ub_index.iter()) {
                assert!((-step.z[zoff + k] - step.s[p] - res.rl[p]).abs() < 1e-10);
            }
        }
        for p in 0..layout.nb {
            let comp = vars.s[p] * step.l[p] + vars.l[p] * step.s[p];
            assert!((comp + vars.l[p] * vars.s[p]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_corrector_direction_satisfies_newton_system() {
        let data = chain();
        let layout = StageLayout::new(&data);
        let vars = interior_point(&layout);

        let mut res = Residuals::new(&layout);
        res.update(&data, &layout, &vars);

        let settings = Settings::<f64>::default();
        let mut kkt = RiccatiKKT::new(&data, &layout, &settings);
        kkt.update(&data, &layout, &vars);

        let mut step_aff = Variables::new(&layout);
        kkt.solve_affine(&mut step_aff, &data, &layout, &vars, &res);

        let σμ = 0.3;
        let mut step = Variables::new(&layout);
        kkt.solve_corrector(&mut step, &data, &layout, &vars, &step_aff, σμ);

        // homogeneous stationarity and equality rows
        let lhs = stationarity_lhs(&data, &layout, &step);
        assert!(lhs.iter().all(|x| x.abs() < 1e-10));
        let lhs = equality_lhs(&data, &layout, &step);
        assert!(lhs.iter().all(|x| x.abs() < 1e-10));

        // complementarity rows against the corrector right-hand side
        for p in 0..layout.nb {
            let rc = step_aff.l[p] * step_aff.s[p] - σμ;
            let comp = vars.s[p] * step.l[p] + vars.l[p] * step.s[p];
            assert!((comp + rc).abs() < 1e-10);
        }
    }

    #[test]
    fn test_single_stage_no_links() {
        // no links at all: Δz = −Φ⁻¹ r̃d directly
        let stages = vec![Stage::new(vec![2., 4.], vec![-4., -2.])];
        let data = ProblemData::new(stages, vec![]).unwrap();
        let layout = StageLayout::new(&data);
        let mut vars = Variables::new(&layout);
        vars.cold_start();

        let mut res = Residuals::new(&layout);
        res.update(&data, &layout, &vars);

        let settings = Settings::<f64>::default();
        let mut kkt = RiccatiKKT::new(&data, &layout, &settings);
        kkt.update(&data, &layout, &vars);

        let mut step = Variables::new(&layout);
        kkt.solve_affine(&mut step, &data, &layout, &vars, &res);

        // H(z + Δz) + f = 0 in one step for an unconstrained QP
        assert!((step.z[0] - 2.0).abs() < 1e-14);
        assert!((step.z[1] - 0.5).abs() < 1e-14);
        assert!(step.v.is_empty());
    }
}
