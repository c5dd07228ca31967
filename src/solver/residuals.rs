use crate::algebra::*;
use crate::solver::layout::StageLayout;
use crate::solver::problem::ProblemData;
use crate::solver::variables::Variables;

/// KKT residuals of the current iterate, refreshed once per iteration.
///
/// Conventions: the stationarity residual is
/// rd = Hz + f + Aᵀv − Gₗᵀl_lb + Gᵤᵀl_ub, the equality residual is
/// re = Az − e, and per bound pair the slack consistency residual is
/// rl = s − (z[k] − lb) for lower bounds and rl = s − (ub − z[k]) for
/// upper bounds.  All are zero at a KKT point.
#[derive(Debug, Clone)]
pub(crate) struct Residuals<T> {
    /// stationarity residual, one entry per primal
    pub rd: Vec<T>,
    /// equality residual, one entry per link row
    pub re: Vec<T>,
    /// slack consistency residual, one entry per bound pair
    pub rl: Vec<T>,

    /// ‖rd‖∞
    pub norm_rd: T,
    /// ‖re‖∞
    pub norm_re: T,
    /// largest raw bound violation max(lb − z, z − ub, 0)
    pub norm_viol: T,
    /// primal objective ½zᵀHz + fᵀz
    pub pobj: T,
}

impl<T> Residuals<T>
where
    T: FloatT,
{
    pub fn new(layout: &StageLayout) -> Self {
        Self {
            rd: vec![T::zero(); layout.nz],
            re: vec![T::zero(); layout.nv],
            rl: vec![T::zero(); layout.nb],
            norm_rd: T::zero(),
            norm_re: T::zero(),
            norm_viol: T::zero(),
            pobj: T::zero(),
        }
    }

    pub fn update(&mut self, data: &ProblemData<T>, layout: &StageLayout, vars: &Variables<T>) {
        // stage costs and gradient: rd = Hz + f
        let mut pobj = T::zero();
        for (i, stage) in data.stages.iter().enumerate() {
            let rng = layout.z(i);
            pobj += quad_form_diag(&mut self.rd[rng.clone()], &stage.h, &vars.z[rng], &stage.f);
        }
        self.pobj = pobj;

        // equality terms: rd += Aᵀv, re = Az − e
        for (i, link) in data.links.iter().enumerate() {
            let vi = &vars.v[layout.v(i)];
            link.c.gemv_t(&mut self.rd[layout.z(i)], vi, T::one());
            link.d.gemv_t(&mut self.rd[layout.z(i + 1)], vi, T::one());

            let rei = &mut self.re[layout.v(i)];
            rei.scalarop_from(|e| -e, &link.e);
            link.c.gemv(rei, &vars.z[layout.z(i)], T::one());
            link.d.gemv(rei, &vars.z[layout.z(i + 1)], T::one());
        }

        // bound terms
        let mut viol = T::zero();
        for (i, stage) in data.stages.iter().enumerate() {
            let zoff = layout.z(i).start;

            for (p, (&k, &lb)) in layout
                .lb(i)
                .zip(stage.lb_index.iter().zip(stage.lb.iter()))
            {
                self.rd[zoff + k] -= vars.l[p];
                self.rl[p] = vars.s[p] + lb - vars.z[zoff + k];
                viol = T::max(viol, lb - vars.z[zoff + k]);
            }
            for (p, (&k, &ub)) in layout
                .ub(i)
                .zip(stage.ub_index.iter().zip(stage.ub.iter()))
            {
                self.rd[zoff + k] += vars.l[p];
                self.rl[p] = vars.s[p] - ub + vars.z[zoff + k];
                viol = T::max(viol, vars.z[zoff + k] - ub);
            }
        }

        self.norm_rd = self.rd.norm_inf();
        self.norm_re = self.re.norm_inf();
        self.norm_viol = viol;
    }
}
