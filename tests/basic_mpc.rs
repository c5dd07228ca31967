#![allow(non_snake_case)]

use stageqp::{algebra::*, solver::*};

// a horizon of identical scalar stages chained by z_i = z_{i+1}, so the
// optimum is a single value shared by every stage
fn chain(n: usize, ub: Option<f64>) -> Solver<f64> {
    let mut stages: Vec<Stage<f64>> = (0..n).map(|_| Stage::new(vec![1.], vec![-1.])).collect();
    if let Some(ub) = ub {
        stages[n / 2] = Stage::new(vec![1.], vec![-1.]).with_upper_bounds(vec![0], vec![ub]);
    }
    let links = (0..n - 1)
        .map(|_| {
            Linking::new(
                StageMatrix::Dense(DenseMatrix::from_rows(&[&[1.]])),
                StageMatrix::Dense(DenseMatrix::from_rows(&[&[-1.]])),
                vec![0.],
            )
        })
        .collect();

    let settings = SettingsBuilder::default().verbose(false).build().unwrap();
    Solver::new(stages, links, settings).unwrap()
}

#[test]
fn test_chain_unbounded() {
    let mut solver = chain(8, None);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    for i in 0..solver.solution.nstages() {
        assert!(f64::abs(solver.solution.stage(i)[0] - 1.) <= 1e-6);
    }
}

#[test]
fn test_chain_bound_propagates() {
    // an upper bound on one interior stage caps the whole chain
    let mut solver = chain(8, Some(0.5));
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    for i in 0..solver.solution.nstages() {
        assert!(f64::abs(solver.solution.stage(i)[0] - 0.5) <= 1e-4);
    }
    assert!(solver.solution.res_eq <= 1e-6);
    assert!(solver.solution.res_ineq <= 1e-6);
}

#[test]
fn test_long_horizon() {
    // the Riccati sweep must stay stable over a long horizon
    let mut solver = chain(200, Some(0.5));
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    assert!(f64::abs(solver.solution.stage(0)[0] - 0.5) <= 1e-4);
    assert!(f64::abs(solver.solution.stage(199)[0] - 0.5) <= 1e-4);
}
