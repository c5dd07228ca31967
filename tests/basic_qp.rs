#![allow(non_snake_case)]

use stageqp::{algebra::*, solver::*};

fn settings_quiet() -> Settings<f64> {
    SettingsBuilder::default().verbose(false).build().unwrap()
}

#[test]
fn test_qp_inactive_bound() {
    // lower bound well below the unconstrained minimizer (2, 1)
    let stages =
        vec![Stage::new(vec![2., 2.], vec![-4., -2.]).with_lower_bounds(vec![0, 1], vec![0., 0.])];

    let mut solver = Solver::<f64>::new(stages, vec![], settings_quiet()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    assert!(solver.solution.stage(0).dist(&[2., 1.]) <= 1e-4);
    assert!(f64::abs(solver.solution.obj_val - (-5.)) <= 1e-4);
}

#[test]
fn test_qp_active_bound() {
    // unconstrained minimizer z = 2, clipped by the upper bound z <= 1
    let stages = vec![Stage::new(vec![2.], vec![-4.]).with_upper_bounds(vec![0], vec![1.])];

    let mut solver = Solver::<f64>::new(stages, vec![], settings_quiet()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    assert!(f64::abs(solver.solution.stage(0)[0] - 1.) <= 1e-4);
    assert!(f64::abs(solver.solution.obj_val - (-3.)) <= 1e-3);
    assert!(solver.solution.res_ineq <= 1e-6);
}

#[test]
fn test_qp_pinned_variable() {
    // lb == ub pins the variable; the barrier must not blow up on the
    // empty interior
    let stages = vec![Stage::new(vec![2., 1.], vec![0., -1.]).with_box_bounds(
        vec![1., -10.],
        vec![1., 10.],
    )];

    let mut solver = Solver::<f64>::new(stages, vec![], settings_quiet()).unwrap();
    solver.solve();

    let z = solver.solution.stage(0);
    assert!(z.is_finite());
    assert!(f64::abs(z[0] - 1.) <= 1e-3);
    assert!(f64::abs(z[1] - 1.) <= 1e-3);
    assert!(matches!(
        solver.solution.status,
        SolverStatus::Optimal | SolverStatus::MaxIterations
    ));
}

#[test]
fn test_qp_loose_bounds() {
    // finite but huge bounds stay in the problem; the solution is the
    // unconstrained minimizer
    let stages = vec![
        Stage::new(vec![2., 4.], vec![-4., -2.]).with_box_bounds(vec![-1e6, -1e6], vec![1e6, 1e6]),
    ];

    let mut solver = Solver::<f64>::new(stages, vec![], settings_quiet()).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    assert!(solver.solution.stage(0).dist(&[2., 0.5]) <= 1e-3);
}

#[test]
fn test_qp_deterministic() {
    let make = || {
        let stages = vec![
            Stage::new(vec![2., 2.], vec![-4., -2.]).with_box_bounds(vec![0., 0.], vec![1.5, 1.5]),
            Stage::new(vec![1., 1.], vec![0.3, -0.7]).with_lower_bounds(vec![1], vec![0.]),
        ];
        let links = vec![Linking::new(
            StageMatrix::Diagonal(DiagonalMatrix::identity(2, 2)),
            StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2)),
            vec![0.5, 0.5],
        )];
        Solver::<f64>::new(stages, links, settings_quiet()).unwrap()
    };

    let mut a = make();
    let mut b = make();
    a.solve();
    b.solve();

    // bitwise identical across fresh solves
    assert_eq!(a.solution.stage(0), b.solution.stage(0));
    assert_eq!(a.solution.stage(1), b.solution.stage(1));
    assert_eq!(a.solution.iterations, b.solution.iterations);
}
