#![allow(non_snake_case)]

use stageqp::solver::*;

fn bounded_qp(settings: Settings<f64>) -> Solver<f64> {
    // active upper bound, so the solve takes several iterations
    let stages = vec![Stage::new(vec![2.], vec![-4.]).with_upper_bounds(vec![0], vec![1.])];
    Solver::new(stages, vec![], settings).unwrap()
}

#[test]
fn test_max_iterations() {
    let settings = SettingsBuilder::default()
        .verbose(false)
        .max_iter(1u32)
        .build()
        .unwrap();
    let mut solver = bounded_qp(settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::MaxIterations);
    assert_eq!(solver.solution.iterations, 1);
}

#[test]
fn test_time_limit() {
    let settings = SettingsBuilder::default()
        .verbose(false)
        .time_limit(0.0)
        .build()
        .unwrap();
    let mut solver = bounded_qp(settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::MaxTime);
}

#[test]
fn test_no_progress() {
    // the first affine direction on this problem crosses the slack
    // boundary (Δs = -4/3 from the cold start), so the line search must
    // backtrack at least once to α = 0.9; a minimum step threshold above
    // that makes the search fail and the solver must halt rather than
    // take the undersized step
    let settings = SettingsBuilder::default()
        .verbose(false)
        .ls_min_step(0.99)
        .build()
        .unwrap();
    let mut solver = bounded_qp(settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::NoProgress);
    // the failure happens inside the first iteration, before it completes
    assert_eq!(solver.solution.iterations, 0);
}

// terminate immediately from the callback
fn stop_now(_info: &Info<f64>) -> bool {
    true
}

#[test]
fn test_termination_callback() {
    let settings = SettingsBuilder::default().verbose(false).build().unwrap();
    let mut solver = bounded_qp(settings);

    solver.set_termination_callback(stop_now);
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::CallbackTerminated);
    assert_eq!(solver.solution.iterations, 0);

    // turn it off and run again
    solver.unset_termination_callback();
    solver.solve();
    assert_eq!(solver.solution.status, SolverStatus::Optimal);
}
