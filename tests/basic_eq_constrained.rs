#![allow(non_snake_case)]

use stageqp::{algebra::*, solver::*};

#[test]
fn test_two_stage_coupled() {
    // min z0'z0 - 4 z01 - 2 z02 + 0.5 z1'z1   s.t.  z0 - z1 = (0.5, 0.5)
    let stages = vec![
        Stage::new(vec![2., 2.], vec![-4., -2.]),
        Stage::new(vec![1., 1.], vec![0., 0.]),
    ];
    let links = vec![Linking::new(
        StageMatrix::Diagonal(DiagonalMatrix::identity(2, 2)),
        StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2)),
        vec![0.5, 0.5],
    )];

    let settings = SettingsBuilder::default().verbose(false).build().unwrap();
    let mut solver = Solver::<f64>::new(stages, links, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);

    // per coordinate: 3 z0 = e - f
    let ref0 = [1.5, 2.5 / 3.];
    let ref1 = [1.0, 2.5 / 3. - 0.5];
    assert!(solver.solution.stage(0).dist(&ref0) <= 1e-8);
    assert!(solver.solution.stage(1).dist(&ref1) <= 1e-8);
    assert!(solver.solution.res_eq <= 1e-8);
}

#[test]
fn test_rectangular_links() {
    // three stages of unequal width chained by dense rectangular couplings
    let stages = vec![
        Stage::new(vec![1., 1., 1.], vec![0.1, -0.2, 0.3]),
        Stage::new(vec![2., 2.], vec![0., 0.]),
        Stage::new(vec![1., 1., 1.], vec![-0.5, 0., 0.]),
    ];
    let c0 = DenseMatrix::from_rows(&[&[1., 0., 1.], &[0., 1., -1.]]);
    let d0 = DenseMatrix::from_rows(&[&[-1., 0.], &[0., -1.]]);
    let c1 = DenseMatrix::from_rows(&[&[1., 1.], &[1., -1.]]);
    let d1 = DenseMatrix::from_rows(&[&[-1., 0., 0.], &[0., -1., 0.]]);
    let links = vec![
        Linking::new(
            StageMatrix::Dense(c0),
            StageMatrix::Dense(d0),
            vec![0.2, -0.1],
        ),
        Linking::new(StageMatrix::Dense(c1), StageMatrix::Dense(d1), vec![0., 0.3]),
    ];

    let settings = SettingsBuilder::default().verbose(false).build().unwrap();
    let mut solver = Solver::<f64>::new(stages, links, settings).unwrap();
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Optimal);
    assert!(solver.solution.res_eq <= 1e-8);

    // check the couplings directly on the returned stages
    let (z0, z1, z2) = (
        solver.solution.stage(0),
        solver.solution.stage(1),
        solver.solution.stage(2),
    );
    assert!(f64::abs(z0[0] + z0[2] - z1[0] - 0.2) <= 1e-7);
    assert!(f64::abs(z0[1] - z0[2] - z1[1] + 0.1) <= 1e-7);
    assert!(f64::abs(z1[0] + z1[1] - z2[0]) <= 1e-7);
    assert!(f64::abs(z1[0] - z1[1] - z2[1] - 0.3) <= 1e-7);
}
