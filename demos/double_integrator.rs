#![allow(non_snake_case)]
use stageqp::algebra::*;
use stageqp::solver::*;

// Drive a double integrator to the origin over a short horizon with the
// control input limited to |u| <= 0.5.
//
// Each stage variable is (p, v, u).  The dynamics
//     p' = p + dt v
//     v' = v + dt u
// become the coupling  [A B] z_i - [I 0] z_{i+1} = 0, and the known
// initial state is pinned with a pair of equal bounds on stage 0.

fn main() {
    let N = 20;
    let dt = 0.1;
    let x0 = [1.0, 0.0];

    let mut stages = Vec::with_capacity(N + 1);
    for i in 0..=N {
        // running cost p² + v² + 0.1 u², input limits on u
        let stage = Stage::new(vec![2., 2., 0.2], vec![0., 0., 0.]);
        let stage = if i == 0 {
            // equal bounds pin the known initial state
            stage
                .with_lower_bounds(vec![0, 1, 2], vec![x0[0], x0[1], -0.5])
                .with_upper_bounds(vec![0, 1, 2], vec![x0[0], x0[1], 0.5])
        } else {
            stage
                .with_lower_bounds(vec![2], vec![-0.5])
                .with_upper_bounds(vec![2], vec![0.5])
        };
        stages.push(stage);
    }

    let links = (0..N)
        .map(|_| {
            let CB = DenseMatrix::from_rows(&[
                &[1., dt, 0.], // p' from (p, v)
                &[0., 1., dt], // v' from (v, u)
            ]);
            let D = DiagonalMatrix::minus_identity(2, 3);
            Linking::new(StageMatrix::Dense(CB), StageMatrix::Diagonal(D), vec![0., 0.])
        })
        .collect();

    let settings = SettingsBuilder::default().build().unwrap();
    let mut solver = Solver::new(stages, links, settings).unwrap();

    solver.solve();
    solver.print_timers();

    println!("\n  i        p          v          u");
    for i in 0..solver.solution.nstages() {
        let z = solver.solution.stage(i);
        println!("{:3}  {:9.5}  {:9.5}  {:9.5}", i, z[0], z[1], z[2]);
    }
}
