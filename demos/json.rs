#![allow(non_snake_case)]
use stageqp::algebra::*;
use stageqp::solver::*;
use std::io::{Seek, SeekFrom};

// Capture a problem to JSON and solve the reloaded copy.  The same
// mechanism turns a misbehaving problem into a shareable repro file.

fn main() {
    let stages = vec![
        Stage::new(vec![2., 2.], vec![-4., -2.]).with_lower_bounds(vec![0], vec![0.]),
        Stage::new(vec![1., 1.], vec![0., 0.]),
    ];
    let links = vec![Linking::new(
        StageMatrix::Diagonal(DiagonalMatrix::identity(2, 2)),
        StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2)),
        vec![0.5, 0.5],
    )];

    let settings = SettingsBuilder::default().build().unwrap();
    let mut solver = Solver::<f64>::new(stages, links, settings).unwrap();

    let mut file = tempfile::tempfile().unwrap();
    solver.write_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reloaded = Solver::<f64>::read_from_file(&mut file).unwrap();
    reloaded.solve();

    println!("Solution = {:?}", reloaded.solution.stage(0));
}
