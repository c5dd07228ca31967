use crate::algebra::*;
use crate::solver::problem::{Linking, ProblemData, Stage};
use crate::solver::settings::Settings;
use crate::solver::solver::Solver;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// A struct very similar to the problem data, but containing only
// the data types provided by the user (i.e. no internal types).

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub stages: Vec<Stage<T>>,
    pub links: Vec<Linking<T>>,
    pub settings: Settings<T>,
}

/// JSON capture and replay of a problem instance together with its
/// settings, for bug reports and repro cases.
pub trait SolverJSONReadWrite<T>: Sized
where
    T: FloatT,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error>;
    fn read_from_file(file: &mut File) -> Result<Self, io::Error>;
}

impl<T> SolverJSONReadWrite<T> for Solver<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let data = self.data();
        let mut json_data = JsonProblemData {
            stages: data.stages.clone(),
            links: data.links.clone(),
            settings: self.settings.clone(),
        };

        // sanitize settings to remove values that
        // can't be serialized, i.e. infs
        sanitize_settings(&mut json_data.settings);

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        // restore sanitized settings to their (likely) original values
        desanitize_settings(&mut json_data.settings);

        // the captured data was validated when first loaded, but a JSON
        // file can have been edited since
        let data = ProblemData::new(json_data.stages, json_data.links)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self::from_data(data, json_data.settings))
    }
}

fn sanitize_settings<T: FloatT>(settings: &mut Settings<T>) {
    if settings.time_limit == f64::INFINITY {
        settings.time_limit = f64::MAX;
    }
}

fn desanitize_settings<T: FloatT>(settings: &mut Settings<T>) {
    if settings.time_limit == f64::MAX {
        settings.time_limit = f64::INFINITY;
    }
}

#[test]
fn test_json_io() {
    use std::io::{Seek, SeekFrom};

    let stages = vec![
        Stage::new(vec![2., 2.], vec![-4., -2.]).with_lower_bounds(vec![0], vec![0.]),
        Stage::new(vec![1., 1.], vec![0., 0.]),
    ];
    let c = StageMatrix::Diagonal(DiagonalMatrix::identity(2, 2));
    let d = StageMatrix::Diagonal(DiagonalMatrix::minus_identity(2, 2));
    let links = vec![Linking::new(c, d, vec![0.5, 0.5])];

    let settings = crate::solver::SettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let mut solver = Solver::<f64>::new(stages, links, settings).unwrap();
    solver.solve();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    solver.write_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = Solver::<f64>::read_from_file(&mut file).unwrap();
    solver2.solve();
    assert_eq!(solver.solution.stage(0), solver2.solution.stage(0));
    assert_eq!(solver.solution.stage(1), solver2.solution.stage(1));
}
