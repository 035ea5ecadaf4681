#![forbid(unsafe_code)]

//! JSON (de)serialization for the cone-program wire format: a `Problem`
//! (matrix, right-hand side, cost, cone partition) in, an `Info`-wrapped
//! `Sol` out.

use anyhow::{anyhow, Context, Result};
use cvxrs_core::math::Scalar;
use cvxrs_core::problem::Problem;
use cvxrs_core::solution::{Info, Sol};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonProblem {
    pub problem: Problem<Scalar>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSolution {
    pub sol: Sol<Scalar>,
    pub info: Info<Scalar>,
}

pub fn read_json_problem<P: AsRef<Path>>(path: P) -> Result<Problem<Scalar>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .with_context(|| format!("failed to read {:?}", path))?;

    match serde_json::from_str::<JsonProblem>(&contents) {
        Ok(wrapped) => Ok(wrapped.problem),
        Err(parse_err) => {
            if serde_json::from_str::<JsonSolution>(&contents).is_ok() {
                Err(anyhow!(
                    "JSON file contains a solver solution, but a problem (with a 'problem' field) was expected."
                ))
            } else {
                Err(parse_err).context("failed to parse JSON problem")
            }
        }
    }
}

pub fn write_json_problem<P: AsRef<Path>>(path: P, problem: &Problem<Scalar>) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("failed to create {:?}", path.as_ref()))?;
    let writer = BufWriter::new(file);
    let wrapped = JsonProblem {
        problem: problem.clone(),
    };
    serde_json::to_writer_pretty(writer, &wrapped).context("failed to serialise problem")?;
    Ok(())
}

pub fn write_solution<P: AsRef<Path>>(path: P, sol: &Sol<Scalar>, info: &Info<Scalar>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent directory {:?}", parent))?;
        }
    }

    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let wrapped = JsonSolution {
        sol: sol.clone(),
        info: info.clone(),
    };
    serde_json::to_writer_pretty(&mut writer, &wrapped).context("failed to serialise solution")?;
    writer
        .flush()
        .with_context(|| format!("failed to write solution into {:?}", path))?;
    Ok(())
}

pub fn read_mps_problem<P: AsRef<Path>>(_path: P) -> Result<()> {
    anyhow::bail!("MPS parsing is not yet implemented.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvxrs_core::problem::{Cone, CscMatrix};

    #[test]
    fn json_roundtrip() {
        let problem = Problem {
            a: CscMatrix {
                nrows: 2,
                ncols: 2,
                indptr: vec![0, 1, 2],
                indices: vec![0, 1],
                data: vec![1.0, 1.0],
            },
            b: vec![1.0, 2.0],
            c: vec![-1.0, -1.0],
            cones: vec![Cone::NonNegative(2)],
        };
        let mut buffer = Vec::new();
        let wrapped = JsonProblem { problem };
        serde_json::to_writer(&mut buffer, &wrapped).unwrap();
        let parsed: JsonProblem = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.problem.b, vec![1.0, 2.0]);
    }
}
