use crate::problem::ProblemError;
use thiserror::Error;

/// Every way a solve can fail to even start iterating. All of these map to
/// the public FAILURE status code; none of them may unwind past the engine.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("problem validation failed: {0}")]
    InvalidProblem(#[from] ProblemError),
    #[error("solver options invalid: {0}")]
    InvalidOptions(String),
    #[error("workspace allocation failed: {0}")]
    Allocation(String),
    #[error("linear-subspace solver setup failed: {0}")]
    LinearSolverSetup(#[source] anyhow::Error),
    #[error("cone projector setup failed: {0}")]
    ConeSetup(#[source] anyhow::Error),
}
