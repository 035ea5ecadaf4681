use crate::math::RealNumber;
use crate::stats::SolveStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal classification of a solve, mirroring the public status codes:
/// FAILURE=-4, INDETERMINATE=-3, INFEASIBLE=-2, UNBOUNDED=-1, SOLVED=+1.
/// Zero is never returned by a public entry point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Solved,
    Unbounded,
    Infeasible,
    Indeterminate,
    Failure,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Solved => 1,
            Status::Unbounded => -1,
            Status::Infeasible => -2,
            Status::Indeterminate => -3,
            Status::Failure => -4,
        }
    }

    /// Short human-readable tag, as printed in the console footer.
    pub fn tag(self, hit_max_iters: bool) -> String {
        let base = match self {
            Status::Solved => "Solved",
            Status::Unbounded => "Unbounded",
            Status::Infeasible => "Infeasible",
            Status::Indeterminate => "Indeterminate",
            Status::Failure => "Failure",
        };
        if hit_max_iters && self != Status::Failure {
            format!("{base} (may be inaccurate, hit MAX_ITERS)")
        } else {
            base.to_string()
        }
    }
}

/// The primal-dual solution returned by the extractor: `x` has length `n`,
/// `y` and `s` have length `m`. Unused slots on UNBOUNDED/INFEASIBLE, and all
/// three on FAILURE, are filled with NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sol<T: RealNumber> {
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub s: Vec<T>,
}

impl<T> Sol<T>
where
    T: RealNumber,
{
    pub fn with_capacity(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            s: vec![T::zero(); m],
        }
    }

    pub fn fill_nan(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::nan(); n],
            y: vec![T::nan(); m],
            s: vec![T::nan(); m],
        }
    }
}

/// Residual and objective diagnostics reported alongside the terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info<T: RealNumber> {
    pub status: Status,
    pub status_tag: String,
    pub iter: usize,
    pub solve_time: Duration,
    pub pobj: T,
    pub dobj: T,
    pub rel_gap: T,
    pub res_pri: T,
    pub res_dual: T,
    /// Text returned by the linear-subspace solver's `summary()`, if any.
    pub linear_solver_summary: Option<String>,
    pub stats: SolveStats<T>,
}

impl<T> Info<T>
where
    T: RealNumber,
{
    pub fn failure() -> Self {
        Self {
            status: Status::Failure,
            status_tag: "Failure".to_string(),
            iter: 0,
            solve_time: Duration::ZERO,
            pobj: T::nan(),
            dobj: T::nan(),
            rel_gap: T::nan(),
            res_pri: T::nan(),
            res_dual: T::nan(),
            linear_solver_summary: None,
            stats: SolveStats::new(),
        }
    }
}
