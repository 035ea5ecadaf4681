use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One termination-oracle sample, taken every CONVERGED_INTERVAL iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord<T: RealNumber> {
    pub iteration: usize,
    pub res_pri: T,
    pub res_dual: T,
    pub rel_gap: T,
    pub pobj: T,
    pub dobj: T,
    pub kappa: T,
    pub elapsed: Duration,
}

impl<T> IterationRecord<T>
where
    T: RealNumber,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        iteration: usize,
        res_pri: T,
        res_dual: T,
        rel_gap: T,
        pobj: T,
        dobj: T,
        kappa: T,
        elapsed: Duration,
    ) -> Self {
        Self {
            iteration,
            res_pri,
            res_dual,
            rel_gap,
            pobj,
            dobj,
            kappa,
            elapsed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStats<T: RealNumber> {
    pub history: Vec<IterationRecord<T>>,
    pub solve_time: Duration,
    pub factorizations: usize,
    pub linear_solves: usize,
}

impl<T> SolveStats<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            solve_time: Duration::ZERO,
            factorizations: 0,
            linear_solves: 0,
        }
    }

    pub fn push(&mut self, record: IterationRecord<T>) {
        self.history.push(record);
    }
}

impl<T> Default for SolveStats<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::new()
    }
}
