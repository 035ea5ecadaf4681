use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often (in outer iterations) the termination oracle is consulted.
pub const CONVERGED_INTERVAL: usize = 20;

/// How often (in outer iterations) a verbose residual row is emitted.
pub const PRINT_INTERVAL: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Method {
    /// The homogeneous self-dual splitting engine (operator-splitting ADMM
    /// on the embedded problem).
    Scs,
    /// Interior-point refinement; not yet implemented.
    Ipm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOptions<T: RealNumber> {
    /// Convergence tolerance EPS used by the termination oracle.
    pub eps: T,
    pub max_iterations: usize,
    pub max_time: Option<Duration>,
    /// Over-relaxation parameter ALPHA; must lie in (0, 2).
    pub alpha: T,
    /// Regularizer applied to the x-block of the saddle-point system.
    pub rho_x: T,
    /// Whether to diagonally equilibrate (A, b, c) before iterating.
    pub normalize: bool,
    /// Whether to emit a residual line every PRINT_INTERVAL iterations.
    pub verbose: bool,
    /// Threshold below which ||u|| is considered numerically zero, used by
    /// the solution extractor's indeterminate branch.
    pub undet_tol: T,
}

impl<T> SolveOptions<T>
where
    T: RealNumber,
{
    pub fn with_eps(eps: T) -> Self {
        Self {
            eps,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let zero = T::from_f64(0.0).unwrap();
        let two = T::from_f64(2.0).unwrap();
        if self.eps < zero {
            return Err("EPS must be >= 0".into());
        }
        if self.alpha <= zero || self.alpha >= two {
            return Err("ALPHA must lie in (0, 2)".into());
        }
        if self.rho_x < zero {
            return Err("RHO_X must be >= 0".into());
        }
        if self.undet_tol <= zero {
            return Err("UNDET_TOL must be > 0".into());
        }
        Ok(())
    }
}

impl<T> Default for SolveOptions<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            eps: T::from_f64(1e-4).unwrap(),
            max_iterations: 10_000,
            max_time: None,
            alpha: T::from_f64(1.5).unwrap(),
            rho_x: T::from_f64(1e-3).unwrap(),
            normalize: true,
            verbose: false,
            undet_tol: T::from_f64(1e-9).unwrap(),
        }
    }
}
