#![forbid(unsafe_code)]

pub mod dense;
pub mod sparse;

pub use dense::{DenseKktMatrix, DenseKktSolver, DensePattern, SaddleKktSolver};
pub use sparse::{SparseKktMatrix, SparseKktSolver, SparsePattern};
