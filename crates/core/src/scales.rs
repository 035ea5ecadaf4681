use crate::math::RealNumber;

/// Diagonal equilibration scales produced by the normalization collaborator:
/// row scales `d` (length m), column scales `e` (length n), and the scalar
/// factors used to undo scaling on `b`, `c`, and the returned solution.
/// Identity (`d = e = 1`, `sigma_b = sigma_c = sigma = 1`) when NORMALIZE=0.
#[derive(Debug, Clone)]
pub struct EquilibrationScales<T: RealNumber> {
    pub d: Vec<T>,
    pub e: Vec<T>,
    pub sigma_b: T,
    pub sigma_c: T,
    pub sigma: T,
}

impl<T> EquilibrationScales<T>
where
    T: RealNumber,
{
    pub fn identity(m: usize, n: usize) -> Self {
        Self {
            d: vec![T::one(); m],
            e: vec![T::one(); n],
            sigma_b: T::one(),
            sigma_c: T::one(),
            sigma: T::one(),
        }
    }
}
