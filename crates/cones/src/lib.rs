#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use cvxrs_core::math::RealNumber;
use cvxrs_core::problem::{cones_dim, Cone};
use cvxrs_core::traits::ConeProjector;

/// Validates that every cone block is well formed (mirrors
/// [`Cone::validate`], exposed here as the collaborator's own entry point
/// since validation of the full product cone, not just one block, is this
/// crate's responsibility).
pub fn validate_cones(cones: &[Cone]) -> Result<()> {
    for cone in cones {
        cone.validate()
            .map_err(|err| anyhow!("invalid cone block: {err}"))?;
    }
    Ok(())
}

/// Total dimension spanned by the product cone; equal to `m` for an
/// admissible problem.
pub fn full_cone_dim(cones: &[Cone]) -> usize {
    cones_dim(cones)
}

/// A one-line, human-readable description of the product cone, printed in
/// the verbose console banner.
pub fn cone_header(cones: &[Cone]) -> String {
    if cones.is_empty() {
        return "cones: (none)".to_string();
    }
    let mut counts = std::collections::BTreeMap::new();
    for cone in cones {
        let (key, dim) = match cone {
            Cone::Zero(n) => ("zero", *n),
            Cone::Free(n) => ("free", *n),
            Cone::NonNegative(n) => ("nonneg", *n),
            Cone::SecondOrder(n) => ("soc", *n),
        };
        let entry: &mut (usize, usize) = counts.entry(key).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += dim;
    }
    let parts: Vec<String> = counts
        .into_iter()
        .map(|(kind, (blocks, dim))| format!("{kind}: {blocks} block(s), dim {dim}"))
        .collect();
    format!("cones: {}", parts.join(", "))
}

/// Projects a length-`n` slice onto the second-order (Lorentz) cone
/// `{(t, x) : ||x||_2 <= t}`, where the last entry is the scalar `t` and the
/// preceding `n-1` entries are `x`. Closed-form Euclidean projection:
/// - if `||x|| <= t`, already in the cone;
/// - if `||x|| <= -t`, the projection is 0;
/// - otherwise, project onto the boundary by scaling.
fn project_soc<T: RealNumber>(block: &mut [T]) {
    let n = block.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        block[0] = block[0].max(T::zero());
        return;
    }
    let t = block[n - 1];
    let norm_x = block[..n - 1]
        .iter()
        .fold(T::zero(), |acc, &v| acc + v * v)
        .sqrt();

    if norm_x <= t {
        return;
    }
    if norm_x <= -t {
        for v in block.iter_mut() {
            *v = T::zero();
        }
        return;
    }
    let scale = (norm_x + t) / (T::from_f64(2.0).unwrap() * norm_x);
    for v in block[..n - 1].iter_mut() {
        *v = *v * scale;
    }
    block[n - 1] = scale * norm_x;
}

/// The default cone projector: handles the zero, free, nonnegative-orthant,
/// and second-order cone blocks. Stateless beyond a setup flag, since none
/// of the supported blocks need iteration-aware warm starts.
#[derive(Debug, Default)]
pub struct ProductConeProjector {
    initialized: bool,
}

impl ProductConeProjector {
    pub fn new() -> Self {
        Self { initialized: false }
    }
}

impl<T> ConeProjector<T> for ProductConeProjector
where
    T: RealNumber,
{
    fn init(&mut self, cones: &[Cone]) -> Result<()> {
        validate_cones(cones)?;
        self.initialized = true;
        Ok(())
    }

    fn project_primal(&mut self, v: &mut [T], cones: &[Cone], _iter: usize) {
        debug_assert!(self.initialized, "cone projector used before init()");
        let mut offset = 0;
        for cone in cones {
            let dim = cone.dim();
            let block = &mut v[offset..offset + dim];
            match cone {
                Cone::Zero(_) => {
                    for entry in block.iter_mut() {
                        *entry = T::zero();
                    }
                }
                Cone::Free(_) => {}
                Cone::NonNegative(_) => {
                    for entry in block.iter_mut() {
                        *entry = entry.max(T::zero());
                    }
                }
                Cone::SecondOrder(_) => project_soc(block),
            }
            offset += dim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonneg_projects_to_orthant() {
        let cones = vec![Cone::NonNegative(3)];
        let mut projector = ProductConeProjector::new();
        ConeProjector::<f64>::init(&mut projector, &cones).unwrap();
        let mut v = vec![-1.0, 0.5, 2.0];
        ConeProjector::<f64>::project_primal(&mut projector, &mut v, &cones, 0);
        assert_eq!(v, vec![0.0, 0.5, 2.0]);
    }

    #[test]
    fn zero_cone_projects_to_origin() {
        let cones = vec![Cone::Zero(2)];
        let mut projector = ProductConeProjector::new();
        ConeProjector::<f64>::init(&mut projector, &cones).unwrap();
        let mut v = vec![3.0, -4.0];
        ConeProjector::<f64>::project_primal(&mut projector, &mut v, &cones, 0);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn dual_of_zero_is_free() {
        let cones = vec![Cone::Zero(2)];
        let mut projector = ProductConeProjector::new();
        ConeProjector::<f64>::init(&mut projector, &cones).unwrap();
        let mut v = vec![3.0, -4.0];
        ConeProjector::<f64>::project_dual(&mut projector, &mut v, &cones, 0);
        assert_eq!(v, vec![3.0, -4.0]);
    }

    #[test]
    fn soc_projection_is_idempotent_inside_cone() {
        let cones = vec![Cone::SecondOrder(3)];
        let mut projector = ProductConeProjector::new();
        ConeProjector::<f64>::init(&mut projector, &cones).unwrap();
        let mut v = vec![0.3, 0.4, 1.0];
        ConeProjector::<f64>::project_primal(&mut projector, &mut v, &cones, 0);
        assert!((v[0] - 0.3).abs() < 1e-9);
        assert!((v[1] - 0.4).abs() < 1e-9);
        assert!((v[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn soc_projection_handles_outside_cone() {
        let cones = vec![Cone::SecondOrder(3)];
        let mut projector = ProductConeProjector::new();
        ConeProjector::<f64>::init(&mut projector, &cones).unwrap();
        let mut v = vec![3.0, 4.0, 1.0];
        ConeProjector::<f64>::project_primal(&mut projector, &mut v, &cones, 0);
        let norm_x = (v[0] * v[0] + v[1] * v[1]).sqrt();
        assert!(norm_x <= v[2] + 1e-9);
    }
}
