//! Trilinear interpolation accumulating per-corner component lanes.

use super::{
    component_lanes_to_cyl, component_lanes_to_derivatives, CellFractions, FieldInterpolator,
};
use crate::{
    cell::{Corner, FieldCellCache},
    geometry::{
        CylDim::{self, Phi, R, Z},
        InCyl,
    },
    lanes::Lanes4,
    num::fbf,
    transform::CylDerivatives,
};

/// A trilinear interpolator that packs the components (Bz, Br, Bphi, 0) of
/// each corner into a lane group and accumulates the groups with scalar
/// corner weights, computing values and derivatives in the same pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct HybridInterpolator;

impl HybridInterpolator {
    /// Creates a new hybrid interpolator.
    pub fn new() -> Self {
        Self
    }

    fn corner_lanes(cache: &FieldCellCache, corner: Corner) -> Lanes4 {
        Lanes4::from_array([
            cache.samples(Z)[corner],
            cache.samples(R)[corner],
            cache.samples(Phi)[corner],
            0.0,
        ])
    }

    fn axis_weight(fractions: &CellFractions, corner: Corner, dim: CylDim) -> fbf {
        fractions.weights(dim)[usize::from(corner.bit(dim))]
    }

    fn axis_difference_weight(corner: Corner, dim: CylDim) -> fbf {
        if corner.bit(dim) {
            1.0
        } else {
            -1.0
        }
    }

    fn accumulate(cache: &FieldCellCache, fractions: &CellFractions) -> [Lanes4; 4] {
        let mut value = Lanes4::zero();
        let mut d_dz = Lanes4::zero();
        let mut d_dr = Lanes4::zero();
        let mut d_dphi = Lanes4::zero();

        for corner in Corner::all() {
            let lanes = Self::corner_lanes(cache, corner);
            let (wz, wr, wphi) = (
                Self::axis_weight(fractions, corner, Z),
                Self::axis_weight(fractions, corner, R),
                Self::axis_weight(fractions, corner, Phi),
            );
            value += lanes * (wz * wr * wphi);
            d_dz += lanes * (Self::axis_difference_weight(corner, Z) * wr * wphi);
            d_dr += lanes * (wz * Self::axis_difference_weight(corner, R) * wphi);
            d_dphi += lanes * (wz * wr * Self::axis_difference_weight(corner, Phi));
        }
        [value, d_dz, d_dr, d_dphi]
    }
}

impl FieldInterpolator for HybridInterpolator {
    fn interp_cylindrical_field(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> InCyl<fbf> {
        let mut value = Lanes4::zero();
        for corner in Corner::all() {
            let weight = Self::axis_weight(fractions, corner, Z)
                * Self::axis_weight(fractions, corner, R)
                * Self::axis_weight(fractions, corner, Phi);
            value += Self::corner_lanes(cache, corner) * weight;
        }
        component_lanes_to_cyl(value * cache.scale())
    }

    fn compute_cylindrical_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> CylDerivatives {
        self.interp_cylindrical_field_and_derivatives(cache, fractions).1
    }

    fn interp_cylindrical_field_and_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> (InCyl<fbf>, CylDerivatives) {
        let scale = cache.scale();
        let [value, d_dz, d_dr, d_dphi] = Self::accumulate(cache, fractions);
        (
            component_lanes_to_cyl(value * scale),
            component_lanes_to_derivatives(
                d_dz * (scale * cache.inverse_width(Z)),
                d_dr * (scale * cache.inverse_width(R)),
                d_dphi * (scale * cache.inverse_width(Phi)),
            ),
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::interpolation::scalar::ScalarInterpolator;
    use approx::assert_relative_eq;

    #[test]
    fn combined_pass_matches_separate_scalar_passes() {
        let corner_vectors: [InCyl<fbf>; 8] = std::array::from_fn(|idx| {
            let x = idx as fbf;
            InCyl::new(100.0 - 3.0 * x, x.sqrt(), 0.1 * x * x)
        });
        let cache = FieldCellCache::from_corner_vectors(
            InCyl::new(5.0, 20.0, -0.4),
            InCyl::new(6.0, 22.0, 0.4),
            0.01,
            &corner_vectors,
        );
        let (hybrid, scalar) = (HybridInterpolator::new(), ScalarInterpolator::new());
        for &(z, r, phi) in &[(5.5, 21.0, 0.0), (6.0, 20.0, -0.4), (4.5, 23.0, 0.3)] {
            let fractions = CellFractions::locate(&cache, z, r, phi);
            let (field, derivatives) =
                hybrid.interp_cylindrical_field_and_derivatives(&cache, &fractions);
            assert_eq!(field, hybrid.interp_cylindrical_field(&cache, &fractions));
            assert_relative_eq!(
                field,
                scalar.interp_cylindrical_field(&cache, &fractions),
                epsilon = 1e-14,
                max_relative = 1e-12
            );
            let reference = scalar.compute_cylindrical_derivatives(&cache, &fractions);
            for coord in CylDim::slice() {
                assert_relative_eq!(
                    derivatives.with_respect_to(coord),
                    reference.with_respect_to(coord),
                    epsilon = 1e-14,
                    max_relative = 1e-10
                );
            }
        }
    }
}
