//! Reference trilinear interpolation using nested scalar sums.

use super::{CellFractions, FieldInterpolator};
use crate::{
    cell::{CornerSamples, FieldCellCache},
    geometry::{
        CylDim::{self, Phi, R, Z},
        InCyl,
    },
    num::fbf,
    transform::CylDerivatives,
};

/// A trilinear interpolator evaluating each component as nested scalar
/// sums, blending along phi first, then r, then z.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarInterpolator;

impl ScalarInterpolator {
    /// Creates a new scalar interpolator.
    pub fn new() -> Self {
        Self
    }

    fn interp_component(samples: &CornerSamples, fractions: &CellFractions) -> fbf {
        let f = samples.as_array();
        let (fz, gz) = (fractions.upper(Z), fractions.lower(Z));
        let (fr, gr) = (fractions.upper(R), fractions.lower(R));
        let (fphi, gphi) = (fractions.upper(Phi), fractions.lower(Phi));
        gz * (gr * (gphi * f[0] + fphi * f[4]) + fr * (gphi * f[1] + fphi * f[5]))
            + fz * (gr * (gphi * f[2] + fphi * f[6]) + fr * (gphi * f[3] + fphi * f[7]))
    }

    fn component_derivatives(samples: &CornerSamples, fractions: &CellFractions) -> InCyl<fbf> {
        let f = samples.as_array();
        let (fz, gz) = (fractions.upper(Z), fractions.lower(Z));
        let (fr, gr) = (fractions.upper(R), fractions.lower(R));
        let (fphi, gphi) = (fractions.upper(Phi), fractions.lower(Phi));

        let d_dz = gr * (gphi * (f[2] - f[0]) + fphi * (f[6] - f[4]))
            + fr * (gphi * (f[3] - f[1]) + fphi * (f[7] - f[5]));
        let d_dr = gz * (gphi * (f[1] - f[0]) + fphi * (f[5] - f[4]))
            + fz * (gphi * (f[3] - f[2]) + fphi * (f[7] - f[6]));
        let d_dphi = gz * (gr * (f[4] - f[0]) + fr * (f[5] - f[1]))
            + fz * (gr * (f[6] - f[2]) + fr * (f[7] - f[3]));

        InCyl::new(d_dz, d_dr, d_dphi)
    }
}

impl FieldInterpolator for ScalarInterpolator {
    fn interp_cylindrical_field(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> InCyl<fbf> {
        let scale = cache.scale();
        InCyl::with_each_component(|component| {
            scale * Self::interp_component(cache.samples(component), fractions)
        })
    }

    fn compute_cylindrical_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> CylDerivatives {
        let scale = cache.scale();
        // Unscaled derivatives indexed as [component][coordinate]
        let per_component = InCyl::with_each_component(|component| {
            Self::component_derivatives(cache.samples(component), fractions)
        });
        let with_respect_to = |coord: CylDim| {
            let factor = scale * cache.inverse_width(coord);
            InCyl::with_each_component(|component| factor * per_component[component][coord])
        };
        CylDerivatives::new(with_respect_to(Z), with_respect_to(R), with_respect_to(Phi))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    fn linear_cell() -> FieldCellCache {
        // Bz = 1 + 2z + 3r + 4phi, Br = r*phi, Bphi = z on the cell corners
        let lower = InCyl::new(-1.0, 2.0, 0.5);
        let upper = InCyl::new(1.0, 4.0, 1.5);
        let corner_vectors: [InCyl<fbf>; 8] = std::array::from_fn(|idx| {
            let z = if idx & 2 != 0 { upper[Z] } else { lower[Z] };
            let r = if idx & 1 != 0 { upper[R] } else { lower[R] };
            let phi = if idx & 4 != 0 { upper[Phi] } else { lower[Phi] };
            InCyl::new(1.0 + 2.0 * z + 3.0 * r + 4.0 * phi, r * phi, z)
        });
        FieldCellCache::from_corner_vectors(lower, upper, 0.5, &corner_vectors)
    }

    #[test]
    fn linear_fields_are_reproduced_inside_and_outside() {
        let cache = linear_cell();
        let interpolator = ScalarInterpolator::new();
        for &(z, r, phi) in &[(0.3, 2.5, 0.75), (-1.0, 4.0, 1.5), (2.0, 1.0, 1.8)] {
            let fractions = CellFractions::locate(&cache, z, r, phi);
            let field = interpolator.interp_cylindrical_field(&cache, &fractions);
            assert_abs_diff_eq!(
                field[Z],
                0.5 * (1.0 + 2.0 * z + 3.0 * r + 4.0 * phi),
                epsilon = 1e-12
            );
            assert_abs_diff_eq!(field[R], 0.5 * r * phi, epsilon = 1e-12);
            assert_abs_diff_eq!(field[Phi], 0.5 * z, epsilon = 1e-12);
        }
    }

    #[test]
    fn derivatives_of_bilinear_fields_are_exact() {
        let cache = linear_cell();
        let fractions = CellFractions::locate(&cache, 0.2, 3.5, 0.6);
        let derivatives =
            ScalarInterpolator::new().compute_cylindrical_derivatives(&cache, &fractions);

        assert_abs_diff_eq!(derivatives.d_dz, InCyl::new(1.0, 0.0, 0.5), epsilon = 1e-12);
        assert_abs_diff_eq!(derivatives.d_dr, InCyl::new(1.5, 0.3, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(
            derivatives.d_dphi,
            InCyl::new(2.0, 1.75, 0.0),
            epsilon = 1e-12
        );
    }
}
