//! Trilinear interpolation written explicitly in terms of four-wide lanes.
//!
//! The 8 samples of a component are loaded as two lane groups, one per phi
//! bound, each holding the corners `(z0 r0, z0 r1, z1 r0, z1 r1)`. Phi is
//! blended across the groups, the r weights are applied as the lane pattern
//! `(gr, fr, gr, fr)`, and the three components are then transposed so that
//! each lane group holds `(Bz, Br, Bphi, 0)` for one corner pair. Z is blended
//! across the corner pairs last.

use super::{
    component_lanes_to_cyl, component_lanes_to_derivatives, CellFractions, FieldInterpolator,
};
use crate::{
    cell::FieldCellCache,
    geometry::{
        CylDim::{self, Phi, R, Z},
        InCyl,
    },
    lanes::{LaneMask4, Lanes4},
    num::fbf,
    transform::CylDerivatives,
};

/// A trilinear interpolator using explicit four-lane arithmetic.
#[derive(Clone, Copy, Debug, Default)]
pub struct LaneInterpolator;

/// Lane groups for the three components, transposed to corner-pair order.
type CornerPairLanes = [Lanes4; 4];

impl LaneInterpolator {
    /// Lanes holding corners on the upper r bound.
    const UPPER_R_LANES: [bool; 4] = [false, true, false, true];

    /// Creates a new lane interpolator.
    pub fn new() -> Self {
        Self
    }

    fn load_phi_groups(cache: &FieldCellCache, component: CylDim) -> (Lanes4, Lanes4) {
        let samples = cache.samples(component).as_array();
        (
            Lanes4::from_slice(&samples[..4]),
            Lanes4::from_slice(&samples[4..]),
        )
    }

    fn r_weights(fractions: &CellFractions) -> Lanes4 {
        Lanes4::select(
            LaneMask4::new(Self::UPPER_R_LANES),
            Lanes4::splat(fractions.upper(R)),
            Lanes4::splat(fractions.lower(R)),
        )
    }

    /// Applies `combine` to the two phi groups of every component and
    /// transposes the results into corner-pair lanes of `(Bz, Br, Bphi, 0)`.
    fn corner_pair_lanes<C>(cache: &FieldCellCache, combine: C) -> CornerPairLanes
    where
        C: Fn(Lanes4, Lanes4) -> Lanes4,
    {
        let rows = CylDim::slice().map(|component| {
            let (lower_phi, upper_phi) = Self::load_phi_groups(cache, component);
            combine(lower_phi, upper_phi)
        });
        Lanes4::transpose([rows[0], rows[1], rows[2], Lanes4::zero()])
    }

    fn phi_blended(
        cache: &FieldCellCache,
        fractions: &CellFractions,
        r_weights: Lanes4,
    ) -> CornerPairLanes {
        let (gphi, fphi) = (fractions.lower(Phi), fractions.upper(Phi));
        Self::corner_pair_lanes(cache, |lower_phi, upper_phi| {
            (lower_phi * gphi + upper_phi * fphi) * r_weights
        })
    }

    fn z_blend(pairs: &CornerPairLanes, fractions: &CellFractions) -> Lanes4 {
        (pairs[0] + pairs[1]) * fractions.lower(Z) + (pairs[2] + pairs[3]) * fractions.upper(Z)
    }
}

impl FieldInterpolator for LaneInterpolator {
    fn interp_cylindrical_field(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> InCyl<fbf> {
        let pairs = Self::phi_blended(cache, fractions, Self::r_weights(fractions));
        component_lanes_to_cyl(Self::z_blend(&pairs, fractions) * cache.scale())
    }

    fn compute_cylindrical_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> CylDerivatives {
        let scale = cache.scale();
        let r_weights = Self::r_weights(fractions);
        let (gz, fz) = (fractions.lower(Z), fractions.upper(Z));

        let weighted = Self::phi_blended(cache, fractions, r_weights);
        let d_dz = ((weighted[2] + weighted[3]) - (weighted[0] + weighted[1]))
            * (scale * cache.inverse_width(Z));

        let (gphi, fphi) = (fractions.lower(Phi), fractions.upper(Phi));
        let blended = Self::corner_pair_lanes(cache, |lower_phi, upper_phi| {
            lower_phi * gphi + upper_phi * fphi
        });
        let d_dr = ((blended[1] - blended[0]) * gz + (blended[3] - blended[2]) * fz)
            * (scale * cache.inverse_width(R));

        let differences = Self::corner_pair_lanes(cache, |lower_phi, upper_phi| {
            (upper_phi - lower_phi) * r_weights
        });
        let d_dphi = Self::z_blend(&differences, fractions) * (scale * cache.inverse_width(Phi));

        component_lanes_to_derivatives(d_dz, d_dr, d_dphi)
    }
}
