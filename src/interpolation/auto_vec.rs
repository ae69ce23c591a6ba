//! Trilinear interpolation as contractions of corner weight arrays with the
//! corner samples, using plain loops over fixed-size arrays so that the
//! compiler is free to vectorize them.

use super::{CellFractions, FieldInterpolator};
use crate::{
    cell::{Corner, FieldCellCache},
    geometry::{
        CylDim::{Phi, R, Z},
        InCyl,
    },
    num::fbf,
    transform::CylDerivatives,
};

/// Weights of the lower and upper corners along an axis when differentiating along it.
const DIFFERENCE_WEIGHTS: [fbf; 2] = [-1.0, 1.0];

/// A trilinear interpolator contracting arrays of corner weights with the samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoVecInterpolator;

impl AutoVecInterpolator {
    /// Creates a new auto-vectorizable interpolator.
    pub fn new() -> Self {
        Self
    }

    /// Computes the product of the per-axis weights for every corner, in storage order.
    fn corner_weights(z_weights: [fbf; 2], r_weights: [fbf; 2], phi_weights: [fbf; 2]) -> [fbf; 8] {
        let mut weights = [0.0; 8];
        for (idx, weight) in weights.iter_mut().enumerate() {
            let z_bit = (idx / Corner::Z_STRIDE) & 1;
            let r_bit = (idx / Corner::R_STRIDE) & 1;
            let phi_bit = (idx / Corner::PHI_STRIDE) & 1;
            *weight = z_weights[z_bit] * r_weights[r_bit] * phi_weights[phi_bit];
        }
        weights
    }

    fn contract(weights: &[fbf; 8], samples: &[fbf; 8]) -> fbf {
        let mut sum = 0.0;
        for idx in 0..8 {
            sum += weights[idx] * samples[idx];
        }
        sum
    }

    fn contract_all(cache: &FieldCellCache, weights: &[fbf; 8], factor: fbf) -> InCyl<fbf> {
        InCyl::with_each_component(|component| {
            factor * Self::contract(weights, cache.samples(component).as_array())
        })
    }
}

impl FieldInterpolator for AutoVecInterpolator {
    fn interp_cylindrical_field(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> InCyl<fbf> {
        let weights = Self::corner_weights(
            fractions.weights(Z),
            fractions.weights(R),
            fractions.weights(Phi),
        );
        Self::contract_all(cache, &weights, cache.scale())
    }

    fn compute_cylindrical_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> CylDerivatives {
        let scale = cache.scale();
        let (z_weights, r_weights, phi_weights) = (
            fractions.weights(Z),
            fractions.weights(R),
            fractions.weights(Phi),
        );

        let z_diff_weights = Self::corner_weights(DIFFERENCE_WEIGHTS, r_weights, phi_weights);
        let r_diff_weights = Self::corner_weights(z_weights, DIFFERENCE_WEIGHTS, phi_weights);
        let phi_diff_weights = Self::corner_weights(z_weights, r_weights, DIFFERENCE_WEIGHTS);

        CylDerivatives::new(
            Self::contract_all(cache, &z_diff_weights, scale * cache.inverse_width(Z)),
            Self::contract_all(cache, &r_diff_weights, scale * cache.inverse_width(R)),
            Self::contract_all(cache, &phi_diff_weights, scale * cache.inverse_width(Phi)),
        )
    }
}
