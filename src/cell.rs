//! Field samples and bounds of a single cell of a cylindrical field map.

use crate::{
    error::{FieldError, Result},
    geometry::{CylDim, InCyl},
    num::fbf,
};
use std::{
    f64::consts::TAU,
    ops::{Index, IndexMut},
};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "json")]
use std::io;

/// One of the 8 corners of a cell in (z, r, phi).
///
/// Each corner is identified by one bit per axis, 0 for the lower bound
/// and 1 for the upper bound of the cell along that axis. The index of a
/// corner is `r_bit + 2*z_bit + 4*phi_bit`, which is the order in which
/// corner samples are stored in a [`FieldCellCache`]. Every interpolation
/// and derivative formula in this crate is written against this ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    Z0R0P0 = 0,
    Z0R1P0 = 1,
    Z1R0P0 = 2,
    Z1R1P0 = 3,
    Z0R0P1 = 4,
    Z0R1P1 = 5,
    Z1R0P1 = 6,
    Z1R1P1 = 7,
}

impl Corner {
    /// Index stride of a step from the lower to the upper r-bound.
    pub const R_STRIDE: usize = 1;
    /// Index stride of a step from the lower to the upper z-bound.
    pub const Z_STRIDE: usize = 2;
    /// Index stride of a step from the lower to the upper phi-bound.
    pub const PHI_STRIDE: usize = 4;

    /// Creates an array of all corners in storage order.
    pub fn all() -> [Self; 8] {
        use Corner::*;
        [
            Z0R0P0, Z0R1P0, Z1R0P0, Z1R1P0, Z0R0P1, Z0R1P1, Z1R0P1, Z1R1P1,
        ]
    }

    /// Returns the corner with the given storage index.
    ///
    /// # Panics
    ///
    /// If the index is 8 or larger.
    pub fn from_index(index: usize) -> Self {
        Self::all()[index]
    }

    /// Returns the corner with the given upper/lower bound bits.
    pub fn from_bits(z_bit: bool, r_bit: bool, phi_bit: bool) -> Self {
        Self::from_index(
            usize::from(r_bit) * Self::R_STRIDE
                + usize::from(z_bit) * Self::Z_STRIDE
                + usize::from(phi_bit) * Self::PHI_STRIDE,
        )
    }

    /// Returns the storage index of the corner.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the corner lies on the upper bound along the given dimension.
    pub fn bit(self, dim: CylDim) -> bool {
        let stride = match dim {
            CylDim::Z => Self::Z_STRIDE,
            CylDim::R => Self::R_STRIDE,
            CylDim::Phi => Self::PHI_STRIDE,
        };
        self.index() & stride != 0
    }
}

/// Values of one field component at the 8 corners of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CornerSamples([fbf; 8]);

impl CornerSamples {
    /// Creates a new set of corner samples given in storage order.
    pub fn new(samples: [fbf; 8]) -> Self {
        Self(samples)
    }

    /// Returns a reference to the samples in storage order.
    pub fn as_array(&self) -> &[fbf; 8] {
        &self.0
    }
}

impl Index<Corner> for CornerSamples {
    type Output = fbf;
    fn index(&self, corner: Corner) -> &Self::Output {
        &self.0[corner.index()]
    }
}

impl IndexMut<Corner> for CornerSamples {
    fn index_mut(&mut self, corner: Corner) -> &mut Self::Output {
        &mut self.0[corner.index()]
    }
}

/// Bounds, scale and corner samples of one cell of a field map.
///
/// The cache is produced by the code that locates the cell containing a
/// query point, and is only read by the interpolators. Component samples
/// are indexed by [`CylDim`], so that `samples(CylDim::Z)` are the Bz values,
/// `samples(CylDim::R)` the Br values and `samples(CylDim::Phi)` the Bphi values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serialization",
    serde(from = "FieldCellRecord", into = "FieldCellRecord")
)]
pub struct FieldCellCache {
    lower_bounds: InCyl<fbf>,
    upper_bounds: InCyl<fbf>,
    inverse_widths: InCyl<fbf>,
    scale: fbf,
    field: InCyl<CornerSamples>,
}

impl FieldCellCache {
    /// Slack allowed on the phi span of a cell beyond one full turn,
    /// absorbing the rounding of tabulated mesh edges.
    pub const PHI_SPAN_TOLERANCE: fbf = 1e-4;

    /// Creates a new cell cache.
    ///
    /// # Parameters
    ///
    /// - `lower_bounds`: Lower cell bounds in (z, r, phi).
    /// - `upper_bounds`: Upper cell bounds in (z, r, phi).
    /// - `scale`: Factor multiplying every interpolated value.
    /// - `field`: Corner samples of Bz, Br and Bphi.
    ///
    /// The reciprocal bin widths are computed here. No validation is
    /// performed; a zero-width bin yields infinite reciprocals.
    pub fn new(
        lower_bounds: InCyl<fbf>,
        upper_bounds: InCyl<fbf>,
        scale: fbf,
        field: InCyl<CornerSamples>,
    ) -> Self {
        Self {
            lower_bounds,
            upper_bounds,
            inverse_widths: Self::compute_inverse_widths(&lower_bounds, &upper_bounds),
            scale,
            field,
        }
    }

    /// Creates a new cell cache from the field vectors (Bz, Br, Bphi)
    /// at each corner, given in storage order.
    pub fn from_corner_vectors(
        lower_bounds: InCyl<fbf>,
        upper_bounds: InCyl<fbf>,
        scale: fbf,
        corner_vectors: &[InCyl<fbf>; 8],
    ) -> Self {
        let field = InCyl::with_each_component(|component| {
            CornerSamples::new(std::array::from_fn(|idx| corner_vectors[idx][component]))
        });
        Self::new(lower_bounds, upper_bounds, scale, field)
    }

    fn compute_inverse_widths(lower_bounds: &InCyl<fbf>, upper_bounds: &InCyl<fbf>) -> InCyl<fbf> {
        InCyl::with_each_component(|dim| 1.0 / (upper_bounds[dim] - lower_bounds[dim]))
    }

    /// Returns the lower cell bounds in (z, r, phi).
    pub fn lower_bounds(&self) -> &InCyl<fbf> {
        &self.lower_bounds
    }

    /// Returns the upper cell bounds in (z, r, phi).
    pub fn upper_bounds(&self) -> &InCyl<fbf> {
        &self.upper_bounds
    }

    /// Returns the lower cell bound along the given dimension.
    pub fn lower_bound(&self, dim: CylDim) -> fbf {
        self.lower_bounds[dim]
    }

    /// Returns the upper cell bound along the given dimension.
    pub fn upper_bound(&self, dim: CylDim) -> fbf {
        self.upper_bounds[dim]
    }

    /// Returns the reciprocal of the cell width along the given dimension.
    pub fn inverse_width(&self, dim: CylDim) -> fbf {
        self.inverse_widths[dim]
    }

    /// Returns the factor multiplying every interpolated value.
    pub fn scale(&self) -> fbf {
        self.scale
    }

    /// Returns the corner samples of the given field component.
    pub fn samples(&self, component: CylDim) -> &CornerSamples {
        &self.field[component]
    }

    /// Returns the field vector (Bz, Br, Bphi) stored at the given corner,
    /// without applying the scale factor.
    pub fn corner_vector(&self, corner: Corner) -> InCyl<fbf> {
        InCyl::with_each_component(|component| self.field[component][corner])
    }

    /// Replaces the cell bounds and recomputes the reciprocal bin widths.
    pub fn set_range(&mut self, lower_bounds: InCyl<fbf>, upper_bounds: InCyl<fbf>) {
        self.inverse_widths = Self::compute_inverse_widths(&lower_bounds, &upper_bounds);
        self.lower_bounds = lower_bounds;
        self.upper_bounds = upper_bounds;
    }

    /// Replaces the field vector (Bz, Br, Bphi) stored at the given corner.
    pub fn set_corner(&mut self, corner: Corner, vector: InCyl<fbf>) {
        for component in CylDim::slice() {
            self.field[component][corner] = vector[component];
        }
    }

    /// Replaces the scale factor.
    pub fn set_scale(&mut self, scale: fbf) {
        self.scale = scale;
    }

    /// Multiplies the scale factor by the given factor.
    pub fn scale_by(&mut self, factor: fbf) {
        self.scale *= factor;
    }

    /// Makes the cache contain no point, so that it will be refilled on next use.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Shifts phi up by one full turn if it is below the lower phi bound.
    pub fn wrapped_phi(&self, phi: fbf) -> fbf {
        if phi < self.lower_bounds[CylDim::Phi] {
            phi + TAU
        } else {
            phi
        }
    }

    /// Whether the given cylindrical coordinates lie inside the cell,
    /// boundaries included.
    pub fn contains(&self, z: fbf, r: fbf, phi: fbf) -> bool {
        let phi = self.wrapped_phi(phi);
        let coords = InCyl::new(z, r, phi);
        CylDim::slice().iter().all(|&dim| {
            coords[dim] >= self.lower_bounds[dim] && coords[dim] <= self.upper_bounds[dim]
        })
    }

    /// Verifies that the cell geometry satisfies the preconditions of the
    /// interpolators: finite bounds, positive bin widths and a phi span of
    /// at most one full turn.
    ///
    /// The interpolators never call this; it is meant for the code producing caches.
    pub fn check_geometry(&self) -> Result<()> {
        for dim in CylDim::slice() {
            let (lower, upper) = (self.lower_bounds[dim], self.upper_bounds[dim]);
            if !lower.is_finite() || !upper.is_finite() {
                return Err(FieldError::NonFiniteBound { dim });
            }
            if upper <= lower {
                return Err(FieldError::DegenerateBin { dim, lower, upper });
            }
        }
        let span = self.upper_bounds[CylDim::Phi] - self.lower_bounds[CylDim::Phi];
        if span > TAU + Self::PHI_SPAN_TOLERANCE {
            return Err(FieldError::PhiSpanTooLarge { span });
        }
        Ok(())
    }
}

/// Serialized form of a cell, leaving out the derived reciprocal widths.
#[cfg(feature = "serialization")]
#[derive(Clone, Debug, Serialize, Deserialize)]
struct FieldCellRecord {
    lower_bounds: InCyl<fbf>,
    upper_bounds: InCyl<fbf>,
    scale: fbf,
    field: InCyl<CornerSamples>,
}

#[cfg(feature = "serialization")]
impl From<FieldCellRecord> for FieldCellCache {
    fn from(record: FieldCellRecord) -> Self {
        Self::new(
            record.lower_bounds,
            record.upper_bounds,
            record.scale,
            record.field,
        )
    }
}

#[cfg(feature = "serialization")]
impl From<FieldCellCache> for FieldCellRecord {
    fn from(cache: FieldCellCache) -> Self {
        Self {
            lower_bounds: cache.lower_bounds,
            upper_bounds: cache.upper_bounds,
            scale: cache.scale,
            field: cache.field,
        }
    }
}

#[cfg(feature = "json")]
impl FieldCellCache {
    /// Serializes the cell into JSON format and writes to the given writer.
    pub fn write_as_json<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).map_err(|err| FieldError::Json(err.to_string()))
    }

    /// Reads a cell in JSON format from the given reader and verifies its geometry.
    pub fn read_from_json<R: io::Read>(reader: R) -> Result<Self> {
        let cache: Self = serde_json::from_reader(reader)
            .map_err(|err| FieldError::Json(err.to_string()))?;
        cache.check_geometry()?;
        Ok(cache)
    }
}

impl Default for FieldCellCache {
    fn default() -> Self {
        Self::new(
            InCyl::same(0.0),
            InCyl::same(-1.0),
            1.0,
            InCyl::same(CornerSamples::new([0.0; 8])),
        )
    }
}
