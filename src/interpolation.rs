//! Trilinear interpolation of a cylindrical field cell and the rotation of
//! the result into the Cartesian basis.

pub mod auto_vec;
pub mod hybrid;
pub mod scalar;
pub mod vectorized;

use crate::{
    cell::FieldCellCache,
    error::FieldError,
    geometry::{CylDim, Dim3, InCyl, Jacobian3, Point3, Vec3},
    lanes::Lanes4,
    num::{fbf, relative_difference},
    transform::{CylDerivatives, DirectionCosines},
};
use std::{fmt, str::FromStr};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use self::{
    auto_vec::AutoVecInterpolator, hybrid::HybridInterpolator, scalar::ScalarInterpolator,
    vectorized::LaneInterpolator,
};

/// A point at which to evaluate the field, with its cylindrical radius and azimuth.
///
/// The radius and azimuth are expected to satisfy `x = r*cos(phi)` and
/// `y = r*sin(phi)`. They are never recomputed from the point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FieldQuery {
    point: Point3,
    r: fbf,
    phi: fbf,
}

impl FieldQuery {
    /// Creates a new query from a Cartesian point and its precomputed
    /// radius and azimuth.
    pub fn new(point: Point3, r: fbf, phi: fbf) -> Self {
        Self { point, r, phi }
    }

    /// Creates a new query from a Cartesian point, computing its radius and azimuth.
    pub fn from_cartesian(point: Point3) -> Self {
        let (x, y) = (point[Dim3::X], point[Dim3::Y]);
        Self::new(point, fbf::hypot(x, y), fbf::atan2(y, x))
    }

    /// Creates a new query from cylindrical coordinates.
    pub fn from_cylindrical(z: fbf, r: fbf, phi: fbf) -> Self {
        Self::new(Point3::from_cylindrical(z, r, phi), r, phi)
    }

    pub fn point(&self) -> &Point3 {
        &self.point
    }

    pub fn z(&self) -> fbf {
        self.point[Dim3::Z]
    }

    pub fn r(&self) -> fbf {
        self.r
    }

    pub fn phi(&self) -> fbf {
        self.phi
    }
}

/// Fractional position of a point inside a cell along each axis.
///
/// The fractions are not clamped, so points outside the cell give
/// fractions outside `[0, 1]` and the interpolators extrapolate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFractions {
    upper: InCyl<fbf>,
    lower: InCyl<fbf>,
}

impl CellFractions {
    /// Computes the fractional position of the given coordinates in the cell,
    /// shifting phi up by one full turn if it lies below the lower phi bound.
    pub fn locate(cache: &FieldCellCache, z: fbf, r: fbf, phi: fbf) -> Self {
        let coords = InCyl::new(z, r, cache.wrapped_phi(phi));
        let upper = InCyl::with_each_component(|dim| {
            (coords[dim] - cache.lower_bound(dim)) * cache.inverse_width(dim)
        });
        let lower = InCyl::with_each_component(|dim| 1.0 - upper[dim]);
        Self { upper, lower }
    }

    /// Returns the weight of the upper bound samples along the given axis.
    pub fn upper(&self, dim: CylDim) -> fbf {
        self.upper[dim]
    }

    /// Returns the weight of the lower bound samples along the given axis.
    pub fn lower(&self, dim: CylDim) -> fbf {
        self.lower[dim]
    }

    /// Returns the lower and upper weights along the given axis, indexed by corner bit.
    pub fn weights(&self, dim: CylDim) -> [fbf; 2] {
        [self.lower[dim], self.upper[dim]]
    }
}

/// Whether to compute the spatial derivatives of the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ComputeDerivatives {
    Yes,
    No,
}

impl ComputeDerivatives {
    pub fn is_yes(&self) -> bool {
        *self == Self::Yes
    }
}

/// Result of evaluating the field at a point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FieldEvaluation {
    field: Vec3,
    jacobian: Option<Jacobian3>,
}

impl FieldEvaluation {
    pub fn new(field: Vec3, jacobian: Option<Jacobian3>) -> Self {
        Self { field, jacobian }
    }

    /// Returns the Cartesian field vector (Bx, By, Bz).
    pub fn field(&self) -> &Vec3 {
        &self.field
    }

    /// Returns the Jacobian `d(Bx, By, Bz)/d(x, y, z)`, if it was computed.
    pub fn jacobian(&self) -> Option<&Jacobian3> {
        self.jacobian.as_ref()
    }

    /// Returns the nine Jacobian elements in row-major order, if computed.
    pub fn jacobian_row_major(&self) -> Option<[fbf; 9]> {
        self.jacobian.map(|jacobian| *jacobian.as_row_major())
    }

    /// Computes the largest relative difference between this and a
    /// reference evaluation over all field components and, when both
    /// carry one, all Jacobian elements.
    ///
    /// Reference values smaller in magnitude than `abs_floor` are compared
    /// by absolute difference instead.
    pub fn max_relative_difference(&self, reference: &Self, abs_floor: fbf) -> fbf {
        let field_diff = Dim3::slice()
            .iter()
            .map(|&dim| relative_difference(self.field[dim], reference.field[dim], abs_floor))
            .fold(0.0, fbf::max);
        match (&self.jacobian, &reference.jacobian) {
            (Some(jacobian), Some(reference_jacobian)) => jacobian
                .as_row_major()
                .iter()
                .zip(reference_jacobian.as_row_major().iter())
                .map(|(&value, &reference)| relative_difference(value, reference, abs_floor))
                .fold(field_diff, fbf::max),
            _ => field_diff,
        }
    }
}

/// Defines the properties of an interpolator for a cylindrical field cell.
pub trait FieldInterpolator: Clone + Sync + Send {
    /// Computes the scaled field components (Bz, Br, Bphi) at the given
    /// fractional position in the cell.
    fn interp_cylindrical_field(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> InCyl<fbf>;

    /// Computes the derivatives of the scaled field components with
    /// respect to z, r and phi at the given fractional position in the cell.
    fn compute_cylindrical_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> CylDerivatives;

    /// Computes both the scaled field components and their derivatives.
    fn interp_cylindrical_field_and_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> (InCyl<fbf>, CylDerivatives) {
        (
            self.interp_cylindrical_field(cache, fractions),
            self.compute_cylindrical_derivatives(cache, fractions),
        )
    }

    /// Evaluates the Cartesian field, and optionally its Jacobian, at the
    /// query point using the samples of the given cell.
    ///
    /// The point does not have to lie inside the cell; outside points are
    /// extrapolated. No validation is performed and no error is raised.
    fn evaluate(
        &self,
        query: &FieldQuery,
        cache: &FieldCellCache,
        derivatives: ComputeDerivatives,
    ) -> FieldEvaluation {
        let fractions = CellFractions::locate(cache, query.z(), query.r(), query.phi());
        let point = query.point();
        let cosines = DirectionCosines::new(
            point[Dim3::X],
            point[Dim3::Y],
            query.r(),
            cache.lower_bound(CylDim::Phi),
        );
        match derivatives {
            ComputeDerivatives::No => {
                let cyl_field = self.interp_cylindrical_field(cache, &fractions);
                FieldEvaluation::new(cosines.rotate_field(&cyl_field), None)
            }
            ComputeDerivatives::Yes => {
                let (cyl_field, cyl_derivatives) =
                    self.interp_cylindrical_field_and_derivatives(cache, &fractions);
                let field = cosines.rotate_field(&cyl_field);
                let jacobian = cosines.rotate_jacobian(&cyl_derivatives, &field);
                FieldEvaluation::new(field, Some(jacobian))
            }
        }
    }
}

/// Converts lanes holding (Bz, Br, Bphi, _) into cylindrical components.
fn component_lanes_to_cyl(lanes: Lanes4) -> InCyl<fbf> {
    let [z, r, phi, _] = lanes.to_array();
    InCyl::new(z, r, phi)
}

/// Converts lanes holding (Bz, Br, Bphi, _) for each coordinate into derivatives.
fn component_lanes_to_derivatives(d_dz: Lanes4, d_dr: Lanes4, d_dphi: Lanes4) -> CylDerivatives {
    CylDerivatives::new(
        component_lanes_to_cyl(d_dz),
        component_lanes_to_cyl(d_dr),
        component_lanes_to_cyl(d_dphi),
    )
}

/// Evaluation order used for computing the interpolated field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "snake_case"))]
pub enum InterpolatorScheme {
    /// Nested scalar sums.
    Scalar,
    /// Explicit four-lane formulation.
    Lanes,
    /// Corner weight array contracted in plain loops.
    AutoVec,
    /// Per-corner component lanes contracted with corner weights.
    Hybrid,
}

impl InterpolatorScheme {
    /// Creates an array of all available schemes.
    pub fn all() -> [Self; 4] {
        [Self::Scalar, Self::Lanes, Self::AutoVec, Self::Hybrid]
    }

    /// Returns the name of the scheme.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Lanes => "lanes",
            Self::AutoVec => "auto_vec",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for InterpolatorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolatorScheme {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| FieldError::UnknownScheme(s.to_string()))
    }
}

/// An interpolator whose scheme is selected at runtime.
#[derive(Clone, Copy, Debug)]
pub enum SchemeInterpolator {
    Scalar(ScalarInterpolator),
    Lanes(LaneInterpolator),
    AutoVec(AutoVecInterpolator),
    Hybrid(HybridInterpolator),
}

impl SchemeInterpolator {
    /// Creates a new interpolator using the given scheme.
    pub fn new(scheme: InterpolatorScheme) -> Self {
        match scheme {
            InterpolatorScheme::Scalar => Self::Scalar(ScalarInterpolator::new()),
            InterpolatorScheme::Lanes => Self::Lanes(LaneInterpolator::new()),
            InterpolatorScheme::AutoVec => Self::AutoVec(AutoVecInterpolator::new()),
            InterpolatorScheme::Hybrid => Self::Hybrid(HybridInterpolator::new()),
        }
    }

    /// Returns the scheme used by the interpolator.
    pub fn scheme(&self) -> InterpolatorScheme {
        match self {
            Self::Scalar(_) => InterpolatorScheme::Scalar,
            Self::Lanes(_) => InterpolatorScheme::Lanes,
            Self::AutoVec(_) => InterpolatorScheme::AutoVec,
            Self::Hybrid(_) => InterpolatorScheme::Hybrid,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $interpolator:ident => $call:expr) => {
        match $self {
            SchemeInterpolator::Scalar($interpolator) => $call,
            SchemeInterpolator::Lanes($interpolator) => $call,
            SchemeInterpolator::AutoVec($interpolator) => $call,
            SchemeInterpolator::Hybrid($interpolator) => $call,
        }
    };
}

impl FieldInterpolator for SchemeInterpolator {
    fn interp_cylindrical_field(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> InCyl<fbf> {
        dispatch!(self, interpolator => interpolator.interp_cylindrical_field(cache, fractions))
    }

    fn compute_cylindrical_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> CylDerivatives {
        dispatch!(self, interpolator => {
            interpolator.compute_cylindrical_derivatives(cache, fractions)
        })
    }

    fn interp_cylindrical_field_and_derivatives(
        &self,
        cache: &FieldCellCache,
        fractions: &CellFractions,
    ) -> (InCyl<fbf>, CylDerivatives) {
        dispatch!(self, interpolator => {
            interpolator.interp_cylindrical_field_and_derivatives(cache, fractions)
        })
    }
}
