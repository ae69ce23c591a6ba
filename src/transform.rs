//! Rotation of cylindrical field components and derivatives into the Cartesian basis.

use crate::{
    geometry::{
        CylDim::{self, Phi, R, Z},
        Dim3, InCyl, Jacobian3, Vec3,
    },
    num::fbf,
};

/// Partial derivatives of the cylindrical field components (Bz, Br, Bphi)
/// with respect to the cylindrical coordinates z, r and phi.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylDerivatives {
    /// Derivatives of (Bz, Br, Bphi) with respect to z.
    pub d_dz: InCyl<fbf>,
    /// Derivatives of (Bz, Br, Bphi) with respect to r.
    pub d_dr: InCyl<fbf>,
    /// Derivatives of (Bz, Br, Bphi) with respect to phi.
    pub d_dphi: InCyl<fbf>,
}

impl CylDerivatives {
    /// Creates a new set of derivatives, given per coordinate.
    pub fn new(d_dz: InCyl<fbf>, d_dr: InCyl<fbf>, d_dphi: InCyl<fbf>) -> Self {
        Self { d_dz, d_dr, d_dphi }
    }

    /// Creates a new set of derivatives from a 3x3 table where
    /// `table[coord][component]` is the derivative of the component
    /// with respect to the coordinate, both in (z, r, phi) order.
    pub fn from_table(table: [[fbf; 3]; 3]) -> Self {
        let [d_dz, d_dr, d_dphi] = table.map(|[z, r, phi]| InCyl::new(z, r, phi));
        Self::new(d_dz, d_dr, d_dphi)
    }

    /// Returns the derivatives of all components with respect to the given coordinate.
    pub fn with_respect_to(&self, coord: CylDim) -> &InCyl<fbf> {
        match coord {
            Z => &self.d_dz,
            R => &self.d_dr,
            Phi => &self.d_dphi,
        }
    }
}

/// Azimuthal direction cosines of a point, used to rotate cylindrical
/// quantities at that point into the Cartesian basis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionCosines {
    cos: fbf,
    sin: fbf,
    inv_r: fbf,
}

impl DirectionCosines {
    /// Computes the direction cosines `x/r` and `y/r` of a point.
    ///
    /// On the axis (`r == 0`) the direction is undefined, and the direction
    /// of `fallback_phi` is used instead, with `1/r` set to zero. Terms of the
    /// Jacobian that scale with `1/r` then vanish.
    pub fn new(x: fbf, y: fbf, r: fbf, fallback_phi: fbf) -> Self {
        if r == 0.0 {
            Self {
                cos: fallback_phi.cos(),
                sin: fallback_phi.sin(),
                inv_r: 0.0,
            }
        } else {
            let inv_r = 1.0 / r;
            Self {
                cos: x * inv_r,
                sin: y * inv_r,
                inv_r,
            }
        }
    }

    pub fn cos(&self) -> fbf {
        self.cos
    }

    pub fn sin(&self) -> fbf {
        self.sin
    }

    pub fn inv_r(&self) -> fbf {
        self.inv_r
    }

    /// Rotates a field vector given as (Bz, Br, Bphi) into (Bx, By, Bz).
    pub fn rotate_field(&self, field: &InCyl<fbf>) -> Vec3 {
        let (c, s) = (self.cos, self.sin);
        Vec3::new(
            field[R] * c - field[Phi] * s,
            field[R] * s + field[Phi] * c,
            field[Z],
        )
    }

    /// Computes the Cartesian Jacobian `d(Bx, By, Bz)/d(x, y, z)` from the
    /// cylindrical derivatives and the already rotated field vector.
    pub fn rotate_jacobian(&self, derivatives: &CylDerivatives, field: &Vec3) -> Jacobian3 {
        let (c, s, ir) = (self.cos, self.sin, self.inv_r);
        let (cc, cs, ss) = (c * c, c * s, s * s);
        let CylDerivatives { d_dz, d_dr, d_dphi } = derivatives;

        Jacobian3::from_row_major([
            cc * d_dr[R]
                - cs * d_dr[Phi]
                - cs * ir * d_dphi[R]
                + ss * ir * d_dphi[Phi]
                + s * ir * field[Dim3::Y],
            cs * d_dr[R]
                - ss * d_dr[Phi]
                + cc * ir * d_dphi[R]
                - cs * ir * d_dphi[Phi]
                - c * ir * field[Dim3::Y],
            c * d_dz[R] - s * d_dz[Phi],
            cs * d_dr[R]
                + cc * d_dr[Phi]
                - ss * ir * d_dphi[R]
                - cs * ir * d_dphi[Phi]
                - s * ir * field[Dim3::X],
            ss * d_dr[R]
                + cs * d_dr[Phi]
                + cs * ir * d_dphi[R]
                + cc * ir * d_dphi[Phi]
                + c * ir * field[Dim3::X],
            s * d_dz[R] + c * d_dz[Phi],
            c * d_dr[Z] - s * ir * d_dphi[Z],
            s * d_dr[Z] + c * ir * d_dphi[Z],
            d_dz[Z],
        ])
    }
}
