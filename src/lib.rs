//! The `bfield` crate interpolates tabulated magnetic field maps given on
//! cylindrical (z, r, phi) meshes.
//!
//! A field map is divided into cells, each holding the field components
//! (Bz, Br, Bphi) at its 8 corners. Given a [`cell::FieldCellCache`] for the
//! cell containing a point, the interpolators in [`interpolation`] compute
//! the Cartesian field vector at the point and, optionally, its Cartesian
//! Jacobian. Several interchangeable evaluation orders implement the
//! [`interpolation::FieldInterpolator`] trait and agree within rounding.
//! The [`batch`] module evaluates many points in parallel through a
//! user-supplied cell lookup.

pub mod batch;
pub mod cell;
pub mod error;
pub mod geometry;
pub mod interpolation;
pub mod lanes;
pub mod num;
pub mod transform;
