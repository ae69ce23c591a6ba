#![allow(dead_code)]

use bfield::{
    batch::FieldCellLookup,
    cell::{Corner, FieldCellCache},
    geometry::{CylDim, InCyl},
    interpolation::FieldQuery,
    num::fbf,
};
use std::f64::consts::TAU;

/// Defines one test per interpolator type, binding an instance of the
/// interpolator to the given identifier in the test body.
#[macro_export]
macro_rules! def_scheme_tests {
    (fn $name:ident($interpolator:ident) $test_body:block) => {
        paste::paste! {
            #[test]
            fn [<$name _with_scalar>]() {
                let $interpolator = bfield::interpolation::scalar::ScalarInterpolator::new();
                $test_body
            }

            #[test]
            fn [<$name _with_lanes>]() {
                let $interpolator = bfield::interpolation::vectorized::LaneInterpolator::new();
                $test_body
            }

            #[test]
            fn [<$name _with_auto_vec>]() {
                let $interpolator = bfield::interpolation::auto_vec::AutoVecInterpolator::new();
                $test_body
            }

            #[test]
            fn [<$name _with_hybrid>]() {
                let $interpolator = bfield::interpolation::hybrid::HybridInterpolator::new();
                $test_body
            }
        }
    };
}

const N_MESH_Z: usize = 4;
const N_MESH_R: usize = 5;
const N_MESH_PHI: usize = 6;
const N_FIELD: usize = N_MESH_Z * N_MESH_R * N_MESH_PHI;

const MESH_Z: [fbf; N_MESH_Z] = [-1400.0, -466.93, 466.14, 1400.0];
const MESH_R: [fbf; N_MESH_R] = [1200.0, 1225.0, 1250.0, 1275.0, 1300.0];
const MESH_PHI: [fbf; N_MESH_PHI] = [0.0, 1.25664, 2.51327, 3.76991, 5.02655, 6.28318];

const ZONE_SCALE: fbf = 1e-7;

#[rustfmt::skip]
const FIELD_Z: [fbf; N_FIELD] = [
    19487.0, 19487.0, 19488.0, 19488.0, 19487.0, 19487.0, 19531.0, 19531.0, 19532.0, 19532.0, 19531.0,
    19531.0, 6399.0,  6400.0,  6400.0,  6400.0,  6399.0,  -1561.0, -1561.0, -1560.0, -1560.0, -1560.0,
    -1561.0, -1516.0, -1516.0, -1515.0, -1515.0, -1516.0, -1516.0, 20310.0, 20310.0, 20311.0, 20311.0,
    20311.0, 20310.0, 20329.0, 20329.0, 20329.0, 20330.0, 20329.0, 20329.0, 7172.0,  7173.0,  7173.0,
    7172.0,  7172.0,  -814.0,  -814.0,  -813.0,  -812.0,  -813.0,  -814.0,  -795.0,  -795.0,  -794.0,
    -793.0,  -794.0,  -795.0,  20310.0, 20310.0, 20311.0, 20312.0, 20311.0, 20310.0, 20329.0, 20329.0,
    20330.0, 20330.0, 20330.0, 20329.0, 7172.0,  7172.0,  7173.0,  7173.0,  7173.0,  7172.0,  -813.0,
    -813.0,  -812.0,  -812.0,  -813.0,  -813.0,  -794.0,  -794.0,  -793.0,  -793.0,  -793.0,  -794.0,
    19487.0, 19487.0, 19488.0, 19488.0, 19488.0, 19487.0, 19531.0, 19531.0, 19532.0, 19532.0, 19532.0,
    19531.0, 6400.0,  6399.0,  6400.0,  6401.0,  6400.0,  6400.0,  -1561.0, -1561.0, -1560.0, -1559.0,
    -1560.0, -1561.0, -1516.0, -1516.0, -1515.0, -1515.0, -1515.0, -1516.0, -1516.0, -1516.0,
];

#[rustfmt::skip]
const FIELD_R: [fbf; N_FIELD] = [
    -1357.0, -1356.0, -1353.0, -1354.0, -1354.0, -1357.0, -1366.0, -1366.0, -1362.0, -1363.0, -1363.0,
    -1366.0, -1378.0, -1374.0, -1375.0, -1375.0, -1378.0, -1388.0, -1388.0, -1385.0, -1386.0, -1386.0,
    -1388.0, -1394.0, -1394.0, -1390.0, -1391.0, -1391.0, -1394.0, -318.0,  -318.0,  -314.0,  -315.0,
    -316.0,  -318.0,  -321.0,  -321.0,  -317.0,  -318.0,  -319.0,  -321.0,  -325.0,  -321.0,  -322.0,
    -322.0,  -325.0,  -328.0,  -328.0,  -324.0,  -325.0,  -326.0,  -328.0,  -330.0,  -331.0,  -326.0,
    -327.0,  -328.0,  -330.0,  312.0,   312.0,   316.0,   315.0,   315.0,   312.0,   315.0,   315.0,
    319.0,   318.0,   318.0,   315.0,   319.0,   318.0,   323.0,   322.0,   321.0,   319.0,   322.0,
    322.0,   326.0,   325.0,   325.0,   322.0,   324.0,   324.0,   328.0,   327.0,   327.0,   324.0,
    1351.0,  1351.0,  1356.0,  1354.0,  1354.0,  1351.0,  1360.0,  1360.0,  1365.0,  1363.0,  1363.0,
    1360.0,  1372.0,  1372.0,  1377.0,  1375.0,  1375.0,  1372.0,  1383.0,  1383.0,  1387.0,  1386.0,
    1386.0,  1383.0,  1388.0,  1388.0,  1393.0,  1391.0,  1391.0,  1388.0,  1388.0,  1388.0,
];

#[rustfmt::skip]
const FIELD_PHI: [fbf; N_FIELD] = [
    -2.0, 7.0, 3.0, 1.0, 6.0, -2.0, -2.0, 7.0, 3.0, 1.0, 6.0, -2.0, -2.0, 3.0, 1.0, 6.0, -2.0, -2.0, 7.0, 3.0,
    1.0,  6.0, -2.0, -2.0, 7.0, 3.0, 1.0,  6.0, -2.0, -1.0, 7.0, 3.0, 1.0, 6.0, -1.0, -1.0, 7.0, 3.0, 1.0, 6.0,
    -1.0, -1.0, 3.0, 1.0, 6.0, -1.0, -1.0, 7.0, 3.0, 1.0, 6.0, -1.0, -1.0, 8.0, 3.0, 1.0, 6.0, -1.0, 1.0, 7.0,
    3.0,  2.0, 6.0, 1.0, 1.0, 7.0, 3.0, 2.0, 6.0, 1.0, 1.0, 7.0, 3.0, 2.0, 6.0, 1.0, 1.0, 7.0, 3.0, 2.0,
    6.0,  1.0, 0.0, 8.0, 3.0, 2.0, 6.0, 0.0, 2.0, 7.0, 3.0, 2.0, 6.0, 2.0, 2.0, 7.0, 3.0, 2.0, 6.0, 2.0,
    2.0,  7.0, 3.0, 2.0, 6.0, 2.0, 2.0, 7.0, 3.0, 2.0, 6.0, 2.0, 2.0, 8.0, 3.0, 2.0, 6.0, 2.0, 2.0, 2.0,
];

/// A small toroid field map zone on a (z, r, phi) mesh, with the field
/// stored with phi varying fastest and z slowest.
#[derive(Clone, Debug)]
pub struct FixtureZone;

impl FixtureZone {
    fn field_index(iz: usize, ir: usize, iphi: usize) -> usize {
        (iz * N_MESH_R + ir) * N_MESH_PHI + iphi
    }

    /// Returns the index of the first bin containing the coordinate,
    /// so that coordinates on an interior edge belong to the lower bin.
    fn bin_index(mesh: &[fbf], coord: fbf) -> Option<usize> {
        if coord < mesh[0] {
            return None;
        }
        mesh.windows(2).position(|edges| coord <= edges[1])
    }

    /// Creates the cache for the cell with the given bin indices.
    pub fn cell(&self, iz: usize, ir: usize, iphi: usize) -> FieldCellCache {
        let corner_vectors: [InCyl<fbf>; 8] = std::array::from_fn(|idx| {
            let corner = Corner::from_index(idx);
            let field_idx = Self::field_index(
                iz + usize::from(corner.bit(CylDim::Z)),
                ir + usize::from(corner.bit(CylDim::R)),
                iphi + usize::from(corner.bit(CylDim::Phi)),
            );
            InCyl::new(FIELD_Z[field_idx], FIELD_R[field_idx], FIELD_PHI[field_idx])
        });
        FieldCellCache::from_corner_vectors(
            InCyl::new(MESH_Z[iz], MESH_R[ir], MESH_PHI[iphi]),
            InCyl::new(MESH_Z[iz + 1], MESH_R[ir + 1], MESH_PHI[iphi + 1]),
            ZONE_SCALE,
            &corner_vectors,
        )
    }

    /// Returns the bin indices of the cell containing the given coordinates.
    pub fn locate(&self, z: fbf, r: fbf, phi: fbf) -> Option<(usize, usize, usize)> {
        let phi = if phi < MESH_PHI[0] { phi + TAU } else { phi };
        Some((
            Self::bin_index(&MESH_Z, z)?,
            Self::bin_index(&MESH_R, r)?,
            Self::bin_index(&MESH_PHI, phi)?,
        ))
    }
}

impl FieldCellLookup for FixtureZone {
    fn fill_cache(&self, z: fbf, r: fbf, phi: fbf, cache: &mut FieldCellCache) -> bool {
        match self.locate(z, r, phi) {
            Some((iz, ir, iphi)) => {
                *cache = self.cell(iz, ir, iphi);
                true
            }
            None => false,
        }
    }

    fn cache_covers(&self, cache: &FieldCellCache, z: fbf, r: fbf, phi: fbf) -> bool {
        let coords = InCyl::new(z, r, cache.wrapped_phi(phi));
        let first_edges = InCyl::new(MESH_Z[0], MESH_R[0], MESH_PHI[0]);
        cache.contains(z, r, phi)
            && CylDim::slice().iter().all(|&dim| {
                let lower = cache.lower_bound(dim);
                coords[dim] != lower || lower == first_edges[dim]
            })
    }
}

/// Coordinates at which the reference cell is filled.
pub const REFERENCE_CELL_COORDS: (fbf, fbf, fbf) = (0.0, 1250.0, 1.6);

/// Returns the cell of the fixture zone containing the reference coordinates.
pub fn reference_cell() -> FieldCellCache {
    let (z, r, phi) = REFERENCE_CELL_COORDS;
    let mut cache = FieldCellCache::default();
    assert!(FixtureZone.fill_cache(z, r, phi, &mut cache));
    cache
}

/// Returns the queries at `z = 0`, `phi = 1.6` and `r = 1205 + 10*i`
/// for which reference field values have been recorded.
pub fn reference_queries() -> Vec<FieldQuery> {
    (0..10)
        .map(|idx| FieldQuery::from_cylindrical(0.0, 1205.0 + 10.0 * idx as fbf, 1.6))
        .collect()
}

/// Recorded (Bx, By, Bz) at each of the reference queries.
pub const REFERENCE_FIELDS: [[fbf; 3]; 10] = [
    [-2.83727e-07, 9.47007e-08, 0.00308551],
    [-2.81403e-07, 7.49033e-08, 0.00255923],
    [-2.79079e-07, 5.51058e-08, 0.00203296],
    [-2.76755e-07, 3.53084e-08, 0.00150669],
    [-2.74431e-07, 1.5511e-08, 0.000980422],
    [-2.72107e-07, -4.28645e-09, 0.000454151],
    [-2.69782e-07, -2.40839e-08, -7.21201e-05],
    [-2.67458e-07, -4.38813e-08, -0.000598391],
    [-2.65134e-07, -6.36787e-08, -0.00112466],
    [-2.6281e-07, -8.34762e-08, -0.00165093],
];

/// Field (Bx, By, Bz) and row-major Jacobian at the first reference query.
pub const FIRST_REFERENCE_FIELD: [fbf; 3] = [
    -2.8372733414111175e-07,
    9.470070622928815e-08,
    0.003085505567161988,
];
pub const FIRST_REFERENCE_JACOBIAN: [fbf; 9] = [
    -4.7637997943820475e-11,
    2.311239362379991e-10,
    -2.0278790002757906e-09,
    3.226245778998419e-10,
    -1.9711630784205124e-09,
    6.732890293784651e-08,
    1.5366002543819825e-06,
    -5.2604656194940554e-05,
    1.1677358306919434e-10,
];

/// A cell touching the axis, with a field that is independent of phi,
/// radial and azimuthal components vanishing on the axis and an axial
/// component independent of r.
pub fn axis_cell() -> FieldCellCache {
    let lower = InCyl::new(-1.0, 0.0, 0.0);
    let upper = InCyl::new(1.0, 2.0, TAU);
    let corner_vectors: [InCyl<fbf>; 8] = std::array::from_fn(|idx| {
        let corner = Corner::from_index(idx);
        let edge = |dim: CylDim| if corner.bit(dim) { upper[dim] } else { lower[dim] };
        let (z, r) = (edge(CylDim::Z), edge(CylDim::R));
        InCyl::new(3.0 + 0.5 * z, (1.0 + 0.2 * z) * r, (-0.5 + 0.1 * z) * r)
    });
    FieldCellCache::from_corner_vectors(lower, upper, 1.0, &corner_vectors)
}

/// Asserts that each value equals its reference to within an absolute
/// tolerance or a relative tolerance.
pub fn assert_values_relative_eq(
    values: &[fbf],
    references: &[fbf],
    epsilon: fbf,
    max_relative: fbf,
) {
    assert_eq!(values.len(), references.len());
    for (&value, &reference) in values.iter().zip(references) {
        approx::assert_relative_eq!(
            value,
            reference,
            epsilon = epsilon,
            max_relative = max_relative
        );
    }
}
