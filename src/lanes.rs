//! Fixed-width numeric lanes for explicitly vectorized formulations.
//!
//! With the `simd` feature enabled, [`Lanes4`] is backed by `wide::f64x4`,
//! which maps onto native 256-bit or paired 128-bit registers where available.
//! Without it, a plain array with elementwise loops is used. Both backends
//! perform the same operations in the same order and so give identical results.

use crate::num::fbf;
use std::ops::{Add, AddAssign, Mul, Sub};

#[cfg(feature = "simd")]
use wide::f64x4;

#[cfg(feature = "simd")]
type Repr = f64x4;

#[cfg(not(feature = "simd"))]
type Repr = [fbf; 4];

/// Four `fbf` lanes operated on together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lanes4(Repr);

/// Per-lane boolean mask used by [`Lanes4::select`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneMask4([bool; 4]);

impl LaneMask4 {
    /// Creates a new mask from the per-lane flags.
    pub fn new(flags: [bool; 4]) -> Self {
        Self(flags)
    }

    /// Creates a mask with the same flag in every lane.
    pub fn splat(flag: bool) -> Self {
        Self([flag; 4])
    }

    /// Whether every lane is set.
    pub fn all(&self) -> bool {
        self.0.iter().all(|&flag| flag)
    }

    /// Whether any lane is set.
    pub fn any(&self) -> bool {
        self.0.iter().any(|&flag| flag)
    }

    /// Returns the per-lane flags.
    pub fn to_array(self) -> [bool; 4] {
        self.0
    }
}

impl Lanes4 {
    /// Number of lanes.
    pub const WIDTH: usize = 4;

    /// Creates lanes holding the given values.
    #[cfg(feature = "simd")]
    pub fn from_array(values: [fbf; 4]) -> Self {
        Self(f64x4::from(values))
    }

    /// Creates lanes holding the given values.
    #[cfg(not(feature = "simd"))]
    pub fn from_array(values: [fbf; 4]) -> Self {
        Self(values)
    }

    /// Returns the lane values.
    #[cfg(feature = "simd")]
    pub fn to_array(self) -> [fbf; 4] {
        self.0.to_array()
    }

    /// Returns the lane values.
    #[cfg(not(feature = "simd"))]
    pub fn to_array(self) -> [fbf; 4] {
        self.0
    }

    /// Creates lanes with the given value broadcast to every lane.
    #[cfg(feature = "simd")]
    pub fn splat(value: fbf) -> Self {
        Self(f64x4::splat(value))
    }

    /// Creates lanes with the given value broadcast to every lane.
    #[cfg(not(feature = "simd"))]
    pub fn splat(value: fbf) -> Self {
        Self([value; 4])
    }

    /// Creates lanes with every lane zero.
    pub fn zero() -> Self {
        Self::splat(0.0)
    }

    /// Loads the first four values of the given slice.
    ///
    /// # Panics
    ///
    /// If the slice holds fewer than four values.
    pub fn from_slice(values: &[fbf]) -> Self {
        let mut array = [0.0; 4];
        array.copy_from_slice(&values[..Self::WIDTH]);
        Self::from_array(array)
    }

    /// Stores the lanes into the first four elements of the given slice.
    ///
    /// # Panics
    ///
    /// If the slice holds fewer than four elements.
    pub fn store(self, output: &mut [fbf]) {
        output[..Self::WIDTH].copy_from_slice(&self.to_array());
    }

    /// Returns the value of the given lane.
    pub fn lane(self, idx: usize) -> fbf {
        self.to_array()[idx]
    }

    /// Returns a copy with the given lane replaced.
    pub fn with_lane(self, idx: usize, value: fbf) -> Self {
        let mut array = self.to_array();
        array[idx] = value;
        Self::from_array(array)
    }

    /// Moves lanes so that lane `i` of the result holds lane `indices[i] % 4`
    /// of `self`.
    pub fn permute(self, indices: [usize; 4]) -> Self {
        let array = self.to_array();
        Self::from_array(indices.map(|idx| array[idx % Self::WIDTH]))
    }

    /// Picks each lane from `if_true` where the mask is set and from
    /// `if_false` elsewhere.
    #[cfg(feature = "simd")]
    pub fn select(mask: LaneMask4, if_true: Self, if_false: Self) -> Self {
        let all_bits = fbf::from_bits(u64::MAX);
        let mask = f64x4::from(mask.0.map(|flag| if flag { all_bits } else { 0.0 }));
        // Lanes are taken bit for bit from the chosen operand
        Self(if_false.0 ^ (mask & (if_true.0 ^ if_false.0)))
    }

    /// Picks each lane from `if_true` where the mask is set and from
    /// `if_false` elsewhere.
    #[cfg(not(feature = "simd"))]
    pub fn select(mask: LaneMask4, if_true: Self, if_false: Self) -> Self {
        let mut result = if_false.0;
        for idx in 0..Self::WIDTH {
            if mask.0[idx] {
                result[idx] = if_true.0[idx];
            }
        }
        Self(result)
    }

    /// Compares lanes, setting the mask where `self` is smaller than `other`.
    pub fn lt(self, other: Self) -> LaneMask4 {
        let (a, b) = (self.to_array(), other.to_array());
        LaneMask4(std::array::from_fn(|idx| a[idx] < b[idx]))
    }

    /// Lanewise minimum. Lanes holding NaN are unspecified.
    pub fn min(self, other: Self) -> Self {
        Self::select(self.lt(other), self, other)
    }

    /// Lanewise maximum. Lanes holding NaN are unspecified.
    pub fn max(self, other: Self) -> Self {
        Self::select(other.lt(self), self, other)
    }

    /// Sums all lanes, pairwise.
    pub fn sum(self) -> fbf {
        let [a, b, c, d] = self.to_array();
        (a + b) + (c + d)
    }

    /// Transposes a 4x4 block given as rows, so that lane `j` of output
    /// row `i` is lane `i` of input row `j`.
    pub fn transpose(rows: [Self; 4]) -> [Self; 4] {
        let arrays = rows.map(Self::to_array);
        std::array::from_fn(|i| {
            Self::from_array([arrays[0][i], arrays[1][i], arrays[2][i], arrays[3][i]])
        })
    }
}

#[cfg(feature = "simd")]
macro_rules! impl_lane_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Lanes4 {
            type Output = Self;
            fn $method(self, other: Self) -> Self::Output {
                Self(self.0 $op other.0)
            }
        }
    };
}

#[cfg(not(feature = "simd"))]
macro_rules! impl_lane_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Lanes4 {
            type Output = Self;
            fn $method(self, other: Self) -> Self::Output {
                let (a, b) = (self.0, other.0);
                Self([a[0] $op b[0], a[1] $op b[1], a[2] $op b[2], a[3] $op b[3]])
            }
        }
    };
}

impl_lane_op!(Add, add, +);
impl_lane_op!(Sub, sub, -);
impl_lane_op!(Mul, mul, *);

impl Mul<fbf> for Lanes4 {
    type Output = Self;
    fn mul(self, factor: fbf) -> Self::Output {
        self * Self::splat(factor)
    }
}

impl Mul<Lanes4> for fbf {
    type Output = Lanes4;
    fn mul(self, lanes: Lanes4) -> Self::Output {
        Lanes4::splat(self) * lanes
    }
}

impl AddAssign for Lanes4 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
