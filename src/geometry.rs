//! Geometric utility objects.

use crate::num::fbf;
use std::{
    fmt,
    ops::{Add, Index, IndexMut, Mul, Sub},
};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "for-testing"))]
use approx::{AbsDiffEq, RelativeEq};

/// Denotes the Cartesian x-, y- or z-dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim3 {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Dim3 {
    /// Creates an array for iterating over the x-, y- and z-dimensions.
    pub fn slice() -> [Self; 3] {
        [Self::X, Self::Y, Self::Z]
    }

    /// Returns the number of the dimension.
    pub fn num(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::X => "x",
                Self::Y => "y",
                Self::Z => "z",
            }
        )
    }
}

use Dim3::{X, Y, Z};

/// Denotes the cylindrical z-, r- or phi-dimension.
///
/// The numbering is also used for the components of a field vector in
/// the cylindrical basis, so that component 0 is Bz, 1 is Br and 2 is Bphi.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CylDim {
    Z = 0,
    R = 1,
    Phi = 2,
}

impl CylDim {
    /// Creates an array for iterating over the z-, r- and phi-dimensions.
    pub fn slice() -> [Self; 3] {
        [Self::Z, Self::R, Self::Phi]
    }

    /// Returns the number of the dimension.
    pub fn num(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CylDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Z => "z",
                Self::R => "r",
                Self::Phi => "phi",
            }
        )
    }
}

/// Represents any quantity with three Cartesian components.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct In3D<T>([T; 3]);

impl<T> In3D<T> {
    /// Creates a new 3D quantity given the three components.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self([x, y, z])
    }
}

impl<T> Index<Dim3> for In3D<T> {
    type Output = T;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<T> IndexMut<Dim3> for In3D<T> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<T: fmt::Display> fmt::Display for In3D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        fmt::Display::fmt(&self[X], f)?;
        f.write_str(", ")?;
        fmt::Display::fmt(&self[Y], f)?;
        f.write_str(", ")?;
        fmt::Display::fmt(&self[Z], f)?;
        f.write_str("]")
    }
}

/// Represents any quantity with three cylindrical components,
/// ordered as (z, r, phi).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct InCyl<T>([T; 3]);

impl<T> InCyl<T> {
    /// Creates a new cylindrical quantity given the z-, r- and phi-components.
    pub fn new(z: T, r: T, phi: T) -> Self {
        Self([z, r, phi])
    }

    /// Creates a new cylindrical quantity by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(CylDim) -> T,
    {
        Self::new(
            create_component(CylDim::Z),
            create_component(CylDim::R),
            create_component(CylDim::Phi),
        )
    }

    /// Creates a new cylindrical quantity with the given value copied into all components.
    pub fn same(a: T) -> Self
    where
        T: Copy,
    {
        Self([a, a, a])
    }

    /// Returns a reference to the underlying array ordered as (z, r, phi).
    pub fn as_array(&self) -> &[T; 3] {
        &self.0
    }
}

impl<T> Index<CylDim> for InCyl<T> {
    type Output = T;
    fn index(&self, dim: CylDim) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<T> IndexMut<CylDim> for InCyl<T> {
    fn index_mut(&mut self, dim: CylDim) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<T: fmt::Display> fmt::Display for InCyl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [z, r, phi] = &self.0;
        write!(f, "(z: {}, r: {}, phi: {})", z, r, phi)
    }
}

/// A 3D Cartesian vector.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Vec3(In3D<fbf>);

impl Vec3 {
    /// Creates a new 3D vector given the three components.
    pub fn new(x: fbf, y: fbf, z: fbf) -> Self {
        Self(In3D::new(x, y, z))
    }

    /// Returns the components as an array.
    pub fn to_array(&self) -> [fbf; 3] {
        self.0 .0
    }
}

impl Index<Dim3> for Vec3 {
    type Output = fbf;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim]
    }
}

impl IndexMut<Dim3> for Vec3 {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl Add<Vec3> for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Self::Output {
        Vec3::new(self[X] + other[X], self[Y] + other[Y], self[Z] + other[Z])
    }
}

impl Sub<Vec3> for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Self::Output {
        Vec3::new(self[X] - other[X], self[Y] - other[Y], self[Z] - other[Z])
    }
}

impl Mul<fbf> for Vec3 {
    type Output = Vec3;
    fn mul(self, factor: fbf) -> Self::Output {
        Vec3::new(self[X] * factor, self[Y] * factor, self[Z] * factor)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A 3D Cartesian point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Point3(In3D<fbf>);

impl Point3 {
    /// Creates a new 3D point given the three components.
    pub fn new(x: fbf, y: fbf, z: fbf) -> Self {
        Self(In3D::new(x, y, z))
    }

    /// Creates the point with the given cylindrical coordinates.
    pub fn from_cylindrical(z: fbf, r: fbf, phi: fbf) -> Self {
        Self::new(r * phi.cos(), r * phi.sin(), z)
    }

    /// Returns the point displaced by the given amount along the given dimension.
    pub fn displaced(&self, dim: Dim3, amount: fbf) -> Self {
        let mut displaced = *self;
        displaced[dim] += amount;
        displaced
    }

    /// Returns the components as an array.
    pub fn to_array(&self) -> [fbf; 3] {
        self.0 .0
    }
}

impl Index<Dim3> for Point3 {
    type Output = fbf;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim]
    }
}

impl IndexMut<Dim3> for Point3 {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A 3x3 matrix of spatial derivatives of a Cartesian vector field.
///
/// Element `(i, j)` holds the derivative of component `i` with respect
/// to coordinate `j`, stored row-major.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Jacobian3([fbf; 9]);

impl Jacobian3 {
    /// Creates a new Jacobian from its nine elements in row-major order.
    pub fn from_row_major(elements: [fbf; 9]) -> Self {
        Self(elements)
    }

    /// Creates a new Jacobian with all elements zero.
    pub fn zero() -> Self {
        Self([0.0; 9])
    }

    /// Returns the derivative of component `component` with respect to `coord`.
    pub fn get(&self, component: Dim3, coord: Dim3) -> fbf {
        self[(component, coord)]
    }

    /// Returns the derivatives of the given component with respect to x, y and z.
    pub fn row(&self, component: Dim3) -> Vec3 {
        let start = 3 * component.num();
        Vec3::new(self.0[start], self.0[start + 1], self.0[start + 2])
    }

    /// Returns the derivatives of all components with respect to the given coordinate.
    pub fn column(&self, coord: Dim3) -> Vec3 {
        let col = coord.num();
        Vec3::new(self.0[col], self.0[3 + col], self.0[6 + col])
    }

    /// Returns the sum of the diagonal elements, i.e. the divergence of the field.
    pub fn trace(&self) -> fbf {
        self.0[0] + self.0[4] + self.0[8]
    }

    /// Returns a reference to the row-major elements.
    pub fn as_row_major(&self) -> &[fbf; 9] {
        &self.0
    }
}

impl Index<(Dim3, Dim3)> for Jacobian3 {
    type Output = fbf;
    fn index(&self, (component, coord): (Dim3, Dim3)) -> &Self::Output {
        &self.0[3 * component.num() + coord.num()]
    }
}

impl IndexMut<(Dim3, Dim3)> for Jacobian3 {
    fn index_mut(&mut self, (component, coord): (Dim3, Dim3)) -> &mut Self::Output {
        &mut self.0[3 * component.num() + coord.num()]
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl AbsDiffEq for Vec3 {
    type Epsilon = fbf;

    fn default_epsilon() -> Self::Epsilon {
        fbf::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        Dim3::slice()
            .iter()
            .all(|&dim| fbf::abs_diff_eq(&self[dim], &other[dim], epsilon))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl RelativeEq for Vec3 {
    fn default_max_relative() -> Self::Epsilon {
        fbf::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        Dim3::slice()
            .iter()
            .all(|&dim| fbf::relative_eq(&self[dim], &other[dim], epsilon, max_relative))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl AbsDiffEq for InCyl<fbf> {
    type Epsilon = fbf;

    fn default_epsilon() -> Self::Epsilon {
        fbf::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        CylDim::slice()
            .iter()
            .all(|&dim| fbf::abs_diff_eq(&self[dim], &other[dim], epsilon))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl RelativeEq for InCyl<fbf> {
    fn default_max_relative() -> Self::Epsilon {
        fbf::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        CylDim::slice()
            .iter()
            .all(|&dim| fbf::relative_eq(&self[dim], &other[dim], epsilon, max_relative))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl AbsDiffEq for Jacobian3 {
    type Epsilon = fbf;

    fn default_epsilon() -> Self::Epsilon {
        fbf::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| fbf::abs_diff_eq(a, b, epsilon))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl RelativeEq for Jacobian3 {
    fn default_max_relative() -> Self::Epsilon {
        fbf::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| fbf::relative_eq(a, b, epsilon, max_relative))
    }
}
