//! Coordinate vectors indexed by [`Direction`].
//!
//! [`Vector`] carries continuous simulation coordinates, [`IntVector`] carries
//! integer lattice-shift steps and grid indices. Both are plain fixed-size
//! arrays under the hood and are indexed by direction rather than by raw
//! `usize` so axis mix-ups do not typecheck.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use super::Direction;

/// A point or displacement in continuous simulation coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vector([f64; 3]);

impl Vector {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector([x, y, z])
    }

    #[inline]
    pub const fn zero() -> Self {
        Vector([0.0; 3])
    }

    /// Raw components in axis order.
    #[inline]
    pub const fn components(self) -> [f64; 3] {
        self.0
    }
}

impl From<[f64; 3]> for Vector {
    fn from(c: [f64; 3]) -> Self {
        Vector(c)
    }
}

impl Index<Direction> for Vector {
    type Output = f64;
    #[inline]
    fn index(&self, d: Direction) -> &f64 {
        &self.0[d.index()]
    }
}

impl IndexMut<Direction> for Vector {
    #[inline]
    fn index_mut(&mut self, d: Direction) -> &mut f64 {
        &mut self.0[d.index()]
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector([self.0[0] - rhs.0[0], self.0[1] - rhs.0[1], self.0[2] - rhs.0[2]])
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        *self = *self - rhs;
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector([-self.0[0], -self.0[1], -self.0[2]])
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, s: f64) -> Vector {
        Vector([self.0[0] * s, self.0[1] * s, self.0[2] * s])
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

/// An integer vector of per-direction steps.
///
/// Used for periodic lattice shifts (one step = one lattice period) and for
/// signed grid indices.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IntVector([i64; 3]);

impl IntVector {
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        IntVector([x, y, z])
    }

    #[inline]
    pub const fn zero() -> Self {
        IntVector([0; 3])
    }
}

impl From<[i64; 3]> for IntVector {
    fn from(c: [i64; 3]) -> Self {
        IntVector(c)
    }
}

impl Index<Direction> for IntVector {
    type Output = i64;
    #[inline]
    fn index(&self, d: Direction) -> &i64 {
        &self.0[d.index()]
    }
}

impl IndexMut<Direction> for IntVector {
    #[inline]
    fn index_mut(&mut self, d: Direction) -> &mut i64 {
        &mut self.0[d.index()]
    }
}

impl fmt::Display for IntVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_by_direction() {
        let mut v = Vector::new(1.0, 2.0, 3.0);
        assert_eq!(v[Direction::Y], 2.0);
        v[Direction::Z] = 9.0;
        assert_eq!(v.components(), [1.0, 2.0, 9.0]);
    }

    #[test]
    fn arithmetic() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = Vector::new(0.5, -2.0, 1.0);
        assert_eq!(a + b, Vector::new(1.5, 0.0, 4.0));
        assert_eq!(a - b, Vector::new(0.5, 4.0, 2.0));
        assert_eq!(-a, Vector::new(-1.0, -2.0, -3.0));
        assert_eq!(b * 2.0, Vector::new(1.0, -4.0, 2.0));
        let mut c = a;
        c -= b;
        assert_eq!(c, a - b);
    }

    #[test]
    fn int_vector_index() {
        let mut s = IntVector::zero();
        s[Direction::X] = -2;
        assert_eq!(s, IntVector::new(-2, 0, 0));
        assert_eq!(s[Direction::X], -2);
    }

    #[test]
    fn serde_as_arrays() {
        let v = Vector::new(0.5, 0.0, -1.0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[0.5,0.0,-1.0]");
        let back: Vector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
