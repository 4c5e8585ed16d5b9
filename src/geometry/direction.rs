//! Spatial directions of the simulation cell.

use std::fmt;

/// One of the three axes of the simulation cell.
///
/// Directions index into [`Vector`](crate::geometry::Vector) and
/// [`IntVector`](crate::geometry::IntVector), and name the active axes of an
/// output grid. The fixed `X < Y < Z` order is load-bearing: shift odometers
/// advance `X` fastest, and output grids list their active directions in this
/// order.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Direction {
    X,
    Y,
    Z,
}

impl Direction {
    /// All directions, in axis order.
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    /// Axis index, `0..3`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The remaining two directions, in cyclic order after `self`.
    ///
    /// `X -> (Y, Z)`, `Y -> (Z, X)`, `Z -> (X, Y)`. Rotations about an axis
    /// act in the plane these two span.
    #[inline]
    pub const fn others(self) -> (Direction, Direction) {
        match self {
            Direction::X => (Direction::Y, Direction::Z),
            Direction::Y => (Direction::Z, Direction::X),
            Direction::Z => (Direction::X, Direction::Y),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        })
    }
}
