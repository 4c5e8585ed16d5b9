//! Axis-aligned geometric regions.

use std::fmt;

use super::{Direction, Vector};

/// A closed, axis-aligned box in simulation coordinates.
///
/// Bounds are inclusive on both sides, matching the way chunk extents and
/// output requests describe geometry: two regions that merely touch share a
/// (degenerate) intersection, and a region may be degenerate along any axis
/// (`min == max`), which is how planes, lines and points are expressed.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    min: Vector,
    max: Vector,
}

impl Region {
    /// Creates a region from its lower and upper corners.
    ///
    /// # Panics
    ///
    /// Panics if `min > max` along any axis. Requests arriving from
    /// deserialized input are re-validated by
    /// [`GridDescriptor::build`](crate::output::GridDescriptor::build) instead.
    pub fn new(min: Vector, max: Vector) -> Self {
        for d in Direction::ALL {
            assert!(
                min[d] <= max[d],
                "region inverted along {d}: min {} > max {}",
                min[d],
                max[d]
            );
        }
        Region { min, max }
    }

    #[inline]
    pub const fn min(&self) -> Vector {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> Vector {
        self.max
    }

    /// Extent along one axis; zero for a degenerate axis.
    #[inline]
    pub fn extent(&self, d: Direction) -> f64 {
        self.max[d] - self.min[d]
    }

    /// Center of the box.
    pub fn midpoint(&self) -> Vector {
        (self.min + self.max) * 0.5
    }

    /// Whether `p` lies inside the closed box (boundary included).
    pub fn contains(&self, p: Vector) -> bool {
        Direction::ALL
            .iter()
            .all(|&d| self.min[d] <= p[d] && p[d] <= self.max[d])
    }

    /// Whether the closed boxes share at least one point.
    pub fn intersects(&self, other: &Region) -> bool {
        Direction::ALL
            .iter()
            .all(|&d| self.min[d] <= other.max[d] && other.min[d] <= self.max[d])
    }

    /// The common sub-box, or `None` when the boxes are disjoint.
    ///
    /// Touching boxes intersect in a degenerate region rather than not at
    /// all; the grid clip step decides whether such a sliver yields samples.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        let mut min = self.min;
        let mut max = self.max;
        for d in Direction::ALL {
            min[d] = min[d].max(other.min[d]);
            max[d] = max[d].min(other.max[d]);
        }
        Some(Region { min, max })
    }

    /// The region translated by `offset`.
    pub fn shifted(&self, offset: Vector) -> Region {
        Region {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}] x [{}, {}]",
            self.min[Direction::X],
            self.max[Direction::X],
            self.min[Direction::Y],
            self.max[Direction::Y],
            self.min[Direction::Z],
            self.max[Direction::Z],
        )
    }
}
