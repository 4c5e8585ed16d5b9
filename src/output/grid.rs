//! Integer output grids derived from continuous requests.
//!
//! [`GridDescriptor::build`] converts a requested region and a sampling
//! resolution into the global dataset shape; [`GridDescriptor::clip`] maps a
//! continuous overlap back onto that grid. Both use the same ceil/floor
//! rounding on the same code path, which is what keeps the dry and real
//! output passes in agreement about which overlaps produce samples.

use crate::error::FieldGatherError;
use crate::geometry::{Direction, Region, Vector};

/// The integer sampling grid of one output call.
///
/// Directions whose span covers at least two grid points are *active* and
/// contribute a dataset dimension, in `X < Y < Z` order. The rest collapse:
/// their sample coordinate is pinned at the request's midpoint and they do
/// not appear in the dataset shape. A pure function of the request, so every
/// process computes the identical descriptor without communicating.
#[derive(Clone, Debug, PartialEq)]
pub struct GridDescriptor {
    rank: usize,
    axes: [Direction; 3],
    dims: [usize; 3],
    start0: [i64; 3],
    pinned: Vector,
    resolution: f64,
    region: Region,
}

impl GridDescriptor {
    /// Rounds `region` onto the grid with `resolution` samples per unit
    /// length.
    ///
    /// Per direction, the first grid point is `ceil(min * resolution)` and
    /// the last is `floor(max * resolution)`; the direction is active when
    /// those differ. Re-validates the region bounds so that deserialized
    /// requests cannot smuggle in an inverted or non-finite box.
    pub fn build(region: &Region, resolution: f64) -> Result<Self, FieldGatherError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(FieldGatherError::InvalidResolution(resolution));
        }
        for axis in Direction::ALL {
            let (min, max) = (region.min()[axis], region.max()[axis]);
            // `min > max` never holds for NaN bounds; check finiteness first
            // or NaN saturates through the rounding below as index 0.
            if !min.is_finite() || !max.is_finite() {
                return Err(FieldGatherError::NonFiniteRegion { axis, min, max });
            }
            if min > max {
                return Err(FieldGatherError::InvertedRegion { axis, min, max });
            }
        }

        let mut rank = 0;
        let mut axes = Direction::ALL;
        let mut dims = [1; 3];
        let mut start0 = [0; 3];
        let mut pinned = Vector::zero();
        for d in Direction::ALL {
            let minpt = (region.min()[d] * resolution).ceil() as i64;
            let maxpt = (region.max()[d] * resolution).floor() as i64;
            if minpt < maxpt {
                axes[rank] = d;
                start0[rank] = minpt;
                dims[rank] = (maxpt - minpt + 1) as usize;
                rank += 1;
            } else {
                pinned[d] = 0.5 * (region.min()[d] + region.max()[d]);
            }
        }

        Ok(GridDescriptor {
            rank,
            axes,
            dims,
            start0,
            pinned,
            resolution,
            region: *region,
        })
    }

    /// Number of active directions, `0..=3`.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Active directions in axis order.
    #[inline]
    pub fn axes(&self) -> &[Direction] {
        &self.axes[..self.rank]
    }

    /// Global dataset extent per active direction.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims[..self.rank]
    }

    /// Global index of the first grid point per active direction.
    #[inline]
    pub fn start0(&self) -> &[i64] {
        &self.start0[..self.rank]
    }

    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Distance between adjacent samples.
    #[inline]
    pub fn sample_step(&self) -> f64 {
        1.0 / self.resolution
    }

    /// The continuous region the grid was built from.
    #[inline]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Total number of grid points.
    pub fn volume(&self) -> usize {
        self.dims().iter().product()
    }

    /// Maps a continuous overlap onto the grid, or `None` when rounding
    /// leaves no grid point inside it along some active direction or the
    /// overlay rounds off the grid entirely.
    ///
    /// Callers pass an intersection with the descriptor's region, which can
    /// never round off the grid. Uses the same rounding as [`build`], so an
    /// overlap judged non-empty here is judged non-empty identically on a
    /// later pass over the same geometry.
    ///
    /// [`build`]: GridDescriptor::build
    pub fn clip(&self, overlay: &Region) -> Option<GridSpan> {
        let mut start = [0; 3];
        let mut count = [0; 3];
        let mut loc0 = self.pinned;
        let mut volume = 1;
        for (j, &d) in self.axes().iter().enumerate() {
            let minpt = (overlay.min()[d] * self.resolution).ceil() as i64;
            let maxpt = (overlay.max()[d] * self.resolution).floor() as i64;
            if maxpt < minpt {
                return None;
            }
            if minpt < self.start0[j] || maxpt >= self.start0[j] + self.dims[j] as i64 {
                return None;
            }
            loc0[d] = minpt as f64 * self.sample_step();
            start[j] = (minpt - self.start0[j]) as usize;
            count[j] = (maxpt - minpt + 1) as usize;
            volume *= count[j];
        }
        Some(GridSpan {
            rank: self.rank,
            start,
            count,
            loc0,
            volume,
        })
    }
}

/// A grid-aligned hyperslab produced by [`GridDescriptor::clip`].
///
/// `start`/`count` are local dataset indices (the grid's own start already
/// subtracted); `loc0` is the continuous coordinate of the first sample,
/// with pinned directions held at the request midpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridSpan {
    rank: usize,
    start: [usize; 3],
    count: [usize; 3],
    loc0: Vector,
    volume: usize,
}

impl GridSpan {
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Dataset offset per active direction.
    #[inline]
    pub fn start(&self) -> &[usize] {
        &self.start[..self.rank]
    }

    /// Sample count per active direction.
    #[inline]
    pub fn count(&self) -> &[usize] {
        &self.count[..self.rank]
    }

    /// Coordinates of the first sample.
    #[inline]
    pub fn loc0(&self) -> Vector {
        self.loc0
    }

    /// Number of samples in the span, always at least one.
    #[inline]
    pub fn volume(&self) -> usize {
        self.volume
    }
}
