//! Axis-aligned geometry for the sampling subsystem.
//!
//! Everything here is closed-interval arithmetic over the three simulation
//! axes: directions, coordinate vectors, and bounding regions. Symmetry and
//! lattice transforms build on these primitives.

pub mod direction;
pub mod region;
pub mod vector;

pub use direction::Direction;
pub use region::Region;
pub use vector::{IntVector, Vector};
