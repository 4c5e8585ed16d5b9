//! Field components and the chunked field-source interface.
//!
//! The distributed field lives behind the [`FieldSource`] trait: a list of
//! chunks, each owning a disjoint region of the untransformed cell, queried
//! one complex sample at a time. The output machinery never touches chunk
//! storage directly; everything it needs is ownership, component availability,
//! a bounding region, and point samples. [`SyntheticField`] implements the
//! trait over closures for tests, docs and benches.

pub mod synthetic;

pub use synthetic::{SyntheticChunk, SyntheticField};

use std::fmt;

use num_complex::Complex64;

use crate::geometry::{Direction, Region, Vector};

/// Which part of a complex sample lands in the output dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Real,
    Imag,
}

impl Part {
    /// Selects this part of `z`.
    #[inline]
    pub fn of(self, z: Complex64) -> f64 {
        match self {
            Part::Real => z.re,
            Part::Imag => z.im,
        }
    }

    /// Dataset-name suffix for a complex-valued component: `".r"` / `".i"`.
    #[inline]
    pub fn dataset_suffix(self) -> &'static str {
        match self {
            Part::Real => ".r",
            Part::Imag => ".i",
        }
    }
}

/// How a component behaves under symmetry operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Transforms as a vector.
    Electric,
    /// Transforms as a pseudovector (extra determinant sign).
    Magnetic,
    /// A material quantity; invariant, never complex-valued.
    Material,
}

/// A named field quantity sampled at a location.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Ex,
    Ey,
    Ez,
    Hx,
    Hy,
    Hz,
    Dielectric,
}

impl Component {
    /// Every component, electric then magnetic then material.
    pub const ALL: [Component; 7] = [
        Component::Ex,
        Component::Ey,
        Component::Ez,
        Component::Hx,
        Component::Hy,
        Component::Hz,
        Component::Dielectric,
    ];

    /// The electric component along `d`.
    #[inline]
    pub const fn electric(d: Direction) -> Component {
        match d {
            Direction::X => Component::Ex,
            Direction::Y => Component::Ey,
            Direction::Z => Component::Ez,
        }
    }

    /// The magnetic component along `d`.
    #[inline]
    pub const fn magnetic(d: Direction) -> Component {
        match d {
            Direction::X => Component::Hx,
            Direction::Y => Component::Hy,
            Direction::Z => Component::Hz,
        }
    }

    /// The axis this component points along; `None` for material quantities.
    #[inline]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Component::Ex | Component::Hx => Some(Direction::X),
            Component::Ey | Component::Hy => Some(Direction::Y),
            Component::Ez | Component::Hz => Some(Direction::Z),
            Component::Dielectric => None,
        }
    }

    #[inline]
    pub const fn kind(self) -> ComponentKind {
        match self {
            Component::Ex | Component::Ey | Component::Ez => ComponentKind::Electric,
            Component::Hx | Component::Hy | Component::Hz => ComponentKind::Magnetic,
            Component::Dielectric => ComponentKind::Material,
        }
    }

    /// Whether this is a material quantity rather than a dynamical field.
    #[inline]
    pub const fn is_material(self) -> bool {
        matches!(self.kind(), ComponentKind::Material)
    }

    /// Short name used for dataset and file naming.
    pub const fn dataset_name(self) -> &'static str {
        match self {
            Component::Ex => "ex",
            Component::Ey => "ey",
            Component::Ez => "ez",
            Component::Hx => "hx",
            Component::Hy => "hy",
            Component::Hz => "hz",
            Component::Dielectric => "eps",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_name())
    }
}

/// Index of a chunk within its field's chunk list.
///
/// Chunks are addressed by index rather than by reference so that a field,
/// its chunks and the output machinery need no back-pointers to each other;
/// a `ChunkId` is only meaningful for the `FieldSource` that issued it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct ChunkId(usize);

impl ChunkId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        ChunkId(index)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChunkId").field(&self.0).finish()
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read access to a distributed field, one chunk at a time.
///
/// Chunks partition the untransformed cell; only their symmetry and periodic
/// images may overlap each other inside an output region. Implementations on
/// a multi-process field report `is_locally_owned` false for remote chunks,
/// and the output machinery never samples those.
pub trait FieldSource {
    /// Number of chunks in the field; ids `0..num_chunks` are valid.
    fn num_chunks(&self) -> usize;

    /// Whether this process owns `chunk`'s data.
    fn is_locally_owned(&self, chunk: ChunkId) -> bool;

    /// Whether `chunk` stores `component`, with an imaginary part when
    /// `part` is [`Part::Imag`]. Layouts that omit a component on some chunks
    /// are expected, not an error.
    fn stores_component(&self, chunk: ChunkId, component: Component, part: Part) -> bool;

    /// `chunk`'s bounding region for `component`, in untransformed
    /// coordinates.
    fn bounding_region(&self, chunk: ChunkId, component: Component) -> Region;

    /// The complex sample of `component` at `loc`, which must lie in the
    /// chunk's bounding region. Only called on locally owned chunks.
    fn sample_complex(&self, chunk: ChunkId, component: Component, loc: Vector) -> Complex64;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_selects_and_suffixes() {
        let z = Complex64::new(1.5, -2.5);
        assert_eq!(Part::Real.of(z), 1.5);
        assert_eq!(Part::Imag.of(z), -2.5);
        assert_eq!(Part::Real.dataset_suffix(), ".r");
        assert_eq!(Part::Imag.dataset_suffix(), ".i");
    }

    #[test]
    fn component_axes_roundtrip() {
        for d in Direction::ALL {
            assert_eq!(Component::electric(d).direction(), Some(d));
            assert_eq!(Component::magnetic(d).direction(), Some(d));
            assert_eq!(Component::electric(d).kind(), ComponentKind::Electric);
            assert_eq!(Component::magnetic(d).kind(), ComponentKind::Magnetic);
        }
        assert_eq!(Component::Dielectric.direction(), None);
        assert!(Component::Dielectric.is_material());
        assert!(!Component::Hz.is_material());
    }

    #[test]
    fn dataset_names() {
        assert_eq!(Component::Ex.dataset_name(), "ex");
        assert_eq!(Component::Hz.dataset_name(), "hz");
        assert_eq!(Component::Dielectric.dataset_name(), "eps");
        assert_eq!(Component::Ey.to_string(), "ey");
    }

    #[test]
    fn chunk_id_get_and_format() {
        let id = ChunkId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(format!("{id:?}"), "ChunkId(7)");
        assert_eq!(format!("{id}"), "7");
    }

    #[test]
    fn chunk_id_ordering_and_hash() {
        use std::collections::HashSet;
        let a = ChunkId::new(1);
        let b = ChunkId::new(2);
        assert!(a < b);
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }
}
