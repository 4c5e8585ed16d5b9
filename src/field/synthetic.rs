//! In-memory field source over closures.
//!
//! `SyntheticField` is the reference [`FieldSource`]: chunk layout is plain
//! data, samples come from an evaluation closure, and every ownership and
//! storage rule the output path relies on can be staged explicitly. Tests
//! build multi-rank scenarios by giving each rank the same chunk list with
//! different `owned` flags.

use num_complex::Complex64;

use super::{ChunkId, Component, FieldSource, Part};
use crate::geometry::{Region, Vector};

/// One chunk of a [`SyntheticField`]: a region plus storage rules.
#[derive(Clone, Debug)]
pub struct SyntheticChunk {
    pub region: Region,
    /// Whether the local process owns this chunk's data.
    pub owned: bool,
    /// Components present on this chunk; `None` stores all of them.
    pub components: Option<Vec<Component>>,
    /// Whether the chunk stores imaginary parts.
    pub store_imag: bool,
}

impl SyntheticChunk {
    /// An owned chunk storing every component, real and imaginary.
    pub fn new(region: Region) -> Self {
        SyntheticChunk {
            region,
            owned: true,
            components: None,
            store_imag: true,
        }
    }

    /// Marks the chunk as owned by some other process.
    pub fn unowned(mut self) -> Self {
        self.owned = false;
        self
    }

    /// Restricts the chunk to the given components.
    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = Some(components);
        self
    }

    /// Drops imaginary-part storage (a purely real chunk).
    pub fn without_imag(mut self) -> Self {
        self.store_imag = false;
        self
    }
}

/// A [`FieldSource`] whose samples come from a closure.
pub struct SyntheticField<F> {
    chunks: Vec<SyntheticChunk>,
    eval: F,
}

impl<F> SyntheticField<F>
where
    F: Fn(Component, Vector) -> Complex64,
{
    pub fn new(chunks: Vec<SyntheticChunk>, eval: F) -> Self {
        SyntheticField { chunks, eval }
    }

    /// A single owned chunk covering `region`.
    pub fn single_chunk(region: Region, eval: F) -> Self {
        Self::new(vec![SyntheticChunk::new(region)], eval)
    }

    pub fn chunks(&self) -> &[SyntheticChunk] {
        &self.chunks
    }
}

impl<F> FieldSource for SyntheticField<F>
where
    F: Fn(Component, Vector) -> Complex64,
{
    fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    fn is_locally_owned(&self, chunk: ChunkId) -> bool {
        self.chunks[chunk.get()].owned
    }

    fn stores_component(&self, chunk: ChunkId, component: Component, part: Part) -> bool {
        let c = &self.chunks[chunk.get()];
        if part == Part::Imag && !c.store_imag {
            return false;
        }
        c.components
            .as_ref()
            .is_none_or(|stored| stored.contains(&component))
    }

    fn bounding_region(&self, chunk: ChunkId, _component: Component) -> Region {
        self.chunks[chunk.get()].region
    }

    fn sample_complex(&self, chunk: ChunkId, component: Component, loc: Vector) -> Complex64 {
        debug_assert!(self.chunks[chunk.get()].owned, "sampled an unowned chunk");
        (self.eval)(component, loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;

    fn unit_region() -> Region {
        Region::new(Vector::zero(), Vector::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn ownership_and_storage_rules() {
        let field = SyntheticField::new(
            vec![
                SyntheticChunk::new(unit_region()),
                SyntheticChunk::new(unit_region()).unowned(),
                SyntheticChunk::new(unit_region()).with_components(vec![Component::Ez]),
                SyntheticChunk::new(unit_region()).without_imag(),
            ],
            |_, _| Complex64::new(1.0, 0.0),
        );
        assert_eq!(field.num_chunks(), 4);
        assert!(field.is_locally_owned(ChunkId::new(0)));
        assert!(!field.is_locally_owned(ChunkId::new(1)));
        assert!(field.stores_component(ChunkId::new(2), Component::Ez, Part::Imag));
        assert!(!field.stores_component(ChunkId::new(2), Component::Ex, Part::Real));
        assert!(field.stores_component(ChunkId::new(3), Component::Ex, Part::Real));
        assert!(!field.stores_component(ChunkId::new(3), Component::Ex, Part::Imag));
    }

    #[test]
    fn samples_come_from_the_closure() {
        let field = SyntheticField::single_chunk(unit_region(), |c, loc| match c {
            Component::Ex => Complex64::new(loc[Direction::X], loc[Direction::Y]),
            _ => Complex64::default(),
        });
        let z = field.sample_complex(ChunkId::new(0), Component::Ex, Vector::new(0.25, 0.5, 0.0));
        assert_eq!(z, Complex64::new(0.25, 0.5));
        let other = field.sample_complex(ChunkId::new(0), Component::Hy, Vector::zero());
        assert_eq!(other, Complex64::default());
    }

    #[test]
    fn bounding_region_is_the_declared_region() {
        let region = Region::new(Vector::new(-1.0, 0.0, 0.0), Vector::new(1.0, 2.0, 0.0));
        let field = SyntheticField::single_chunk(region, |_, _| Complex64::default());
        assert_eq!(field.bounding_region(ChunkId::new(0), Component::Hz), region);
    }
}
