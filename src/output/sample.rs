//! Sample fetching and buffer packing for one contributing triple.

use num_complex::Complex64;
use num_traits::One;

use crate::field::{ChunkId, Component, FieldSource, Part};
use crate::geometry::{IntVector, Vector};
use crate::lattice::PeriodicLattice;
use crate::output::grid::{GridDescriptor, GridSpan};
use crate::symmetry::SymmetryElement;

/// Flat sample storage, allocated once per output call and reused.
///
/// Sized to the globally agreed maximum span volume, never below one so a
/// rank-0 output still has its single slot.
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    data: Vec<f64>,
}

impl SampleBuffer {
    pub fn new(max_volume: usize) -> Self {
        SampleBuffer {
            data: vec![0.0; max_volume.max(1)],
        }
    }

    /// Allocated slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The first `volume` packed samples.
    #[inline]
    pub fn samples(&self, volume: usize) -> &[f64] {
        &self.data[..volume]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// Total phase carried by one contribution: the element's phase for the
/// stored component times the accumulated Bloch phase of the lattice shift.
///
/// A material `requested` component forces the phase to exactly one; such
/// quantities are not complex-valued fields and never pick up symmetry or
/// boundary phases.
pub fn contribution_phase(
    element: &SymmetryElement,
    source: Component,
    requested: Component,
    lattice: &PeriodicLattice,
    shift: IntVector,
) -> Complex64 {
    if requested.is_material() {
        return Complex64::one();
    }
    element.phase_shift(source) * lattice.shift_phase(shift)
}

/// Packs the samples of one span into `out`, row-major over the active
/// directions.
///
/// Each grid point is moved back by `offset` (the continuous lattice shift)
/// and pulled through the element's inverse transform before the chunk is
/// sampled; `part` selects which part of the phased complex sample lands in
/// the buffer.
///
/// # Panics
///
/// Panics on a span rank above 3. Grids cannot produce one, so hitting the
/// guard means memory corruption or a hand-built span.
#[allow(clippy::too_many_arguments)]
pub fn pack_samples<F>(
    field: &F,
    chunk: ChunkId,
    element: &SymmetryElement,
    source: Component,
    phase: Complex64,
    part: Part,
    grid: &GridDescriptor,
    span: &GridSpan,
    offset: Vector,
    out: &mut [f64],
) where
    F: FieldSource + ?Sized,
{
    debug_assert!(out.len() >= span.volume(), "sample buffer too small");
    let step = grid.sample_step();
    let axes = grid.axes();
    let count = span.count();
    let origin = span.loc0() - offset;
    let fetch = |loc: Vector| {
        part.of(field.sample_complex(chunk, source, element.untransform_point(loc)) * phase)
    };
    match span.rank() {
        0 => {
            out[0] = fetch(origin);
        }
        1 => {
            let mut loc = origin;
            for i0 in 0..count[0] {
                loc[axes[0]] = origin[axes[0]] + i0 as f64 * step;
                out[i0] = fetch(loc);
            }
        }
        2 => {
            let mut loc = origin;
            for i0 in 0..count[0] {
                loc[axes[0]] = origin[axes[0]] + i0 as f64 * step;
                for i1 in 0..count[1] {
                    loc[axes[1]] = origin[axes[1]] + i1 as f64 * step;
                    out[i0 * count[1] + i1] = fetch(loc);
                }
            }
        }
        3 => {
            let mut loc = origin;
            for i0 in 0..count[0] {
                loc[axes[0]] = origin[axes[0]] + i0 as f64 * step;
                for i1 in 0..count[1] {
                    loc[axes[1]] = origin[axes[1]] + i1 as f64 * step;
                    for i2 in 0..count[2] {
                        loc[axes[2]] = origin[axes[2]] + i2 as f64 * step;
                        out[(i0 * count[1] + i1) * count[2] + i2] = fetch(loc);
                    }
                }
            }
        }
        _ => panic!("unexpected dimensionality > 3 of output data"),
    }
}
