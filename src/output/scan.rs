//! Enumeration of the (chunk, symmetry element, lattice shift) triples that
//! can land samples inside an output region.
//!
//! [`scan_contributions`] drives both halves of the two-pass output protocol:
//! the dry pass counts spans and sizes the buffer through it, the real pass
//! samples and writes through it. Running the passes over the same code is
//! what guarantees they agree on the number of writes.

use crate::error::FieldGatherError;
use crate::field::{ChunkId, Component, FieldSource, Part};
use crate::geometry::{Direction, IntVector, Region};
use crate::lattice::PeriodicLattice;
use crate::output::grid::{GridDescriptor, GridSpan};
use crate::symmetry::{SymmetryElement, SymmetryGroup};

/// One non-empty overlap between a transformed, shifted chunk image and the
/// output grid.
#[derive(Clone, Debug)]
pub struct Contribution<'a> {
    /// Chunk whose data backs the overlap.
    pub chunk: ChunkId,
    /// Symmetry element producing the image.
    pub element: &'a SymmetryElement,
    /// Component actually stored by the chunk for this element.
    pub source: Component,
    /// Lattice steps applied to the image.
    pub shift: IntVector,
    /// The overlap clipped onto the output grid.
    pub span: GridSpan,
}

/// Inclusive shift range along each direction for which `image` moved by a
/// whole number of periods can still touch `out`.
fn shift_bounds(
    lattice: &PeriodicLattice,
    image: &Region,
    out: &Region,
) -> (IntVector, IntVector) {
    let mut lo = IntVector::zero();
    let mut hi = IntVector::zero();
    for d in Direction::ALL {
        if let Some(axis) = lattice.axis(d) {
            let period = axis.period();
            lo[d] = ((out.min()[d] - image.max()[d]) / period).floor() as i64;
            hi[d] = ((out.max()[d] - image.min()[d]) / period).ceil() as i64;
        }
    }
    (lo, hi)
}

/// Every integer vector in an inclusive box, first direction fastest.
///
/// A mixed-radix counter: advancing increments `X`, carries into `Y`, then
/// `Z`; a wrap back to the start ends the sequence. No recursion and no
/// per-step allocation. Empty when the box is inverted along any direction.
#[derive(Clone, Debug)]
pub struct ShiftOdometer {
    lo: IntVector,
    hi: IntVector,
    cur: IntVector,
    done: bool,
}

impl ShiftOdometer {
    pub fn new(lo: IntVector, hi: IntVector) -> Self {
        let done = Direction::ALL.iter().any(|&d| lo[d] > hi[d]);
        ShiftOdometer {
            lo,
            hi,
            cur: lo,
            done,
        }
    }
}

impl Iterator for ShiftOdometer {
    type Item = IntVector;

    fn next(&mut self) -> Option<IntVector> {
        if self.done {
            return None;
        }
        let emit = self.cur;
        let mut carried = true;
        for d in Direction::ALL {
            if self.cur[d] < self.hi[d] {
                self.cur[d] += 1;
                carried = false;
                break;
            }
            self.cur[d] = self.lo[d];
        }
        if carried {
            self.done = true;
        }
        Some(emit)
    }
}

/// Visits every contributing triple for one requested `component`/`part`.
///
/// Per symmetry element, the requested component is pulled back to the
/// component the chunks actually store; chunks that are remote or do not
/// store that component in the needed part are skipped silently. Each owned
/// chunk's bounding region is pushed through the element, every lattice
/// shift within [`shift_bounds`] is tried, and overlaps that survive
/// [`GridDescriptor::clip`] reach the visitor in a deterministic order
/// (elements outermost, chunks next, shifts innermost).
pub fn scan_contributions<F, V>(
    field: &F,
    symmetry: &SymmetryGroup,
    lattice: &PeriodicLattice,
    component: Component,
    part: Part,
    grid: &GridDescriptor,
    mut visit: V,
) -> Result<(), FieldGatherError>
where
    F: FieldSource + ?Sized,
    V: FnMut(Contribution<'_>) -> Result<(), FieldGatherError>,
{
    for element in symmetry.elements() {
        let source = element.source_component(component);
        for index in 0..field.num_chunks() {
            let chunk = ChunkId::new(index);
            if !field.is_locally_owned(chunk) || !field.stores_component(chunk, source, part) {
                continue;
            }
            let image = element.transform_region(&field.bounding_region(chunk, source));
            let (lo, hi) = shift_bounds(lattice, &image, grid.region());
            for shift in ShiftOdometer::new(lo, hi) {
                let shifted = image.shifted(lattice.shift_vector(shift));
                let Some(overlap) = shifted.intersection(grid.region()) else {
                    continue;
                };
                let Some(span) = grid.clip(&overlap) else {
                    continue;
                };
                visit(Contribution {
                    chunk,
                    element,
                    source,
                    shift,
                    span,
                })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SyntheticField;
    use crate::geometry::Vector;
    use crate::lattice::PeriodicAxis;
    use num_complex::Complex64;

    fn bx(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Region {
        Region::new(Vector::new(x.0, y.0, z.0), Vector::new(x.1, y.1, z.1))
    }

    fn flat(region: Region) -> SyntheticField<impl Fn(Component, Vector) -> Complex64> {
        SyntheticField::single_chunk(region, |_, _| Complex64::new(1.0, 0.0))
    }

    #[test]
    fn odometer_covers_the_box_first_direction_fastest() {
        let seen: Vec<IntVector> =
            ShiftOdometer::new(IntVector::new(-1, 0, 0), IntVector::new(1, 1, 0)).collect();
        assert_eq!(
            seen,
            vec![
                IntVector::new(-1, 0, 0),
                IntVector::new(0, 0, 0),
                IntVector::new(1, 0, 0),
                IntVector::new(-1, 1, 0),
                IntVector::new(0, 1, 0),
                IntVector::new(1, 1, 0),
            ]
        );
    }

    #[test]
    fn odometer_single_cell() {
        let seen: Vec<_> = ShiftOdometer::new(IntVector::zero(), IntVector::zero()).collect();
        assert_eq!(seen, vec![IntVector::zero()]);
    }

    #[test]
    fn odometer_empty_on_inverted_bounds() {
        let mut odo = ShiftOdometer::new(IntVector::new(1, 0, 0), IntVector::new(0, 0, 0));
        assert!(odo.next().is_none());
    }

    #[test]
    fn shift_bounds_bracket_every_touching_image() {
        let lattice = PeriodicLattice::aperiodic().with_axis(Direction::X, PeriodicAxis::plain(1.0));
        let image = bx((0.0, 0.4), (0.0, 0.0), (0.0, 0.0));
        let out = bx((0.0, 2.0), (0.0, 0.0), (0.0, 0.0));
        let (lo, hi) = shift_bounds(&lattice, &image, &out);
        assert_eq!(lo, IntVector::new(-1, 0, 0));
        assert_eq!(hi, IntVector::new(2, 0, 0));
        // one step below lo the image can no longer touch the region
        assert!(!image
            .shifted(lattice.shift_vector(IntVector::new(lo[Direction::X] - 1, 0, 0)))
            .intersects(&out));
    }

    #[test]
    fn shift_bounds_pin_aperiodic_directions() {
        let lattice = PeriodicLattice::aperiodic();
        let r = bx((0.0, 1.0), (0.0, 1.0), (0.0, 1.0));
        let far = bx((90.0, 91.0), (0.0, 1.0), (0.0, 1.0));
        assert_eq!(
            shift_bounds(&lattice, &far, &r),
            (IntVector::zero(), IntVector::zero())
        );
    }

    #[test]
    fn direct_overlap_yields_one_contribution() {
        let region = bx((0.0, 2.0), (0.0, 0.0), (0.0, 0.0));
        let field = flat(region);
        let grid = GridDescriptor::build(&region, 2.0).unwrap();
        let mut spans = Vec::new();
        scan_contributions(
            &field,
            &SymmetryGroup::trivial(),
            &PeriodicLattice::aperiodic(),
            Component::Ex,
            Part::Real,
            &grid,
            |c| {
                spans.push(c.span);
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start(), &[0]);
        assert_eq!(spans[0].count(), &[5]);
    }

    #[test]
    fn unowned_and_component_free_chunks_are_skipped() {
        use crate::field::SyntheticChunk;
        let region = bx((0.0, 2.0), (0.0, 0.0), (0.0, 0.0));
        let grid = GridDescriptor::build(&region, 2.0).unwrap();
        let field = SyntheticField::new(
            vec![
                SyntheticChunk::new(region).unowned(),
                SyntheticChunk::new(region).with_components(vec![Component::Hz]),
            ],
            |_, _| Complex64::new(1.0, 0.0),
        );
        let mut hits = 0;
        scan_contributions(
            &field,
            &SymmetryGroup::trivial(),
            &PeriodicLattice::aperiodic(),
            Component::Ex,
            Part::Real,
            &grid,
            |_| {
                hits += 1;
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(hits, 0);
    }

    #[test]
    fn mirror_image_contributes_the_reflected_half() {
        // Chunk covers [0,1]; its mirror image about x=1 covers [1,2].
        let out = bx((0.0, 2.0), (0.0, 0.0), (0.0, 0.0));
        let field = flat(bx((0.0, 1.0), (0.0, 0.0), (0.0, 0.0)));
        let grid = GridDescriptor::build(&out, 2.0).unwrap();
        let symmetry = SymmetryGroup::mirror(
            Direction::X,
            Vector::new(1.0, 0.0, 0.0),
            crate::symmetry::Parity::Even,
        );
        let mut starts = Vec::new();
        scan_contributions(
            &field,
            &symmetry,
            &PeriodicLattice::aperiodic(),
            Component::Ex,
            Part::Real,
            &grid,
            |c| {
                starts.push((c.span.start()[0], c.span.count()[0]));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(starts, vec![(0, 3), (2, 3)]);
    }

    #[test]
    fn periodic_images_tile_the_region() {
        // Period 2 copies of [0,1] inside [0,4]: shifts 0, 1 and the single
        // boundary point contributed by shift 2.
        let out = bx((0.0, 4.0), (0.0, 0.0), (0.0, 0.0));
        let field = flat(bx((0.0, 1.0), (0.0, 0.0), (0.0, 0.0)));
        let grid = GridDescriptor::build(&out, 1.0).unwrap();
        let lattice =
            PeriodicLattice::aperiodic().with_axis(Direction::X, PeriodicAxis::plain(2.0));
        let mut seen = Vec::new();
        scan_contributions(
            &field,
            &SymmetryGroup::trivial(),
            &lattice,
            Component::Ex,
            Part::Real,
            &grid,
            |c| {
                seen.push((c.shift[Direction::X], c.span.start()[0], c.span.count()[0]));
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(seen, vec![(0, 0, 2), (1, 2, 2), (2, 4, 1)]);
    }

    #[test]
    fn visitor_errors_stop_the_scan() {
        let region = bx((0.0, 2.0), (0.0, 0.0), (0.0, 0.0));
        let field = flat(region);
        let grid = GridDescriptor::build(&region, 2.0).unwrap();
        let err = scan_contributions(
            &field,
            &SymmetryGroup::trivial(),
            &PeriodicLattice::aperiodic(),
            Component::Ex,
            Part::Real,
            &grid,
            |_| {
                Err(FieldGatherError::MissingDataset {
                    dataset: "ex".into(),
                })
            },
        )
        .unwrap_err();
        assert!(matches!(err, FieldGatherError::MissingDataset { .. }));
    }
}
