//! Collective field output: uniform resampling of a distributed field onto a
//! rectangular grid, written through a chunked-array writer.
//!
//! The model follows a two-pass protocol. A dry pass enumerates every
//! contribution a process will write (its own chunks, their symmetry images
//! and their periodic images) and measures them; one max-reduction agrees on
//! the collective call count and another on the largest buffer any process
//! needs. The real pass then samples and writes, and processes with fewer
//! contributions than the agreed count pad with zero-sized writes so every
//! backend sees the same number of calls everywhere.
//!
//! [`output_field`] is the top of the public API; [`output_dataset`] writes a
//! single dataset and is the unit the parity guarantees are stated over.

pub mod grid;
pub mod sample;
pub mod scan;
pub mod writer;

pub use grid::{GridDescriptor, GridSpan};
pub use sample::{SampleBuffer, contribution_phase, pack_samples};
pub use scan::{Contribution, ShiftOdometer, scan_contributions};
pub use writer::{ChunkWriter, Dataset, MemoryWriter, SharedMemoryWriter, WriteFlags};

use std::path::{Path, PathBuf};

use crate::comm::{CommTag, Communicator};
use crate::error::FieldGatherError;
use crate::field::{Component, FieldSource, Part};
use crate::geometry::Region;
use crate::lattice::PeriodicLattice;
use crate::symmetry::SymmetryGroup;

/// One output request: where to sample and how to store it.
///
/// Identical on every process of a collective call. `time_slice: Some(i)`
/// appends the samples as slice `i` along an extra leading dataset axis;
/// successive slices of one run reuse the same file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputRequest {
    /// Region to resample, in continuous simulation coordinates.
    pub region: Region,
    /// Samples per unit length.
    pub resolution: f64,
    /// Target time slice, `None` for a flat dataset.
    pub time_slice: Option<usize>,
    /// Gather several components into one shared file.
    pub append_file: bool,
    /// Store through an `f32` round-trip.
    pub single_precision: bool,
}

impl OutputRequest {
    pub fn new(region: Region, resolution: f64) -> Self {
        OutputRequest {
            region,
            resolution,
            time_slice: None,
            append_file: false,
            single_precision: false,
        }
    }
}

/// Everything an output call reads but does not own: the field, its symmetry
/// and boundary structure, the communicator, and naming state.
pub struct OutputContext<'a, F: ?Sized, C: ?Sized> {
    pub field: &'a F,
    pub symmetry: &'a SymmetryGroup,
    pub lattice: &'a PeriodicLattice,
    pub comm: &'a C,
    /// Directory output files are placed in.
    pub output_dir: PathBuf,
    /// Optional filename prefix; empty behaves like `None`.
    pub prefix: Option<String>,
    /// The field stores no imaginary parts; skip `.i` datasets.
    pub real_fields: bool,
    /// Simulation time stamped into filenames.
    pub time: f64,
}

impl<'a, F, C> OutputContext<'a, F, C>
where
    F: FieldSource + ?Sized,
    C: Communicator + ?Sized,
{
    pub fn new(
        field: &'a F,
        symmetry: &'a SymmetryGroup,
        lattice: &'a PeriodicLattice,
        comm: &'a C,
    ) -> Self {
        OutputContext {
            field,
            symmetry,
            lattice,
            comm,
            output_dir: PathBuf::from("."),
            prefix: None,
            real_fields: false,
            time: 0.0,
        }
    }

    /// The file an [`output_field`] call for `component` writes to:
    /// `<output_dir>/[<prefix>-]<base>[-<time>].h5`, where `base` is
    /// `"fields"` for shared files and the component name otherwise. The
    /// zero-padded time stamp is omitted for sliced requests, which reuse
    /// one file across time.
    pub fn field_path(&self, component: Component, request: &OutputRequest) -> PathBuf {
        let base = if request.append_file {
            "fields"
        } else {
            component.dataset_name()
        };
        let mut name = String::new();
        if let Some(prefix) = self.prefix.as_deref().filter(|p| !p.is_empty()) {
            name.push_str(prefix);
            name.push('-');
        }
        name.push_str(base);
        if request.time_slice.is_none() {
            name.push_str(&format!("-{:09.2}", self.time));
        }
        name.push_str(".h5");
        self.output_dir.join(name)
    }
}

/// Result summary of one dataset write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Grid rank after degenerate directions collapsed.
    pub rank: usize,
    /// Global dataset extent per active direction; empty for a rank-0 grid.
    pub dims: Vec<usize>,
    /// Writes on this process that carried samples.
    pub local_writes: usize,
    /// Zero-sized writes issued to reach the collective count.
    pub padding_writes: usize,
    /// Globally agreed number of writes per process.
    pub collective_writes: u64,
}

/// Stats of a real/imaginary dataset pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentStats {
    pub real: OutputStats,
    /// `None` when only the real dataset was written.
    pub imag: Option<OutputStats>,
}

/// Tags of the two coordinator reductions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputCommTags {
    /// Agrees on the collective write count.
    pub writes: CommTag,
    /// Agrees on the shared sample-buffer volume.
    pub volume: CommTag,
}

impl OutputCommTags {
    pub const fn from_base(base: CommTag) -> Self {
        OutputCommTags {
            writes: base,
            volume: base.offset(1),
        }
    }
}

/// Tag block reserved for [`output_dataset`]'s reductions.
pub const REDUCE_TAGS: OutputCommTags = OutputCommTags::from_base(CommTag::new(0xF1E1));

// A rank-0 grid holds one sample but writers need at least one dimension, so
// it is presented to them as a one-element 1-D dataset.
const SCALAR_DIMS: [usize; 1] = [1];
const SCALAR_START: [usize; 1] = [0];
const SCALAR_COUNT: [usize; 1] = [1];

fn write_flags(first: bool, request: &OutputRequest) -> WriteFlags {
    WriteFlags {
        create_dataset: first && request.time_slice.is_none_or(|i| i == 0),
        append_slice: request.time_slice.is_some(),
        slice_index: request.time_slice.unwrap_or(0),
        append_file: request.append_file,
        single_precision: request.single_precision,
    }
}

/// Samples one component/part over the request region and writes it as
/// `dataset` in `path`, collectively across all processes of `ctx.comm`.
///
/// Every process must call this with identical `request`, `dataset` and grid
/// inputs; local state (chunk ownership) is what may differ. When the
/// reduction finds no contribution on any process, no writer call is made
/// anywhere and the returned stats are all zero.
pub fn output_dataset<F, C, W>(
    ctx: &OutputContext<'_, F, C>,
    writer: &mut W,
    path: &Path,
    dataset: &str,
    component: Component,
    part: Part,
    request: &OutputRequest,
) -> Result<OutputStats, FieldGatherError>
where
    F: FieldSource + ?Sized,
    C: Communicator + ?Sized,
    W: ChunkWriter + ?Sized,
{
    let grid = GridDescriptor::build(&request.region, request.resolution)?;

    let mut local_writes = 0usize;
    let mut max_volume = 0usize;
    scan_contributions(
        ctx.field,
        ctx.symmetry,
        ctx.lattice,
        component,
        part,
        &grid,
        |c| {
            local_writes += 1;
            max_volume = max_volume.max(c.span.volume());
            Ok(())
        },
    )?;

    let (collective_writes, volume) = if ctx.comm.is_no_comm() || ctx.comm.size() <= 1 {
        (local_writes as u64, max_volume)
    } else {
        let writes = ctx.comm.all_reduce_max(REDUCE_TAGS.writes, local_writes as u64)?;
        let volume = ctx.comm.all_reduce_max(REDUCE_TAGS.volume, max_volume as u64)?;
        (writes, volume as usize)
    };

    let mut stats = OutputStats {
        rank: grid.rank(),
        dims: grid.dims().to_vec(),
        local_writes: 0,
        padding_writes: 0,
        collective_writes,
    };
    if collective_writes == 0 {
        log::debug!("dataset `{dataset}`: no contributions on any process, skipping");
        return Ok(stats);
    }

    let dims: &[usize] = if grid.rank() == 0 {
        &SCALAR_DIMS
    } else {
        grid.dims()
    };
    let mut buffer = SampleBuffer::new(volume);
    let mut written = 0usize;

    scan_contributions(
        ctx.field,
        ctx.symmetry,
        ctx.lattice,
        component,
        part,
        &grid,
        |c| {
            let phase = contribution_phase(c.element, c.source, component, ctx.lattice, c.shift);
            let offset = ctx.lattice.shift_vector(c.shift);
            pack_samples(
                ctx.field,
                c.chunk,
                c.element,
                c.source,
                phase,
                part,
                &grid,
                &c.span,
                offset,
                buffer.as_mut_slice(),
            );
            let (start, count): (&[usize], &[usize]) = if c.span.rank() == 0 {
                (&SCALAR_START, &SCALAR_COUNT)
            } else {
                (c.span.start(), c.span.count())
            };
            let flags = write_flags(written == 0, request);
            writer.write_chunk(
                path,
                dataset,
                dims,
                buffer.samples(c.span.volume()),
                start,
                count,
                &flags,
            )?;
            written += 1;
            Ok(())
        },
    )?;
    debug_assert_eq!(written, local_writes, "dry and real passes disagree");
    stats.local_writes = written;

    let zeros = [0usize; 3];
    let pad = &zeros[..dims.len()];
    while (written as u64) < collective_writes {
        let flags = write_flags(written == 0, request);
        writer.write_chunk(path, dataset, dims, &[], pad, pad, &flags)?;
        written += 1;
        stats.padding_writes += 1;
    }

    log::trace!(
        "dataset `{dataset}`: {} data + {} padding writes of {} collective",
        stats.local_writes,
        stats.padding_writes,
        stats.collective_writes
    );
    Ok(stats)
}

/// Writes `component` into `path`, as one dataset or as a `.r`/`.i` pair.
///
/// Complex-valued fields produce `<name>.r` followed by `<name>.i`, the
/// imaginary write always appending so it cannot truncate its own real half.
/// Real fields and material components produce a single `<name>` dataset.
pub fn output_component<F, C, W>(
    ctx: &OutputContext<'_, F, C>,
    writer: &mut W,
    path: &Path,
    component: Component,
    request: &OutputRequest,
) -> Result<ComponentStats, FieldGatherError>
where
    F: FieldSource + ?Sized,
    C: Communicator + ?Sized,
    W: ChunkWriter + ?Sized,
{
    let name = component.dataset_name();
    if ctx.real_fields || component.is_material() {
        let real = output_dataset(ctx, writer, path, name, component, Part::Real, request)?;
        return Ok(ComponentStats { real, imag: None });
    }

    let real_name = format!("{name}{}", Part::Real.dataset_suffix());
    let real = output_dataset(ctx, writer, path, &real_name, component, Part::Real, request)?;

    let mut imag_request = request.clone();
    imag_request.append_file = true;
    let imag_name = format!("{name}{}", Part::Imag.dataset_suffix());
    let imag = output_dataset(
        ctx,
        writer,
        path,
        &imag_name,
        component,
        Part::Imag,
        &imag_request,
    )?;
    Ok(ComponentStats {
        real,
        imag: Some(imag),
    })
}

/// Writes `component` to its derived file path and returns it with the stats.
///
/// # Examples
///
/// ```
/// use field_gather::prelude::*;
///
/// let region = Region::new(Vector::zero(), Vector::new(1.0, 0.0, 0.0));
/// let field = SyntheticField::single_chunk(region, |_, p| {
///     num_complex::Complex64::new(p[Direction::X], 0.0)
/// });
/// let symmetry = SymmetryGroup::trivial();
/// let lattice = PeriodicLattice::aperiodic();
/// let comm = NoComm;
/// let mut ctx = OutputContext::new(&field, &symmetry, &lattice, &comm);
/// ctx.real_fields = true;
///
/// let mut writer = MemoryWriter::new();
/// let request = OutputRequest::new(region, 4.0);
/// let (path, stats) = output_field(&ctx, &mut writer, Component::Ex, &request)?;
///
/// assert_eq!(stats.real.dims, vec![5]);
/// assert_eq!(writer.dataset(&path, "ex").unwrap().values().len(), 5);
/// # Ok::<(), field_gather::error::FieldGatherError>(())
/// ```
pub fn output_field<F, C, W>(
    ctx: &OutputContext<'_, F, C>,
    writer: &mut W,
    component: Component,
    request: &OutputRequest,
) -> Result<(PathBuf, ComponentStats), FieldGatherError>
where
    F: FieldSource + ?Sized,
    C: Communicator + ?Sized,
    W: ChunkWriter + ?Sized,
{
    let path = ctx.field_path(component, request);
    let stats = output_component(ctx, writer, &path, component, request)?;
    Ok((path, stats))
}
