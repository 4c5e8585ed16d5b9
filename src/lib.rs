#![cfg_attr(docsrs, feature(doc_cfg))]
//! # field-gather
//!
//! field-gather is the collective output subsystem of a distributed field
//! simulator: it resamples field components stored in per-process chunks onto
//! uniform rectangular grids and writes them through a chunked-array backend,
//! with every process issuing the same globally agreed number of writer calls.
//! Symmetry-reduced and periodic computational cells are expanded on the fly,
//! so the written grid always covers the full requested region.
//!
//! ## Features
//! - Grid descriptors that collapse degenerate directions and agree across
//!   processes by construction
//! - Contribution scans over chunk ownership, symmetry images and periodic
//!   images, with Bloch phases applied per lattice shift
//! - A two-pass collective write protocol with zero-sized padding writes, so
//!   chunked-array backends can treat every call as collective
//! - Pluggable communication backends (serial, in-process threads, MPI) and a
//!   pluggable writer seam with an in-memory reference implementation
//!
//! ## Determinism
//!
//! Output is bit-reproducible: contributions are enumerated in a fixed order,
//! rounding happens at one shared site, and randomized tests use `SmallRng`
//! with fixed seeds.
//!
//! ## Usage
//! Add `field-gather` as a dependency in your `Cargo.toml` and enable
//! features as needed:
//!
//! ```toml
//! [dependencies]
//! field-gather = "0.3.2"
//! # Optional features:
//! # features = ["mpi-support"]
//! ```

pub mod comm;
pub mod error;
pub mod field;
pub mod geometry;
pub mod lattice;
pub mod output;
pub mod symmetry;

pub use error::FieldGatherError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "mpi-support")]
    pub use crate::comm::MpiComm;
    pub use crate::comm::{CommTag, Communicator, NoComm, ThreadComm};
    pub use crate::error::FieldGatherError;
    pub use crate::field::{
        ChunkId, Component, ComponentKind, FieldSource, Part, SyntheticChunk, SyntheticField,
    };
    pub use crate::geometry::{Direction, IntVector, Region, Vector};
    pub use crate::lattice::{PeriodicAxis, PeriodicLattice};
    pub use crate::output::{
        ChunkWriter, ComponentStats, GridDescriptor, GridSpan, MemoryWriter, OutputCommTags,
        OutputContext, OutputRequest, OutputStats, SharedMemoryWriter, WriteFlags,
        output_component, output_dataset, output_field,
    };
    pub use crate::symmetry::{Parity, SymmetryElement, SymmetryGroup};
}
