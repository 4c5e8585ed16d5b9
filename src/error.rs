//! FieldGatherError: unified error type for field-gather public APIs.
//!
//! Every fallible operation in this crate reports through this enum so that
//! callers driving a collective output sequence can fail the whole call with
//! one error value instead of unwinding.

use std::fmt::Debug;
use thiserror::Error;

use crate::comm::CommTag;
use crate::geometry::Direction;

/// Unified error type for field-gather operations.
#[derive(Debug, Error)]
pub enum FieldGatherError {
    /// Sampling resolution must be a positive, finite number of samples per
    /// unit length.
    #[error("sampling resolution must be positive and finite, got {0}")]
    InvalidResolution(f64),
    /// The requested output region has `min > max` along some axis.
    #[error("output region inverted along {axis}: min {min} > max {max}")]
    InvertedRegion { axis: Direction, min: f64, max: f64 },
    /// The requested output region has a non-finite bound along some axis.
    #[error("output region bounds along {axis} are not finite: min {min}, max {max}")]
    NonFiniteRegion { axis: Direction, min: f64, max: f64 },
    /// `dims`, `start` and `count` passed to a writer disagree in rank.
    #[error(
        "dataset `{dataset}`: dims rank {dims}, start rank {start}, count rank {count} disagree"
    )]
    RankMismatch {
        dataset: String,
        dims: usize,
        start: usize,
        count: usize,
    },
    /// A write referenced a dataset that was never created.
    #[error("dataset `{dataset}` written before it was created")]
    MissingDataset { dataset: String },
    /// A dataset was re-announced with a different global shape.
    #[error("dataset `{dataset}` has dims {existing:?}, write announced {requested:?}")]
    DatasetShapeMismatch {
        dataset: String,
        existing: Vec<usize>,
        requested: Vec<usize>,
    },
    /// A hyperslab does not fit inside the dataset bounds.
    #[error("dataset `{dataset}`: hyperslab start {start:?} count {count:?} exceeds dims {dims:?}")]
    HyperslabOutOfBounds {
        dataset: String,
        start: Vec<usize>,
        count: Vec<usize>,
        dims: Vec<usize>,
    },
    /// The data buffer handed to a write is smaller than the hyperslab volume.
    #[error("dataset `{dataset}`: buffer holds {have} samples, hyperslab needs {need}")]
    ShortWriteBuffer {
        dataset: String,
        have: usize,
        need: usize,
    },
    /// A time slice was written past the end of the recorded slice sequence.
    #[error("dataset `{dataset}`: time slice {slice} leaves a gap, {have} slices recorded")]
    TimeSliceGap {
        dataset: String,
        slice: usize,
        have: usize,
    },
    /// Sliced and unsliced writes were mixed on one dataset.
    #[error("dataset `{dataset}`: time-slice mode differs from the mode it was created with")]
    TimeSliceMismatch { dataset: String },
    /// Two ranks entered the same collective step with different tags.
    #[error("collective step {epoch}: expected tag {expected}, peer published {found}")]
    CollectiveMismatch {
        epoch: u64,
        expected: CommTag,
        found: CommTag,
    },
    /// The communication environment could not be brought up.
    #[error("communicator initialization failed: {0}")]
    CommInit(&'static str),
    /// An underlying writer failed; wraps the backend's own error.
    #[error("writer failed on dataset `{dataset}`: {source}")]
    Writer {
        dataset: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
