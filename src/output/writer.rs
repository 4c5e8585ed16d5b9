//! The collective array-writer boundary and its in-memory reference
//! implementation.
//!
//! [`ChunkWriter`] is the seam to the on-disk chunked-array backend; this
//! crate never touches a file format directly. [`MemoryWriter`] assembles
//! hyperslabs into in-memory datasets while enforcing the same contract a
//! real backend would (shape agreement, hyperslab bounds, slice ordering),
//! so protocol violations surface as structured errors in tests instead of
//! corrupt files in production.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::Mutex;

use crate::error::FieldGatherError;

/// Per-call flags of the collective write protocol.
///
/// `slice_index` is meaningful only when `append_slice` is set; the pair
/// writes the samples as one time slice along an extra leading dataset axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WriteFlags {
    /// True only on a process's first call of the dataset's lifetime.
    pub create_dataset: bool,
    /// Write into a time-slice sequence instead of a flat dataset.
    pub append_slice: bool,
    /// Which slice this call targets.
    pub slice_index: usize,
    /// Keep other datasets in the file instead of truncating on create.
    pub append_file: bool,
    /// Quantize samples through `f32` before storing.
    pub single_precision: bool,
}

/// Collective chunk-at-a-time dataset writer.
///
/// One output operation makes a globally agreed number of calls on every
/// process, in the same relative order, each carrying the full dataset shape
/// `dims` plus a local `start`/`count` hyperslab. Padding calls have all
/// counts zero and must still be dispatched: backends use them to stay in
/// the collective lockstep.
pub trait ChunkWriter {
    #[allow(clippy::too_many_arguments)]
    fn write_chunk(
        &mut self,
        path: &Path,
        dataset: &str,
        dims: &[usize],
        data: &[f64],
        start: &[usize],
        count: &[usize],
        flags: &WriteFlags,
    ) -> Result<(), FieldGatherError>;
}

/// One assembled dataset held by a [`MemoryWriter`].
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    dims: Vec<usize>,
    sliced: bool,
    slices: Vec<Vec<f64>>,
}

impl Dataset {
    fn new(dims: &[usize], sliced: bool) -> Self {
        let slices = if sliced {
            Vec::new()
        } else {
            vec![vec![0.0; dims.iter().product()]]
        };
        Dataset {
            dims: dims.to_vec(),
            sliced,
            slices,
        }
    }

    /// Global shape, without the implicit time axis of sliced datasets.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn is_sliced(&self) -> bool {
        self.sliced
    }

    /// Recorded time slices; 1 for a flat dataset.
    pub fn num_slices(&self) -> usize {
        self.slices.len()
    }

    /// The first (for flat datasets, the only) slice, row-major.
    pub fn values(&self) -> &[f64] {
        &self.slices[0]
    }

    /// One time slice, row-major.
    pub fn slice(&self, index: usize) -> Option<&[f64]> {
        self.slices.get(index).map(Vec::as_slice)
    }
}

#[derive(Default)]
struct FileEntry {
    datasets: HashMap<String, Dataset>,
}

/// [`ChunkWriter`] that assembles writes in memory and polices the contract.
///
/// Plays the role for `ChunkWriter` that an in-memory reference
/// implementation plays for any storage trait: tests observe exactly the
/// bytes the collective protocol produced, including the effect of
/// single-precision quantization, and every deviation from the documented
/// write contract (mismatched shapes, out-of-bounds hyperslabs, slice gaps)
/// is a structured error.
///
/// Creation semantics mirror a truncating file open: a create call without
/// `append_file` on a file that does not yet hold the dataset drops the
/// file's other datasets first. Create calls for an already-present dataset
/// only re-validate its shape, so every rank of a collective run may carry
/// the create flag on its first call.
#[derive(Default)]
pub struct MemoryWriter {
    files: HashMap<PathBuf, FileEntry>,
    calls: usize,
    data_calls: usize,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total write calls observed, padding included.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Write calls that carried at least one sample.
    pub fn data_calls(&self) -> usize {
        self.data_calls
    }

    /// Whether any file was ever touched.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of all files written, sorted.
    pub fn files(&self) -> Vec<&Path> {
        self.files.keys().map(PathBuf::as_path).sorted().collect()
    }

    /// Dataset names within one file, sorted.
    pub fn dataset_names(&self, path: impl AsRef<Path>) -> Vec<&str> {
        self.files
            .get(path.as_ref())
            .map(|f| f.datasets.keys().map(String::as_str).sorted().collect())
            .unwrap_or_default()
    }

    pub fn dataset(&self, path: impl AsRef<Path>, dataset: &str) -> Option<&Dataset> {
        self.files
            .get(path.as_ref())
            .and_then(|f| f.datasets.get(dataset))
    }
}

impl ChunkWriter for MemoryWriter {
    fn write_chunk(
        &mut self,
        path: &Path,
        dataset: &str,
        dims: &[usize],
        data: &[f64],
        start: &[usize],
        count: &[usize],
        flags: &WriteFlags,
    ) -> Result<(), FieldGatherError> {
        self.calls += 1;
        if dims.len() != start.len() || dims.len() != count.len() {
            return Err(FieldGatherError::RankMismatch {
                dataset: dataset.to_string(),
                dims: dims.len(),
                start: start.len(),
                count: count.len(),
            });
        }

        let ds = if flags.create_dataset {
            let entry = self.files.entry(path.to_path_buf()).or_default();
            if !flags.append_file && !entry.datasets.contains_key(dataset) {
                // a fresh create without append opens the file truncating
                entry.datasets.clear();
            }
            match entry.datasets.entry(dataset.to_string()) {
                Entry::Vacant(v) => v.insert(Dataset::new(dims, flags.append_slice)),
                Entry::Occupied(o) => o.into_mut(),
            }
        } else {
            self.files
                .get_mut(path)
                .and_then(|f| f.datasets.get_mut(dataset))
                .ok_or_else(|| FieldGatherError::MissingDataset {
                    dataset: dataset.to_string(),
                })?
        };

        if ds.dims != dims {
            return Err(FieldGatherError::DatasetShapeMismatch {
                dataset: dataset.to_string(),
                existing: ds.dims.clone(),
                requested: dims.to_vec(),
            });
        }
        if ds.sliced != flags.append_slice {
            return Err(FieldGatherError::TimeSliceMismatch {
                dataset: dataset.to_string(),
            });
        }
        for j in 0..dims.len() {
            if start[j] + count[j] > dims[j] {
                return Err(FieldGatherError::HyperslabOutOfBounds {
                    dataset: dataset.to_string(),
                    start: start.to_vec(),
                    count: count.to_vec(),
                    dims: dims.to_vec(),
                });
            }
        }
        let volume: usize = count.iter().product();
        if data.len() < volume {
            return Err(FieldGatherError::ShortWriteBuffer {
                dataset: dataset.to_string(),
                have: data.len(),
                need: volume,
            });
        }

        // Padding calls may precede a rank's real writes, so a zero-count
        // call still creates the dataset and extends the slice sequence; it
        // just moves no samples.
        let target = if ds.sliced {
            let index = flags.slice_index;
            match index.cmp(&ds.slices.len()) {
                std::cmp::Ordering::Less => &mut ds.slices[index],
                std::cmp::Ordering::Equal => {
                    ds.slices.push(vec![0.0; ds.dims.iter().product()]);
                    ds.slices.last_mut().unwrap()
                }
                std::cmp::Ordering::Greater => {
                    return Err(FieldGatherError::TimeSliceGap {
                        dataset: dataset.to_string(),
                        slice: index,
                        have: ds.slices.len(),
                    });
                }
            }
        } else {
            &mut ds.slices[0]
        };

        if volume == 0 {
            return Ok(());
        }
        self.data_calls += 1;

        let mut strides = vec![1usize; dims.len()];
        for j in (0..dims.len().saturating_sub(1)).rev() {
            strides[j] = strides[j + 1] * dims[j + 1];
        }
        for (k, &value) in data[..volume].iter().enumerate() {
            let mut rem = k;
            let mut flat = 0;
            for j in (0..count.len()).rev() {
                flat += (start[j] + rem % count[j]) * strides[j];
                rem /= count[j];
            }
            target[flat] = if flags.single_precision {
                value as f32 as f64
            } else {
                value
            };
        }
        Ok(())
    }
}

/// Clonable handle to one [`MemoryWriter`] shared by several ranks.
///
/// Thread-backed parity tests hand each rank a clone; the mutex serializes
/// the calls while the assembled datasets stay a single logical file set.
#[derive(Clone, Default)]
pub struct SharedMemoryWriter {
    inner: Arc<Mutex<MemoryWriter>>,
}

impl SharedMemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the underlying writer for inspection.
    pub fn lock(&self) -> parking_lot::MutexGuard<'_, MemoryWriter> {
        self.inner.lock()
    }
}

impl ChunkWriter for SharedMemoryWriter {
    fn write_chunk(
        &mut self,
        path: &Path,
        dataset: &str,
        dims: &[usize],
        data: &[f64],
        start: &[usize],
        count: &[usize],
        flags: &WriteFlags,
    ) -> Result<(), FieldGatherError> {
        self.inner
            .lock()
            .write_chunk(path, dataset, dims, data, start, count, flags)
    }
}
