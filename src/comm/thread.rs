//! Multi-rank-in-one-process communicator backed by a static mailbox.
//!
//! `ThreadComm` lets integration tests run the full collective protocol with
//! N ranks as N threads of one process: each rank publishes its contribution
//! into a process-global map and spin-waits for its peers'. Entries are keyed
//! by a per-instance epoch counter, so repeated collectives on the same tag
//! cannot collide as long as every rank issues its collectives in the same
//! order — the same ordering rule MPI imposes.
//!
//! Messages are byte payloads cast from a fixed little-endian wire struct so
//! the transport stays oblivious to what it carries.

use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::{CommTag, Communicator};
use crate::error::FieldGatherError;

/// (epoch, src, dst); the tag travels in the payload so mismatches are
/// detectable rather than a silent deadlock.
type Key = (u64, usize, usize);

static MAILBOX: Lazy<DashMap<Key, Bytes>> = Lazy::new(DashMap::new);

/// Reduction contribution on the wire; little-endian, explicitly padded.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct WireReduce {
    tag_le: u16,
    _pad: [u8; 6],
    value_le: u64,
}

impl WireReduce {
    fn new(tag: CommTag, value: u64) -> Self {
        WireReduce {
            tag_le: tag.as_u16().to_le(),
            _pad: [0; 6],
            value_le: value.to_le(),
        }
    }

    fn tag(&self) -> CommTag {
        CommTag::new(u16::from_le(self.tag_le))
    }

    fn value(&self) -> u64 {
        u64::from_le(self.value_le)
    }
}

const _: () = assert!(std::mem::size_of::<WireReduce>() == 16);

/// One rank of an N-rank collective running inside a single process.
///
/// Every rank must run on its own thread with its own `ThreadComm`; ranks
/// sharing an instance would share the epoch counter and desynchronize.
#[derive(Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    epoch: AtomicU64,
}

impl ThreadComm {
    /// # Panics
    ///
    /// Panics unless `rank < size` and `size > 0`.
    pub fn new(rank: usize, size: usize) -> Self {
        assert!(size > 0, "communicator needs at least one rank");
        assert!(rank < size, "rank {rank} out of range for size {size}");
        ThreadComm {
            rank,
            size,
            epoch: AtomicU64::new(0),
        }
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_max(&self, tag: CommTag, value: u64) -> Result<u64, FieldGatherError> {
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed);
        if self.size == 1 {
            return Ok(value);
        }

        let wire = WireReduce::new(tag, value);
        let payload = Bytes::copy_from_slice(bytemuck::bytes_of(&wire));
        for peer in 0..self.size {
            if peer != self.rank {
                MAILBOX.insert((epoch, self.rank, peer), payload.clone());
            }
        }

        // Each entry is consumed exactly once by its addressee; withdrawing
        // an outbound entry or skipping an inbound one would strand a peer
        // in its receive loop. A mismatch therefore still drains every peer
        // and only then reports the first foreign tag it saw.
        let mut max = value;
        let mut foreign: Option<CommTag> = None;
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            let key = (epoch, peer, self.rank);
            let bytes = loop {
                if let Some((_, bytes)) = MAILBOX.remove(&key) {
                    break bytes;
                }
                std::thread::yield_now();
            };
            let peer_wire: WireReduce = bytemuck::pod_read_unaligned(&bytes);
            if peer_wire.tag() != tag {
                foreign.get_or_insert(peer_wire.tag());
                continue;
            }
            max = max.max(peer_wire.value());
        }
        if let Some(found) = foreign {
            return Err(FieldGatherError::CollectiveMismatch {
                epoch,
                expected: tag,
                found,
            });
        }
        Ok(max)
    }
}
