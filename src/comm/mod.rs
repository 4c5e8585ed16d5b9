//! Thin façade over the one collective the output protocol needs.
//!
//! The two-pass output protocol synchronizes processes at exactly one point
//! besides the writer itself: a global maximum reduction over the dry-pass
//! counts. [`Communicator`] exposes that reduction plus rank/size; backends
//! are a serial no-op ([`NoComm`]), a multi-rank-in-one-process mailbox
//! ([`ThreadComm`]) for tests, and native MPI ([`MpiComm`], feature
//! `mpi-support`).
//!
//! All ranks must call `all_reduce_max` with the same tag in the same order;
//! a rank that skips a call deadlocks the others. This mirrors the collective
//! contract of the writer (see [`crate::output`]).

pub mod thread;

#[cfg(feature = "mpi-support")]
pub mod mpi;

pub use thread::ThreadComm;

#[cfg(feature = "mpi-support")]
pub use mpi::MpiComm;

use std::fmt;

use crate::error::FieldGatherError;

/// Distinguishes collective sequences that could otherwise interleave.
///
/// Callers pick disjoint tag ranges per subsystem and derive step tags with
/// [`CommTag::offset`], so two back-to-back collectives never present the
/// same tag to the transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(u16);

impl CommTag {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        CommTag(raw)
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// The tag `n` steps after this one.
    #[inline]
    pub const fn offset(self, n: u16) -> Self {
        CommTag(self.0.wrapping_add(n))
    }
}

impl fmt::Display for CommTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Collective interface between the processes sharing one distributed field.
pub trait Communicator: Send + Sync {
    /// This process's rank, `0..size`.
    fn rank(&self) -> usize;

    /// Number of cooperating processes.
    fn size(&self) -> usize;

    /// Global maximum of `value` across all ranks. Blocking: returns once
    /// every rank has contributed its value for this tag.
    fn all_reduce_max(&self, tag: CommTag, value: u64) -> Result<u64, FieldGatherError>;

    /// Whether this is the serial no-op backend; lets callers skip
    /// collective machinery outright.
    fn is_no_comm(&self) -> bool {
        false
    }
}

/// Compile-time no-op comm for single-process use and serial tests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_max(&self, _tag: CommTag, value: u64) -> Result<u64, FieldGatherError> {
        Ok(value)
    }

    fn is_no_comm(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_comm_reduction_is_identity() {
        let comm = NoComm;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert!(comm.is_no_comm());
        assert_eq!(comm.all_reduce_max(CommTag::new(7), 42).unwrap(), 42);
    }

    #[test]
    fn tags_offset_and_display() {
        let base = CommTag::new(0x0100);
        assert_eq!(base.offset(2), CommTag::new(0x0102));
        assert_eq!(base.as_u16(), 0x0100);
        assert_eq!(base.to_string(), "0x0100");
    }
}
