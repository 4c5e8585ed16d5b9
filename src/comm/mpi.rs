//! MPI-backed communicator (feature `mpi-support`).

use mpi::collective::{CommunicatorCollectives as _, SystemOperation};
use mpi::environment::Universe;
use mpi::topology::{Communicator as _, SimpleCommunicator};

use crate::comm::{CommTag, Communicator};
use crate::error::FieldGatherError;

/// [`Communicator`] backed by an MPI world communicator.
///
/// Construct one per process with [`MpiComm::init`], or wrap a world handle
/// obtained elsewhere with [`MpiComm::from_world`]. The [`Universe`] returned
/// by `init` finalizes MPI when dropped, so it must outlive the communicator.
pub struct MpiComm {
    world: SimpleCommunicator,
}

impl MpiComm {
    /// Initializes the MPI runtime and wraps the world communicator.
    ///
    /// MPI permits exactly one initialization per process; a second call
    /// fails with [`FieldGatherError::CommInit`].
    pub fn init() -> Result<(Universe, Self), FieldGatherError> {
        let universe = mpi::initialize()
            .ok_or(FieldGatherError::CommInit("MPI runtime already initialized"))?;
        let world = universe.world();
        Ok((universe, Self { world }))
    }

    /// Wraps a world communicator from an already-initialized runtime.
    pub fn from_world(world: SimpleCommunicator) -> Self {
        Self { world }
    }
}

// One communicator per process, driven from one thread at a time; the raw
// MPI handle is never mutated through a shared reference.
unsafe impl Send for MpiComm {}
unsafe impl Sync for MpiComm {}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn all_reduce_max(&self, _tag: CommTag, value: u64) -> Result<u64, FieldGatherError> {
        // MPI matches collectives by call order, not by tag; every rank must
        // issue its reductions in the same sequence.
        let mut out = 0u64;
        self.world
            .all_reduce_into(&value, &mut out, SystemOperation::max());
        Ok(out)
    }
}
