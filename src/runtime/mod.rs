//! Distributed-execution seam.
//!
//! Interpolation setup and execution only touch distribution through this
//! trait, so a single-process build runs against [`SerialRuntime`] and an MPI
//! build can slot in a communicator-backed implementation without touching
//! the numerics.

use crate::data::Field;

/// Rank/size queries, synchronization and halo exchange.
pub trait Runtime: Send + Sync {
    /// This process's rank in `0..size()`.
    fn rank(&self) -> usize;
    /// Number of participating processes.
    fn size(&self) -> usize;
    /// Block until every process has reached the same barrier.
    fn barrier(&self);
    /// Bring the field's halo points up to date and clear its dirty flag.
    fn halo_exchange(&self, field: &mut Field);
}

/// Single-process runtime. Barriers and halo exchanges are no-ops apart from
/// clearing the dirty flag; there are no remote halos to fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialRuntime;

impl Runtime for SerialRuntime {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}

    fn halo_exchange(&self, field: &mut Field) {
        field.set_dirty(false);
    }
}
