/*!
 * Memory Management
 * Admission control for allocation and access requests against the
 * shared simulated address space
 *
 * Blocks are never resized, coalesced, or reused; a process's blocks
 * are released together when the process is dropped at teardown.
 */

use crate::core::types::{Address, Pid, Size};
use crate::process::{Process, ProcessSet};
use serde::Serialize;
use tracing::debug;

/// One granted allocation, owned exclusively by a single process
///
/// `upper` is the exclusive end of the range (`lower + size`), kept as
/// a bound so access checks are two comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryBlock {
    pub lower: Address,
    pub upper: Address,
}

impl MemoryBlock {
    #[inline]
    pub const fn new(offset: Address, size: Size) -> Self {
        Self {
            lower: offset,
            upper: offset + size,
        }
    }

    /// Whether `[offset, offset + size)` lies entirely inside this block
    ///
    /// A range whose end overflows the address type fits in no block.
    #[inline(always)]
    pub const fn contains(&self, offset: Address, size: Size) -> bool {
        match offset.checked_add(size) {
            Some(end) => offset >= self.lower && end <= self.upper,
            None => false,
        }
    }

    /// Closed-interval overlap test used for admission
    #[inline(always)]
    pub const fn overlaps(&self, offset: Address, size: Size) -> bool {
        offset <= self.upper && offset + size >= self.lower
    }
}

/// Memory admission checker
///
/// Holds only the configured address ceiling; granted blocks live in
/// their owning process control blocks.
#[derive(Debug, Clone, Copy)]
pub struct MemoryManager {
    ceiling: u64,
}

impl MemoryManager {
    pub const fn new(ceiling: u64) -> Self {
        Self { ceiling }
    }

    /// Check an access request against the process's granted blocks
    ///
    /// Returns true iff the requested range lies entirely within one
    /// existing block of this process.
    pub fn access(&self, process: &Process, offset: Address, size: Size) -> bool {
        process.blocks.iter().any(|b| b.contains(offset, size))
    }

    /// Admit or deny an allocation request
    ///
    /// Admits iff the range fits under the ceiling and does not overlap
    /// any block of ANY process in the set. On success the block is
    /// appended to the requesting process's block list.
    pub fn allocate(
        &self,
        set: &mut ProcessSet,
        pid: Pid,
        offset: Address,
        size: Size,
    ) -> bool {
        if !self.verify(set, offset, size) {
            debug!(pid, offset, size, "memory allocation denied");
            return false;
        }
        set.get_mut(pid).blocks.push(MemoryBlock::new(offset, size));
        debug!(pid, offset, size, "memory allocation granted");
        true
    }

    fn verify(&self, set: &ProcessSet, offset: Address, size: Size) -> bool {
        match offset.checked_add(size) {
            Some(end) if end <= self.ceiling => {}
            _ => return false,
        }
        set.iter()
            .flat_map(|p| p.blocks.iter())
            .all(|b| !b.overlaps(offset, size))
    }
}
