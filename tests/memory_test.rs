/*!
 * Memory Tests
 * Admission invariants over arbitrary allocation sequences
 */

use os_sim_kernel::{MemoryManager, Process, ProcessSet, ProcessState};
use proptest::prelude::*;

const CEILING: u64 = 1000;

fn set_of(n: u32) -> ProcessSet {
    let mut set = ProcessSet::new();
    for pid in 0..n {
        let mut p = Process::new(pid, 0, 1);
        p.state = ProcessState::Ready;
        set.push(p);
    }
    set
}

#[test]
fn test_grants_accumulate_per_process() {
    let manager = MemoryManager::new(CEILING);
    let mut set = set_of(2);

    assert!(manager.allocate(&mut set, 0, 0, 100));
    assert!(manager.allocate(&mut set, 0, 300, 100));
    assert!(manager.allocate(&mut set, 1, 600, 100));

    assert_eq!(set.get(0).blocks.len(), 2);
    assert_eq!(set.get(1).blocks.len(), 1);

    // Each process may access only its own grants
    assert!(manager.access(set.get(0), 310, 50));
    assert!(!manager.access(set.get(1), 310, 50));
}

#[test]
fn test_denial_leaves_prior_grants_intact() {
    let manager = MemoryManager::new(CEILING);
    let mut set = set_of(1);

    assert!(manager.allocate(&mut set, 0, 0, 100));
    assert!(!manager.allocate(&mut set, 0, 50, 10));
    assert_eq!(set.get(0).blocks.len(), 1);
    assert!(manager.access(set.get(0), 0, 100));
}

proptest! {
    /// No sequence of requests can produce overlapping grants or a
    /// grant past the ceiling, across all processes.
    #[test]
    fn prop_granted_blocks_never_overlap(
        requests in prop::collection::vec(
            (0u32..3, 0u64..1200, 1u64..200),
            1..40,
        )
    ) {
        let manager = MemoryManager::new(CEILING);
        let mut set = set_of(3);

        for (pid, offset, size) in requests {
            manager.allocate(&mut set, pid, offset, size);
        }

        let blocks: Vec<_> = set.iter().flat_map(|p| p.blocks.iter()).collect();
        for block in &blocks {
            prop_assert!(block.upper <= CEILING);
            prop_assert!(block.lower < block.upper);
        }
        for (i, a) in blocks.iter().enumerate() {
            for b in blocks.iter().skip(i + 1) {
                // Closed-interval disjointness: not even touching bounds
                prop_assert!(a.upper < b.lower || b.upper < a.lower);
            }
        }
    }

    /// An admitted access is always covered by a prior grant of the
    /// same process.
    #[test]
    fn prop_access_implies_containing_grant(
        grants in prop::collection::vec((0u64..900, 1u64..100), 1..10),
        probe_offset in 0u64..1000,
        probe_size in 1u64..100,
    ) {
        let manager = MemoryManager::new(CEILING);
        let mut set = set_of(1);
        for (offset, size) in grants {
            manager.allocate(&mut set, 0, offset, size);
        }

        if manager.access(set.get(0), probe_offset, probe_size) {
            let covered = set.get(0).blocks.iter().any(|b| {
                probe_offset >= b.lower && probe_offset + probe_size <= b.upper
            });
            prop_assert!(covered);
        }
    }
}
