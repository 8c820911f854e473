//! Property tests for ledger invariants under arbitrary allocate/free sequences.
//!
//! After every operation:
//! - region sizes sum to capacity
//! - regions are disjoint, contiguous and ordered by offset
//! - the used counter equals the sum of allocated region sizes
//! - a failed allocation leaves the ledger unchanged

use kernsim_memory::{CoalescePolicy, Handle, MemoryError, MemoryPool, PoolConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize),
    /// Free the n-th live handle (modulo the number of live handles)
    Free(usize),
    /// Free an arbitrary offset, usually not a handle
    FreeRaw(usize),
}

fn op_strategy(capacity: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..=capacity / 4).prop_map(Op::Alloc),
        3 => any::<usize>().prop_map(Op::Free),
        1 => (0usize..capacity).prop_map(Op::FreeRaw),
    ]
}

fn policy_strategy() -> impl Strategy<Value = CoalescePolicy> {
    prop_oneof![Just(CoalescePolicy::Forward), Just(CoalescePolicy::Bidirectional)]
}

fn assert_partition(pool: &MemoryPool) -> Result<(), TestCaseError> {
    let regions = pool.regions();
    let total: usize = regions.iter().map(|r| r.size()).sum();
    prop_assert_eq!(total, pool.capacity(), "conservation violated");

    for pair in regions.windows(2) {
        prop_assert!(pair[0].offset() < pair[1].offset(), "offsets not increasing");
        prop_assert_eq!(pair[0].end(), pair[1].offset(), "regions overlap or gap");
    }
    prop_assert!(regions.iter().all(|r| r.size() > 0), "zero-size region");

    let allocated: usize = regions
        .iter()
        .filter(|r| r.is_allocated())
        .map(|r| r.size())
        .sum();
    prop_assert_eq!(allocated, pool.used(), "used counter drifted");

    let ratio = pool.fragmentation_ratio();
    prop_assert!((0.0..=1.0).contains(&ratio), "ratio {} out of range", ratio);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn partition_invariants_hold(
        capacity in 1usize..8192,
        policy in policy_strategy(),
        ops in proptest::collection::vec(op_strategy(8192), 1..80),
    ) {
        let config = PoolConfig::performance(capacity).with_coalesce(policy);
        let mut pool = MemoryPool::with_config(config).unwrap();
        let mut live: Vec<Handle> = Vec::new();

        for op in ops {
            match op {
                Op::Alloc(size) => {
                    let before = pool.regions().to_vec();
                    match pool.allocate(size) {
                        Ok(Some(handle)) => live.push(handle),
                        Ok(None) => prop_assert_eq!(size, 0),
                        Err(MemoryError::OutOfMemory { requested, .. }) => {
                            prop_assert_eq!(requested, size);
                            prop_assert_eq!(pool.regions(), before.as_slice());
                        }
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    }
                }
                Op::Free(n) => {
                    if !live.is_empty() {
                        let handle = live.swap_remove(n % live.len());
                        prop_assert!(pool.deallocate(handle).is_some());
                    }
                }
                Op::FreeRaw(offset) => {
                    let handle = Handle::from_offset(offset);
                    if !live.contains(&handle) {
                        let used = pool.used();
                        prop_assert_eq!(pool.deallocate(handle), None);
                        prop_assert_eq!(pool.used(), used);
                    }
                }
            }
            assert_partition(&pool)?;
        }

        for handle in live.drain(..) {
            prop_assert!(pool.deallocate(handle).is_some());
        }
        prop_assert_eq!(pool.used(), 0);
        if policy == CoalescePolicy::Bidirectional {
            prop_assert_eq!(pool.region_count(), 1);
        }
    }

    #[test]
    fn allocating_past_capacity_eventually_fails(
        capacity in 64usize..4096,
        chunk in 1usize..512,
    ) {
        let mut pool = MemoryPool::with_config(PoolConfig::performance(capacity)).unwrap();
        let mut granted = 0usize;
        let mut failed = false;

        // Never more than capacity / chunk + 1 successful allocations.
        for _ in 0..=(capacity / chunk + 1) {
            match pool.allocate(chunk) {
                Ok(_) => granted += 1,
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }

        prop_assert!(failed, "{} allocations of {} fit in {}", granted, chunk, capacity);
        prop_assert!(granted * chunk <= capacity);
    }
}
