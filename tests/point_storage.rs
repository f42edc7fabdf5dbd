//! # Point Storage Integration Tests
//!
//! End-to-end tests over the public surface: codec, channel, store and
//! shared handle working together.
//!
//! ## Test Coverage
//!
//! 1. Arena Placement
//!    - Page sharing: n allocations per page, (n+1)-th opens a new page
//!    - Fill-then-overflow on a fixed allocation
//!
//! 2. Morton-Keyed Storage
//!    - Nodes keyed by encoded codes, retrieved by re-encoding
//!    - Ascending code iteration matches Z-order
//!
//! 3. Lockstep Invariant
//!    - Identical key sets and ordinals across X/Y/Z after mixed traffic
//!
//! 4. Budget & Teardown
//!    - Page budget bounds the whole store
//!    - Dispose releases pages; later use fails

use mortonstore::{
    morton, ChannelConfig, NodeState, PointNodeStorage, SharedPointStore, SparseChannel,
    StoreConfig, StoreError,
};

#[test]
fn end_to_end_channel_placement_and_overflow() {
    // allocation_size=10, page_size=20, max_pages=2: A and B land on
    // page 0, C opens page 1, filling A to 10 then one more fails.
    let mut channel = SparseChannel::<f32>::new(ChannelConfig {
        allocation_size: 10,
        page_size: 20,
        max_pages: 2,
        max_keys: 16,
    })
    .unwrap();

    let (a, b, c) = (0xa0, 0xb0, 0xc0);
    channel.add_key(a).unwrap();
    channel.add_key(b).unwrap();
    assert_eq!(channel.allocation(a).unwrap().page(), 0);
    assert_eq!(channel.allocation(b).unwrap().page(), 0);

    channel.add_key(c).unwrap();
    assert_eq!(channel.allocation(c).unwrap().page(), 1);

    channel.append(a, &[1.0; 10]).unwrap();
    assert!(channel.is_full(a).unwrap());
    assert_eq!(channel.slice(a).unwrap().len(), 10);

    let err = channel.append(a, &[2.0]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::CapacityExceeded { remaining: 0, .. })
    ));

    // B and C are untouched by A's traffic.
    assert_eq!(channel.len(b).unwrap(), 0);
    assert_eq!(channel.len(c).unwrap(), 0);
}

#[test]
fn appended_lengths_sum_into_view_length() {
    let mut channel = SparseChannel::<u32>::new(ChannelConfig {
        allocation_size: 16,
        page_size: 64,
        max_pages: 2,
        max_keys: 8,
    })
    .unwrap();

    channel.add_key(1).unwrap();
    let mut total = 0;
    for batch in [3usize, 1, 7, 5] {
        channel.append(1, &vec![0xdead_beef; batch]).unwrap();
        total += batch;
        assert_eq!(channel.slice(1).unwrap().len(), total);
        assert_eq!(channel.len(1).unwrap(), total);
    }
    assert!(channel.is_full(1).unwrap());
}

#[test]
fn morton_coded_nodes_roundtrip_through_store() {
    let mut store = PointNodeStorage::new(StoreConfig {
        max_nodes: 64,
        points_per_node: 8,
        nodes_per_page: 4,
        max_pages: 16,
    })
    .unwrap();

    let cells = [(5u32, 9, 1), (0, 0, 0), (100, 7, 63), (1023, 1023, 1023)];
    for &(x, y, z) in &cells {
        let code = morton::encode64(x, y, z).unwrap();
        store.add_node(code).unwrap();
        store.add_point(code, x as f32, y as f32, z as f32).unwrap();
    }
    assert_eq!(store.node_count(), cells.len());

    for &(x, y, z) in &cells {
        let code = morton::encode64(x, y, z).unwrap();
        assert!(store.contains_node(code));

        let (px, py, pz) = store.node(code).unwrap();
        assert_eq!((px[0], py[0], pz[0]), (x as f32, y as f32, z as f32));

        let decoded = morton::decode64(code);
        assert_eq!(decoded, (x, y, z));
    }

    // Iteration follows ascending code order, which is Z-order.
    let codes: Vec<u64> = store.codes().collect();
    let mut sorted = codes.clone();
    sorted.sort_unstable();
    assert_eq!(codes, sorted);
}

#[test]
fn lockstep_survives_mixed_traffic() {
    let mut store = PointNodeStorage::new(StoreConfig {
        max_nodes: 32,
        points_per_node: 4,
        nodes_per_page: 2,
        max_pages: 16,
    })
    .unwrap();

    for code in [900u64, 3, 512, 77, 1] {
        store.add_node(code).unwrap();
    }
    store.add_data(512, &[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]).unwrap();
    store.add_point(3, 9.0, 8.0, 7.0).unwrap();

    // Failed mutations must not desynchronize the channels.
    assert!(store.add_node(77).is_err());
    assert!(store
        .add_data(512, &[0.0; 3], &[0.0; 3], &[0.0; 3])
        .is_err());
    assert!(store.add_point(4096, 0.0, 0.0, 0.0).is_err());

    let codes: Vec<u64> = store.codes().collect();
    assert_eq!(codes, vec![1, 3, 77, 512, 900]);
    for &code in &codes {
        let (x, y, z) = store.node(code).unwrap();
        assert_eq!(x.len(), y.len());
        assert_eq!(y.len(), z.len());
    }
    assert_eq!(store.node_state(512), NodeState::Partial);
    assert_eq!(store.node_state(3), NodeState::Partial);
    assert_eq!(store.node_state(900), NodeState::Empty);
}

#[test]
fn page_budget_bounds_the_whole_store() {
    let mut store = PointNodeStorage::new(StoreConfig {
        max_nodes: 64,
        points_per_node: 4,
        nodes_per_page: 2,
        max_pages: 2,
    })
    .unwrap();

    // Two nodes per page, two pages per channel.
    for code in 0..4u64 {
        store.add_node(code).unwrap();
    }
    assert_eq!(store.page_count(), 6);
    assert_eq!(store.budget().used(), 6);
    assert_eq!(store.budget().limit(), 6);

    let err = store.add_node(4).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::PageBudgetExhausted { requested: 3, .. })
    ));
    assert_eq!(store.node_count(), 4);
}

#[test]
fn dispose_tears_down_once_and_poisons_clones() {
    let store = SharedPointStore::with_config(StoreConfig {
        max_nodes: 8,
        points_per_node: 4,
        nodes_per_page: 2,
        max_pages: 2,
    })
    .unwrap();
    let worker = store.clone();

    worker.add_node(42).unwrap();
    worker.add_data(42, &[1.0], &[2.0], &[3.0]).unwrap();
    let first = store.with_node(42, |x, y, z| [x[0], y[0], z[0]]).unwrap();
    assert_eq!(first, [1.0, 2.0, 3.0]);

    store.dispose().unwrap();

    for err in [
        worker.add_node(1).unwrap_err(),
        worker.add_point(42, 0.0, 0.0, 0.0).unwrap_err(),
        worker.contains_node(42).unwrap_err(),
        store.dispose().unwrap_err(),
    ] {
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::UseAfterDispose)
        );
    }
}

#[test]
fn populate_then_process_workload() {
    // The intended workload shape: register nodes in arbitrary code
    // order, stream batches in, then read everything back densely.
    let mut store = PointNodeStorage::new(StoreConfig {
        max_nodes: 128,
        points_per_node: 32,
        nodes_per_page: 8,
        max_pages: 16,
    })
    .unwrap();

    let mut expected = Vec::new();
    for i in (0..96u64).rev() {
        let code = i * 0x1000 + 5;
        store.add_node(code).unwrap();
        expected.push(code);
    }
    expected.reverse();

    for (ordinal, &code) in expected.iter().enumerate() {
        let value = ordinal as f32;
        store.add_data(code, &[value; 4], &[value; 4], &[value; 4]).unwrap();
    }

    assert_eq!(store.codes().collect::<Vec<_>>(), expected);
    for (ordinal, &code) in expected.iter().enumerate() {
        let (x, _, _) = store.node(code).unwrap();
        assert_eq!(x, &[ordinal as f32; 4]);
        assert_eq!(store.node_state(code), NodeState::Partial);
    }
}
