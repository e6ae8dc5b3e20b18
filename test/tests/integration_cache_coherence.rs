//! INTEGRATION TESTS: snapshot reuse and invalidation
//!
//! Scans are counted at the provider, so these tests can tell a cached answer
//! from a fresh one.

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use stockpile_shared::{
    AggregationScope, BackendCategory, BackendId, CacheEvent, ItemRequest, ItemStack, ItemType,
    PeerId, Position,
};
use stockpile_test::{Harness, TestBackend};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wood() -> ItemType {
    ItemType::from("resourceWood")
}

fn stocked_harness() -> (Harness, Arc<TestBackend>) {
    let harness = Harness::new();
    let container = harness
        .provider
        .add(TestBackend::new(1, BackendCategory::Container).with_items(&[("resourceWood", 10)]));
    (harness, container)
}

#[test]
fn queries_within_a_cycle_share_one_scan() {
    init_logging();
    let (harness, _container) = stocked_harness();

    for _ in 0..50 {
        assert_eq!(harness.inventory.count(&wood()), 10);
    }
    harness
        .inventory
        .has(&[ItemRequest::new("resourceWood", 1)], 1)
        .unwrap();

    assert_eq!(harness.provider.scan_count(), 1);
    let stats = harness.inventory.diagnostics().cache;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 50);
}

#[test]
fn same_cycle_reuses_snapshot_even_when_stale_and_moved() {
    init_logging();
    let (harness, _container) = stocked_harness();

    harness.inventory.count(&wood());
    harness.clock.advance(Duration::from_secs(5));
    harness
        .inventory
        .set_reference_point(Position::new(100.0, 0.0, 0.0));
    harness.inventory.count(&wood());

    assert_eq!(harness.provider.scan_count(), 1);
}

#[test]
fn fresh_snapshot_survives_next_cycle() {
    init_logging();
    let (harness, _container) = stocked_harness();

    harness.inventory.count(&wood());
    harness.tick(Duration::from_millis(100));
    harness.inventory.count(&wood());

    assert_eq!(harness.provider.scan_count(), 1);
}

#[test]
fn stale_snapshot_is_rebuilt_in_next_cycle() {
    init_logging();
    let (harness, container) = stocked_harness();

    assert_eq!(harness.inventory.count(&wood()), 10);
    container.set_resting_slot(0, Some(ItemStack::new("resourceWood", 7)));

    harness.tick(Duration::from_millis(600));
    assert_eq!(harness.inventory.count(&wood()), 7);
    assert_eq!(harness.provider.scan_count(), 2);
}

#[test]
fn moving_away_forces_rebuild_in_next_cycle() {
    init_logging();
    let (harness, _container) = stocked_harness();

    harness.inventory.count(&wood());
    harness.tick(Duration::from_millis(10));
    harness
        .inventory
        .set_reference_point(Position::new(0.5, 0.0, 0.0));
    harness.inventory.count(&wood());
    assert_eq!(harness.provider.scan_count(), 1);

    harness.tick(Duration::from_millis(10));
    harness
        .inventory
        .set_reference_point(Position::new(5.0, 0.0, 0.0));
    harness.inventory.count(&wood());
    assert_eq!(harness.provider.scan_count(), 2);
}

#[test]
fn backend_events_invalidate_immediately() {
    init_logging();
    let (harness, container) = stocked_harness();
    let id = container.backend_id();

    assert_eq!(harness.inventory.count(&wood()), 10);

    container.set_resting_slot(0, Some(ItemStack::new("resourceWood", 9)));
    harness.inventory.slot_changed(id, 0);
    assert_eq!(harness.inventory.count(&wood()), 9);

    container.open_view();
    harness.inventory.backend_opened(id);
    assert_eq!(harness.inventory.count(&wood()), 9);

    container.set_live_slot(0, Some(ItemStack::new("resourceWood", 2)));
    harness.inventory.slot_changed(id, 0);
    assert_eq!(harness.inventory.count(&wood()), 2);

    container.close_view();
    harness.inventory.backend_closed(id);
    assert_eq!(harness.inventory.count(&wood()), 2);

    assert_eq!(harness.provider.scan_count(), 5);
}

#[test]
fn debit_invalidates_snapshot() {
    init_logging();
    let (harness, _container) = stocked_harness();

    harness.inventory.count(&wood());
    harness
        .inventory
        .debit(&[ItemRequest::new("resourceWood", 4)], 1)
        .unwrap();

    assert_eq!(harness.inventory.count(&wood()), 6);
    assert_eq!(harness.provider.scan_count(), 2);
}

#[test]
fn subscribers_hear_every_invalidation() {
    init_logging();
    let (harness, container) = stocked_harness();
    let events: Arc<Mutex<Vec<CacheEvent>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = events.clone();
    let subscription = harness
        .inventory
        .on_invalidated(move |event| sink.lock().unwrap().push(event.clone()));

    harness.inventory.backend_opened(container.backend_id());
    harness
        .inventory
        .debit(&[ItemRequest::new("resourceWood", 1)], 1)
        .unwrap();
    harness.inventory.peer_joined(PeerId::new(7)).unwrap();
    harness.inventory.invalidate();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            CacheEvent::BackendOpened(BackendId::new(1)),
            CacheEvent::DebitCompleted,
            CacheEvent::ScopeChanged(AggregationScope::LocalOnly),
            CacheEvent::Manual,
        ]
    );

    assert!(harness.inventory.unsubscribe(subscription));
    assert!(!harness.inventory.unsubscribe(subscription));
    harness.inventory.invalidate();
    assert_eq!(events.lock().unwrap().len(), 4);
}

#[test]
fn subscriber_may_query_during_notification() {
    init_logging();
    let (harness, _container) = stocked_harness();
    let harness = Arc::new(harness);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let inner = Arc::downgrade(&harness);
    let sink = seen.clone();
    harness.inventory.on_invalidated(move |_| {
        if let Some(harness) = inner.upgrade() {
            sink.lock().unwrap().push(harness.inventory.count(&wood()));
        }
    });

    harness
        .inventory
        .debit(&[ItemRequest::new("resourceWood", 3)], 1)
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![7]);
}

#[test]
fn concurrent_queries_rebuild_once() {
    init_logging();
    let (harness, _container) = stocked_harness();
    let harness = Arc::new(harness);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let harness = harness.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(harness.inventory.count(&wood()), 10);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(harness.provider.scan_count(), 1);
}
