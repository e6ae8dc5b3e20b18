//! INTEGRATION TESTS: trust handshake and gate propagation
//!
//! Any peer that has not acknowledged a compatible protocol version locks
//! the gate, and while locked only local storage is aggregated.

use std::time::Duration;

use stockpile_shared::{
    BackendCategory, BackendScope, GateState, HandshakeError, ItemRequest, ItemType,
    OperationError, PeerId, TrustState, PROTOCOL_VERSION,
};
use stockpile_test::{Harness, TestBackend};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wood() -> ItemType {
    ItemType::from("resourceWood")
}

fn mixed_harness() -> Harness {
    let harness = Harness::new();
    harness.provider.add(
        TestBackend::new(1, BackendCategory::Drone)
            .with_items(&[("resourceWood", 4)])
            .with_scope(BackendScope::Local),
    );
    harness
        .provider
        .add(TestBackend::new(2, BackendCategory::Container).with_items(&[("resourceWood", 10)]));
    harness
}

#[test]
fn single_player_is_unlocked() {
    init_logging();
    let harness = mixed_harness();

    assert_eq!(harness.inventory.gate(), GateState::Unlocked);
    assert_eq!(harness.inventory.count(&wood()), 14);
    assert_eq!(harness.inventory.lock_report().to_string(), "Unlocked");
}

#[test]
fn joining_peer_locks_until_verified() {
    init_logging();
    let harness = mixed_harness();
    let peer = PeerId::new(1);

    assert_eq!(harness.inventory.count(&wood()), 14);

    harness.inventory.peer_joined(peer).unwrap();
    assert_eq!(harness.inventory.gate(), GateState::Locked);
    assert_eq!(harness.inventory.count(&wood()), 4);
    assert_eq!(
        harness.inventory.lock_report().to_string(),
        "Locked: waiting on Peer(1) (Pending)"
    );

    harness
        .inventory
        .peer_acknowledged(peer, PROTOCOL_VERSION)
        .unwrap();
    assert_eq!(harness.inventory.gate(), GateState::Unlocked);
    assert_eq!(harness.inventory.count(&wood()), 14);
}

#[test]
fn locked_debit_only_touches_local_storage() {
    init_logging();
    let harness = mixed_harness();
    harness.inventory.peer_joined(PeerId::new(1)).unwrap();

    let result = harness
        .inventory
        .debit(&[ItemRequest::new("resourceWood", 5)], 1);
    assert_eq!(
        result,
        Err(OperationError::InsufficientStock {
            item: "resourceWood".to_string(),
            required: 5,
            available: 4,
        })
    );

    let receipt = harness
        .inventory
        .debit(&[ItemRequest::new("resourceWood", 3)], 1)
        .unwrap();
    assert_eq!(
        receipt.takes_for(&wood()),
        vec![(BackendCategory::Drone, 3)]
    );
}

#[test]
fn every_peer_must_verify() {
    init_logging();
    let harness = mixed_harness();
    let first = PeerId::new(1);
    let second = PeerId::new(2);

    harness.inventory.peer_joined(first).unwrap();
    harness.inventory.peer_joined(second).unwrap();
    harness
        .inventory
        .peer_acknowledged(first, PROTOCOL_VERSION)
        .unwrap();

    assert_eq!(harness.inventory.gate(), GateState::Locked);
    assert_eq!(
        harness.inventory.lock_report().to_string(),
        "Locked: waiting on Peer(2) (Pending)"
    );

    harness.inventory.peer_left(second).unwrap();
    assert_eq!(harness.inventory.gate(), GateState::Unlocked);
}

#[test]
fn incompatible_version_keeps_peer_pending() {
    init_logging();
    let harness = mixed_harness();
    let peer = PeerId::new(3);
    harness.inventory.peer_joined(peer).unwrap();

    assert_eq!(
        harness.inventory.peer_acknowledged(peer, "stockpile/0"),
        Err(HandshakeError::IncompatibleVersion {
            peer,
            version: "stockpile/0".to_string(),
        })
    );
    assert_eq!(harness.inventory.gate(), GateState::Locked);

    harness
        .inventory
        .peer_acknowledged(peer, PROTOCOL_VERSION)
        .unwrap();
    assert_eq!(harness.inventory.gate(), GateState::Unlocked);
}

#[test]
fn silent_peer_times_out_and_stays_locked() {
    init_logging();
    let harness = mixed_harness();
    let peer = PeerId::new(9);
    harness.inventory.peer_joined(peer).unwrap();

    harness.tick(Duration::from_secs(5));
    assert_eq!(
        harness.inventory.diagnostics().unverified[0].state,
        TrustState::Pending
    );

    harness.tick(Duration::from_secs(5));
    assert_eq!(
        harness.inventory.lock_report().to_string(),
        "Locked: waiting on Peer(9) (TimedOut)"
    );

    assert_eq!(
        harness.inventory.peer_acknowledged(peer, PROTOCOL_VERSION),
        Err(HandshakeError::NotPending {
            peer,
            state: "TimedOut",
        })
    );
    assert_eq!(harness.inventory.gate(), GateState::Locked);

    harness.inventory.peer_left(peer).unwrap();
    assert_eq!(harness.inventory.gate(), GateState::Unlocked);
}

#[test]
fn late_acknowledgement_is_rejected() {
    init_logging();
    let harness = mixed_harness();
    let peer = PeerId::new(4);
    harness.inventory.peer_joined(peer).unwrap();

    // time passes without an update
    harness.clock.advance(Duration::from_secs(11));
    assert!(matches!(
        harness.inventory.peer_acknowledged(peer, PROTOCOL_VERSION),
        Err(HandshakeError::NotPending { .. })
    ));
    assert_eq!(harness.inventory.gate(), GateState::Locked);
}

#[test]
fn peer_events_are_validated() {
    init_logging();
    let harness = mixed_harness();
    let peer = PeerId::new(5);

    assert_eq!(
        harness.inventory.peer_left(peer),
        Err(HandshakeError::UnknownPeer { peer })
    );
    assert_eq!(
        harness.inventory.peer_acknowledged(peer, PROTOCOL_VERSION),
        Err(HandshakeError::UnknownPeer { peer })
    );

    harness.inventory.peer_joined(peer).unwrap();
    assert_eq!(
        harness.inventory.peer_joined(peer),
        Err(HandshakeError::AlreadyJoined { peer })
    );
}

#[test]
fn lock_is_broadcast_immediately_and_unlock_after_early_window() {
    init_logging();
    let harness = mixed_harness();
    let peer = PeerId::new(1);

    harness.inventory.peer_joined(peer).unwrap();
    assert_eq!(harness.transport.sent(), vec![GateState::Locked]);

    harness
        .inventory
        .peer_acknowledged(peer, PROTOCOL_VERSION)
        .unwrap();
    assert_eq!(harness.transport.sent(), vec![GateState::Locked]);
    assert_eq!(harness.inventory.diagnostics().broadcast.deferred, 1);

    harness.tick(Duration::from_millis(400));
    assert_eq!(harness.transport.sent(), vec![GateState::Locked]);

    harness.tick(Duration::from_millis(600));
    assert_eq!(
        harness.transport.sent(),
        vec![GateState::Locked, GateState::Unlocked]
    );
}

#[test]
fn latest_gate_state_wins_inside_early_window() {
    init_logging();
    let harness = mixed_harness();

    harness.inventory.peer_joined(PeerId::new(1)).unwrap();
    harness
        .inventory
        .peer_acknowledged(PeerId::new(1), PROTOCOL_VERSION)
        .unwrap();
    harness.inventory.peer_joined(PeerId::new(2)).unwrap();

    harness.tick(Duration::from_secs(1));
    assert_eq!(
        harness.transport.sent(),
        vec![GateState::Locked, GateState::Locked]
    );
}

#[test]
fn transport_failures_never_reach_the_caller() {
    init_logging();
    let harness = mixed_harness();
    harness.transport.fail(true);

    harness.inventory.peer_joined(PeerId::new(1)).unwrap();
    harness.tick(Duration::from_millis(100));
    harness.tick(Duration::from_millis(100));
    harness.tick(Duration::from_millis(100));

    let broadcast = harness.inventory.diagnostics().broadcast;
    assert_eq!(broadcast.failures, 4);
    assert_eq!(broadcast.sent, 0);
    assert!(harness.transport.sent().is_empty());

    harness.transport.fail(false);
    harness.tick(Duration::from_millis(100));
    assert_eq!(harness.transport.sent(), vec![GateState::Locked]);
    assert_eq!(harness.transport.attempts(), 5);
}

#[test]
fn panicking_transport_is_contained() {
    init_logging();
    let harness = mixed_harness();
    harness.transport.panic(true);

    harness.inventory.peer_joined(PeerId::new(1)).unwrap();
    assert_eq!(harness.inventory.gate(), GateState::Locked);
    assert_eq!(harness.inventory.diagnostics().broadcast.failures, 1);

    harness.transport.panic(false);
    harness.tick(Duration::from_millis(10));
    assert_eq!(harness.transport.sent(), vec![GateState::Locked]);
}

#[test]
fn last_broadcast_matches_gate_after_concurrent_peer_churn() {
    init_logging();
    let harness = mixed_harness();

    std::thread::scope(|scope| {
        for worker in 0..4u64 {
            let inventory = &harness.inventory;
            scope.spawn(move || {
                for round in 0..25u64 {
                    let peer = PeerId::new(worker * 100 + round);
                    inventory.peer_joined(peer).unwrap();
                    if round % 2 == 0 {
                        inventory.peer_acknowledged(peer, PROTOCOL_VERSION).unwrap();
                    }
                    inventory.peer_left(peer).unwrap();
                }
            });
        }
    });
    harness.inventory.peer_joined(PeerId::new(1_000)).unwrap();

    harness.tick(Duration::from_secs(2));
    let sent = harness.transport.sent();
    assert_eq!(sent.last(), Some(&harness.inventory.gate()));
    assert_eq!(harness.inventory.gate(), GateState::Locked);
    assert_eq!(harness.inventory.diagnostics().broadcast.sent, sent.len() as u64);
}
