//! PROPERTY-BASED TESTS: debit invariants
//!
//! Uses proptest to check, over random backend layouts and requests:
//! 1. Items are conserved: what a receipt reports is exactly what left the
//!    backends
//! 2. A failed debit changes nothing
//! 3. A lower priority backend is only touched once every higher priority
//!    backend is drained of that item

use proptest::prelude::*;
use stockpile_shared::{BackendCategory, ItemRequest, ItemType, PriorityOrder};
use stockpile_test::{Harness, TestBackend};

const ITEMS: [&str; 2] = ["resourceWood", "resourceStone"];

fn category_strategy() -> impl Strategy<Value = BackendCategory> {
    prop::sample::select(BackendCategory::ALL.to_vec())
}

// (category, wood, stone) per backend
fn layout_strategy() -> impl Strategy<Value = Vec<(BackendCategory, u32, u32)>> {
    prop::collection::vec((category_strategy(), 0u32..20, 0u32..20), 1..6)
}

fn build(layout: &[(BackendCategory, u32, u32)]) -> (Harness, Vec<std::sync::Arc<TestBackend>>) {
    let harness = Harness::new();
    let backends = layout
        .iter()
        .enumerate()
        .map(|(index, (category, wood, stone))| {
            harness.provider.add(
                TestBackend::new(index as u64 + 1, *category)
                    .with_items(&[(ITEMS[0], *wood), (ITEMS[1], *stone)]),
            )
        })
        .collect();
    (harness, backends)
}

fn total(backends: &[std::sync::Arc<TestBackend>], item: &str) -> u64 {
    backends.iter().map(|backend| backend.resting_count(item)).sum()
}

proptest! {
    #[test]
    fn prop_debit_conserves_items(
        layout in layout_strategy(),
        wood in 0i32..60,
        stone in 0i32..60,
        multiplier in 0i32..3,
    ) {
        let (harness, backends) = build(&layout);
        let before: Vec<u64> = ITEMS.iter().map(|item| total(&backends, item)).collect();

        let result = harness.inventory.debit(
            &[ItemRequest::new(ITEMS[0], wood), ItemRequest::new(ITEMS[1], stone)],
            multiplier,
        );

        let wanted = [wood as u64 * multiplier as u64, stone as u64 * multiplier as u64];
        match result {
            Ok(receipt) => {
                for (index, item) in ITEMS.iter().enumerate() {
                    let item_type = ItemType::from(*item);
                    prop_assert_eq!(receipt.removed(&item_type), wanted[index]);
                    let taken: u64 = receipt.takes_for(&item_type).iter().map(|(_, count)| count).sum();
                    prop_assert_eq!(taken, wanted[index]);
                    prop_assert_eq!(total(&backends, item), before[index] - wanted[index]);
                }
            }
            Err(_) => {
                prop_assert!(before[0] < wanted[0] || before[1] < wanted[1]);
                for (index, item) in ITEMS.iter().enumerate() {
                    prop_assert_eq!(total(&backends, item), before[index]);
                }
            }
        }
    }

    #[test]
    fn prop_debit_drains_in_priority_order(
        layout in layout_strategy(),
        wood in 1i32..40,
    ) {
        let (harness, backends) = build(&layout);
        let order = PriorityOrder::default();
        let item = ItemType::from(ITEMS[0]);

        if let Ok(receipt) = harness.inventory.debit(&[ItemRequest::new(ITEMS[0], wood)], 1) {
            for backend in &backends {
                if backend.resting_count(ITEMS[0]) == 0 {
                    continue;
                }
                // something is left here, so nothing of a later rank was touched
                let rank = order.rank(layout[backend.backend_id().to_u64() as usize - 1].0);
                for take in receipt.takes.iter().filter(|take| take.item == item) {
                    prop_assert!(order.rank(take.category) <= rank);
                }
            }
        }
    }

    #[test]
    fn prop_has_agrees_with_debit(
        layout in layout_strategy(),
        wood in 0i32..40,
        stone in 0i32..40,
    ) {
        let (harness, _backends) = build(&layout);
        let requests = [ItemRequest::new(ITEMS[0], wood), ItemRequest::new(ITEMS[1], stone)];

        let has = harness.inventory.has(&requests, 1).unwrap();
        let debited = harness.inventory.debit(&requests, 1).is_ok();
        prop_assert_eq!(has, debited);
    }
}
