use std::collections::HashMap;

use crate::types::ItemType;

use super::error::OperationError;

/// One ingredient of a `has` or `debit` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRequest {
    pub item: ItemType,
    pub count: i32,
}

impl ItemRequest {
    pub fn new(item: impl Into<ItemType>, count: i32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    /// `count × multiplier`, rejecting negatives and overflow
    pub fn required(&self, multiplier: i32) -> Result<u64, OperationError> {
        if self.count < 0 {
            return Err(OperationError::InvalidArgument {
                item: self.item.to_string(),
                reason: "negative count",
            });
        }
        if multiplier < 0 {
            return Err(OperationError::InvalidArgument {
                item: self.item.to_string(),
                reason: "negative multiplier",
            });
        }
        u64::try_from(self.count)
            .ok()
            .and_then(|count| count.checked_mul(u64::try_from(multiplier).ok()?))
            .ok_or(OperationError::InvalidArgument {
                item: self.item.to_string(),
                reason: "count overflow",
            })
    }
}

/// Validates every request and merges repeats of the same item, keeping
/// first-seen order
pub fn merged_requirements(
    requests: &[ItemRequest],
    multiplier: i32,
) -> Result<Vec<(ItemType, u64)>, OperationError> {
    let mut order: Vec<ItemType> = Vec::new();
    let mut totals: HashMap<ItemType, u64> = HashMap::new();

    for request in requests {
        let required = request.required(multiplier)?;
        let total = totals.entry(request.item.clone()).or_insert_with(|| {
            order.push(request.item.clone());
            0
        });
        *total = total
            .checked_add(required)
            .ok_or(OperationError::InvalidArgument {
                item: request.item.to_string(),
                reason: "count overflow",
            })?;
    }

    Ok(order
        .into_iter()
        .map(|item| {
            let total = totals.get(&item).copied().unwrap_or(0);
            (item, total)
        })
        .collect())
}
