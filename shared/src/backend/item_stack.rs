use crate::types::ItemType;

/// The contents of one occupied slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub item: ItemType,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<ItemType>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// A backend's slot array; `None` is an empty slot
pub type Slots = Vec<Option<ItemStack>>;
