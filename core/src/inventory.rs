//! Player inventory: a fixed number of ordered slots.

use crate::{
    error::LoadWarning,
    snapshot::InventorySlotSnapshot,
    subsystem::{InventoryStore, RestoreContext},
    types::ItemId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub item_id:  ItemId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Option<Slot>>,
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: vec![None; capacity] }
    }

    pub fn capacity(&self) -> usize { self.slots.len() }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Occupied slots as `(index, slot)` in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Put `quantity` of `item_id` into `index`, replacing what was there.
    /// Zero quantity or an empty id clears the slot. Returns false when
    /// the index is out of range.
    pub fn set_slot(&mut self, index: usize, item_id: &str, quantity: u32) -> bool {
        let Some(slot) = self.slots.get_mut(index) else { return false };
        *slot = if item_id.is_empty() || quantity == 0 {
            None
        } else {
            Some(Slot { item_id: item_id.to_string(), quantity })
        };
        true
    }

    /// Add to the first stack of the same item, else the first empty slot.
    /// Stacks are not capped at the item's max_stack.
    /// Returns false when there is no room.
    pub fn add(&mut self, item_id: &str, quantity: u32) -> bool {
        if let Some(slot) = self.slots.iter_mut().flatten().find(|s| s.item_id == item_id) {
            slot.quantity = slot.quantity.saturating_add(quantity);
            return true;
        }
        match self.slots.iter().position(|s| s.is_none()) {
            Some(index) => self.set_slot(index, item_id, quantity),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

impl InventoryStore for Inventory {
    fn capture_slots(&self) -> Vec<InventorySlotSnapshot> {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot_index, slot)| match slot {
                Some(s) => InventorySlotSnapshot::new(slot_index, s.item_id.clone(), s.quantity),
                None => InventorySlotSnapshot::new(slot_index, "", 0),
            })
            .collect()
    }

    fn restore_slots(&mut self, slots: &[InventorySlotSnapshot], ctx: &mut RestoreContext<'_>) {
        self.clear();
        let capacity = self.capacity();
        for stored in slots {
            if stored.slot_index >= capacity {
                ctx.warn(LoadWarning::SlotOutOfRange { slot_index: stored.slot_index, capacity });
                continue;
            }
            if stored.is_empty() {
                continue;
            }
            let owner = format!("inventory slot {}", stored.slot_index);
            if ctx.resolve(&owner, &stored.item_id).is_none() {
                continue;
            }
            // Restored exactly as captured; live stacks may exceed max_stack.
            self.set_slot(stored.slot_index, &stored.item_id, stored.quantity);
        }
        log::debug!("inventory: restored {} occupied slots", self.occupied_count());
    }
}
