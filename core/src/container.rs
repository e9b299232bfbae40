//! Loot containers: chests and crates. Discovered when the world
//! is built and registered with a ContainerRegistry.

use crate::{
    loot::{ItemStack, LootTable},
    rng::LootRng,
    snapshot::ContainerSnapshot,
    subsystem::{Container, RestoreContext},
    types::ContainerId,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// What a container persists beside its id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerPayload {
    pub opened: bool,
    pub items:  Vec<ItemStack>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootContainer {
    pub container_id: ContainerId,
    pub opened:       bool,
    pub items:        Vec<ItemStack>,
    /// An opened container that has been emptied is switched off in the
    /// world (no prompt, no collider).
    pub enabled:      bool,
}

impl LootContainer {
    pub fn new(container_id: impl Into<ContainerId>, items: Vec<ItemStack>) -> Self {
        Self { container_id: container_id.into(), opened: false, items, enabled: true }
    }

    /// Build with contents rolled from `table`. Same seed and id give the
    /// same contents.
    pub fn rolled(container_id: impl Into<ContainerId>, table: &LootTable, world_seed: u64) -> Self {
        let container_id = container_id.into();
        let mut rng = LootRng::new(world_seed, &container_id);
        let items = table.roll(&mut rng);
        Self::new(container_id, items)
    }

    pub fn open(&mut self) {
        self.opened = true;
        self.refresh_enabled();
    }

    /// Take everything out. Returns the stacks taken.
    pub fn take_all(&mut self) -> Vec<ItemStack> {
        self.opened = true;
        let taken = std::mem::take(&mut self.items);
        self.refresh_enabled();
        taken
    }

    fn refresh_enabled(&mut self) {
        self.enabled = !(self.opened && self.items.is_empty());
    }
}

impl Container for LootContainer {
    fn container_id(&self) -> &str { &self.container_id }

    fn capture_state(&self) -> ContainerSnapshot {
        ContainerSnapshot::with_payload(
            self.container_id.clone(),
            &ContainerPayload { opened: self.opened, items: self.items.clone() },
        )
    }

    fn restore_state(&mut self, snapshot: &ContainerSnapshot, ctx: &mut RestoreContext<'_>) {
        let payload = snapshot.payload_as::<ContainerPayload>().unwrap_or_else(|| {
            log::warn!("container '{}': unreadable payload; treating as empty", self.container_id);
            ContainerPayload::default()
        });
        let owner = format!("container '{}'", self.container_id);
        let mut items = Vec::with_capacity(payload.items.len());
        for stack in payload.items {
            if stack.quantity == 0 || stack.item_id.is_empty() {
                continue;
            }
            if ctx.resolve(&owner, &stack.item_id).is_none() {
                continue;
            }
            items.push(stack);
        }
        self.opened = payload.opened;
        self.items = items;
        self.refresh_enabled();
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}
