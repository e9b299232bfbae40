//! Snapshot model: one complete point-in-time state, as written to disk.
//!
//! Pure data. Every field has a zero value reachable through `Default`,
//! and every nested struct is `#[serde(default)]`, so a partially
//! populated file still produces a meaningful value for each restore.
//!
//! Top-level sections (player, inventory, quests, world) are default-filled
//! by the codec, not by serde, so the engine can report which ones were
//! missing. See codec.rs.

use crate::types::{ContainerId, Day, ItemId, SchemaVersion, Vec3};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current on-disk schema revision.
/// Bump when the shape of a persisted section changes.
pub const CURRENT_SCHEMA_VERSION: SchemaVersion = 1;

/// An opaque, subsystem-owned fragment. The engine stores and returns it
/// as a unit and never looks inside. `Value::Null` is the zero fragment.
pub type Fragment = Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: SchemaVersion,
    pub build_version:  String,
    pub saved_at:       DateTime<Utc>,
    pub player:         PlayerSnapshot,
    pub inventory:      Vec<InventorySlotSnapshot>,
    pub quests:         Fragment,
    pub world:          WorldSnapshot,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            schema_version: 0,
            build_version:  String::new(),
            saved_at:       DateTime::<Utc>::default(),
            player:         PlayerSnapshot::default(),
            inventory:      Vec::new(),
            quests:         Value::Null,
            world:          WorldSnapshot::default(),
        }
    }
}

/// Zero value: at the origin, zero rotation, null stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSnapshot {
    pub position:       Vec3,
    pub rotation_euler: Vec3,
    pub stats:          Fragment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySlotSnapshot {
    pub slot_index: usize,
    pub item_id:    ItemId,
    pub quantity:   u32,
}

impl InventorySlotSnapshot {
    pub fn new(slot_index: usize, item_id: impl Into<ItemId>, quantity: u32) -> Self {
        Self { slot_index, item_id: item_id.into(), quantity }
    }

    /// Empty id or zero quantity both mean an empty slot.
    pub fn is_empty(&self) -> bool {
        self.item_id.is_empty() || self.quantity == 0
    }
}

/// Zero value: day 0, time 0, no containers, no spawner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub normalized_time:    f64,
    pub current_day:        Day,
    pub container_states:   Vec<ContainerSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boss_spawner_state: Option<Fragment>,
}

/// One container's state. `container_id` is the reconciliation key; the
/// rest of the object belongs to the container and is flattened beside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    #[serde(default)]
    pub container_id: ContainerId,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ContainerSnapshot {
    pub fn new(container_id: impl Into<ContainerId>) -> Self {
        Self { container_id: container_id.into(), payload: Map::new() }
    }

    /// Build a snapshot from a serializable payload struct. A payload that
    /// does not serialize to a JSON object contributes no fields.
    pub fn with_payload<T: Serialize>(container_id: impl Into<ContainerId>, payload: &T) -> Self {
        let payload = match serde_json::to_value(payload) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self { container_id: container_id.into(), payload }
    }

    /// Read the payload back as a typed struct. Fields the payload lacks
    /// take their `#[serde(default)]` values; a payload of the wrong shape
    /// yields `None`.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.payload.clone())).ok()
    }
}

/// The part of a save file `peek` reads without restoring anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub schema_version: SchemaVersion,
    pub build_version:  String,
    pub saved_at:       DateTime<Utc>,
    pub current_day:    Day,
}

impl From<&Snapshot> for SaveHeader {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            schema_version: snapshot.schema_version,
            build_version:  snapshot.build_version.clone(),
            saved_at:       snapshot.saved_at,
            current_day:    snapshot.world.current_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_payload_flattens_beside_id() {
        #[derive(Serialize)]
        struct Payload { opened: bool }

        let snap = ContainerSnapshot::with_payload("chest_01", &Payload { opened: true });
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json, serde_json::json!({ "container_id": "chest_01", "opened": true }));
    }

    #[test]
    fn inventory_slot_without_item_is_empty() {
        assert!(InventorySlotSnapshot::new(1, "", 0).is_empty());
        assert!(InventorySlotSnapshot::new(1, "potion", 0).is_empty());
        assert!(!InventorySlotSnapshot::new(0, "potion", 3).is_empty());
    }

    #[test]
    fn world_zero_value_omits_spawner() {
        let json = serde_json::to_value(WorldSnapshot::default()).unwrap();
        assert!(json.get("boss_spawner_state").is_none());
        assert_eq!(json["current_day"], 0);
    }
}
