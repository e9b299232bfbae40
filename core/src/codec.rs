//! Snapshot <-> JSON bytes.
//!
//! Decoding is staged so that nothing partial escapes:
//!   1. parse       : bytes must be UTF-8 JSON with an object root,
//!                     otherwise `CorruptData`
//!   2. header      : schema_version / build_version / saved_at, each
//!                     zero-valued when absent
//!   3. default-fill: each top-level section (player, inventory, quests,
//!                     world) is decoded on its own; absent or null means
//!                     zero value, wrong shape means zero value + warning
//!   4. entries:       world fields, inventory slots and container states
//!                     are decoded one by one; a bad entry is dropped with
//!                     a warning and its neighbours survive
//!
//! There is no per-field migration. Older files rely on default-fill;
//! newer files are read best-effort (see schema_status).

use crate::{
    error::{LoadWarning, SaveError, SaveResult},
    snapshot::{InventorySlotSnapshot, PlayerSnapshot, Snapshot, WorldSnapshot, CURRENT_SCHEMA_VERSION},
    types::SchemaVersion,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Top-level sections subject to default-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Player,
    Inventory,
    Quests,
    World,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Player, Section::Inventory, Section::Quests, Section::World];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Player    => "player",
            Section::Inventory => "inventory",
            Section::Quests    => "quests",
            Section::World     => "world",
        }
    }
}

/// How a stored schema version compares to this build's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Current,
    Older { found: SchemaVersion },
    Newer { found: SchemaVersion },
}

pub fn schema_status(found: SchemaVersion) -> SchemaStatus {
    use std::cmp::Ordering::*;
    match found.cmp(&CURRENT_SCHEMA_VERSION) {
        Equal   => SchemaStatus::Current,
        Less    => SchemaStatus::Older { found },
        Greater => SchemaStatus::Newer { found },
    }
}

/// A decoded snapshot plus what default-fill had to do to produce it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub snapshot: Snapshot,
    /// Sections that were absent or null and got their zero value.
    pub filled:   Vec<Section>,
    /// Sections that were present but unreadable.
    pub warnings: Vec<LoadWarning>,
}

pub fn encode(snapshot: &Snapshot, pretty: bool) -> SaveResult<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(snapshot)?
    } else {
        serde_json::to_vec(snapshot)?
    };
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> SaveResult<Decoded> {
    let root = parse_root(bytes)?;

    let mut filled = Vec::new();
    let mut warnings = Vec::new();
    let mut section = |s: Section| -> Option<Value> {
        match root.get(s.key()) {
            None | Some(Value::Null) => {
                filled.push(s);
                None
            }
            Some(v) => Some(v.clone()),
        }
    };
    let player_raw = section(Section::Player);
    let inventory_raw = section(Section::Inventory);
    let quests_raw = section(Section::Quests);
    let world_raw = section(Section::World);

    let player: PlayerSnapshot = decode_section(Section::Player, player_raw, &mut warnings);
    let inventory: Vec<InventorySlotSnapshot> = match inventory_raw {
        Some(raw) => decode_entries(Section::Inventory.key(), raw, &mut warnings),
        None => Vec::new(),
    };
    let world = match world_raw {
        Some(raw) => decode_world(raw, &mut warnings),
        None => WorldSnapshot::default(),
    };
    // Quests are opaque; any JSON value is a valid quest fragment.
    let quests = quests_raw.unwrap_or(Value::Null);

    let snapshot = Snapshot {
        schema_version: header_field(&root, "schema_version"),
        build_version:  header_field(&root, "build_version"),
        saved_at:       header_field::<DateTime<Utc>>(&root, "saved_at"),
        player,
        inventory,
        quests,
        world,
    };

    if !filled.is_empty() {
        log::debug!(
            "codec: default-filled sections {:?}",
            filled.iter().map(Section::key).collect::<Vec<_>>()
        );
    }
    Ok(Decoded { snapshot, filled, warnings })
}

fn parse_root(bytes: &[u8]) -> SaveResult<Map<String, Value>> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| SaveError::CorruptData {
        reason: format!("not valid JSON: {e}"),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SaveError::CorruptData {
            reason: format!("root must be an object, found {}", json_kind(&other)),
        }),
    }
}

fn decode_section<T: DeserializeOwned + Default>(
    section:  Section,
    raw:      Option<Value>,
    warnings: &mut Vec<LoadWarning>,
) -> T {
    let Some(raw) = raw else { return T::default() };
    serde_json::from_value(raw).unwrap_or_else(|e| {
        warnings.push(LoadWarning::SectionMalformed { section: section.key(), reason: e.to_string() });
        T::default()
    })
}

fn decode_world(raw: Value, warnings: &mut Vec<LoadWarning>) -> WorldSnapshot {
    let mut fields = match raw {
        Value::Object(map) => map,
        other => {
            warnings.push(LoadWarning::SectionMalformed {
                section: Section::World.key(),
                reason:  format!("expected an object, found {}", json_kind(&other)),
            });
            return WorldSnapshot::default();
        }
    };
    WorldSnapshot {
        normalized_time:    take_field(&mut fields, "normalized_time", "world.normalized_time", warnings),
        current_day:        take_field(&mut fields, "current_day", "world.current_day", warnings),
        container_states:   match fields.remove("container_states") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => decode_entries("world.container_states", raw, warnings),
        },
        boss_spawner_state: match fields.remove("boss_spawner_state") {
            None | Some(Value::Null) => None,
            Some(state) => Some(state),
        },
    }
}

/// Remove and decode one field. Absent or null is the zero value; wrong
/// shape is the zero value plus a warning against `label`.
fn take_field<T: DeserializeOwned + Default>(
    fields:   &mut Map<String, Value>,
    key:      &str,
    label:    &'static str,
    warnings: &mut Vec<LoadWarning>,
) -> T {
    match fields.remove(key) {
        None | Some(Value::Null) => T::default(),
        Some(raw) => serde_json::from_value(raw).unwrap_or_else(|e| {
            warnings.push(LoadWarning::SectionMalformed { section: label, reason: e.to_string() });
            T::default()
        }),
    }
}

/// Decode a JSON array entry by entry, dropping the unreadable ones.
fn decode_entries<T: DeserializeOwned>(
    section:  &'static str,
    raw:      Value,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<T> {
    let items = match raw {
        Value::Array(items) => items,
        other => {
            warnings.push(LoadWarning::SectionMalformed {
                section,
                reason: format!("expected an array, found {}", json_kind(&other)),
            });
            return Vec::new();
        }
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warnings.push(LoadWarning::EntryMalformed { section, index, reason: e.to_string() });
                None
            }
        })
        .collect()
}

/// Header fields are informational or gate only warnings, so an
/// unreadable one degrades to its zero value with a log line.
fn header_field<T: DeserializeOwned + Default>(root: &Map<String, Value>, key: &str) -> T {
    match root.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            log::warn!("codec: header field '{key}' unreadable ({e}); using default");
            T::default()
        }),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}
