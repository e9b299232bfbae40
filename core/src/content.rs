//! Content database: resolves item ids to authored definitions.
//!
//! Restore never fails on an unknown id: the affected entry is dropped and
//! an `UnresolvedItemReference` warning is recorded (see subsystem.rs).

use crate::types::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub item_id:   ItemId,
    pub name:      String,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

fn default_max_stack() -> u32 { 99 }

pub trait ContentDatabase {
    fn resolve(&self, item_id: &str) -> Option<&ItemDefinition>;
}

#[derive(Debug, Clone, Deserialize)]
struct ItemCatalogFile {
    items: Vec<ItemDefinition>,
}

/// JSON-backed content database.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, ItemDefinition>,
}

impl ItemCatalog {
    /// Load from `{data_dir}/items/item_catalog.json`.
    /// In tests, use ItemCatalog::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/items/item_catalog.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: ItemCatalogFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(Self::from_items(file.items))
    }

    pub fn from_items(items: impl IntoIterator<Item = ItemDefinition>) -> Self {
        let mut catalog = Self::default();
        for item in items {
            if catalog.items.contains_key(&item.item_id) {
                log::warn!("item catalog: duplicate definition for '{}'", item.item_id);
            }
            catalog.items.insert(item.item_id.clone(), item);
        }
        catalog
    }

    /// Catalog with hardcoded items for use in tests.
    pub fn default_test() -> Self {
        let item = |id: &str, name: &str, max_stack: u32| ItemDefinition {
            item_id: id.into(),
            name: name.into(),
            max_stack,
        };
        Self::from_items([
            item("potion", "Healing Potion", 10),
            item("elixir", "Stamina Elixir", 5),
            item("gold_coin", "Gold Coin", 999),
            item("iron_sword", "Iron Sword", 1),
            item("arrow", "Arrow", 64),
            item("boss_key", "Warden's Key", 1),
        ])
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

impl ContentDatabase for ItemCatalog {
    fn resolve(&self, item_id: &str) -> Option<&ItemDefinition> {
        self.items.get(item_id)
    }
}
