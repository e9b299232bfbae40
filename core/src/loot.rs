//! Loot tables: construction-time contents for world containers.
//!
//! Rolling happens once, when the world is built. The result is the
//! container's default state; a load only ever overwrites it.

use crate::{rng::LootRng, types::ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: ItemId,
    pub weight:  u32,
    pub min_qty: u32,
    pub max_qty: u32,
    #[serde(default = "always")]
    pub drop_chance: f64,
}

fn always() -> f64 { 1.0 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub table_id:  String,
    pub rolls_min: u32,
    pub rolls_max: u32,
    pub entries:   Vec<LootEntry>,
}

/// A rolled stack of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id:  ItemId,
    pub quantity: u32,
}

impl LootTable {
    /// Roll this table. Repeated picks of the same item merge into one
    /// stack; stacks come out in first-picked order.
    pub fn roll(&self, rng: &mut LootRng) -> Vec<ItemStack> {
        let total_weight: u64 = self.entries.iter().map(|e| u64::from(e.weight)).sum();
        if total_weight == 0 {
            return Vec::new();
        }

        let rolls = rng.range_inclusive(self.rolls_min, self.rolls_max);
        let mut stacks: Vec<ItemStack> = Vec::new();
        for _ in 0..rolls {
            let Some(entry) = self.pick(rng.next_u64_below(total_weight)) else { continue };
            if !rng.chance(entry.drop_chance) {
                continue;
            }
            let qty = rng.range_inclusive(entry.min_qty, entry.max_qty);
            if qty == 0 {
                continue;
            }
            match stacks.iter_mut().find(|s| s.item_id == entry.item_id) {
                Some(stack) => stack.quantity = stack.quantity.saturating_add(qty),
                None => stacks.push(ItemStack { item_id: entry.item_id.clone(), quantity: qty }),
            }
        }
        stacks
    }

    fn pick(&self, mut ticket: u64) -> Option<&LootEntry> {
        for entry in &self.entries {
            let w = u64::from(entry.weight);
            if ticket < w {
                return Some(entry);
            }
            ticket -= w;
        }
        None
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LootTablesFile {
    tables: Vec<LootTable>,
}

#[derive(Debug, Clone, Default)]
pub struct LootTables {
    tables: HashMap<String, LootTable>,
}

impl LootTables {
    /// Load from `{data_dir}/loot/loot_tables.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/loot/loot_tables.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: LootTablesFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(Self::from_tables(file.tables))
    }

    pub fn from_tables(tables: impl IntoIterator<Item = LootTable>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.table_id.clone(), t)).collect(),
        }
    }

    /// Tables with hardcoded entries for use in tests.
    pub fn default_test() -> Self {
        let entry = |id: &str, weight, min_qty, max_qty| LootEntry {
            item_id: id.into(),
            weight,
            min_qty,
            max_qty,
            drop_chance: 1.0,
        };
        Self::from_tables([
            LootTable {
                table_id: "common_chest".into(),
                rolls_min: 1,
                rolls_max: 3,
                entries: vec![
                    entry("potion", 5, 1, 2),
                    entry("gold_coin", 10, 5, 20),
                    entry("arrow", 4, 4, 12),
                ],
            },
            LootTable {
                table_id: "boss_chest".into(),
                rolls_min: 2,
                rolls_max: 2,
                entries: vec![entry("boss_key", 1, 1, 1), entry("elixir", 1, 1, 3)],
            },
        ])
    }

    pub fn get(&self, table_id: &str) -> Option<&LootTable> {
        self.tables.get(table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_is_deterministic_per_seed_and_key() {
        let tables = LootTables::default_test();
        let table = tables.get("common_chest").unwrap();
        let a = table.roll(&mut LootRng::new(99, "chest_a"));
        let b = table.roll(&mut LootRng::new(99, "chest_a"));
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn roll_merges_repeated_items() {
        let table = LootTable {
            table_id: "only_coins".into(),
            rolls_min: 4,
            rolls_max: 4,
            entries: vec![LootEntry {
                item_id: "gold_coin".into(),
                weight: 1,
                min_qty: 1,
                max_qty: 1,
                drop_chance: 1.0,
            }],
        };
        let stacks = table.roll(&mut LootRng::new(0, "x"));
        assert_eq!(stacks, vec![ItemStack { item_id: "gold_coin".into(), quantity: 4 }]);
    }

    #[test]
    fn zero_weight_table_rolls_nothing() {
        let table = LootTable { table_id: "empty".into(), rolls_min: 3, rolls_max: 3, entries: vec![] };
        assert!(table.roll(&mut LootRng::new(0, "x")).is_empty());
    }
}
