//! Integration tests for container reconciliation.
//!
//! Stored containers are matched to live ones by id:
//! 1. Order in the file does not matter
//! 2. Live containers with no stored entry keep their built state
//! 3. Stored entries with no live container are dropped quietly
//! 4. Duplicate stored ids resolve last-write-wins
//! 5. A world rebuilt with containers added/removed still loads

use keepsake_core::{
    config::{ContainerPlacement, SaveConfig, WorldLayout},
    container::{ContainerPayload, LootContainer},
    content::ItemCatalog,
    engine::SaveEngine,
    error::LoadWarning,
    loot::{ItemStack, LootTables},
    reconcile::{reconcile_containers, ReconcileSummary},
    snapshot::ContainerSnapshot,
    subsystem::{ContainerRegistry, RestoreContext},
    world::GameWorld,
};
use serde_json::json;
use tempfile::TempDir;

const SEED: u64 = 0xC0FF_EE00;

fn layout(ids: &[&str]) -> WorldLayout {
    WorldLayout {
        containers: ids
            .iter()
            .map(|id| ContainerPlacement { container_id: id.to_string(), loot_table: "common_chest".into() })
            .collect(),
        ..WorldLayout::default_test()
    }
}

fn build(ids: &[&str]) -> GameWorld {
    GameWorld::build(&layout(ids), &LootTables::default_test(), SEED)
}

fn stack(id: &str, quantity: u32) -> ItemStack {
    ItemStack { item_id: id.into(), quantity }
}

fn stored(id: &str, opened: bool, items: Vec<ItemStack>) -> ContainerSnapshot {
    ContainerSnapshot::with_payload(id, &ContainerPayload { opened, items })
}

fn engine_in(dir: &TempDir) -> SaveEngine {
    let path = dir.path().join("slot1.json").display().to_string();
    SaveEngine::new(SaveConfig::default_test().with_path(path), ItemCatalog::default_test())
}

#[test]
fn matches_by_id_not_position() {
    let catalog = ItemCatalog::default_test();
    let mut world = build(&["A", "B", "C"]);
    let b_default = build(&["B"]).container("B").cloned().unwrap();

    let file = vec![
        stored("C", true, vec![stack("arrow", 7)]),
        stored("A", true, vec![]),
    ];
    let mut ctx = RestoreContext::new(&catalog);
    let summary = reconcile_containers(&file, &mut world.containers, &mut ctx);

    assert_eq!(summary, ReconcileSummary { restored: 2, untouched: 1, discarded: 0, duplicates: 0 });
    assert!(ctx.warnings().is_empty());

    let c = world.container("C").unwrap();
    assert!(c.opened);
    assert_eq!(c.items, vec![stack("arrow", 7)]);

    let a = world.container("A").unwrap();
    assert!(a.opened && a.items.is_empty() && !a.enabled);

    assert_eq!(world.container("B").unwrap(), &b_default);
}

#[test]
fn unmatched_stored_entries_are_discarded() {
    let catalog = ItemCatalog::default_test();
    let mut world = build(&["A"]);
    let before = world.container("A").cloned().unwrap();

    let file = vec![stored("Z", true, vec![stack("potion", 1)])];
    let mut ctx = RestoreContext::new(&catalog);
    let summary = reconcile_containers(&file, &mut world.containers, &mut ctx);

    assert_eq!(summary.discarded, 1);
    assert_eq!(summary.untouched, 1);
    assert!(ctx.warnings().is_empty());
    assert_eq!(world.containers.ids(), vec!["A".to_string()]);
    assert_eq!(world.container("A").unwrap(), &before);
}

#[test]
fn duplicate_stored_ids_last_write_wins() {
    let catalog = ItemCatalog::default_test();
    let mut world = build(&["A"]);

    let file = vec![
        stored("A", false, vec![stack("potion", 1)]),
        stored("A", true, vec![stack("potion", 2)]),
    ];
    let mut ctx = RestoreContext::new(&catalog);
    let summary = reconcile_containers(&file, &mut world.containers, &mut ctx);

    assert_eq!(summary.restored, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.discarded, 0);
    let a = world.container("A").unwrap();
    assert!(a.opened);
    assert_eq!(a.items, vec![stack("potion", 2)]);
    assert_eq!(
        ctx.warnings(),
        &[LoadWarning::DuplicateContainer { container_id: "A".into() }]
    );
}

#[test]
fn duplicate_live_ids_both_receive_the_fragment() {
    let catalog = ItemCatalog::default_test();
    let mut registry = ContainerRegistry::new();
    registry.register(Box::new(LootContainer::new("twin", vec![])));
    registry.register(Box::new(LootContainer::new("twin", vec![])));

    let mut ctx = RestoreContext::new(&catalog);
    let summary =
        reconcile_containers(&[stored("twin", true, vec![stack("gold_coin", 9)])], &mut registry, &mut ctx);

    assert_eq!(summary.restored, 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn world_layout_change_between_sessions() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);

    let mut old_world = build(&["A", "B", "C"]);
    old_world.container_mut("A").unwrap().take_all();
    old_world.container_mut("C").unwrap().open();
    engine.save(&old_world.targets()).unwrap();

    // Next build: B removed, D added, order changed.
    let mut new_world = build(&["C", "D", "A"]);
    let d_default = new_world.container("D").cloned().unwrap();
    let report = engine.load(&mut new_world.targets()).unwrap();

    assert_eq!(report.containers, ReconcileSummary { restored: 2, untouched: 1, discarded: 1, duplicates: 0 });
    assert!(new_world.container("A").unwrap().items.is_empty());
    assert!(new_world.container("C").unwrap().opened);
    assert_eq!(new_world.container("C").unwrap().items, old_world.container("C").unwrap().items);
    assert_eq!(new_world.container("D").unwrap(), &d_default);
}

#[test]
fn load_without_registry_discards_every_container() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    let path = dir.path().join("slot1.json");
    std::fs::write(
        &path,
        serde_json::to_vec(&json!({
            "schema_version": 1,
            "world": { "container_states": [
                { "container_id": "A", "opened": true },
                { "container_id": "B", "opened": false, "items": [] }
            ]}
        }))
        .unwrap(),
    )
    .unwrap();

    let mut world = build(&[]);
    let mut targets = keepsake_core::engine::SaveTargets::new()
        .player(&mut world.player)
        .stats(&mut world.stats)
        .inventory(&mut world.inventory);
    let report = engine.load(&mut targets).unwrap();

    assert_eq!(report.containers.discarded, 2);
    assert_eq!(report.containers.restored, 0);
}

#[test]
fn container_payload_with_unknown_item_keeps_the_rest() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    std::fs::write(
        dir.path().join("slot1.json"),
        serde_json::to_vec(&json!({
            "schema_version": 1,
            "world": { "container_states": [{
                "container_id": "A",
                "opened": true,
                "items": [
                    { "item_id": "cut_content", "quantity": 1 },
                    { "item_id": "gold_coin", "quantity": 40 }
                ]
            }]}
        }))
        .unwrap(),
    )
    .unwrap();

    let mut world = build(&["A"]);
    let report = engine.load(&mut world.targets()).unwrap();

    assert_eq!(world.container("A").unwrap().items, vec![stack("gold_coin", 40)]);
    assert!(report.warnings.contains(&LoadWarning::UnresolvedItemReference {
        owner: "container 'A'".into(),
        item_id: "cut_content".into(),
    }));
}

#[test]
fn restoring_twice_reenables_a_looted_container() {
    let catalog = ItemCatalog::default_test();
    let mut world = build(&["A"]);

    let mut ctx = RestoreContext::new(&catalog);
    reconcile_containers(&[stored("A", true, vec![])], &mut world.containers, &mut ctx);
    assert!(!world.container("A").unwrap().enabled);

    reconcile_containers(&[stored("A", false, vec![stack("potion", 1)])], &mut world.containers, &mut ctx);
    let a = world.container("A").unwrap();
    assert!(a.enabled);
    assert!(!a.opened);
    assert_eq!(a.items, vec![stack("potion", 1)]);
}
