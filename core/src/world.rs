//! A complete live world built from a layout: every collaborator the save
//! engine talks to, owned in one place, plus the registry of containers
//! discovered at build time.

use crate::{
    clock::DayNightClock,
    config::WorldLayout,
    container::LootContainer,
    engine::SaveTargets,
    inventory::Inventory,
    loot::LootTables,
    player::{PlayerStats, PlayerTransform},
    quest::QuestLog,
    spawner::BossSpawner,
    subsystem::{Container, ContainerRegistry, PlayerBody, WorldClock},
    types::{Day, Vec3},
};
use serde::Serialize;

pub struct GameWorld {
    pub seed:       u64,
    pub player:     PlayerTransform,
    pub stats:      PlayerStats,
    pub inventory:  Inventory,
    pub quests:     QuestLog,
    pub clock:      DayNightClock,
    pub spawner:    Option<BossSpawner>,
    pub containers: ContainerRegistry,
}

impl GameWorld {
    /// Build the world in its construction-time default state. Container
    /// contents are rolled from their loot tables with `seed`.
    pub fn build(layout: &WorldLayout, loot: &LootTables, seed: u64) -> Self {
        let mut containers = ContainerRegistry::new();
        for placement in &layout.containers {
            let container = match loot.get(&placement.loot_table) {
                Some(table) => LootContainer::rolled(placement.container_id.clone(), table, seed),
                None => {
                    log::warn!(
                        "world: container '{}' uses unknown loot table '{}'; built empty",
                        placement.container_id, placement.loot_table
                    );
                    LootContainer::new(placement.container_id.clone(), Vec::new())
                }
            };
            containers.register(Box::new(container));
        }
        log::debug!("world: built with {} containers (seed {seed})", containers.len());

        Self {
            seed,
            player:    PlayerTransform::default(),
            stats:     PlayerStats::new(),
            inventory: Inventory::with_capacity(layout.inventory_slots),
            quests:    QuestLog::new(),
            clock:     DayNightClock::new(layout.day_length_secs),
            spawner:   layout.has_boss_spawner.then(|| BossSpawner::new(layout.boss_respawn_secs)),
            containers,
        }
    }

    /// Borrow every collaborator for one save or load.
    pub fn targets(&mut self) -> SaveTargets<'_> {
        let targets = SaveTargets::new()
            .player(&mut self.player)
            .stats(&mut self.stats)
            .inventory(&mut self.inventory)
            .quests(&mut self.quests)
            .clock(&mut self.clock)
            .containers(&mut self.containers);
        match self.spawner.as_mut() {
            Some(spawner) => targets.spawner(spawner),
            None => targets,
        }
    }

    pub fn container(&self, id: &str) -> Option<&LootContainer> {
        self.containers.get::<LootContainer>(id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut LootContainer> {
        self.containers.get_mut::<LootContainer>(id)
    }

    pub fn summary(&self) -> WorldSummary {
        let (normalized_time, current_day) = self.clock.now();
        WorldSummary {
            current_day,
            normalized_time,
            position:         self.player.position(),
            health:           self.stats.state.health,
            level:            self.stats.state.level,
            occupied_slots:   self.inventory.occupied_count(),
            active_quests:    self.quests.active.len(),
            completed_quests: self.quests.completed.len(),
            boss_defeated:    self.spawner.as_ref().is_some_and(|s| s.state.boss_defeated),
            containers: self
                .containers
                .iter()
                .filter_map(|c| c.as_any().downcast_ref::<LootContainer>())
                .map(|c| ContainerSummary {
                    container_id: c.container_id.clone(),
                    opened:       c.opened,
                    items:        c.items.iter().map(|s| s.quantity).sum(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSummary {
    pub current_day:      Day,
    pub normalized_time:  f64,
    pub position:         Vec3,
    pub health:           f32,
    pub level:            u32,
    pub occupied_slots:   usize,
    pub active_quests:    usize,
    pub completed_quests: usize,
    pub boss_defeated:    bool,
    pub containers:       Vec<ContainerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSummary {
    pub container_id: String,
    pub opened:       bool,
    pub items:        u32,
}
