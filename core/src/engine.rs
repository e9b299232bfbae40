//! The save engine. Drives capture, encoding, storage and restore.
//!
//! SAVE (fixed order):
//!   1. Precondition check   player transform, stats, inventory present
//!   2. Capture              player -> inventory -> quests -> clock
//!                           -> spawner -> each container
//!   3. Encode               codec.rs
//!   4. Write                store.rs (atomic unless configured otherwise)
//!
//! LOAD (fixed order):
//!   1. Precondition check
//!   2. File check           missing file is NotFound
//!   3. Decode               malformed bytes are CorruptData
//!   4. Schema gate          newer => warning, older => default-fill only
//!   5. Default-fill         codec.rs
//!   6. Restore              player transform + stats -> inventory
//!                           -> quests -> clock -> spawner
//!   7. Reconcile            reconcile.rs
//!
//! RULES:
//!   - Nothing live is mutated before step 6. Every failure before that
//!     leaves the world exactly as it was.
//!   - Steps 6 and 7 always run together; there is no partial apply.
//!   - Save and load take `&mut self`, so they cannot overlap.

use crate::{
    codec::{self, Section, SchemaStatus},
    config::SaveConfig,
    content::ContentDatabase,
    error::{LoadWarning, SaveError, SaveResult},
    event::{EventChannel, Operation, PersistEvent},
    reconcile::{reconcile_containers, ReconcileSummary},
    snapshot::{ContainerSnapshot, PlayerSnapshot, SaveHeader, Snapshot, WorldSnapshot, CURRENT_SCHEMA_VERSION},
    store::{SaveStore, WriteMode},
    subsystem::{
        ContainerRegistry, InventoryStore, MotionSuspended, Persistent, PlayerBody,
        RestoreContext, WorldClock,
    },
    types::SchemaVersion,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::mpsc::Receiver;

/// The live collaborators one save or load runs against.
/// Player transform, stats, and inventory are required; the rest are
/// optional and simply skipped when absent.
#[derive(Default)]
pub struct SaveTargets<'a> {
    pub player:     Option<&'a mut dyn PlayerBody>,
    pub stats:      Option<&'a mut dyn Persistent>,
    pub inventory:  Option<&'a mut dyn InventoryStore>,
    pub quests:     Option<&'a mut dyn Persistent>,
    pub clock:      Option<&'a mut dyn WorldClock>,
    pub spawner:    Option<&'a mut dyn Persistent>,
    pub containers: Option<&'a mut ContainerRegistry>,
}

impl<'a> SaveTargets<'a> {
    pub fn new() -> Self { Self::default() }

    pub fn player(mut self, player: &'a mut dyn PlayerBody) -> Self {
        self.player = Some(player);
        self
    }

    pub fn stats(mut self, stats: &'a mut dyn Persistent) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn inventory(mut self, inventory: &'a mut dyn InventoryStore) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn quests(mut self, quests: &'a mut dyn Persistent) -> Self {
        self.quests = Some(quests);
        self
    }

    pub fn clock(mut self, clock: &'a mut dyn WorldClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn spawner(mut self, spawner: &'a mut dyn Persistent) -> Self {
        self.spawner = Some(spawner);
        self
    }

    pub fn containers(mut self, containers: &'a mut ContainerRegistry) -> Self {
        self.containers = Some(containers);
        self
    }

    fn check_required(&self) -> SaveResult<()> {
        if self.player.is_none() {
            return Err(SaveError::MissingDependency { name: "player transform" });
        }
        if self.stats.is_none() {
            return Err(SaveError::MissingDependency { name: "player stats" });
        }
        if self.inventory.is_none() {
            return Err(SaveError::MissingDependency { name: "inventory" });
        }
        Ok(())
    }
}

/// What a completed save wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub path:           String,
    pub bytes:          usize,
    pub schema_version: SchemaVersion,
    pub saved_at:       DateTime<Utc>,
    pub containers:     usize,
}

/// A decoded, gated, default-filled snapshot that has not touched any
/// live state yet.
#[derive(Debug, Clone)]
pub struct StagedLoad {
    pub snapshot: Snapshot,
    pub schema:   SchemaStatus,
    pub filled:   Vec<Section>,
    pub warnings: Vec<LoadWarning>,
}

/// What a completed load did.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub schema_version:  SchemaVersion,
    pub schema:          SchemaStatus,
    pub filled_sections: Vec<Section>,
    pub warnings:        Vec<LoadWarning>,
    pub containers:      ReconcileSummary,
}

impl LoadReport {
    pub fn schema_newer(&self) -> bool {
        matches!(self.schema, SchemaStatus::Newer { .. })
    }
}

pub struct SaveEngine {
    config:  SaveConfig,
    store:   SaveStore,
    content: Box<dyn ContentDatabase>,
    events:  EventChannel,
}

impl SaveEngine {
    pub fn new(config: SaveConfig, content: impl ContentDatabase + 'static) -> Self {
        Self {
            store: SaveStore::open(&config.save_path),
            config,
            content: Box::new(content),
            events: EventChannel::new(),
        }
    }

    pub fn config(&self) -> &SaveConfig { &self.config }

    pub fn subscribe(&mut self) -> Receiver<PersistEvent> {
        self.events.subscribe()
    }

    pub fn exists(&self) -> bool { self.store.exists() }

    pub fn delete(&self) -> SaveResult<()> {
        self.store.remove()?;
        log::info!("save deleted: {}", self.store.path().display());
        Ok(())
    }

    /// Read just the header fields. Touches no live state.
    pub fn peek(&self) -> SaveResult<SaveHeader> {
        let bytes = self.store.read()?;
        let decoded = codec::decode(&bytes)?;
        Ok(SaveHeader::from(&decoded.snapshot))
    }

    // ── Save ───────────────────────────────────────────────────

    pub fn save(&mut self, targets: &SaveTargets<'_>) -> SaveResult<SaveReceipt> {
        let result = self.write_snapshot(targets);
        match &result {
            Ok(receipt) => {
                log::info!(
                    "saved {} bytes to {} (schema v{}, {} containers)",
                    receipt.bytes, receipt.path, receipt.schema_version, receipt.containers
                );
                self.events.publish(PersistEvent::SaveCompleted {
                    path:           receipt.path.clone(),
                    bytes:          receipt.bytes,
                    schema_version: receipt.schema_version,
                });
            }
            Err(e) => self.publish_failure(Operation::Save, e),
        }
        result
    }

    /// Build a snapshot from live state. Pure read; no file access.
    pub fn capture(&self, targets: &SaveTargets<'_>, saved_at: DateTime<Utc>) -> SaveResult<Snapshot> {
        let player = targets
            .player
            .as_deref()
            .ok_or(SaveError::MissingDependency { name: "player transform" })?;
        let stats = targets
            .stats
            .as_deref()
            .ok_or(SaveError::MissingDependency { name: "player stats" })?;
        let inventory = targets
            .inventory
            .as_deref()
            .ok_or(SaveError::MissingDependency { name: "inventory" })?;

        let player = PlayerSnapshot {
            position:       player.position(),
            rotation_euler: player.rotation_euler(),
            stats:          stats.capture(),
        };
        let inventory = inventory.capture_slots();
        let quests = targets.quests.as_deref().map(|q| q.capture()).unwrap_or(Value::Null);
        let (normalized_time, current_day) =
            targets.clock.as_deref().map(|c| c.now()).unwrap_or((0.0, 0));
        let boss_spawner_state = targets.spawner.as_deref().map(|s| s.capture());
        let container_states: Vec<ContainerSnapshot> = targets
            .containers
            .as_deref()
            .map(|registry| registry.iter().map(|c| c.capture_state()).collect())
            .unwrap_or_default();

        let snapshot = Snapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            build_version:  self.config.build_version.clone(),
            saved_at,
            player,
            inventory,
            quests,
            world: WorldSnapshot {
                normalized_time,
                current_day,
                container_states,
                boss_spawner_state,
            },
        };
        log::debug!(
            "captured: {} inventory slots, {} containers, spawner={}",
            snapshot.inventory.len(),
            snapshot.world.container_states.len(),
            snapshot.world.boss_spawner_state.is_some()
        );
        Ok(snapshot)
    }

    fn write_snapshot(&self, targets: &SaveTargets<'_>) -> SaveResult<SaveReceipt> {
        let snapshot = self.capture(targets, Utc::now())?;
        let bytes = codec::encode(&snapshot, self.config.pretty)?;
        let mode = if self.config.atomic_write { WriteMode::Atomic } else { WriteMode::Direct };
        self.store.write(&bytes, mode)?;
        Ok(SaveReceipt {
            path:           self.store.path().display().to_string(),
            bytes:          bytes.len(),
            schema_version: snapshot.schema_version,
            saved_at:       snapshot.saved_at,
            containers:     snapshot.world.container_states.len(),
        })
    }

    // ── Load ───────────────────────────────────────────────────

    pub fn load(&mut self, targets: &mut SaveTargets<'_>) -> SaveResult<LoadReport> {
        let result = self.try_load(targets);
        if let Err(e) = &result {
            self.publish_failure(Operation::Load, e);
        }
        result
    }

    fn try_load(&mut self, targets: &mut SaveTargets<'_>) -> SaveResult<LoadReport> {
        targets.check_required()?;
        let staged = self.read_snapshot()?;
        self.apply(staged, targets)
    }

    /// File check, decode, schema gate, default-fill. No live mutation.
    pub fn read_snapshot(&self) -> SaveResult<StagedLoad> {
        let bytes = self.store.read()?;
        let decoded = codec::decode(&bytes)?;
        let mut warnings = decoded.warnings;
        for w in &warnings {
            log::warn!("{w}");
        }

        let found = decoded.snapshot.schema_version;
        let schema = codec::schema_status(found);
        match schema {
            SchemaStatus::Current => {}
            SchemaStatus::Older { found } => log::info!(
                "save schema v{found} is older than v{CURRENT_SCHEMA_VERSION}; missing fields take zero values"
            ),
            SchemaStatus::Newer { found } => {
                let w = LoadWarning::SchemaNewer { found, supported: CURRENT_SCHEMA_VERSION };
                log::warn!("{w}");
                warnings.push(w);
            }
        }

        Ok(StagedLoad { snapshot: decoded.snapshot, schema, filled: decoded.filled, warnings })
    }

    /// Restore every subsystem from a staged snapshot, then reconcile
    /// containers. Runs to completion once it starts mutating.
    pub fn apply(&mut self, staged: StagedLoad, targets: &mut SaveTargets<'_>) -> SaveResult<LoadReport> {
        targets.check_required()?;
        let StagedLoad { snapshot, schema, filled, mut warnings } = staged;

        let mut ctx = RestoreContext::new(self.content.as_ref());

        if let Some(body) = targets.player.as_deref_mut() {
            let mut suspended = MotionSuspended::new(body);
            if let Err(e) = suspended.teleport(snapshot.player.position, snapshot.player.rotation_euler) {
                ctx.warn(LoadWarning::PlayerPlacementRejected { reason: e.to_string() });
            }
        }
        if let Some(stats) = targets.stats.as_deref_mut() {
            stats.restore(&snapshot.player.stats, &mut ctx);
        }
        if let Some(inventory) = targets.inventory.as_deref_mut() {
            inventory.restore_slots(&snapshot.inventory, &mut ctx);
        }
        if let Some(quests) = targets.quests.as_deref_mut() {
            quests.restore(&snapshot.quests, &mut ctx);
        }
        if let Some(clock) = targets.clock.as_deref_mut() {
            clock.set(snapshot.world.current_day, snapshot.world.normalized_time);
        }
        if let Some(spawner) = targets.spawner.as_deref_mut() {
            let fragment = snapshot.world.boss_spawner_state.clone().unwrap_or(Value::Null);
            spawner.restore(&fragment, &mut ctx);
        }

        let stored = &snapshot.world.container_states;
        let containers = match targets.containers.as_deref_mut() {
            Some(registry) => reconcile_containers(stored, registry, &mut ctx),
            None => reconcile_containers(stored, &mut ContainerRegistry::new(), &mut ctx),
        };

        warnings.extend(ctx.into_warnings());
        let report = LoadReport {
            schema_version: snapshot.schema_version,
            schema,
            filled_sections: filled,
            warnings,
            containers,
        };

        log::info!(
            "loaded {} (schema v{}, day {}, {} containers restored, {} warnings)",
            self.store.path().display(),
            report.schema_version,
            snapshot.world.current_day,
            report.containers.restored,
            report.warnings.len()
        );
        for w in &report.warnings {
            self.events.publish(PersistEvent::LoadWarned(w.clone()));
        }
        self.events.publish(PersistEvent::LoadCompleted {
            schema_version:      report.schema_version,
            restored_containers: report.containers.restored,
        });
        Ok(report)
    }

    fn publish_failure(&mut self, operation: Operation, error: &SaveError) {
        log::warn!("{operation:?} failed: {error}");
        self.events.publish(PersistEvent::OperationFailed { operation, reason: error.to_string() });
    }
}
