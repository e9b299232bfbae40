//! Capture and restore contracts.
//!
//! RULE: capture() is a pure read. It never mutates the subsystem, never
//! fails, and returns equal fragments when called twice without an
//! intervening state change. A subsystem with nothing to say returns its
//! zero fragment.
//!
//! RULE: restore() accepts any fragment of its type, including the zero
//! fragment, and leaves the subsystem valid. Calling it again with a
//! different fragment is a reset and must not leak the previous state.
//! A subsystem never reaches into another subsystem during restore;
//! ordering is owned by engine.rs.

use crate::{
    content::{ContentDatabase, ItemDefinition},
    error::{LoadWarning, SaveResult},
    snapshot::{ContainerSnapshot, Fragment, InventorySlotSnapshot},
    types::{ContainerId, Day, Vec3},
};
use std::any::Any;

/// Everything a restore call may consult besides its own fragment.
/// Collects the non-fatal warnings raised along the way.
pub struct RestoreContext<'a> {
    content:  &'a dyn ContentDatabase,
    warnings: Vec<LoadWarning>,
}

impl<'a> RestoreContext<'a> {
    pub fn new(content: &'a dyn ContentDatabase) -> Self {
        Self { content, warnings: Vec::new() }
    }

    /// Resolve an item id. On a miss, records an `UnresolvedItemReference`
    /// against `owner` and returns `None`; the caller drops the entry.
    pub fn resolve(&mut self, owner: &str, item_id: &str) -> Option<&'a ItemDefinition> {
        let content: &'a dyn ContentDatabase = self.content;
        let found = content.resolve(item_id);
        if found.is_none() {
            self.warn(LoadWarning::UnresolvedItemReference {
                owner:   owner.to_string(),
                item_id: item_id.to_string(),
            });
        }
        found
    }

    pub fn warn(&mut self, warning: LoadWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[LoadWarning] { &self.warnings }

    pub fn into_warnings(self) -> Vec<LoadWarning> { self.warnings }
}

/// A subsystem whose whole state is one opaque fragment
/// (player stats, quest log, spawner).
pub trait Persistent {
    /// Unique stable name, used in logs and warnings.
    fn name(&self) -> &'static str;

    fn capture(&self) -> Fragment;

    fn restore(&mut self, fragment: &Fragment, ctx: &mut RestoreContext<'_>);
}

/// The player's physical body. Position and orientation are written
/// directly, so the motion controller must be off while they change.
pub trait PlayerBody {
    fn position(&self) -> Vec3;
    fn rotation_euler(&self) -> Vec3;

    fn motion_enabled(&self) -> bool;
    fn set_motion_enabled(&mut self, enabled: bool);

    /// Place the body. Implementations may reject the write while the
    /// motion controller is still enabled.
    fn teleport(&mut self, position: Vec3, rotation_euler: Vec3) -> SaveResult<()>;
}

/// Scoped suspension of a body's motion controller. Disables on
/// construction, restores the prior state on drop, whatever the outcome
/// of the writes made through it.
pub struct MotionSuspended<'a, B: PlayerBody + ?Sized> {
    body:        &'a mut B,
    was_enabled: bool,
}

impl<'a, B: PlayerBody + ?Sized> MotionSuspended<'a, B> {
    pub fn new(body: &'a mut B) -> Self {
        let was_enabled = body.motion_enabled();
        body.set_motion_enabled(false);
        Self { body, was_enabled }
    }

    pub fn teleport(&mut self, position: Vec3, rotation_euler: Vec3) -> SaveResult<()> {
        self.body.teleport(position, rotation_euler)
    }
}

impl<B: PlayerBody + ?Sized> Drop for MotionSuspended<'_, B> {
    fn drop(&mut self) {
        self.body.set_motion_enabled(self.was_enabled);
    }
}

/// An ordered list of item slots.
pub trait InventoryStore {
    /// Every live slot, empty ones included, in slot order.
    fn capture_slots(&self) -> Vec<InventorySlotSnapshot>;

    fn restore_slots(&mut self, slots: &[InventorySlotSnapshot], ctx: &mut RestoreContext<'_>);
}

/// The day/night clock.
pub trait WorldClock {
    /// `(normalized_time, current_day)`.
    fn now(&self) -> (f64, Day);

    fn set(&mut self, day: Day, normalized_time: f64);
}

/// A dynamic world container discovered at world-load time.
pub trait Container {
    fn container_id(&self) -> &str;

    fn capture_state(&self) -> ContainerSnapshot;

    fn restore_state(&mut self, snapshot: &ContainerSnapshot, ctx: &mut RestoreContext<'_>);

    /// For downcasting in tests and tooling only.
    /// Save and load never use these.
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The live containers the host registered for the current world layout.
/// Registration order is capture order.
#[derive(Default)]
pub struct ContainerRegistry {
    containers: Vec<Box<dyn Container>>,
}

impl ContainerRegistry {
    pub fn new() -> Self { Self::default() }

    /// Register a live container. Duplicate ids are a host bug; they are
    /// accepted and logged, and both instances receive the same fragment
    /// on load.
    pub fn register(&mut self, container: Box<dyn Container>) {
        let id = container.container_id();
        if self.containers.iter().any(|c| c.container_id() == id) {
            log::warn!("container registry: duplicate live container id '{id}'");
        }
        self.containers.push(container);
    }

    pub fn len(&self) -> usize { self.containers.len() }

    pub fn is_empty(&self) -> bool { self.containers.is_empty() }

    pub fn ids(&self) -> Vec<ContainerId> {
        self.containers.iter().map(|c| c.container_id().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Container> {
        self.containers.iter().map(|c| c.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Container>> {
        self.containers.iter_mut()
    }

    /// Remove every container with `id`. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.containers.len();
        self.containers.retain(|c| c.container_id() != id);
        before - self.containers.len()
    }

    /// Typed lookup by id. Used by tests and tooling.
    pub fn get<T: Container + 'static>(&self, id: &str) -> Option<&T> {
        self.containers
            .iter()
            .filter(|c| c.container_id() == id)
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Container + 'static>(&mut self, id: &str) -> Option<&mut T> {
        self.containers
            .iter_mut()
            .filter(|c| c.container_id() == id)
            .find_map(|c| c.as_any_mut().downcast_mut::<T>())
    }
}
