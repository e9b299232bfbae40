//! Shared primitive types used across the entire save system.

use serde::{Deserialize, Serialize};

/// Integer schema revision of the on-disk format. Author-controlled.
pub type SchemaVersion = u32;

/// Stable string identifier resolved against the content database.
/// An empty id means "nothing here".
pub type ItemId = String;

/// Stable identifier of a dynamic container. Join key for reconciliation.
pub type ContainerId = String;

/// An in-game day counter.
pub type Day = u32;

/// Three scalars. Used for positions and Euler angles (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
