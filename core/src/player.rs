//! Player body and player stats.

use crate::{
    error::{SaveError, SaveResult},
    snapshot::Fragment,
    subsystem::{PlayerBody, Persistent, RestoreContext},
    types::Vec3,
};
use serde::{Deserialize, Serialize};

/// Character-controller stand-in. While enabled it owns the body's
/// motion; direct placement has to wait until it is switched off.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionController {
    pub enabled: bool,
    pub velocity: Vec3,
}

impl Default for MotionController {
    fn default() -> Self {
        Self { enabled: true, velocity: Vec3::ZERO }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTransform {
    pub position:       Vec3,
    pub rotation_euler: Vec3,
    pub controller:     MotionController,
    /// Number of successful teleports. Lets tests see that a placement
    /// actually happened.
    pub teleports:      u32,
}

impl PlayerTransform {
    pub fn at(position: Vec3, rotation_euler: Vec3) -> Self {
        Self { position, rotation_euler, ..Self::default() }
    }

    /// Controller-driven movement. Ignored while the controller is off.
    pub fn step(&mut self, dt: f32) {
        if !self.controller.enabled {
            return;
        }
        let v = self.controller.velocity;
        self.position = Vec3::new(
            self.position.x + v.x * dt,
            self.position.y + v.y * dt,
            self.position.z + v.z * dt,
        );
    }
}

impl PlayerBody for PlayerTransform {
    fn position(&self) -> Vec3 { self.position }
    fn rotation_euler(&self) -> Vec3 { self.rotation_euler }

    fn motion_enabled(&self) -> bool { self.controller.enabled }

    fn set_motion_enabled(&mut self, enabled: bool) {
        self.controller.enabled = enabled;
        if !enabled {
            self.controller.velocity = Vec3::ZERO;
        }
    }

    fn teleport(&mut self, position: Vec3, rotation_euler: Vec3) -> SaveResult<()> {
        if self.controller.enabled {
            return Err(SaveError::PlacementRejected {
                reason: "motion controller is still enabled".into(),
            });
        }
        if !position.is_finite() || !rotation_euler.is_finite() {
            return Err(SaveError::PlacementRejected {
                reason: "non-finite transform".into(),
            });
        }
        self.position = position;
        self.rotation_euler = rotation_euler;
        self.teleports += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsState {
    pub health:     f32,
    pub max_health: f32,
    pub stamina:    f32,
    pub level:      u32,
    pub experience: u64,
}

impl Default for StatsState {
    fn default() -> Self {
        Self { health: 100.0, max_health: 100.0, stamina: 100.0, level: 1, experience: 0 }
    }
}

impl StatsState {
    /// Clamp into range: 0 <= health <= max_health, level >= 1.
    /// Zero health is a real state (downed) and survives restore.
    fn sanitized(mut self) -> Self {
        if !self.max_health.is_finite() || self.max_health <= 0.0 {
            self.max_health = StatsState::default().max_health;
        }
        if !self.health.is_finite() {
            // Unreadable, same as a missing field.
            self.health = self.max_health;
        }
        self.health = self.health.clamp(0.0, self.max_health);
        if !self.stamina.is_finite() {
            self.stamina = 0.0;
        }
        self.stamina = self.stamina.clamp(0.0, 100.0);
        self.level = self.level.max(1);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    pub state: StatsState,
}

impl PlayerStats {
    pub fn new() -> Self { Self::default() }

    pub fn take_damage(&mut self, amount: f32) {
        self.state.health = (self.state.health - amount).max(0.0);
    }

    pub fn gain_experience(&mut self, xp: u64) {
        self.state.experience += xp;
        while self.state.experience >= self.xp_for_next_level() {
            self.state.level += 1;
        }
    }

    fn xp_for_next_level(&self) -> u64 {
        u64::from(self.state.level) * 100
    }
}

impl Persistent for PlayerStats {
    fn name(&self) -> &'static str { "player_stats" }

    fn capture(&self) -> Fragment {
        serde_json::to_value(&self.state).unwrap_or_default()
    }

    fn restore(&mut self, fragment: &Fragment, _ctx: &mut RestoreContext<'_>) {
        let state = match fragment {
            Fragment::Null => StatsState::default(),
            other => serde_json::from_value::<StatsState>(other.clone()).unwrap_or_else(|e| {
                log::warn!("player_stats: unreadable fragment ({e}); resetting");
                StatsState::default()
            }),
        };
        self.state = state.sanitized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ItemCatalog;

    #[test]
    fn teleport_rejected_while_controller_enabled() {
        let mut body = PlayerTransform::default();
        let err = body.teleport(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap_err();
        assert!(matches!(err, SaveError::PlacementRejected { .. }));
        assert_eq!(body.position, Vec3::ZERO);
    }

    #[test]
    fn stats_restore_fills_missing_fields_and_clamps() {
        let catalog = ItemCatalog::default_test();
        let mut ctx = RestoreContext::new(&catalog);
        let mut stats = PlayerStats::new();
        stats.restore(&serde_json::json!({ "health": 250.0, "level": 0 }), &mut ctx);
        assert_eq!(stats.state.health, 100.0);
        assert_eq!(stats.state.level, 1);
        assert_eq!(stats.state.experience, 0);
    }

    #[test]
    fn stats_restore_keeps_zero_health_and_clamps_negative() {
        let catalog = ItemCatalog::default_test();
        let mut ctx = RestoreContext::new(&catalog);
        let mut stats = PlayerStats::new();

        stats.restore(&serde_json::json!({ "health": 0.0 }), &mut ctx);
        assert_eq!(stats.state.health, 0.0);

        stats.restore(&serde_json::json!({ "health": -12.5 }), &mut ctx);
        assert_eq!(stats.state.health, 0.0);
    }

    #[test]
    fn stats_restore_from_null_resets() {
        let catalog = ItemCatalog::default_test();
        let mut ctx = RestoreContext::new(&catalog);
        let mut stats = PlayerStats::new();
        stats.gain_experience(450);
        stats.take_damage(30.0);
        stats.restore(&Fragment::Null, &mut ctx);
        assert_eq!(stats.state, StatsState::default());
    }
}
