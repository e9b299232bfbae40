//! Boss spawner: whether the boss is up, down, or waiting to respawn.

use crate::{
    snapshot::Fragment,
    subsystem::{Persistent, RestoreContext},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerState {
    pub boss_defeated:      bool,
    pub boss_spawned:       bool,
    /// Seconds until the boss may respawn after a defeat. Zero when idle.
    pub respawn_timer_secs: f32,
    pub times_defeated:     u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossSpawner {
    pub state:         SpawnerState,
    pub respawn_delay: f32,
}

impl BossSpawner {
    pub fn new(respawn_delay: f32) -> Self {
        Self { state: SpawnerState::default(), respawn_delay }
    }

    pub fn spawn(&mut self) -> bool {
        if self.state.boss_spawned || self.state.respawn_timer_secs > 0.0 {
            return false;
        }
        self.state.boss_spawned = true;
        self.state.boss_defeated = false;
        true
    }

    pub fn defeat(&mut self) {
        if !self.state.boss_spawned {
            return;
        }
        self.state.boss_spawned = false;
        self.state.boss_defeated = true;
        self.state.times_defeated += 1;
        self.state.respawn_timer_secs = self.respawn_delay;
    }

    pub fn tick(&mut self, dt: f32) {
        if self.state.respawn_timer_secs > 0.0 {
            self.state.respawn_timer_secs = (self.state.respawn_timer_secs - dt).max(0.0);
        }
    }
}

impl Persistent for BossSpawner {
    fn name(&self) -> &'static str { "boss_spawner" }

    fn capture(&self) -> Fragment {
        serde_json::to_value(&self.state).unwrap_or_default()
    }

    fn restore(&mut self, fragment: &Fragment, _ctx: &mut RestoreContext<'_>) {
        let mut state = match fragment {
            Fragment::Null => SpawnerState::default(),
            other => serde_json::from_value::<SpawnerState>(other.clone()).unwrap_or_else(|e| {
                log::warn!("boss_spawner: unreadable fragment ({e}); resetting");
                SpawnerState::default()
            }),
        };
        if !state.respawn_timer_secs.is_finite() || state.respawn_timer_secs < 0.0 {
            state.respawn_timer_secs = 0.0;
        }
        // A defeated boss is never also standing.
        if state.boss_defeated {
            state.boss_spawned = false;
        }
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defeat_starts_respawn_timer() {
        let mut spawner = BossSpawner::new(30.0);
        assert!(spawner.spawn());
        spawner.defeat();
        assert!(!spawner.spawn());
        spawner.tick(30.0);
        assert!(spawner.spawn());
        assert_eq!(spawner.state.times_defeated, 1);
    }
}
