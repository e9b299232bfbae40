use serde::{Deserialize, Serialize};

/// Where and how saves are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveConfig {
    pub save_path:     String,
    /// Informational only; written into every save, never gates a load.
    pub build_version: String,
    #[serde(default = "yes")]
    pub atomic_write:  bool,
    #[serde(default = "yes")]
    pub pretty:        bool,
}

fn yes() -> bool { true }

impl SaveConfig {
    /// Load from `{data_dir}/save/save_config.json`.
    /// In tests, use SaveConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/save/save_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SaveConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            save_path:     "savegame.json".into(),
            build_version: format!("{}-test", env!("CARGO_PKG_VERSION")),
            atomic_write:  true,
            pretty:        true,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.save_path = path.into();
        self
    }
}

/// One container placed in the world layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPlacement {
    pub container_id: String,
    pub loot_table:   String,
}

/// Shape of the world the host builds before any load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLayout {
    pub inventory_slots: usize,
    #[serde(default)]
    pub containers:      Vec<ContainerPlacement>,
    #[serde(default)]
    pub has_boss_spawner: bool,
    #[serde(default = "default_respawn_delay")]
    pub boss_respawn_secs: f32,
    #[serde(default = "default_day_length")]
    pub day_length_secs:  f64,
}

fn default_respawn_delay() -> f32 { 300.0 }
fn default_day_length() -> f64 { crate::clock::DEFAULT_DAY_LENGTH_SECS }

impl WorldLayout {
    /// Load from `{data_dir}/world/layout.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/world/layout.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let layout: WorldLayout = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(layout)
    }

    /// Layout with hardcoded placements for use in unit tests.
    pub fn default_test() -> Self {
        let place = |id: &str, table: &str| ContainerPlacement {
            container_id: id.into(),
            loot_table:   table.into(),
        };
        Self {
            inventory_slots:   8,
            containers:        vec![
                place("chest_cellar", "common_chest"),
                place("chest_tower", "common_chest"),
                place("chest_warden", "boss_chest"),
            ],
            has_boss_spawner:  true,
            boss_respawn_secs: 300.0,
            day_length_secs:   crate::clock::DEFAULT_DAY_LENGTH_SECS,
        }
    }
}
