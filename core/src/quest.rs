//! Quest log. The save engine stores its fragment without looking inside.

use crate::{
    snapshot::Fragment,
    subsystem::{Persistent, RestoreContext},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestProgress {
    pub stage:      u32,
    /// Objective id -> completed count.
    pub objectives: BTreeMap<String, u32>,
}

/// BTree collections keep capture output ordered, so two captures of the
/// same log serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestLog {
    pub active:    BTreeMap<String, QuestProgress>,
    pub completed: BTreeSet<String>,
}

impl QuestLog {
    pub fn new() -> Self { Self::default() }

    /// Start a quest. No-op if it is active or already completed.
    pub fn start(&mut self, quest_id: &str) -> bool {
        if self.completed.contains(quest_id) || self.active.contains_key(quest_id) {
            return false;
        }
        self.active.insert(quest_id.to_string(), QuestProgress::default());
        true
    }

    pub fn record_objective(&mut self, quest_id: &str, objective: &str, count: u32) {
        if let Some(progress) = self.active.get_mut(quest_id) {
            *progress.objectives.entry(objective.to_string()).or_default() += count;
        }
    }

    pub fn advance_stage(&mut self, quest_id: &str) {
        if let Some(progress) = self.active.get_mut(quest_id) {
            progress.stage += 1;
        }
    }

    pub fn complete(&mut self, quest_id: &str) -> bool {
        if self.active.remove(quest_id).is_none() {
            return false;
        }
        self.completed.insert(quest_id.to_string());
        true
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

impl Persistent for QuestLog {
    fn name(&self) -> &'static str { "quest_log" }

    fn capture(&self) -> Fragment {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn restore(&mut self, fragment: &Fragment, _ctx: &mut RestoreContext<'_>) {
        let mut restored = match fragment {
            Fragment::Null => QuestLog::default(),
            other => serde_json::from_value::<QuestLog>(other.clone()).unwrap_or_else(|e| {
                log::warn!("quest_log: unreadable fragment ({e}); starting empty");
                QuestLog::default()
            }),
        };
        // A quest cannot be both active and completed; completion wins.
        let completed = restored.completed.clone();
        restored.active.retain(|id, _| !completed.contains(id));
        *self = restored;
    }
}
