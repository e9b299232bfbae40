//! Identity reconciliation: pairs stored container fragments with the
//! containers that exist in the world right now.
//!
//! The join is by `container_id`, never by position. Containers added,
//! removed, or reordered since the save was written are all tolerated:
//!   - stored and live      -> restored from the fragment
//!   - live only            -> left at its construction-time default
//!   - stored only          -> discarded
//!   - stored more than once -> last entry wins

use crate::{
    error::LoadWarning,
    snapshot::ContainerSnapshot,
    subsystem::{ContainerRegistry, RestoreContext},
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Live containers that received a stored fragment.
    pub restored:   usize,
    /// Live containers with no stored fragment.
    pub untouched:  usize,
    /// Stored ids with no live container.
    pub discarded:  usize,
    /// Stored entries shadowed by a later entry with the same id.
    pub duplicates: usize,
}

pub fn reconcile_containers(
    stored: &[ContainerSnapshot],
    live:   &mut ContainerRegistry,
    ctx:    &mut RestoreContext<'_>,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    let mut by_id: HashMap<&str, &ContainerSnapshot> = HashMap::with_capacity(stored.len());
    for snapshot in stored {
        if by_id.insert(snapshot.container_id.as_str(), snapshot).is_some() {
            summary.duplicates += 1;
            ctx.warn(LoadWarning::DuplicateContainer {
                container_id: snapshot.container_id.clone(),
            });
        }
    }

    let mut matched: HashSet<&str> = HashSet::new();
    for container in live.iter_mut() {
        let id = container.container_id().to_string();
        match by_id.get(id.as_str()) {
            Some(snapshot) => {
                container.restore_state(snapshot, ctx);
                matched.insert(snapshot.container_id.as_str());
                summary.restored += 1;
            }
            None => {
                log::debug!("reconcile: live container '{id}' has no stored state; left at default");
                summary.untouched += 1;
            }
        }
    }

    for id in by_id.keys() {
        if !matched.contains(id) {
            log::debug!("reconcile: stored container '{id}' no longer exists; discarded");
            summary.discarded += 1;
        }
    }

    log::debug!(
        "reconcile: restored={} untouched={} discarded={} duplicates={}",
        summary.restored, summary.untouched, summary.discarded, summary.duplicates
    );
    summary
}
