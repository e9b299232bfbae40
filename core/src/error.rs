use crate::types::{ContainerId, ItemId, SchemaVersion};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Missing dependency: {name} is not available")]
    MissingDependency { name: &'static str },

    #[error("No save file at {path}")]
    NotFound { path: String },

    #[error("Corrupt save data: {reason}")]
    CorruptData { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Player placement rejected: {reason}")]
    PlacementRejected { reason: String },
}

pub type SaveResult<T> = Result<T, SaveError>;

/// Non-fatal conditions found during a load. Collected, logged, and
/// handed back to the caller; the load itself still succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// File was written by a newer engine; loaded best-effort.
    SchemaNewer { found: SchemaVersion, supported: SchemaVersion },

    /// An item id did not resolve; the entry was dropped.
    UnresolvedItemReference { owner: String, item_id: ItemId },

    /// A section or world field had the wrong shape and was zero-filled.
    SectionMalformed { section: &'static str, reason: String },

    /// One element of a stored list was unreadable; only it was dropped.
    EntryMalformed { section: &'static str, index: usize, reason: String },

    /// A stored inventory slot does not exist in the live inventory.
    SlotOutOfRange { slot_index: usize, capacity: usize },

    /// The same container id appeared more than once in the file.
    DuplicateContainer { container_id: ContainerId },

    /// The player body refused the stored transform; it stays where it was.
    PlayerPlacementRejected { reason: String },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaNewer { found, supported } => write!(
                f,
                "save schema v{found} is newer than supported v{supported}; loading best-effort"
            ),
            Self::UnresolvedItemReference { owner, item_id } => {
                write!(f, "{owner}: unknown item '{item_id}' dropped")
            }
            Self::SectionMalformed { section, reason } => {
                write!(f, "section '{section}' malformed ({reason}); using zero value")
            }
            Self::EntryMalformed { section, index, reason } => {
                write!(f, "{section}[{index}] malformed ({reason}); entry dropped")
            }
            Self::SlotOutOfRange { slot_index, capacity } => {
                write!(f, "inventory slot {slot_index} out of range (capacity {capacity})")
            }
            Self::DuplicateContainer { container_id } => {
                write!(f, "container '{container_id}' stored more than once; last entry wins")
            }
            Self::PlayerPlacementRejected { reason } => {
                write!(f, "player placement rejected ({reason}); position unchanged")
            }
        }
    }
}
