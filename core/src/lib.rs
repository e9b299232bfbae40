//! Keepsake: save and restore for a running game world.
//!
//! Module map:
//!   snapshot   versioned, zero-value-closed data model written to disk
//!   subsystem  capture / restore contracts every stateful system meets
//!   reconcile  id-keyed matching of stored containers to live ones
//!   codec      JSON encoding, schema gate, default-fill
//!   store      the only module that touches the file system
//!   engine     save / load orchestration in a fixed order
//!
//! The remaining modules are the live game systems the engine persists.

pub mod clock;
pub mod codec;
pub mod config;
pub mod container;
pub mod content;
pub mod engine;
pub mod error;
pub mod event;
pub mod inventory;
pub mod loot;
pub mod player;
pub mod quest;
pub mod reconcile;
pub mod rng;
pub mod snapshot;
pub mod spawner;
pub mod store;
pub mod subsystem;
pub mod types;
pub mod world;
