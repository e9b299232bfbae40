//! Persistence notifications.
//!
//! RULE: Observers learn about saves and loads ONLY through this channel.
//! The engine publishes; anyone holding a receiver listens. There are no
//! callback fields on the engine itself.

use crate::{error::LoadWarning, types::SchemaVersion};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

#[derive(Debug, Clone, PartialEq)]
pub enum PersistEvent {
    SaveCompleted {
        path:           String,
        bytes:          usize,
        schema_version: SchemaVersion,
    },
    LoadCompleted {
        schema_version:      SchemaVersion,
        restored_containers: usize,
    },
    LoadWarned(LoadWarning),
    OperationFailed {
        operation: Operation,
        reason:    String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Load,
}

/// Events buffered per subscriber before new ones are dropped for it.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Fan-out publisher. Each subscriber gets a bounded buffer; a receiver
/// that stops draining loses the overflow instead of blocking the engine
/// or growing without limit. Receivers that have been dropped are pruned
/// on the next publish.
#[derive(Debug)]
pub struct EventChannel {
    subscribers: Vec<SyncSender<PersistEvent>>,
    buffer:      usize,
}

impl Default for EventChannel {
    fn default() -> Self { Self::with_buffer(DEFAULT_EVENT_BUFFER) }
}

impl EventChannel {
    pub fn new() -> Self { Self::default() }

    pub fn with_buffer(buffer: usize) -> Self {
        Self { subscribers: Vec::new(), buffer: buffer.max(1) }
    }

    pub fn subscribe(&mut self) -> Receiver<PersistEvent> {
        let (tx, rx) = mpsc::sync_channel(self.buffer);
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: PersistEvent) {
        self.subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                log::warn!("events: subscriber buffer full; dropped {dropped:?}");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    pub fn subscriber_count(&self) -> usize { self.subscribers.len() }
}
