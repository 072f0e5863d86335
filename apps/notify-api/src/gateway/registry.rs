//! Registry of live WebSocket connections eligible for broadcasts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use notify_common::id::{prefix, prefixed_ulid};
use tokio::sync::mpsc;

use crate::schedule::target::NotificationMessage;

/// Sending half of a connection's outbound queue.
pub type NotificationSender = mpsc::Sender<NotificationMessage>;

/// Receiving half, drained by the connection's socket writer.
pub type NotificationReceiver = mpsc::Receiver<NotificationMessage>;

/// One live client connection capable of receiving pushes.
///
/// Dropping the handle drops its sender, which closes the outbound queue and
/// ends the connection's writer.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub connection_id: String,
    pub connected_at: DateTime<Utc>,
    sender: NotificationSender,
}

impl ConnectionHandle {
    /// Create a handle with a fresh `ws_` id and a bounded outbound queue.
    pub fn new(capacity: usize) -> (Self, NotificationReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = Self {
            connection_id: prefixed_ulid(prefix::CONNECTION),
            connected_at: Utc::now(),
            sender,
        };
        (handle, receiver)
    }

    /// Non-blocking send into the outbound queue.
    pub fn try_send(
        &self,
        message: NotificationMessage,
    ) -> Result<(), mpsc::error::TrySendError<NotificationMessage>> {
        self.sender.try_send(message)
    }
}

/// Shared registry of all connected clients.
///
/// `DashMap` gives shard-level locking, so the accept path and the broadcast
/// path can mutate it concurrently without a global lock.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    pub(crate) connections: Arc<DashMap<String, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Add a handle. Ids are unique per connection, so this never collides.
    pub fn register(&self, handle: ConnectionHandle) {
        tracing::debug!(connection_id = %handle.connection_id, "connection registered");
        self.connections.insert(handle.connection_id.clone(), handle);
    }

    /// Remove a handle. Returns `false` if it was already gone.
    pub fn unregister(&self, connection_id: &str) -> bool {
        let removed = self.connections.remove(connection_id).is_some();
        if removed {
            tracing::debug!(%connection_id, "connection unregistered");
        }
        removed
    }

    pub fn contains(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Visit every handle, keeping only those for which `keep` returns true.
    ///
    /// Each shard is write-locked while it is visited; concurrent
    /// registrations on that shard wait rather than interleave.
    pub(crate) fn retain(&self, mut keep: impl FnMut(&ConnectionHandle) -> bool) {
        self.connections.retain(|_, handle| keep(handle));
    }

    /// Drop every handle, closing all outbound queues. Returns how many were dropped.
    pub fn close_all(&self) -> usize {
        let before = self.connections.len();
        self.connections.clear();
        before
    }
}
