//! Best-effort delivery of one notification to every registered connection.
//!
//! Each connection owns a bounded queue drained by its socket writer. A
//! broadcast pushes into every queue without waiting; a connection whose queue
//! is full or closed is pruned from the registry in the same pass.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use utoipa::ToSchema;

use crate::schedule::target::NotificationMessage;

use super::registry::ConnectionRegistry;

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BroadcastReport {
    /// Connections the message was queued for.
    pub delivered: usize,
    /// Connections removed because their queue rejected the message.
    pub pruned: usize,
}

/// Fans notifications out over the connection registry. Cloneable.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `message` to every registered connection.
    ///
    /// Failures are logged and never abort delivery to the rest.
    pub fn broadcast(&self, message: &NotificationMessage) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        self.registry.retain(|handle| match handle.try_send(message.clone()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    connection_id = %handle.connection_id,
                    "outbound queue full; dropping connection"
                );
                report.pruned += 1;
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    connection_id = %handle.connection_id,
                    "outbound queue closed; dropping connection"
                );
                report.pruned += 1;
                false
            }
        });

        tracing::info!(
            delivered = report.delivered,
            pruned = report.pruned,
            "notification broadcast"
        );
        report
    }
}
