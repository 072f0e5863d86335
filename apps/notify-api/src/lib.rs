pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod schedule;

use std::sync::Arc;

use clock::Clock;
use config::Config;
use gateway::fanout::Broadcaster;
use gateway::registry::ConnectionRegistry;
use schedule::matcher::{ClockMatcher, MatcherHandle, MatcherSettings};

/// Shared application state available to all route handlers.
///
/// Built once at startup; owns the connection registry and the handle to
/// the clock matcher task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connections: Arc<ConnectionRegistry>,
    pub matcher: MatcherHandle,
}

impl AppState {
    /// Build the state and spawn the matcher. Must run inside a Tokio runtime.
    pub fn new(config: Config, clock: impl Clock) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let matcher = ClockMatcher::spawn(
            clock,
            MatcherSettings {
                offset: config.utc_offset,
                poll_interval: config.poll_interval,
            },
            Broadcaster::new(connections.clone()),
        );

        Self {
            config: Arc::new(config),
            connections,
            matcher,
        }
    }

    /// Stop the matcher and close every client connection.
    pub async fn shutdown(&self) {
        self.matcher.shutdown().await;
        let closed = self.connections.close_all();
        tracing::info!(closed, "notify service shut down");
    }
}
