#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tokio::time;

use notify_api::clock::ManualClock;
use notify_api::config::Config;
use notify_api::schedule::matcher::MatcherStatus;
use notify_api::AppState;

/// Poll interval used by tests; short enough that real-time waits stay fast.
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Build a UTC instant on a fixed test date.
pub fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
}

/// Config reading the clock in UTC with a short poll interval.
pub fn test_config() -> Config {
    Config {
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        poll_interval: TEST_POLL_INTERVAL,
        static_index: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static/index.html"),
        ..Config::default()
    }
}

/// Build a test AppState driven by a manual clock starting at `start`.
pub fn test_state(start: DateTime<Utc>) -> (AppState, ManualClock) {
    let clock = ManualClock::new(start);
    let state = AppState::new(test_config(), clock.clone());
    (state, clock)
}

/// Build the full application router wired to a fresh test state.
pub fn test_app(start: DateTime<Utc>) -> (Router, AppState, ManualClock) {
    let (state, clock) = test_state(start);
    let app = notify_api::routes::router(&state.config).with_state(state.clone());
    (app, state, clock)
}

/// Start an actual TCP server for WebSocket testing. The server runs in the background.
pub async fn start_server(start: DateTime<Utc>) -> (SocketAddr, AppState, ManualClock) {
    let (app, state, clock) = test_app(start);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state, clock)
}

/// Wait (up to 5s) until the matcher status satisfies `predicate`.
pub async fn wait_for_status(
    state: &AppState,
    predicate: impl FnMut(&MatcherStatus) -> bool,
) -> MatcherStatus {
    let mut rx = state.matcher.subscribe();
    let status = time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timeout waiting for matcher status")
        .expect("matcher status channel closed");
    MatcherStatus::clone(&status)
}

/// Wait (up to 5s) until exactly `n` connections are registered.
pub async fn wait_for_connections(state: &AppState, n: usize) {
    time::timeout(Duration::from_secs(5), async {
        while state.connections.len() != n {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| {
        panic!(
            "expected {n} connections, registry has {}",
            state.connections.len()
        )
    });
}
