mod common;

use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;

use notify_api::schedule::target::ScheduleTarget;

// ---------------------------------------------------------------------------
// POST /schedule
// ---------------------------------------------------------------------------

#[tokio::test]
async fn schedule_returns_success_message() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/schedule")
        .json(&serde_json::json!({ "time": "09:00" }))
        .await;

    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["message"], "Time scheduled successfully");

    let status = common::wait_for_status(&state, |s| s.pending.is_some()).await;
    assert_eq!(status.pending, Some(ScheduleTarget::new("09:00")));
}

#[tokio::test]
async fn schedule_does_not_require_json_content_type() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server.post("/schedule").text(r#"{"time": "17:30"}"#).await;

    resp.assert_status_ok();
    let status = common::wait_for_status(&state, |s| s.pending.is_some()).await;
    assert_eq!(status.pending, Some(ScheduleTarget::new("17:30")));
}

#[tokio::test]
async fn schedule_replaces_pending_target() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    for time in ["09:00", "10:15"] {
        server
            .post("/schedule")
            .json(&serde_json::json!({ "time": time }))
            .await
            .assert_status_ok();
    }

    let status = common::wait_for_status(&state, |s| {
        s.pending == Some(ScheduleTarget::new("10:15"))
    })
    .await;
    assert!(status.last_fired.is_none());
}

#[tokio::test]
async fn schedule_rejects_wrong_type() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server
        .post("/schedule")
        .json(&serde_json::json!({ "time": 900 }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.text(), "Invalid JSON");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(state.matcher.status().pending.is_none());
}

#[tokio::test]
async fn schedule_rejects_malformed_bodies() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    for body in ["", "not json", "{\"time\":", "{}", "{\"when\": \"09:00\"}"] {
        let resp = server.post("/schedule").text(body).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.text(), "Invalid JSON", "body: {body:?}");
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(state.matcher.status().pending.is_none());
}

#[tokio::test]
async fn schedule_accepts_unvalidated_time_strings() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    // Decodes fine; it just never matches.
    server
        .post("/schedule")
        .json(&serde_json::json!({ "time": "25:99" }))
        .await
        .assert_status_ok();

    let status = common::wait_for_status(&state, |s| s.pending.is_some()).await;
    assert_eq!(status.pending, Some(ScheduleTarget::new("25:99")));
}

#[tokio::test]
async fn schedule_rejects_get() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/schedule").await;

    resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.text(), "Invalid request method");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(state.matcher.status().pending.is_none());
}

#[tokio::test]
async fn schedule_rejects_put_and_delete() {
    let (app, _state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    server
        .put("/schedule")
        .json(&serde_json::json!({ "time": "09:00" }))
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    server
        .delete("/schedule")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

// ---------------------------------------------------------------------------
// GET /schedule/status, POST /schedule/cancel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_idle_service() {
    let (app, _state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/schedule/status").await;

    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert!(body["pending"].is_null());
    assert!(body["last_fired"].is_null());
    assert_eq!(body["connections"], 0);
}

#[tokio::test]
async fn status_reports_last_fired_schedule() {
    let (app, state, clock) = common::test_app(common::utc(8, 59, 30));
    let server = TestServer::new(app).unwrap();

    server
        .post("/schedule")
        .json(&serde_json::json!({ "time": "09:00" }))
        .await
        .assert_status_ok();
    common::wait_for_status(&state, |s| s.pending.is_some()).await;

    clock.set(common::utc(9, 0, 5));
    common::wait_for_status(&state, |s| s.last_fired.is_some()).await;

    let body: serde_json::Value = server.get("/schedule/status").await.json();
    assert!(body["pending"].is_null());
    assert_eq!(body["last_fired"]["time"], "09:00");
    assert_eq!(body["last_fired"]["delivered"], 0);
    assert_eq!(body["last_fired"]["pruned"], 0);
    assert!(body["last_fired"]["fired_at"].is_string());
}

#[tokio::test]
async fn cancel_clears_pending_schedule() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    server
        .post("/schedule")
        .json(&serde_json::json!({ "time": "09:00" }))
        .await
        .assert_status_ok();
    common::wait_for_status(&state, |s| s.pending.is_some()).await;

    let resp = server.post("/schedule/cancel").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<serde_json::Value>()["message"], "Schedule cancelled");

    common::wait_for_status(&state, |s| s.pending.is_none()).await;
}

#[tokio::test]
async fn schedule_after_shutdown_is_internal_error() {
    let (app, state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    state.shutdown().await;

    let resp = server
        .post("/schedule")
        .json(&serde_json::json!({ "time": "09:00" }))
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// Static page and health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_page_is_served() {
    let (app, _state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/").await;

    resp.assert_status_ok();
    assert!(resp.text().contains("<html"));
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _state, _clock) = common::test_app(common::utc(8, 0, 0));
    let server = TestServer::new(app).unwrap();

    let resp = server.get("/health").await;

    resp.assert_status_ok();
    assert_eq!(resp.json::<serde_json::Value>()["status"], "ok");
}
