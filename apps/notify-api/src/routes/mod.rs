pub mod health;
pub mod home;
pub mod schedule;

use axum::Router;
use utoipa::OpenApi;

use crate::config::Config;
use crate::AppState;

pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(home::router(&config.static_index))
        .merge(health::router())
        .merge(schedule::router())
        .merge(crate::gateway::server::router())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Schedule
        schedule::create_schedule,
        schedule::schedule_status,
        schedule::cancel_schedule,
    ),
    components(
        schemas(
            health::HealthResponse,
            schedule::ScheduleRequest,
            schedule::MessageResponse,
            schedule::ScheduleStatusResponse,
            crate::schedule::target::ScheduleTarget,
            crate::schedule::matcher::MatcherStatus,
            crate::schedule::matcher::FiredSchedule,
            crate::gateway::fanout::BroadcastReport,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Schedule", description = "Time-of-day notification scheduling"),
    )
)]
pub struct ApiDoc;
