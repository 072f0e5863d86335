//! The time-of-day the service is watching for, and the message sent when it arrives.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::clock::TIME_OF_DAY_FORMAT;

/// A target time-of-day in `HH:MM` 24-hour form.
///
/// The raw string is kept verbatim. Nothing rejects an out-of-range or
/// malformed value; such a target simply never equals a formatted clock
/// reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "09:00")]
pub struct ScheduleTarget(String);

impl ScheduleTarget {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the target can ever equal an `HH:MM` clock reading.
    pub fn is_reachable(&self) -> bool {
        // `%H:%M` parsing accepts single-digit fields; a formatted reading never has them.
        self.0.len() == 5 && NaiveTime::parse_from_str(&self.0, TIME_OF_DAY_FORMAT).is_ok()
    }

    /// Exact comparison against a formatted `HH:MM` reading.
    pub fn matches(&self, time_of_day: &str) -> bool {
        self.0 == time_of_day
    }
}

impl fmt::Display for ScheduleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable text pushed to every connected client when a target matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage(Arc<str>);

impl NotificationMessage {
    /// Build the notification for a matched time.
    pub fn for_match(matched: &ScheduleTarget) -> Self {
        Self(format!("Notify the user: It's {matched}").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
