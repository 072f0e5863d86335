use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

/// Default offset the clock is read in (`+05:30`).
const DEFAULT_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const POLL_INTERVAL_VAR: &str = "POLL_INTERVAL_SECS";

/// A poll interval of a full minute or more can step over the target minute.
const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Notify API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Fixed offset applied once to UTC before comparing against a target.
    pub utc_offset: FixedOffset,
    /// How often a pending target is compared against the clock.
    pub poll_interval: Duration,
    /// Home page served at `/`.
    pub static_index: PathBuf,
    /// Per-connection outbound queue capacity.
    pub client_buffer: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional. Panics with a descriptive message if one
    /// is set but cannot be parsed or is out of range.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

        let poll_interval = match parsed_var::<u64>(POLL_INTERVAL_VAR, &var) {
            Some(secs) if (1..MAX_POLL_INTERVAL_SECS).contains(&secs) => Duration::from_secs(secs),
            Some(secs) => panic!(
                "{POLL_INTERVAL_VAR} env var is invalid ({secs}): must be between 1 and {} so every minute is observed",
                MAX_POLL_INTERVAL_SECS - 1
            ),
            None => defaults.poll_interval,
        };

        Self {
            port: parsed_var("PORT", &var).unwrap_or(defaults.port),
            utc_offset: parsed_var("UTC_OFFSET", &var).unwrap_or(defaults.utc_offset),
            poll_interval,
            static_index: var("STATIC_INDEX")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_index),
            client_buffer: parsed_var("CLIENT_BUFFER", &var)
                .unwrap_or(defaults.client_buffer),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8082,
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or(Utc.fix()),
            poll_interval: Duration::from_secs(30),
            static_index: PathBuf::from("static/index.html"),
            client_buffer: 16,
        }
    }
}

fn parsed_var<T>(name: &str, var: &dyn Fn(&str) -> Option<String>) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => panic!("{name} env var is invalid ({raw}): {err}"),
    }
}
