//! Clock matcher: one long-lived task that owns the current schedule target.
//!
//! HTTP handlers never touch the target directly. They send commands to the
//! task, which races the next polling tick against the next command. Arming
//! while a target is pending replaces it, so an old target can never fire.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use notify_common::id::{prefix, prefixed_ulid};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use utoipa::ToSchema;

use crate::clock::Clock;
use crate::gateway::fanout::{BroadcastReport, Broadcaster};

use super::target::{NotificationMessage, ScheduleTarget};

/// Commands accepted by the matcher task.
#[derive(Debug)]
enum MatcherCommand {
    Arm(ScheduleTarget),
    Cancel,
    Shutdown,
}

/// Returned when the matcher task is no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherStopped;

impl std::fmt::Display for MatcherStopped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("clock matcher is not running")
    }
}

impl std::error::Error for MatcherStopped {}

/// The most recent match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FiredSchedule {
    pub time: ScheduleTarget,
    pub fired_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: BroadcastReport,
}

/// Observable matcher state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MatcherStatus {
    /// Target currently being polled for, if any.
    pub pending: Option<ScheduleTarget>,
    pub last_fired: Option<FiredSchedule>,
}

/// Timing parameters for the matcher.
#[derive(Debug, Clone, Copy)]
pub struct MatcherSettings {
    /// Offset the clock reading is converted to before comparison.
    pub offset: FixedOffset,
    pub poll_interval: Duration,
}

/// Cloneable handle used to command the matcher task.
#[derive(Clone)]
pub struct MatcherHandle {
    commands: mpsc::UnboundedSender<MatcherCommand>,
    status: watch::Receiver<MatcherStatus>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl MatcherHandle {
    /// Replace the pending target with `target` and start polling for it.
    pub fn arm(&self, target: ScheduleTarget) -> Result<(), MatcherStopped> {
        self.send(MatcherCommand::Arm(target))
    }

    /// Drop the pending target, if any.
    pub fn cancel(&self) -> Result<(), MatcherStopped> {
        self.send(MatcherCommand::Cancel)
    }

    pub fn status(&self) -> MatcherStatus {
        self.status.borrow().clone()
    }

    /// Watch receiver that changes whenever the status does.
    pub fn subscribe(&self) -> watch::Receiver<MatcherStatus> {
        self.status.clone()
    }

    /// Stop the task and wait for it to exit. Safe to call more than once.
    pub async fn shutdown(&self) {
        let _ = self.send(MatcherCommand::Shutdown);
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::error!(?err, "clock matcher task failed");
            }
        }
    }

    fn send(&self, command: MatcherCommand) -> Result<(), MatcherStopped> {
        self.commands.send(command).map_err(|_| MatcherStopped)
    }
}

/// A target together with the id used to trace it through the logs.
struct PendingSchedule {
    schedule_id: String,
    target: ScheduleTarget,
}

/// The matcher task's owned state.
pub struct ClockMatcher<C> {
    clock: C,
    settings: MatcherSettings,
    broadcaster: Broadcaster,
    commands: mpsc::UnboundedReceiver<MatcherCommand>,
    status: watch::Sender<MatcherStatus>,
}

impl<C: Clock> ClockMatcher<C> {
    /// Spawn the matcher onto the current Tokio runtime.
    pub fn spawn(clock: C, settings: MatcherSettings, broadcaster: Broadcaster) -> MatcherHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(MatcherStatus::default());

        let matcher = Self {
            clock,
            settings,
            broadcaster,
            commands: command_rx,
            status: status_tx,
        };
        let task = tokio::spawn(matcher.run());

        MatcherHandle {
            commands: command_tx,
            status: status_rx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn run(mut self) {
        tracing::info!(
            offset = %self.settings.offset,
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            "clock matcher started"
        );
        let mut pending: Option<PendingSchedule> = None;

        loop {
            pending = pending.and_then(|schedule| self.check(schedule));

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(MatcherCommand::Arm(target)) => {
                        pending = Some(self.arm(pending.take(), target));
                    }
                    Some(MatcherCommand::Cancel) => {
                        if let Some(old) = pending.take() {
                            tracing::info!(schedule_id = %old.schedule_id, time = %old.target, "schedule cancelled");
                        }
                        self.publish_pending(None);
                    }
                    Some(MatcherCommand::Shutdown) | None => break,
                },
                _ = time::sleep(self.settings.poll_interval), if pending.is_some() => {}
            }
        }

        if let Some(old) = pending {
            tracing::info!(schedule_id = %old.schedule_id, time = %old.target, "pending schedule dropped at shutdown");
        }
        self.publish_pending(None);
        tracing::info!("clock matcher stopped");
    }

    fn arm(&self, previous: Option<PendingSchedule>, target: ScheduleTarget) -> PendingSchedule {
        let schedule_id = prefixed_ulid(prefix::SCHEDULE);

        if let Some(old) = previous {
            tracing::info!(
                schedule_id = %old.schedule_id,
                time = %old.target,
                superseded_by = %schedule_id,
                "schedule superseded"
            );
        }
        if !target.is_reachable() {
            tracing::warn!(%schedule_id, time = %target, "target is not an HH:MM time and will never match");
        }
        tracing::info!(%schedule_id, time = %target, "schedule armed");

        self.publish_pending(Some(target.clone()));
        PendingSchedule { schedule_id, target }
    }

    /// Compare the clock against the pending target. Returns the schedule
    /// back if it is still waiting, `None` once it has fired.
    fn check(&self, schedule: PendingSchedule) -> Option<PendingSchedule> {
        let now = self.clock.time_of_day(self.settings.offset);
        if !schedule.target.matches(&now) {
            tracing::trace!(schedule_id = %schedule.schedule_id, %now, time = %schedule.target, "no match");
            return Some(schedule);
        }

        let message = NotificationMessage::for_match(&schedule.target);
        tracing::info!(schedule_id = %schedule.schedule_id, %message, "schedule matched");
        let report = self.broadcaster.broadcast(&message);

        let fired = FiredSchedule {
            time: schedule.target,
            fired_at: self.clock.now(),
            report,
        };
        self.status.send_modify(|status| {
            status.pending = None;
            status.last_fired = Some(fired);
        });
        None
    }

    fn publish_pending(&self, target: Option<ScheduleTarget>) {
        self.status.send_modify(|status| status.pending = target);
    }
}
