//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{ActiveRegistry, Lifecycle, Timer, TimerDefinition, TimerMode, TimerSnapshot, TurboMode};
use crate::{
    control::{Command, CommandQueue, Operation, QueueSettings},
    error::{Result, TimerError},
    services::AlertSink,
    utils::time::parse_duration,
};

/// Notification published to UI collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A timer changed and should be redrawn
    Refresh(TimerSnapshot),
    /// The single alert chosen for a tick
    Alert { name: String, sound: String },
    Turbo { enabled: bool },
}

/// Which bulk control the UI should offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Nothing running: start everything in auto mode
    Auto,
    /// Something running: pause everything
    Stop,
    /// Something paused: resume everything
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub action: ControlAction,
    pub reset_enabled: bool,
}

/// Coordinates all timers: owns the active registry, the turbo flag, the
/// command queue handle, the alert sink and the event channel
#[derive(Debug)]
pub struct AppState {
    timers: Vec<Arc<Timer>>,
    registry: ActiveRegistry,
    turbo: TurboMode,
    queue: CommandQueue,
    ack_timeout: Duration,
    alerts: Arc<dyn AlertSink>,
    /// Server metadata
    pub start_time: Instant,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Channel for refresh, alert and turbo notifications
    events_tx: broadcast::Sender<TimerEvent>,
    /// Keep the receiver alive to prevent channel closure
    _events_rx: broadcast::Receiver<TimerEvent>,
}

impl AppState {
    /// Create the state and the receiver the command loop must drain
    pub fn new(
        definitions: Vec<TimerDefinition>,
        settings: QueueSettings,
        alerts: Arc<dyn AlertSink>,
    ) -> (Self, mpsc::Receiver<Command>) {
        let (queue, rx) = CommandQueue::new(&settings);
        let (events_tx, events_rx) = broadcast::channel(100);

        let timers = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| Arc::new(Timer::new(index, definition)))
            .collect();

        let state = Self {
            timers,
            registry: ActiveRegistry::new(),
            turbo: TurboMode::new(),
            queue,
            ack_timeout: settings.ack_timeout,
            alerts,
            start_time: Instant::now(),
            last_action: Mutex::new(None),
            events_tx,
            _events_rx: events_rx,
        };
        (state, rx)
    }

    /// All timers in configuration order
    pub fn timers(&self) -> &[Arc<Timer>] {
        &self.timers
    }

    /// Timer names in configuration order
    pub fn list_all(&self) -> Vec<String> {
        self.timers.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn find(&self, name: &str) -> Result<Arc<Timer>> {
        self.timers
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| TimerError::UnknownTimer(name.to_string()))
    }

    pub fn custom_timer(&self) -> Option<&Arc<Timer>> {
        self.timers.iter().find(|t| t.is_custom())
    }

    pub fn registry(&self) -> &ActiveRegistry {
        &self.registry
    }

    pub fn turbo(&self) -> &TurboMode {
        &self.turbo
    }

    pub fn turbo_enabled(&self) -> bool {
        self.turbo.is_enabled()
    }

    /// Atomic snapshot of one timer
    pub fn snapshot(&self, name: &str) -> Result<TimerSnapshot> {
        let _turbo = self.turbo.read();
        Ok(self.find(name)?.snapshot())
    }

    /// Snapshots of every timer, never showing a partial turbo swap
    pub fn snapshots(&self) -> Vec<TimerSnapshot> {
        let _turbo = self.turbo.read();
        self.timers.iter().map(|t| t.snapshot()).collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    /// Enqueue a command; false if it was dropped
    pub async fn submit(&self, command: Command) -> bool {
        self.queue.submit(command).await
    }

    /// Wait for an acknowledgment up to the configured timeout
    async fn await_ack(&self, what: String, rx: oneshot::Receiver<Result<()>>) -> Result<()> {
        match tokio::time::timeout(self.ack_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) | Err(_) => {
                debug!("No acknowledgment for {}", what);
                Err(TimerError::Unacknowledged(what))
            }
        }
    }

    /// Submit one operation and wait for it to be applied
    pub async fn dispatch(&self, operation: Operation, target: Arc<Timer>) -> Result<TimerSnapshot> {
        let (command, rx) = Command::with_reply(operation, Arc::clone(&target));
        let what = command.describe();
        self.submit(command).await;
        self.await_ack(what, rx).await?;
        Ok(target.snapshot())
    }

    /// Submit the same operation for every timer, then wait for each acknowledgment.
    /// Missing acknowledgments are tolerated; the returned snapshots are fresh.
    pub async fn dispatch_all(&self, operation: Operation) -> Vec<TimerSnapshot> {
        let mut pending = Vec::with_capacity(self.timers.len());
        for timer in &self.timers {
            let (command, rx) = Command::with_reply(operation, Arc::clone(timer));
            let what = command.describe();
            self.submit(command).await;
            pending.push((what, rx));
        }

        for (what, rx) in pending {
            if let Err(e) = self.await_ack(what, rx).await {
                debug!("Bulk {:?}: {}", operation, e);
            }
        }
        self.snapshots()
    }

    /// Primary action on a timer: pause if running, resume if paused,
    /// start in manual mode if inactive. An unconfigured timer needs a
    /// duration first.
    pub async fn tap(&self, name: &str) -> Result<TimerSnapshot> {
        let timer = self.find(name)?;
        let operation = match timer.state() {
            Lifecycle::ActiveAuto | Lifecycle::ActiveManual => Operation::Pause,
            Lifecycle::Paused => Operation::Resume,
            Lifecycle::Inactive => Operation::Start(TimerMode::Manual),
            Lifecycle::Unconfigured => {
                return Err(TimerError::InvalidPrecondition(format!(
                    "{} needs a duration before it can start",
                    name
                )))
            }
        };
        self.dispatch(operation, timer).await
    }

    /// Validate a `mm:ss` or seconds string and apply it to the custom timer
    pub async fn set_custom_duration(&self, input: &str) -> Result<TimerSnapshot> {
        let seconds = parse_duration(input)?;
        let timer = self
            .custom_timer()
            .cloned()
            .ok_or_else(|| TimerError::InvalidPrecondition("no custom timer is configured".to_string()))?;
        self.dispatch(Operation::SetCustomDuration(seconds), timer).await
    }

    /// Enable or disable turbo durations for every timer
    pub async fn toggle_turbo(&self, enable: bool) -> Result<()> {
        let (command, rx) = Command::turbo(enable);
        let what = command.describe();
        self.submit(command).await;
        self.await_ack(what, rx).await
    }

    /// Which bulk control applies to the current timer states
    pub fn control_summary(&self) -> ControlSummary {
        let states: Vec<Lifecycle> = self.timers.iter().map(|t| t.state()).collect();

        let any_active = states.iter().any(|s| s.is_active());
        let any_paused = states.contains(&Lifecycle::Paused);
        let any_unconfigured = states.contains(&Lifecycle::Unconfigured);
        let all_idle = states.iter().all(|s| s.is_idle());

        let action = if any_active {
            ControlAction::Stop
        } else if any_paused {
            ControlAction::Start
        } else {
            ControlAction::Auto
        };

        ControlSummary {
            action,
            reset_enabled: !(any_unconfigured && all_idle),
        }
    }

    /// Publish a refresh request for one timer
    pub fn notify_refresh(&self, timer: &Timer) {
        self.publish(TimerEvent::Refresh(timer.snapshot()));
    }

    /// Publish refresh requests for every timer
    pub fn notify_refresh_all(&self) {
        for snapshot in self.snapshots() {
            self.publish(TimerEvent::Refresh(snapshot));
        }
    }

    pub fn notify_turbo(&self, enabled: bool) {
        self.publish(TimerEvent::Turbo { enabled });
    }

    /// Hand the timer's sound to the alert sink and publish the alert
    pub fn raise_alert(&self, timer: &Timer) {
        info!("Alert for {} (priority {})", timer.name(), timer.priority());
        self.alerts.play_sound(timer.sound());
        self.publish(TimerEvent::Alert {
            name: timer.name().to_string(),
            sound: timer.sound().to_string(),
        });
    }

    fn publish(&self, event: TimerEvent) {
        if let Err(e) = self.events_tx.send(event) {
            warn!("Failed to send timer event: {}", e);
        }
    }

    /// Remember the most recently applied command
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
