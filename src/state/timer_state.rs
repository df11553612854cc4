//! Per-timer state machine
//!
//! Every transition runs under the timer's own write lock. Registry
//! membership is updated inside that same critical section, so a timer is in
//! the [`ActiveRegistry`] exactly when its state is one of the active states.
//! Lock order is always timer first, registry second.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ActiveRegistry, DurationPair, TimerDefinition};
use crate::{
    error::{Result, TimerError},
    utils::time::{format_time, MAX_CUSTOM_DURATION_SECS},
};

/// Lifecycle state of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Inactive,
    ActiveAuto,
    ActiveManual,
    Paused,
    /// Custom timer without a duration
    Unconfigured,
}

impl Lifecycle {
    /// Check if the timer is being counted down
    pub fn is_active(self) -> bool {
        matches!(self, Lifecycle::ActiveAuto | Lifecycle::ActiveManual)
    }

    /// Check if the timer is neither counting nor paused
    pub fn is_idle(self) -> bool {
        matches!(self, Lifecycle::Inactive | Lifecycle::Unconfigured)
    }
}

/// Drive mode: automatic cycling or manual single-shot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Auto,
    Manual,
}

impl TimerMode {
    fn active_state(self) -> Lifecycle {
        match self {
            TimerMode::Auto => Lifecycle::ActiveAuto,
            TimerMode::Manual => Lifecycle::ActiveManual,
        }
    }
}

/// Consistent view of one timer, read in a single critical section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub name: String,
    pub state: Lifecycle,
    pub mode: TimerMode,
    pub remaining: u32,
    pub cycle: u32,
    pub custom_duration: u32,
    pub custom: bool,
    pub priority: i32,
    /// Effective normal-mode durations (turbo values while turbo is on)
    pub auto: DurationPair,
    pub manual: DurationPair,
}

impl TimerSnapshot {
    /// Text shown for the timer's countdown
    pub fn display_text(&self) -> String {
        match self.state {
            Lifecycle::ActiveAuto | Lifecycle::ActiveManual | Lifecycle::Paused => format_time(self.remaining),
            Lifecycle::Unconfigured if self.custom && self.custom_duration == 0 => "+".to_string(),
            Lifecycle::Unconfigured | Lifecycle::Inactive => {
                if self.custom {
                    format_time(self.custom_duration)
                } else {
                    match self.mode {
                        TimerMode::Auto => format_time(self.auto.initial),
                        TimerMode::Manual => format_time(self.manual.initial),
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
struct TimerFields {
    state: Lifecycle,
    mode: TimerMode,
    remaining: u32,
    cycle: u32,
    custom_duration: u32,
    auto: DurationPair,
    manual: DurationPair,
}

/// A timer instance; one per definition, alive for the whole process
#[derive(Debug)]
pub struct Timer {
    index: usize,
    definition: TimerDefinition,
    fields: RwLock<TimerFields>,
}

impl Timer {
    /// Create a timer in its initial state (Unconfigured for the custom timer)
    pub fn new(index: usize, definition: TimerDefinition) -> Self {
        let state = if definition.custom {
            Lifecycle::Unconfigured
        } else {
            Lifecycle::Inactive
        };

        Self {
            index,
            fields: RwLock::new(TimerFields {
                state,
                mode: TimerMode::Auto,
                remaining: 0,
                cycle: 0,
                custom_duration: 0,
                auto: definition.normal_auto,
                manual: definition.normal_manual,
            }),
            definition,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TimerFields> {
        self.fields.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TimerFields> {
        self.fields.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Position in configuration order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn sound(&self) -> &str {
        &self.definition.sound
    }

    pub fn priority(&self) -> i32 {
        self.definition.priority
    }

    pub fn is_custom(&self) -> bool {
        self.definition.custom
    }

    pub fn definition(&self) -> &TimerDefinition {
        &self.definition
    }

    pub fn state(&self) -> Lifecycle {
        self.read().state
    }

    pub fn remaining(&self) -> u32 {
        self.read().remaining
    }

    /// Take a consistent snapshot of all mutable fields
    pub fn snapshot(&self) -> TimerSnapshot {
        let fields = self.read();
        TimerSnapshot {
            name: self.definition.name.clone(),
            state: fields.state,
            mode: fields.mode,
            remaining: fields.remaining,
            cycle: fields.cycle,
            custom_duration: fields.custom_duration,
            custom: self.definition.custom,
            priority: self.definition.priority,
            auto: fields.auto,
            manual: fields.manual,
        }
    }

    /// Bring registry membership in line with the current state
    fn sync_membership(self: &Arc<Self>, fields: &TimerFields, registry: &ActiveRegistry) {
        if fields.state.is_active() {
            registry.register(self);
        } else {
            registry.deregister(self);
        }
    }

    /// Start counting in the given mode.
    ///
    /// From Paused this behaves like resume and keeps the remaining time;
    /// otherwise the mode's effective durations are loaded fresh. Returns
    /// false when the custom timer has no duration yet.
    pub fn start(self: &Arc<Self>, registry: &ActiveRegistry, mode: TimerMode) -> bool {
        let mut fields = self.write();

        if self.definition.custom && fields.custom_duration == 0 {
            debug!("{}: start ignored, no custom duration set", self.name());
            return false;
        }

        if fields.state != Lifecycle::Paused {
            let (remaining, cycle) = if self.definition.custom {
                (fields.custom_duration, fields.custom_duration)
            } else {
                match mode {
                    TimerMode::Auto => (fields.auto.initial, fields.auto.repeat),
                    TimerMode::Manual => (fields.manual.initial, fields.manual.repeat),
                }
            };
            fields.remaining = remaining;
            fields.cycle = cycle;
        }

        fields.state = mode.active_state();
        fields.mode = mode;
        self.sync_membership(&fields, registry);

        info!("{}: started {:?} with {}s remaining", self.name(), mode, fields.remaining);
        true
    }

    /// Pause an active timer, remembering its mode
    pub fn pause(self: &Arc<Self>, registry: &ActiveRegistry) -> bool {
        let mut fields = self.write();
        if !fields.state.is_active() {
            return false;
        }

        fields.state = Lifecycle::Paused;
        self.sync_membership(&fields, registry);
        debug!("{}: paused at {}s", self.name(), fields.remaining);
        true
    }

    /// Resume a paused timer in its remembered mode
    pub fn resume(self: &Arc<Self>, registry: &ActiveRegistry) -> bool {
        let mut fields = self.write();
        if fields.state != Lifecycle::Paused {
            return false;
        }

        fields.state = fields.mode.active_state();
        self.sync_membership(&fields, registry);
        debug!("{}: resumed {:?} at {}s", self.name(), fields.mode, fields.remaining);
        true
    }

    /// Return to Inactive, or Unconfigured for the custom timer
    pub fn reset(self: &Arc<Self>, registry: &ActiveRegistry) {
        let mut fields = self.write();

        fields.remaining = 0;
        fields.cycle = 0;
        fields.mode = TimerMode::Auto;
        if self.definition.custom {
            fields.custom_duration = 0;
            fields.state = Lifecycle::Unconfigured;
        } else {
            fields.state = Lifecycle::Inactive;
        }
        self.sync_membership(&fields, registry);
        debug!("{}: reset to {:?}", self.name(), fields.state);
    }

    /// Store a user-supplied duration on the custom timer, making it Inactive
    pub fn set_custom_duration(&self, seconds: u32) -> Result<()> {
        if !self.definition.custom {
            return Err(TimerError::InvalidPrecondition(format!(
                "{} does not accept a custom duration",
                self.name()
            )));
        }
        if seconds == 0 || seconds > MAX_CUSTOM_DURATION_SECS {
            return Err(TimerError::InvalidInput(format!(
                "duration must be between 1 and {} seconds",
                MAX_CUSTOM_DURATION_SECS
            )));
        }

        let mut fields = self.write();
        if !fields.state.is_idle() {
            return Err(TimerError::InvalidPrecondition(format!(
                "{} must be reset before changing its duration",
                self.name()
            )));
        }

        fields.custom_duration = seconds;
        fields.state = Lifecycle::Inactive;
        info!("{}: custom duration set to {}s", self.name(), seconds);
        Ok(())
    }

    /// Advance one second. Returns true when the timer expired in this step.
    ///
    /// On expiry a manual custom timer goes back to Inactive with its custom
    /// duration displayed; every other timer reloads its cycle duration, or
    /// stops when there is no cycle to reload.
    pub fn tick(self: &Arc<Self>, registry: &ActiveRegistry) -> bool {
        let mut fields = self.write();

        // May have been paused or reset after the registry snapshot
        if !fields.state.is_active() {
            return false;
        }

        fields.remaining = fields.remaining.saturating_sub(1);
        if fields.remaining > 0 {
            return false;
        }

        if self.definition.custom && fields.state == Lifecycle::ActiveManual {
            fields.remaining = fields.custom_duration;
            fields.state = Lifecycle::Inactive;
            self.sync_membership(&fields, registry);
        } else if fields.cycle == 0 {
            fields.state = Lifecycle::Inactive;
            self.sync_membership(&fields, registry);
        } else {
            fields.remaining = fields.cycle;
        }

        debug!("{}: expired, now {:?} with {}s", self.name(), fields.state, fields.remaining);
        true
    }

    /// Swap effective durations to the turbo overrides, or restore the originals.
    /// Modes without a turbo override keep their normal durations.
    pub(crate) fn apply_turbo(&self, enabled: bool) {
        let mut fields = self.write();
        if enabled {
            if !self.definition.turbo_auto.is_zero() {
                fields.auto = self.definition.turbo_auto;
            }
            if !self.definition.turbo_manual.is_zero() {
                fields.manual = self.definition.turbo_manual;
            }
        } else {
            fields.auto = self.definition.normal_auto;
            fields.manual = self.definition.normal_manual;
        }
    }
}
