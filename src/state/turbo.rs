//! Turbo reconfiguration
//!
//! Swaps every timer's effective normal durations for its turbo overrides,
//! or back to the as-loaded values. Runs on the command loop, so no command
//! interleaves with it; the flag's write lock is held for the whole swap so
//! readers of [`TurboMode::read`] never see a partial swap.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tracing::info;

use super::Timer;
use crate::error::{Result, TimerError};

#[derive(Debug, Default)]
pub struct TurboMode {
    enabled: RwLock<bool>,
}

impl TurboMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        *self.read()
    }

    /// Hold the flag for reading; blocks while a swap is in progress
    pub fn read(&self) -> RwLockReadGuard<'_, bool> {
        self.enabled.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enable or disable turbo durations for all timers.
    ///
    /// Enabling requires every timer to be Inactive or Unconfigured and
    /// changes nothing otherwise. Disabling always succeeds.
    pub fn reconfigure(&self, timers: &[Arc<Timer>], enable: bool) -> Result<()> {
        let mut enabled = self.enabled.write().unwrap_or_else(PoisonError::into_inner);

        if enable {
            if let Some(busy) = timers.iter().find(|t| !t.state().is_idle()) {
                return Err(TimerError::InvalidPrecondition(format!(
                    "cannot enable turbo while {} is running or paused",
                    busy.name()
                )));
            }
        }

        for timer in timers {
            timer.apply_turbo(enable);
        }
        *enabled = enable;

        info!("Turbo mode {}", if enable { "enabled" } else { "disabled" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActiveRegistry, DurationPair, TimerDefinition, TimerMode};

    fn timers() -> Vec<Arc<Timer>> {
        vec![
            Arc::new(Timer::new(
                0,
                TimerDefinition::preset("Runes", "a.ogg", 9, DurationPair::new(120, 120), DurationPair::new(110, 120))
                    .with_turbo(DurationPair::new(60, 60), DurationPair::new(50, 60)),
            )),
            Arc::new(Timer::new(
                1,
                TimerDefinition::preset("Shrine", "b.ogg", 3, DurationPair::new(420, 420), DurationPair::new(400, 420)),
            )),
            Arc::new(Timer::new(2, TimerDefinition::custom("Custom Timer", "c.ogg", 1))),
        ]
    }

    #[test]
    fn test_enable_then_disable_round_trips() {
        let turbo = TurboMode::new();
        let timers = timers();
        let before: Vec<_> = timers.iter().map(|t| t.snapshot()).collect();

        turbo.reconfigure(&timers, true).unwrap();
        assert!(turbo.is_enabled());
        assert_eq!(timers[0].snapshot().auto, DurationPair::new(60, 60));
        assert_eq!(timers[0].snapshot().manual, DurationPair::new(50, 60));
        assert_eq!(timers[1].snapshot(), before[1]);

        turbo.reconfigure(&timers, false).unwrap();
        assert!(!turbo.is_enabled());
        let after: Vec<_> = timers.iter().map(|t| t.snapshot()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_enable_rejected_while_active() {
        let turbo = TurboMode::new();
        let registry = ActiveRegistry::new();
        let timers = timers();
        timers[1].start(&registry, TimerMode::Auto);

        let result = turbo.reconfigure(&timers, true);
        assert!(matches!(result, Err(TimerError::InvalidPrecondition(_))));
        assert!(!turbo.is_enabled());
        assert_eq!(timers[0].snapshot().auto, DurationPair::new(120, 120));
    }

    #[test]
    fn test_enable_rejected_while_paused() {
        let turbo = TurboMode::new();
        let registry = ActiveRegistry::new();
        let timers = timers();
        timers[0].start(&registry, TimerMode::Manual);
        timers[0].pause(&registry);

        assert!(turbo.reconfigure(&timers, true).is_err());
    }

    #[test]
    fn test_disable_always_allowed() {
        let turbo = TurboMode::new();
        let registry = ActiveRegistry::new();
        let timers = timers();
        turbo.reconfigure(&timers, true).unwrap();
        timers[0].start(&registry, TimerMode::Auto);

        turbo.reconfigure(&timers, false).unwrap();
        assert_eq!(timers[0].snapshot().auto, DurationPair::new(120, 120));
    }
}
