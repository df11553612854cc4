//! Ticker background task
//!
//! Once per period: snapshot the active registry, tick each timer outside
//! the registry lock, raise a single alert for the highest-priority expiry,
//! then request a refresh of every timer.

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::{AppState, Timer};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Run one tick period. Returns the timer that was alerted, if any.
pub fn tick_once(state: &AppState) -> Option<Arc<Timer>> {
    let active = state.registry().snapshot();

    let expired: Vec<Arc<Timer>> = active
        .into_iter()
        .filter(|timer| timer.tick(state.registry()))
        .collect();

    // Highest priority wins; ties go to the first one in registry order
    let chosen = expired.into_iter().reduce(|best, timer| {
        if timer.priority() > best.priority() {
            timer
        } else {
            best
        }
    });

    if let Some(timer) = &chosen {
        state.raise_alert(timer);
    }

    state.notify_refresh_all();
    chosen
}

/// Tick every second until cancelled
pub async fn ticker_task(state: Arc<AppState>, cancel: CancellationToken) {
    run_ticker(state, TICK_PERIOD, cancel).await;
}

/// Tick every `period` until cancelled. Periods missed while the runtime was
/// stalled are skipped, never replayed back-to-back.
pub async fn run_ticker(state: Arc<AppState>, period: Duration, cancel: CancellationToken) {
    info!("Starting ticker task");

    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Ticker cancelled");
                break;
            }

            _ = interval.tick() => {
                if let Some(timer) = tick_once(&state) {
                    debug!("Tick alerted {}", timer.name());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        control::QueueSettings,
        services::LogAlertSink,
        state::{DurationPair, Lifecycle, TimerDefinition, TimerEvent, TimerMode},
    };

    fn state_with(priorities: &[i32]) -> AppState {
        let definitions = priorities
            .iter()
            .enumerate()
            .map(|(i, &priority)| {
                let pair = DurationPair::new(2, 2);
                TimerDefinition::preset(&format!("timer-{}", i), &format!("sound-{}", i), priority, pair, pair)
            })
            .collect();
        let (state, _rx) = AppState::new(definitions, QueueSettings::default(), Arc::new(LogAlertSink));
        state
    }

    #[test]
    fn test_highest_priority_alert_wins() {
        let state = state_with(&[5, 9, 3]);
        for timer in state.timers() {
            timer.start(state.registry(), TimerMode::Auto);
        }

        assert!(tick_once(&state).is_none());
        let alerted = tick_once(&state).unwrap();
        assert_eq!(alerted.name(), "timer-1");

        // Every timer reloaded and kept running
        for timer in state.timers() {
            assert_eq!(timer.state(), Lifecycle::ActiveAuto);
            assert_eq!(timer.remaining(), 2);
        }
    }

    #[test]
    fn test_equal_priority_first_in_registry_order() {
        let state = state_with(&[4, 4]);
        let timers = state.timers().to_vec();
        timers[1].start(state.registry(), TimerMode::Auto);
        timers[0].start(state.registry(), TimerMode::Auto);

        tick_once(&state);
        assert_eq!(tick_once(&state).unwrap().name(), "timer-1");
    }

    #[test]
    fn test_exactly_one_alert_event_per_tick() {
        let state = state_with(&[5, 9, 3]);
        let mut rx = state.subscribe();
        for timer in state.timers() {
            timer.start(state.registry(), TimerMode::Manual);
        }
        tick_once(&state);
        tick_once(&state);

        let mut alerts = 0;
        let mut refreshes = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                TimerEvent::Alert { sound, .. } => {
                    alerts += 1;
                    assert_eq!(sound, "sound-1");
                }
                TimerEvent::Refresh(_) => refreshes += 1,
                TimerEvent::Turbo { .. } => {}
            }
        }
        assert_eq!(alerts, 1);
        assert_eq!(refreshes, 6);
    }

    #[test]
    fn test_inactive_timers_are_not_ticked() {
        let state = state_with(&[1, 2]);
        let timers = state.timers().to_vec();
        timers[0].start(state.registry(), TimerMode::Auto);

        tick_once(&state);
        assert_eq!(timers[0].remaining(), 1);
        assert_eq!(timers[1].remaining(), 0);
        assert_eq!(timers[1].state(), Lifecycle::Inactive);
    }

    #[tokio::test]
    async fn test_ticker_skips_missed_periods_after_stall() {
        let definitions = vec![TimerDefinition::preset(
            "Long",
            "a.ogg",
            1,
            DurationPair::new(100, 100),
            DurationPair::new(100, 100),
        )];
        let (state, _rx) = AppState::new(definitions, QueueSettings::default(), Arc::new(LogAlertSink));
        let state = Arc::new(state);
        let timer = Arc::clone(&state.timers()[0]);
        timer.start(state.registry(), TimerMode::Auto);

        let period = Duration::from_millis(100);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_ticker(Arc::clone(&state), period, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(timer.remaining(), 99);

        // Block the runtime across several periods
        std::thread::sleep(Duration::from_millis(450));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // One catch-up tick at most, not one per missed period
        let remaining = timer.remaining();
        assert!(remaining >= 97, "missed ticks were replayed: remaining={}", remaining);
        assert!(remaining < 99);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_ticker_exits_on_cancel() {
        let state = Arc::new(state_with(&[1]));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(ticker_task(state, cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("ticker did not stop")
            .unwrap();
    }
}
