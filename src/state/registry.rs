//! Active-timer registry
//!
//! Set of timers currently advanced by the ticker. It has its own lock,
//! independent of any timer's lock. Membership is only changed from inside a
//! timer's transition methods.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Timer;

#[derive(Debug, Default)]
pub struct ActiveRegistry {
    timers: Mutex<Vec<Arc<Timer>>>,
}

impl ActiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Timer>>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a timer; no-op if already present
    pub(crate) fn register(&self, timer: &Arc<Timer>) {
        let mut timers = self.lock();
        if !timers.iter().any(|t| Arc::ptr_eq(t, timer)) {
            timers.push(Arc::clone(timer));
        }
    }

    /// Remove a timer; no-op if absent
    pub(crate) fn deregister(&self, timer: &Arc<Timer>) {
        self.lock().retain(|t| !Arc::ptr_eq(t, timer));
    }

    pub fn contains(&self, timer: &Arc<Timer>) -> bool {
        self.lock().iter().any(|t| Arc::ptr_eq(t, timer))
    }

    /// Copy of the current members, in insertion order
    pub fn snapshot(&self) -> Vec<Arc<Timer>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DurationPair, TimerDefinition};

    fn timer(name: &str) -> Arc<Timer> {
        let pair = DurationPair::new(10, 10);
        Arc::new(Timer::new(0, TimerDefinition::preset(name, "a.ogg", 1, pair, pair)))
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = ActiveRegistry::new();
        let a = timer("a");

        registry.register(&a);
        registry.register(&a);
        assert_eq!(registry.len(), 1);

        registry.deregister(&a);
        registry.deregister(&a);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let registry = ActiveRegistry::new();
        let a = timer("a");
        let b = timer("b");

        registry.register(&b);
        registry.register(&a);

        let snapshot = registry.snapshot();
        assert!(Arc::ptr_eq(&snapshot[0], &b));
        assert!(Arc::ptr_eq(&snapshot[1], &a));

        // Snapshot is detached from later membership changes
        registry.deregister(&b);
        assert_eq!(snapshot.len(), 2);
        assert!(!registry.contains(&b));
        assert!(registry.contains(&a));
    }
}
