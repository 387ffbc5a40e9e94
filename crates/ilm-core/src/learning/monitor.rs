//! Background health poll for the learning store.
//!
//! Each tick probes the store on the blocking pool and evicts stale sessions.
//! After `threshold` consecutive probe failures the target is reinitialized and
//! the counter resets, whether or not the reinit succeeded.

use crate::error::CoreResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// What the monitor drives. Implemented by [`crate::Assistant`].
pub trait MonitorTarget: Send + Sync + 'static {
    fn probe(&self) -> CoreResult<()>;
    fn reinitialize(&self) -> CoreResult<()>;
    /// Returns the number of sessions removed.
    fn evict_stale_sessions(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Healthy,
    Failing { consecutive: u32 },
    Reinitialized,
    ReinitFailed,
}

pub struct LearningMonitor {
    threshold: u32,
    consecutive_failures: u32,
}

impl LearningMonitor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// One synchronous tick. Blocking: call from the blocking pool.
    pub fn tick<T: MonitorTarget + ?Sized>(&mut self, target: &T) -> TickOutcome {
        let evicted = target.evict_stale_sessions();
        if evicted > 0 {
            tracing::debug!(target: "ilm::monitor", evicted, "Evicted stale sessions");
        }

        match target.probe() {
            Ok(()) => {
                if self.consecutive_failures > 0 {
                    tracing::info!(
                        target: "ilm::monitor",
                        after_failures = self.consecutive_failures,
                        "Learning store reachable again"
                    );
                }
                self.consecutive_failures = 0;
                return TickOutcome::Healthy;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                tracing::warn!(
                    target: "ilm::monitor",
                    consecutive = self.consecutive_failures,
                    kind = e.kind(),
                    error = %e,
                    "Learning store probe failed"
                );
            }
        }

        if self.consecutive_failures < self.threshold {
            return TickOutcome::Failing {
                consecutive: self.consecutive_failures,
            };
        }

        self.consecutive_failures = 0;
        match target.reinitialize() {
            Ok(()) => {
                tracing::info!(target: "ilm::monitor", "Learning subsystem reinitialized");
                TickOutcome::Reinitialized
            }
            Err(e) => {
                tracing::error!(
                    target: "ilm::monitor",
                    kind = e.kind(),
                    error = %e,
                    "Critical: learning subsystem reinitialization failed"
                );
                TickOutcome::ReinitFailed
            }
        }
    }

    /// Spawns the polling loop on the current runtime. The loop runs until the
    /// runtime shuts down or the handle is aborted.
    pub fn spawn<T: MonitorTarget>(target: Arc<T>, interval: Duration, threshold: u32) -> JoinHandle<()> {
        let interval = interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            tracing::info!(
                target: "ilm::monitor",
                interval_ms = interval.as_millis() as u64,
                threshold,
                "Learning monitor started"
            );
            let mut monitor = Self::new(threshold);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval's first tick fires immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let target = Arc::clone(&target);
                let result = tokio::task::spawn_blocking(move || {
                    let outcome = monitor.tick(target.as_ref());
                    (monitor, outcome)
                })
                .await;
                match result {
                    Ok((m, _)) => monitor = m,
                    Err(e) => {
                        tracing::error!(target: "ilm::monitor", error = %e, "Monitor tick panicked");
                        monitor = Self::new(threshold);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Fake {
        failing: AtomicBool,
        reinit_fails: AtomicBool,
        reinits: AtomicUsize,
        evictions: AtomicUsize,
    }

    impl MonitorTarget for Fake {
        fn probe(&self) -> CoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(CoreError::Internal("store closed".into()))
            } else {
                Ok(())
            }
        }

        fn reinitialize(&self) -> CoreResult<()> {
            self.reinits.fetch_add(1, Ordering::SeqCst);
            if self.reinit_fails.load(Ordering::SeqCst) {
                Err(CoreError::Internal("still locked".into()))
            } else {
                self.failing.store(false, Ordering::SeqCst);
                Ok(())
            }
        }

        fn evict_stale_sessions(&self) -> usize {
            self.evictions.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[test]
    fn reinitializes_after_threshold_failures() {
        let target = Fake::default();
        let mut m = LearningMonitor::new(3);
        assert_eq!(m.tick(&target), TickOutcome::Healthy);

        target.failing.store(true, Ordering::SeqCst);
        assert_eq!(m.tick(&target), TickOutcome::Failing { consecutive: 1 });
        assert_eq!(m.tick(&target), TickOutcome::Failing { consecutive: 2 });
        assert_eq!(m.tick(&target), TickOutcome::Reinitialized);
        assert_eq!(m.consecutive_failures(), 0);
        assert_eq!(target.reinits.load(Ordering::SeqCst), 1);
        assert_eq!(m.tick(&target), TickOutcome::Healthy);
        assert_eq!(target.evictions.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn success_resets_counter() {
        let target = Fake::default();
        let mut m = LearningMonitor::new(3);
        target.failing.store(true, Ordering::SeqCst);
        m.tick(&target);
        m.tick(&target);
        target.failing.store(false, Ordering::SeqCst);
        assert_eq!(m.tick(&target), TickOutcome::Healthy);
        target.failing.store(true, Ordering::SeqCst);
        assert_eq!(m.tick(&target), TickOutcome::Failing { consecutive: 1 });
        assert_eq!(target.reinits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_reinit_keeps_monitoring() {
        let target = Fake::default();
        target.failing.store(true, Ordering::SeqCst);
        target.reinit_fails.store(true, Ordering::SeqCst);
        let mut m = LearningMonitor::new(2);
        m.tick(&target);
        assert_eq!(m.tick(&target), TickOutcome::ReinitFailed);
        m.tick(&target);
        assert_eq!(m.tick(&target), TickOutcome::ReinitFailed);
        assert_eq!(target.reinits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn spawned_loop_ticks_in_background() {
        let target = Arc::new(Fake::default());
        target.failing.store(true, Ordering::SeqCst);
        let handle = LearningMonitor::spawn(Arc::clone(&target), Duration::from_millis(5), 2);
        for _ in 0..200 {
            if target.reinits.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        handle.abort();
        assert!(target.reinits.load(Ordering::SeqCst) >= 1);
        assert!(!target.failing.load(Ordering::SeqCst));
    }
}
