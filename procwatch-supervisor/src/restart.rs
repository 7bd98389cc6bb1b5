use procwatch_core::ProcessHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::monitor::HealthMonitor;

/// Fleet-wide lock ensuring restarts never overlap. Only ever try-acquired.
#[derive(Debug, Default)]
pub struct RestartGate {
    lock: Mutex<()>,
    held: AtomicBool,
}

/// Proof of holding the gate; releases it on drop.
#[derive(Debug)]
pub struct RestartPermit<'a> {
    _guard: MutexGuard<'a, ()>,
    held: &'a AtomicBool,
}

impl Drop for RestartPermit<'_> {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

impl RestartGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means a restart is already in progress.
    pub fn try_acquire(&self) -> Option<RestartPermit<'_>> {
        let guard = self.lock.try_lock().ok()?;
        self.held.store(true, Ordering::SeqCst);
        Some(RestartPermit {
            _guard: guard,
            held: &self.held,
        })
    }

    /// Reads the held flag only; never contends for the lock.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// The fleet was still unhealthy; `stopped` processes were killed.
    Performed { stopped: usize },
    /// Everything recovered between detection and acquiring the gate.
    NotNeeded,
    /// Another restart held the gate; nothing was touched.
    Skipped,
}

/// Decides whether the fleet needs a restart and stops every process if so.
/// Bringing processes back is left to their watchdogs.
pub struct RestartCoordinator {
    gate: RestartGate,
    monitor: Arc<HealthMonitor>,
    handles: Vec<Arc<ProcessHandle>>,
}

impl RestartCoordinator {
    pub fn new(monitor: Arc<HealthMonitor>, handles: Vec<Arc<ProcessHandle>>) -> Self {
        Self {
            gate: RestartGate::new(),
            monitor,
            handles,
        }
    }

    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        &self.monitor
    }

    pub fn is_restarting(&self) -> bool {
        self.gate.is_held()
    }

    pub async fn try_restart(&self) -> RestartOutcome {
        let Some(_permit) = self.gate.try_acquire() else {
            info!("Restart already in progress, ignoring request");
            return RestartOutcome::Skipped;
        };

        if self.monitor.check_all().await {
            info!("All processes are healthy, no need to restart");
            return RestartOutcome::NotNeeded;
        }

        debug!("One or more processes are not healthy. Restarting processes...");
        let stopped = self.stop_all();
        RestartOutcome::Performed { stopped }
    }

    /// Requests a kill for every process that currently has an identity;
    /// returns how many were asked. Does not wait for them to exit.
    fn stop_all(&self) -> usize {
        let mut stopped = 0;
        for handle in &self.handles {
            match handle.kill() {
                Ok(pid) => {
                    debug!(process = %handle.name(), pid, "Stopping {} with pid {}", handle.name(), pid);
                    stopped += 1;
                }
                Err(e) => {
                    debug!(process = %handle.name(), "{}", e);
                }
            }
        }
        stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_is_exclusive() {
        let gate = RestartGate::new();
        assert!(!gate.is_held());

        let guard = gate.try_acquire();
        assert!(guard.is_some());
        assert!(gate.is_held());
        assert!(gate.try_acquire().is_none());

        drop(guard);
        assert!(!gate.is_held());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_observing_gate_does_not_take_it() {
        let gate = RestartGate::new();
        for _ in 0..1000 {
            assert!(!gate.is_held());
        }
        let permit = gate.try_acquire();
        assert!(permit.is_some());
    }
}
