use procwatch_core::ProcessHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::probe::Prober;
use crate::restart::{RestartCoordinator, RestartOutcome};

/// Probes every supervised process' port, in declared order.
pub struct HealthMonitor {
    handles: Vec<Arc<ProcessHandle>>,
    prober: Arc<dyn Prober>,
}

impl HealthMonitor {
    pub fn new(handles: Vec<Arc<ProcessHandle>>, prober: Arc<dyn Prober>) -> Self {
        Self { handles, prober }
    }

    /// `true` only if every process answered. Stops at the first failure, so
    /// processes declared after it are not probed.
    pub async fn check_all(&self) -> bool {
        for handle in &self.handles {
            debug!(process = %handle.name(), "Checking network health of {}...", handle.name());
            if !self.prober.probe(handle.port()).await {
                debug!(process = %handle.name(), port = handle.port(), "{} is not reachable", handle.name());
                return false;
            }
            debug!(process = %handle.name(), "Connected to {}", handle.name());
        }
        true
    }

    /// Periodic check: sleep, probe, and on failure hand over to the
    /// coordinator, which defers to any restart already in progress.
    pub fn spawn_interval_loop(
        coordinator: Arc<RestartCoordinator>,
        interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if coordinator.monitor().check_all().await {
                    info!("Network connection to all processes is healthy");
                    continue;
                }

                info!("One or more processes are not accessible over network, restarting processes...");
                match coordinator.try_restart().await {
                    RestartOutcome::Skipped => {
                        info!("Restart already in progress, skipping health check")
                    }
                    RestartOutcome::NotNeeded => {
                        info!("Processes recovered before restart, nothing to do")
                    }
                    RestartOutcome::Performed { stopped } => {
                        info!(stopped, "Processes restarted")
                    }
                }
            }
        })
    }
}
