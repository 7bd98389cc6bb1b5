pub mod monitor;
pub mod output;
pub mod probe;
pub mod restart;
pub mod watchdog;

pub use monitor::HealthMonitor;
pub use probe::{Prober, TcpProber};
pub use restart::{RestartCoordinator, RestartGate, RestartOutcome, RestartPermit};
pub use watchdog::Watchdog;

use procwatch_core::{Config, ProcessHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The supervised fleet: one handle per configured process plus the health
/// monitor and restart coordinator shared by the periodic loop and the HTTP
/// boundary.
pub struct Supervisor {
    config: Arc<Config>,
    handles: Vec<Arc<ProcessHandle>>,
    coordinator: Arc<RestartCoordinator>,
    started: AtomicBool,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Self::with_prober(config, Arc::new(TcpProber::new()))
    }

    pub fn with_prober(config: Config, prober: Arc<dyn Prober>) -> Self {
        let handles: Vec<Arc<ProcessHandle>> = config
            .processes
            .iter()
            .cloned()
            .map(|spec| Arc::new(ProcessHandle::new(spec)))
            .collect();

        let monitor = Arc::new(HealthMonitor::new(handles.clone(), prober));
        let coordinator = Arc::new(RestartCoordinator::new(monitor, handles.clone()));

        Self {
            config: Arc::new(config),
            handles,
            coordinator,
            started: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handles(&self) -> &[Arc<ProcessHandle>] {
        &self.handles
    }

    pub fn monitor(&self) -> &Arc<HealthMonitor> {
        self.coordinator.monitor()
    }

    pub fn coordinator(&self) -> &Arc<RestartCoordinator> {
        &self.coordinator
    }

    /// Launches one watchdog per process in declared order. Each watchdog
    /// makes its first start attempt, stagger delay included, before the
    /// next one is launched. Calling this twice is a no-op.
    pub async fn start(&self) -> Vec<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Processes already started");
            return Vec::new();
        }

        info!("Starting processes...");
        let mut tasks = Vec::with_capacity(self.handles.len());
        for handle in &self.handles {
            let (task, first_attempt) = Watchdog::new(handle.clone())
                .with_backoff(self.config.restart_backoff.as_ref())
                .spawn();
            let _ = first_attempt.await;
            tasks.push(task);
        }
        debug!("All watchdogs launched");
        tasks
    }

    pub fn spawn_health_loop(&self) -> JoinHandle<()> {
        debug!("Starting health check loop...");
        HealthMonitor::spawn_interval_loop(
            self.coordinator.clone(),
            self.config.health_check_interval(),
        )
    }

    pub async fn check_health(&self) -> bool {
        self.monitor().check_all().await
    }

    pub async fn restart(&self) -> RestartOutcome {
        self.coordinator.try_restart().await
    }
}
