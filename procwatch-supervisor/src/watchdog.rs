use procwatch_core::{
    BackoffConfig, BackoffStrategy, KillSwitch, ProcessBuilder, ProcessHandle, Termination,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::output;

/// Keeps one process alive for the life of the supervisor.
///
/// Every exit, whatever its cause, is followed by a fresh start. Without a
/// backoff config the next start happens right away, delayed only by the
/// process' own stagger delay, and there is no restart ceiling.
pub struct Watchdog {
    handle: Arc<ProcessHandle>,
    backoff: Option<BackoffStrategy>,
}

impl Watchdog {
    pub fn new(handle: Arc<ProcessHandle>) -> Self {
        Self {
            handle,
            backoff: None,
        }
    }

    pub fn with_backoff(mut self, config: Option<&BackoffConfig>) -> Self {
        self.backoff = config.map(BackoffStrategy::from_config);
        self
    }

    pub fn handle(&self) -> &Arc<ProcessHandle> {
        &self.handle
    }

    /// Spawns the watchdog loop. The receiver fires once the first start
    /// attempt has been made, successful or not.
    pub fn spawn(self) -> (JoinHandle<()>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(self.run(Some(tx)));
        (task, rx)
    }

    pub async fn run(mut self, mut first_attempt: Option<oneshot::Sender<()>>) {
        debug!(process = %self.handle.name(), "[Watchdog] Start monitoring process: {}", self.handle.name());
        loop {
            let started = self.start().await;
            if let Some(tx) = first_attempt.take() {
                let _ = tx.send(());
            }

            let run_started = Instant::now();
            match started {
                Some((child, kill)) => {
                    self.wait(child, kill).await;
                }
                // Nothing to wait on; stay cooperative when the stagger delay is zero
                None => tokio::task::yield_now().await,
            }

            self.pause_before_restart(run_started.elapsed()).await;
            info!(process = %self.handle.name(), "[Watchdog] Process {} exited, restarting...", self.handle.name());
        }
    }

    /// One start/wait cycle. `None` when the process could not be spawned.
    pub async fn run_once(&self) -> Option<Termination> {
        let (child, kill) = self.start().await?;
        Some(self.wait(child, kill).await)
    }

    async fn start(&self) -> Option<(Child, KillSwitch)> {
        let spec = self.handle.spec();
        debug!(
            process = %spec.name,
            "Starting {} with command {} and args {:?}",
            spec.name, spec.command, spec.args
        );
        tokio::time::sleep(spec.stagger_delay()).await;

        let mut child = match ProcessBuilder::from_spec(spec).spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(process = %spec.name, "Failed to start {}: {}", spec.name, e);
                return None;
            }
        };

        let Some(pid) = child.id() else {
            error!(process = %spec.name, "{} exited before its pid could be read", spec.name);
            return None;
        };

        match child.stdout.take() {
            Some(stdout) => {
                output::capture(spec.name.clone(), "stdout", stdout);
            }
            None => debug!(process = %spec.name, "Failed to get stdout pipe for {}", spec.name),
        }
        match child.stderr.take() {
            Some(stderr) => {
                output::capture(spec.name.clone(), "stderr", stderr);
            }
            None => debug!(process = %spec.name, "Failed to get stderr pipe for {}", spec.name),
        }

        let kill = self.handle.set_running(pid);
        debug!(process = %spec.name, pid, "{} started with pid {}", spec.name, pid);
        Some((child, kill))
    }

    async fn wait(&self, mut child: Child, kill: KillSwitch) -> Termination {
        let name = self.handle.name();
        let pid = child.id();

        let status = tokio::select! {
            status = child.wait() => status,
            _ = kill.requested() => {
                debug!(process = %name, "Killing {}", name);
                if let Err(e) = child.start_kill() {
                    warn!(process = %name, "Failed to kill {}: {}", name, e);
                }
                child.wait().await
            }
        };

        let termination = match status {
            Ok(status) => Termination::from_status(status),
            Err(e) => Termination::from_wait_error(&e),
        };

        match &termination {
            Termination::Success => {
                info!(process = %name, "[Watchdog] Process {} {}", name, termination)
            }
            Termination::ExitCode(code) => {
                warn!(process = %name, code, "[Watchdog] Process {} {}", name, termination)
            }
            Termination::Signaled { signal, .. } => {
                warn!(process = %name, signal, "[Watchdog] Process {} {}", name, termination)
            }
            Termination::WaitFailed(_) => {
                error!(process = %name, "[Watchdog] Process {} {}", name, termination)
            }
        }

        if let Some(pid) = pid {
            self.handle.set_exited(pid, termination.clone());
        }
        termination
    }

    async fn pause_before_restart(&mut self, ran_for: Duration) {
        let Some(backoff) = self.backoff.as_mut() else {
            return;
        };

        if ran_for >= backoff.max_delay() {
            backoff.reset();
        }
        let delay = backoff.next_delay();
        debug!(
            process = %self.handle.name(),
            attempt = backoff.attempt(),
            "Restarting {} after {:?}",
            self.handle.name(),
            delay
        );
        tokio::time::sleep(delay).await;
    }
}
