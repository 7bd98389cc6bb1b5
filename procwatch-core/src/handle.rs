use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

use crate::{ProcessSpec, Termination};

/// Runtime state of one supervised process.
///
/// The handle lives for the whole supervisor lifetime; only the OS identity
/// inside it is replaced on every restart. Its own watchdog is the only
/// writer of that identity, stop and status paths only read it.
#[derive(Debug)]
pub struct ProcessHandle {
    spec: ProcessSpec,
    identity: RwLock<Option<Identity>>,
    last_termination: RwLock<Option<Termination>>,
    starts: AtomicU64,
}

#[derive(Debug)]
struct Identity {
    pid: u32,
    started_at: Instant,
    kill: KillSwitch,
}

/// Kill request for one incarnation of a process.
///
/// A fresh switch is handed out on every start, so a request that arrives
/// after that incarnation exited dies with it and never reaches a successor.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch(Arc<Notify>);

impl KillSwitch {
    fn trigger(&self) {
        self.0.notify_one();
    }

    /// Resolves once a kill has been requested.
    pub async fn requested(&self) {
        self.0.notified().await
    }
}

impl ProcessHandle {
    pub fn new(spec: ProcessSpec) -> Self {
        Self {
            spec,
            identity: RwLock::new(None),
            last_termination: RwLock::new(None),
            starts: AtomicU64::new(0),
        }
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn port(&self) -> u16 {
        self.spec.port
    }

    /// Records a freshly spawned process, retiring any previous identity.
    /// The returned switch fires when [`kill`](Self::kill) targets this process.
    pub fn set_running(&self, pid: u32) -> KillSwitch {
        let kill = KillSwitch::default();
        *self.identity.write() = Some(Identity {
            pid,
            started_at: Instant::now(),
            kill: kill.clone(),
        });
        self.starts.fetch_add(1, Ordering::SeqCst);
        kill
    }

    /// Clears the identity if it still belongs to `pid` and stores how it ended.
    pub fn set_exited(&self, pid: u32, termination: Termination) {
        {
            let mut identity = self.identity.write();
            if identity.as_ref().is_some_and(|current| current.pid == pid) {
                *identity = None;
            }
        }
        *self.last_termination.write() = Some(termination);
    }

    pub fn pid(&self) -> Option<u32> {
        self.identity.read().as_ref().map(|identity| identity.pid)
    }

    pub fn uptime(&self) -> Option<Duration> {
        self.identity
            .read()
            .as_ref()
            .map(|identity| identity.started_at.elapsed())
    }

    pub fn is_running(&self) -> bool {
        self.identity.read().is_some()
    }

    /// Number of successful spawns so far.
    pub fn starts(&self) -> u64 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn last_termination(&self) -> Option<Termination> {
        self.last_termination.read().clone()
    }

    /// Asks the watchdog owning the current process to SIGKILL it and returns
    /// that process' pid. Does not wait for it to exit.
    ///
    /// No signal is sent to the pid directly: the owner kills the child it
    /// still holds, so a pid reaped and recycled in the meantime is never hit.
    pub fn kill(&self) -> crate::Result<u32> {
        let identity = self.identity.read();
        let Some(current) = identity.as_ref() else {
            return Err(crate::Error::NotRunning(self.spec.name.clone()));
        };
        current.kill.trigger();
        Ok(current.pid)
    }
}
