use std::fmt;
use std::process::Stdio;
use tokio::process::{Child, Command};

use crate::ProcessSpec;

/// How one run of a supervised process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Success,
    ExitCode(i32),
    Signaled { signal: i32, name: String },
    /// Observing the exit failed; the process state is unknown.
    WaitFailed(String),
}

impl Termination {
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(0) => return Termination::Success,
            Some(code) => return Termination::ExitCode(code),
            None => {}
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled {
                    signal,
                    name: signal_name(signal),
                };
            }
        }

        Termination::WaitFailed(format!("unrecognized exit status: {}", status))
    }

    pub fn from_wait_error(err: &std::io::Error) -> Self {
        Termination::WaitFailed(err.to_string())
    }

    pub fn success(&self) -> bool {
        matches!(self, Termination::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Termination::Success => Some(0),
            Termination::ExitCode(code) => Some(*code),
            _ => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            Termination::Signaled { signal, .. } => Some(*signal),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Success => write!(f, "completed successfully"),
            Termination::ExitCode(code) => write!(f, "exited with code: {}", code),
            Termination::Signaled { name, .. } => write!(f, "was terminated by signal: {}", name),
            Termination::WaitFailed(err) => write!(f, "exited with error: {}", err),
        }
    }
}

#[cfg(unix)]
pub fn signal_name(signal: i32) -> String {
    nix::sys::signal::Signal::try_from(signal)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|_| format!("signal {}", signal))
}

#[cfg(not(unix))]
pub fn signal_name(signal: i32) -> String {
    format!("signal {}", signal)
}

pub struct ProcessBuilder {
    command: String,
    args: Vec<String>,
    stdout: Stdio,
    stderr: Stdio,
    stdin: Stdio,
}

impl ProcessBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            stdout: Stdio::piped(),
            stderr: Stdio::piped(),
            stdin: Stdio::null(),
        }
    }

    pub fn from_spec(spec: &ProcessSpec) -> Self {
        Self::new(&spec.command).args(&spec.args)
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn stdout(mut self, stdout: Stdio) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn stderr(mut self, stderr: Stdio) -> Self {
        self.stderr = stderr;
        self
    }

    pub fn stdin(mut self, stdin: Stdio) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn spawn(self) -> crate::Result<Child> {
        tracing::debug!(
            "Spawning process: command='{}', args={:?}",
            self.command,
            self.args
        );

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .stdout(self.stdout)
            .stderr(self.stderr)
            .stdin(self.stdin)
            .kill_on_drop(true);

        cmd.spawn()
            .map_err(|e| crate::Error::SpawnFailed(format!("{}: {}", self.command, e)))
    }
}
