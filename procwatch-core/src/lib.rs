pub mod backoff;
pub mod config;
pub mod error;
pub mod handle;
pub mod process;

pub use backoff::BackoffStrategy;
pub use config::{BackoffConfig, Config, ConfigLoader, LogLevel, ProcessSpec};
pub use error::{Error, Result};
pub use handle::{KillSwitch, ProcessHandle};
pub use process::{ProcessBuilder, Termination};
