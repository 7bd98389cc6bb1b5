use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Process spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process {0} is not running")]
    NotRunning(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
