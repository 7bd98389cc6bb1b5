use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

/// Forwards every line of a child's stdout or stderr to the log at debug level.
/// The task ends when the stream closes, i.e. when that run of the process ends.
pub fn capture<R>(process: String, stream: &'static str, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => debug!(process = %process, stream, "[{}] {}", process, line),
                Ok(None) => break,
                Err(e) => {
                    debug!(process = %process, stream, "Error reading from pipe for {}: {}", process, e);
                    break;
                }
            }
        }
    })
}
