//! Smallest useful worker: listens on 127.0.0.1 and accepts connections
//! until it is killed. Handy for trying a config out.

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "procwatch-demo-worker")]
#[command(about = "TCP worker that accepts connections on one port", long_about = None)]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let listener = TcpListener::bind(("127.0.0.1", args.port))
        .await
        .with_context(|| format!("failed to listen on port {}", args.port))?;
    info!("Listening on port {}", args.port);

    loop {
        let (_stream, peer) = listener.accept().await?;
        debug!("Connection from {}", peer);
    }
}
