mod cli;
mod daemon;
mod http;

use clap::Parser;
use procwatch_core::LogLevel;
use tracing::warn;
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Config loading is logged too, so start with the flag's level and
    // switch to the config's once it is known
    let filter = init_tracing(cli.log_level);
    let config = daemon::load_config(cli.config.as_deref()).await?;
    if let (Some(filter), None) = (&filter, cli.log_level) {
        if let Err(e) = filter.reload(EnvFilter::new(config.log_level.as_filter())) {
            warn!("Failed to apply log level {}: {}", config.log_level, e);
        }
    }

    daemon::run(config, cli.listen).await
}

/// `RUST_LOG` wins outright and is never reloaded. Otherwise the returned
/// handle lets the configured level replace the provisional one.
fn init_tracing(level: Option<LogLevel>) -> Option<FilterHandle> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        return None;
    }

    let (filter, handle) =
        reload::Layer::new(EnvFilter::new(level.unwrap_or_default().as_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    Some(handle)
}
