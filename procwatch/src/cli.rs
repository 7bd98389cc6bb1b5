use clap::Parser;
use procwatch_core::LogLevel;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "procwatch")]
#[command(about = "Keeps a fixed set of worker processes alive and reachable", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to procwatch.json or config.json in . or ./config)
    #[arg(short, long, env = "PROCWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address for the health/restart HTTP endpoints (overrides httpPort)
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Log level: DEBUG, INFO or ERROR (overrides logLevel)
    #[arg(long)]
    pub log_level: Option<LogLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["procwatch"]);
        assert!(cli.config.is_none());
        assert!(cli.listen.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "procwatch",
            "--config",
            "/etc/procwatch.json",
            "--listen",
            "127.0.0.1:9090",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/procwatch.json")));
        assert_eq!(cli.listen, Some("127.0.0.1:9090".parse().unwrap()));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["procwatch", "--log-level", "loud"]).is_err());
    }
}
