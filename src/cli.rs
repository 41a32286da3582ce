use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "YouTube transcript summary service",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Config file (default: ~/.config/ytsum/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["ytsum"]);
        assert!(cli.config.is_none());
        assert!(cli.bind.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["ytsum", "--config", "/etc/ytsum.toml", "--bind", "127.0.0.1:9000", "-v"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ytsum.toml")));
        assert_eq!(cli.bind, Some("127.0.0.1:9000".parse().unwrap()));
        assert!(cli.verbose);
    }

    #[test]
    fn test_rejects_bad_bind() {
        assert!(Cli::try_parse_from(["ytsum", "--bind", "nowhere"]).is_err());
    }
}
