use std::net::SocketAddr;
use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use log::{info, warn};

mod cli;

use cli::Cli;
use ytsum::config::Config;
use ytsum::server::{self, AppState};

fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(path)?);
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    if let Some(path) = log_file {
        info!("Logging to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = Config::load(cli.config.as_deref())?;
    let addr: SocketAddr = match cli.bind {
        Some(addr) => addr,
        None => config
            .bind
            .parse()
            .wrap_err_with(|| format!("invalid bind address {:?}", config.bind))?,
    };

    if std::env::var_os("OPENAI_API_KEY").is_none() && std::env::var_os("ANTHROPIC_API_KEY").is_none() {
        warn!("Neither OPENAI_API_KEY nor ANTHROPIC_API_KEY is set; summaries will fail");
    }
    info!("Summarizer model: {}", config.summarizer.model);

    let state = AppState::from_config(config)?;
    server::serve(addr, server::router(state)).await
}
