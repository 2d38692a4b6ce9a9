mod bridge;
mod cli;
mod config;
mod input;
mod models;
mod realtime;
mod render;
mod session;
mod transport;

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use cli::{App, Cli};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_logging(&config);

    let app = App::new(config);
    if cli.once {
        app.once()?;
    } else {
        app.realtime()?;
    }

    Ok(())
}

/// Logs go to a file: stdout belongs to the display.
fn init_logging(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false);

    let log_file = config.ensure_dirs().and_then(|()| {
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())?)
    });

    match log_file {
        Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::stderr).init(),
    }
}
