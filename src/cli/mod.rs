use clap::Parser;

mod commands;
pub use commands::*;

#[derive(Parser)]
#[command(name = "nowplay")]
#[command(about = "Show and control what the current media session is playing")]
#[command(version)]
pub struct Cli {
    /// Print the current title and artist once and exit
    #[arg(long)]
    pub once: bool,
}
