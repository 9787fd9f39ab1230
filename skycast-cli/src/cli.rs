use clap::{Parser, Subcommand};

use crate::app;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API credential.
    Configure,

    /// Show weather for a location once and exit.
    Show {
        /// Location name, e.g. "Paris" or "Paris,FR".
        location: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => app::configure(),
            Some(Command::Show { location }) => app::show_once(&location).await,
            None => app::interactive().await,
        }
    }
}
