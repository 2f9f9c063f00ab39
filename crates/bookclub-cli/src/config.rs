use clap::{Parser, Subcommand};

use crate::commands::init::InitCmd;

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for bookclub - maintenance commands for the catalogue database."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Init(InitCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Init(cmd) => cmd.run().await,
        }
    }
}
