use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "roster", about = "Terminal presence dashboard (CLI + TUI)")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the TUI dashboard
    Run {
        /// Treat the page as a single-question page, optionally with its id
        #[arg(long, value_name = "ID", num_args = 0..=1)]
        question: Option<Option<String>>,

        /// Extra page parameters as key=value pairs
        #[arg(long = "page-param", value_name = "KEY=VALUE")]
        page_params: Vec<String>,

        /// Pre-filled tag filter input, applied before any keystroke
        #[arg(long)]
        filter: Option<String>,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run {
            question: None,
            page_params: Vec::new(),
            filter: None,
        })
    }
}
