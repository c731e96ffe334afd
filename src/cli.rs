use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Validate search-form state and turn it into backend filter trees
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with query and section defaults
    #[arg(short, long, global = true, env = "SEARCH_FORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report the errors of every section in an editor state file
    Validate {
        /// Editor state (JSON5)
        state: PathBuf,
    },
    /// Print the filter tree for a valid editor state file
    Tree {
        /// Editor state (JSON5)
        state: PathBuf,
    },
    /// Print the full query request for a valid editor state file
    Build {
        /// Editor state (JSON5)
        state: PathBuf,

        /// Request id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Batch id (generated when omitted)
        #[arg(long)]
        batch_id: Option<String>,
    },
    /// Rebuild editor state from a filter tree file
    Parse {
        /// Filter tree (JSON5)
        tree: PathBuf,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
