use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "provbench",
    about = "Provider test support: sweep leftover test resources and check credentials",
    version
)]
pub struct Cli {
    /// Log line format.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Delete leftover test resources in a region.
    Sweep {
        /// Region to sweep.
        #[arg(long, env = "GOOGLE_REGION")]
        region: String,

        /// Run only these sweepers (and their dependencies). Repeatable.
        #[arg(long = "sweeper")]
        sweepers: Vec<String>,

        /// Report format.
        #[arg(long, default_value = "text")]
        output: ReportOutput,
    },

    /// List the registered sweepers in execution order.
    Sweepers,

    /// Show the account the configured credentials belong to.
    Whoami {
        /// Provider config YAML. Falls back to the environment when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Region for environment-based configuration.
        #[arg(long, env = "GOOGLE_REGION", default_value = "us-central1")]
        region: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportOutput {
    Text,
    Json,
}
