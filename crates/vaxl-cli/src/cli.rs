use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vaxl",
    about = "vaxl: subject and dose registries over a key-value world state",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file (default: ./vaxl.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the world-state files
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed both registries
    Init,
    /// Run a function and commit its writes
    Submit(InvokeArgs),
    /// Run a function without committing anything
    Evaluate(InvokeArgs),
    /// List the functions a contract exposes
    Functions(FunctionsArgs),
    /// Walk through seeding, creating, updating and listing doses
    Demo,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// `subject` (or `user`) / `dose` (or `vaccine`)
    pub contract: String,
    pub function: String,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FunctionsArgs {
    /// Limit the listing to one contract
    pub contract: Option<String>,
}
