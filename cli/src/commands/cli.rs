use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "conductor", version, about = "Multi-agent task orchestrator backed by Windmill")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file. Defaults to ~/.conductor/config.toml, then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service (default)
    Serve(ServeArgs),
    /// Run one task through the agents and print the result as JSON
    Run(RunArgs),
    /// Run a single remote script and print the result as JSON
    Script(ScriptArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Overrides `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides `server.port`
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[arg(long)]
    pub user: String,

    /// Session id; a random one is generated when omitted.
    #[arg(long)]
    pub session: Option<String>,

    /// Skip classification and force a skill (social_media, analytics, workflow, core).
    #[arg(long)]
    pub skill: Option<String>,

    /// Task text
    pub content: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScriptArgs {
    /// Remote script path, e.g. f/openanalyst/core/log_activity
    pub path: String,

    /// Script arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub args: String,
}
