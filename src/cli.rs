use std::path::PathBuf;

use crate::config::DEFAULT_REFRESH_SECS;

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show data paths, detected plan and usage analysis, then exit
    Info,
}

#[derive(clap::Parser, Debug)]
#[command(
    name = "cctracker",
    version,
    about = "Claude Code rate limit tracker: real-time monitoring of weighted token usage"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Subscription plan: pro|max5|max20|custom_max|auto
    #[arg(short, long, default_value = "auto")]
    pub plan: String,

    /// Claude data directory; repeat for several. Defaults to CLAUDE_DATA_PATHS,
    /// CLAUDE_DATA_PATH, then ~/.claude/projects and ~/.config/claude/projects
    #[arg(short = 'd', long = "data-path", global = true)]
    pub data_path: Vec<PathBuf>,

    /// Refresh interval in seconds (minimum 1)
    #[arg(short, long, default_value_t = DEFAULT_REFRESH_SECS)]
    pub refresh: u64,

    /// Disable plan detection when --plan pro is given
    #[arg(long)]
    pub no_auto_detect: bool,

    /// Render a single snapshot and exit
    #[arg(long)]
    pub once: bool,

    /// Emit JSON instead of colored text (implies --once)
    #[arg(long)]
    pub json: bool,

    /// Debug mode: verbose logging to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}
