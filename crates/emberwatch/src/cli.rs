//! Clap derive structures for the `emberwatch` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of workspace types so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// emberwatch -- emergency dashboard for the terminal
#[derive(Debug, Parser)]
#[command(
    name = "emberwatch",
    version,
    about = "Track and triage emergency incidents from the command line",
    long_about = "Shows the live incident board, cycles incident status, reports new \
        incidents and follows the alert signal.\n\n\
        Without backend credentials every command runs against a built-in \
        demo board that lives only for the duration of the command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EMBERWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Seconds to wait for the backend (requests and first data)
    #[arg(long, env = "EMBERWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Ignore configured credentials and use the demo board
    #[arg(long, global = true)]
    pub demo: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FilterArg {
    #[default]
    All,
    Fire,
    Medical,
    Patrol,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    InProgress,
    Resolved,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the incident board
    #[command(alias = "ls")]
    List(ListArgs),

    /// Follow the incident board, printing it on every change
    Watch(WatchArgs),

    /// Report a new incident
    Add(AddArgs),

    /// Advance an incident to its next status, or set one explicitly
    Status(StatusArgs),

    /// Show the latest alert signal
    Alert(AlertArgs),

    /// Replace the backend collection with the sample incident set
    Seed,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Board commands ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show incidents of this type
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: FilterArg,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only show incidents of this type
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: FilterArg,

    /// Exit after printing this many boards
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Incident type (fire, medical, patrol). Anything else picks one at random.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub kind: Option<String>,

    /// Latitude; random within the demo area when omitted
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude; random within the demo area when omitted
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Incident id (a unique prefix is enough)
    pub id: String,

    /// Set this status instead of advancing to the next one
    #[arg(long)]
    pub set: Option<StatusArg>,
}

#[derive(Debug, Args)]
pub struct AlertArgs {
    /// Keep following the signal until interrupted
    #[arg(long)]
    pub follow: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Create a config file interactively
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
