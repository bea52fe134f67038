//! Clap derive structures for the `lawliet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lawliet -- drive a file-carving recovery service from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "lawliet",
    version,
    about = "Recover deleted files from disk images and block devices",
    long_about = "Client for a Lawliet file-carving service.\n\n\
        Upload disk images, pick an image or block device, run a carving\n\
        job with live progress, then browse and download recovered files.",
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
    /// Service profile to use
    #[arg(long, short = 'p', env = "LAWLIET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Service API root, e.g. http://localhost:5000/api (overrides profile)
    #[arg(long, short = 's', env = "LAWLIET_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LAWLIET_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LAWLIET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LAWLIET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// YAML
    Yaml,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage disk images stored on the service
    #[command(alias = "img", alias = "i")]
    Images(ImagesArgs),

    /// List block devices the service can read
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Start a carving job and follow its progress
    #[command(alias = "run")]
    Recover(RecoverArgs),

    /// Show the progress of a server operation
    Progress(ProgressArgs),

    /// Browse and download recovered files
    #[command(alias = "f")]
    Files(FilesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IMAGES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ImagesArgs {
    #[command(subcommand)]
    pub command: ImagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ImagesCommand {
    /// List stored images
    #[command(alias = "ls")]
    List,

    /// Upload a disk image (.raw, .img, .dd, .bin)
    #[command(alias = "up")]
    Upload {
        /// Local image file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Delete a stored image
    #[command(alias = "rm")]
    Delete {
        /// Image name as listed by `images list`
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List discovered block devices
    #[command(alias = "ls")]
    List {
        /// Only show unmounted devices (the ones a job may read)
        #[arg(long)]
        unmounted: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RECOVER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["image", "device", "device_path"])
))]
pub struct RecoverArgs {
    /// Carve a stored image
    #[arg(long, short = 'i', value_name = "NAME")]
    pub image: Option<String>,

    /// Carve a discovered block device
    #[arg(long, short = 'd', value_name = "PATH")]
    pub device: Option<String>,

    /// Carve a device path typed by hand (bypasses discovery)
    #[arg(long, value_name = "PATH")]
    pub device_path: Option<String>,

    /// Read buffer in MB (1-1024; defaults to the configured value)
    #[arg(long, short = 'b', value_name = "MB")]
    pub buffer_size: Option<u32>,

    /// Submit the job and return without following progress
    #[arg(long)]
    pub detach: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROGRESS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProgressArgs {
    /// Operation name
    #[arg(default_value = "file_recovery")]
    pub operation: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// List recovered files
    #[command(alias = "ls")]
    List {
        /// Only files of this format (e.g. jpeg, pdf); "all" for every format
        #[arg(long = "type", short = 't', default_value = "all", value_name = "FORMAT")]
        file_type: String,

        /// Only files carved from this image or device; "all" for every source
        #[arg(long, short = 'S', default_value = "all")]
        source: String,
    },

    /// List the formats and sources present in the catalog
    Facets,

    /// Download a recovered file
    #[command(alias = "get")]
    Download {
        /// Path as listed by `files list`, e.g. jpeg/restored_1.jpg
        path: String,

        /// Destination file or directory (defaults to the file name)
        #[arg(long, short = 'd', value_name = "DEST")]
        dest: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
