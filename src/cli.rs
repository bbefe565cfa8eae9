//! Command-line interface definitions and shared output helpers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Parser)]
#[command(
    name = "grow",
    version,
    about = "Component manager for the Growing design-system taxonomy",
    long_about = "Locates, extracts, renames, and grafts SCSS/JS components from the \
                  Growing source taxonomy into a project tree, generating matching HTML \
                  for structural components."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress progress output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Report planned changes without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// Global flags threaded through every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppContext {
    pub quiet: bool,
    pub no_color: bool,
    pub dry_run: bool,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract components and graft them into the project tree
    Grow(GrowArgs),
    /// Promote sprouts with their full dependency closure
    Promote(PromoteArgs),
    /// Search source files for matching components
    Search(SearchArgs),
    /// Remove components from the tree
    Clean(CleanArgs),
    /// Re-extract components already in the tree
    Update(UpdateArgs),
    /// Check tree structure, caches, and source directories
    Validate(ValidateArgs),
    /// Inspect or clear the learned mapping caches
    Cache(CacheArgs),
    /// Scaffold a starter project layout
    New(NewArgs),
    /// Write a default grow.toml
    Init(InitArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct GrowArgs {
    /// Components to grow, as name[:new-name]
    #[arg(required = true)]
    pub components: Vec<String>,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Force a component kind instead of the name heuristic
    #[arg(long = "type", value_name = "KIND")]
    pub kind: Option<String>,

    /// Pull in one level of sprout dependencies for trunks
    #[arg(long)]
    pub auto_deps: bool,

    /// Fall back to the configured sync provider when local lookup fails
    #[arg(long)]
    pub online: bool,

    /// Remote repository consulted by --online
    #[arg(long, default_value = "codessa-registry")]
    pub repository: String,
}

#[derive(Debug, Args)]
pub struct PromoteArgs {
    /// Sprouts to promote
    #[arg(required = true)]
    pub components: Vec<String>,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Term matched against component names
    pub term: String,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Restrict the search to one kind
    #[arg(long = "type", value_name = "KIND")]
    pub kind: Option<String>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Components to remove from the tree
    #[arg(required_unless_present = "all")]
    pub components: Vec<String>,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Reset the tree to its empty skeleton
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Components to re-extract
    #[arg(required = true)]
    pub components: Vec<String>,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Force a component kind instead of the name heuristic
    #[arg(long = "type", value_name = "KIND")]
    pub kind: Option<String>,

    /// Pull in one level of sprout dependencies for trunks
    #[arg(long)]
    pub auto_deps: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Check the tree document only
    #[arg(long)]
    pub tree: bool,

    /// Check the mapping caches only
    #[arg(long)]
    pub cache: bool,
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Drop every learned mapping
    Clear,
    /// Print all learned mappings
    List,
    /// Per-kind mapping counts and freshness
    Stats,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Name of the project directory to create
    pub name: String,

    /// Parent directory (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Scaffold even if the target directory exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<String>,

    /// Overwrite an existing grow.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Directory to write the completion file into
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Success line: green check plus message.
pub fn ok(msg: &str) {
    println!(
        "{} {msg}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green())
    );
}

/// Advisory line: yellow bang plus message.
pub fn note(msg: &str) {
    println!(
        "{} {msg}",
        "!".if_supports_color(Stream::Stdout, |t| t.yellow())
    );
}

/// Failure line: red cross plus message. Per-component failures are
/// reported here and recovered; they do not abort the batch.
pub fn fail(msg: &str) {
    println!(
        "{} {msg}",
        "✗".if_supports_color(Stream::Stdout, |t| t.red())
    );
}
