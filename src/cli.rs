//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the symlink manager.
#[derive(Parser, Debug)]
#[command(
    name = "composer-symlinks",
    about = "Declarative symlink management for Composer projects",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Project directory containing composer.json (defaults to the current directory)
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// PHP version to evaluate php-version conditions against
    #[arg(long, global = true)]
    pub php_version: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create configured symlinks (post-install hook)
    Install,
    /// Create configured symlinks (post-update hook)
    Update,
    /// Create or repair configured symlinks
    Refresh(RefreshOpts),
    /// Show the current status of configured symlinks
    Status(StatusOpts),
    /// Remove every symlink recorded in the registry
    Uninstall,
    /// Print version information
    Version,
}

/// Options for the `refresh` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RefreshOpts {
    /// Show the operations without creating links
    #[arg(long)]
    pub dry_run: bool,
}

/// Options for the `status` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct StatusOpts {
    /// Output the status information as JSON
    #[arg(long)]
    pub json: bool,

    /// Return a non-zero exit code when problems are found
    #[arg(long)]
    pub strict: bool,
}
