//! Declarative symlink management for Composer projects.
//!
//! Reads `extra."somework/composer-symlinks"` from `composer.json`, creates
//! the configured links (falling back to junctions, hard links or copies on
//! Windows), and records what it created in a registry under the vendor
//! directory so later runs can detect drift and clean up.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** — manifest loading, option coercion, placeholders,
//!   conditions, and the factory producing [`resources::symlink::Symlink`]s
//! - **[`resources`]** — link creation strategies, the processor and the registry
//! - **[`report`]** — drift classification for the `status` command
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod report;
pub mod resources;
