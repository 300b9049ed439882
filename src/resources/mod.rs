//! File-system side of the engine: link records, creation and the registry.
pub mod helpers;
pub mod link;
pub mod processor;
pub mod registry;
pub mod symlink;
