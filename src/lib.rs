//! Dotfiles symlink manager.
//!
//! Deploys configuration bundles from a dotfiles repository into the places
//! applications read them from, by creating symbolic links.  Anything already
//! occupying a target path is renamed to a timestamped backup first, so a run
//! never destroys user data, and a second run changes nothing.
//!
//! The public API is organised into layers:
//!
//! - **[`mapping`]**: the validated table of entries (built-in or TOML)
//! - **[`selection`]**: `--all` / `--limit` / `--exclude` filtering by name
//! - **[`settings`]** and **[`platform`]**: environment and config-root resolution
//! - **[`resources`]**: idempotent `check + apply` symlink and backup primitives
//! - **[`manager`]**: ordered, failure-isolating apply and its [`manager::ApplyReport`]
//! - **[`commands`]**: CLI orchestration and exit codes
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod manager;
pub mod mapping;
pub mod operations;
pub mod platform;
pub mod resources;
pub mod selection;
pub mod settings;

/// Version string embedded by `build.rs`, falling back to the crate version.
pub const VERSION: &str = match option_env!("DOTLINKS_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
