//! Command-line interface.
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

use crate::mapping::TargetOverride;
use crate::selection::SelectionFilter;

/// Deploy dotfile bundles from a repository into the home directory via
/// symlinks, backing up anything already in the way.
#[derive(Parser, Debug)]
#[command(
    name = "dotlinks",
    about = "Dotfiles symlink manager",
    version = crate::VERSION,
    disable_help_flag = true,
    after_help = "Without --all or --limit, prints this help and the entry list."
)]
#[command(group(ArgGroup::new("selection").args(["all", "limit"]).multiple(false)))]
pub struct Cli {
    /// Link every entry in the mapping
    #[arg(long)]
    pub all: bool,

    /// Link only these entries (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub limit: Vec<String>,

    /// Skip these entries (comma-separated; unknown names are ignored)
    #[arg(long, value_delimiter = ',', value_name = "NAMES", requires = "selection")]
    pub exclude: Vec<String>,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Repository root that entry sources are resolved against
    #[arg(long, env = "DOTFILES_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Override the platform config root used for ${CONFIG_DIR}
    #[arg(long, env = "CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Load the mapping from a TOML file instead of the built-in table
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Replace an entry's targets with a single template (repeatable)
    #[arg(long = "map", value_name = "NAME=TARGET")]
    pub overrides: Vec<TargetOverride>,

    /// Write the run report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,

    /// Print help and the entry list
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub help: bool,
}

impl Cli {
    /// The entry filter requested on the command line.
    ///
    /// `None` when neither `--all` nor `--limit` was given, or `--help` was;
    /// the caller then prints help instead of applying anything.
    #[must_use]
    pub fn selection_filter(&self) -> Option<SelectionFilter> {
        if self.help {
            return None;
        }
        let filter = if self.all {
            SelectionFilter::all()
        } else if self.limit.is_empty() {
            return None;
        } else {
            SelectionFilter::only(&self.limit)
        };
        Some(filter.excluding(&self.exclude))
    }
}
