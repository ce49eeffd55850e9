use std::path::PathBuf;
use clap::Parser;
use reqs::SystemTool;

/// Install system, pip and npm requirements.
///
/// Without a source flag the current directory is searched for
/// `<tool>-requirements.txt`, `common-requirements.txt` and `reqs.yml`.
#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Directory or comma separated directories with requirements files
    #[clap(short, long, value_delimiter = ',', conflicts_with_all = ["file", "stdin"])]
    pub dir: Vec<PathBuf>,

    /// Specific requirements file to read from
    #[clap(short, long, conflicts_with = "stdin")]
    pub file: Option<PathBuf>,

    /// Read requirements from the first line of stdin
    #[clap(short = 'i', long)]
    pub stdin: bool,

    /// Print the currently installed system packages
    #[clap(short = 'o', long)]
    pub stdout: bool,

    /// Print the currently installed system packages with versions
    #[clap(long, visible_alias = "ov")]
    pub with_version: bool,

    /// Recurse down directories to find requirements
    #[clap(short, long)]
    pub recurse: bool,

    /// Print the currently installed system packages as a reqs.yml manifest
    #[clap(long)]
    pub yml: bool,

    /// Print apt sources or brew taps
    #[clap(long, visible_alias = "so")]
    pub sources: bool,

    /// Install pip requirements with the given pip executable
    #[clap(long, value_name = "PIP")]
    pub pip: Option<String>,

    /// Install pip3 requirements with the given pip3 executable
    #[clap(long, value_name = "PIP3")]
    pub pip3: Option<String>,

    /// Install pip requirements with sudo (uses `pip` unless --pip is given)
    #[clap(long)]
    pub spip: bool,

    /// Install pip3 requirements with sudo (uses `pip3` unless --pip3 is given)
    #[clap(long)]
    pub spip3: bool,

    /// Install global npm requirements and run `npm install` in package directories
    #[clap(long)]
    pub npm: bool,

    /// Like --npm, with sudo for the global install
    #[clap(long)]
    pub snpm: bool,

    /// Force reinstall packages
    #[clap(long)]
    pub force: bool,

    /// Update packages before install
    #[clap(short, long)]
    pub update: bool,

    /// Update and upgrade packages before install
    #[clap(long, visible_alias = "up")]
    pub upgrade: bool,

    /// Print resolved requirements instead of installing them
    #[clap(short = 'n', long)]
    pub dry_run: bool,

    /// Use this system package tool instead of detecting one
    #[clap(long, value_enum)]
    pub tool: Option<SystemTool>,

    /// Run installed-package queries with sudo
    #[clap(long)]
    pub list_sudo: bool,

    /// Config file to use instead of the default location
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log debug output
    #[clap(short, long)]
    pub verbose: bool,
}

impl CLI {
    /// Flags that print to stdout and must keep logging out of the way.
    pub fn is_listing(&self) -> bool {
        self.stdout || self.with_version || self.yml || self.sources
    }

    /// The pip executable to install with, if pip was requested.
    pub fn pip_path(&self) -> Option<String> {
        self.pip.clone().or_else(|| self.spip.then(|| "pip".to_string()))
    }

    pub fn pip3_path(&self) -> Option<String> {
        self.pip3.clone().or_else(|| self.spip3.then(|| "pip3".to_string()))
    }

    pub fn npm_requested(&self) -> bool {
        self.npm || self.snpm
    }
}
