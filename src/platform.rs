use std::process::{Command, Stdio};
use tracing::{debug, info};
use crate::error::{ReqsError, Result};
use crate::installer::install_homebrew;
use crate::tool::SystemTool;

/// Operating system family, as far as requirement resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Darwin,
    Windows,
    Other,
}

impl OsFamily {
    /// The family of the running system.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to its family.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" => OsFamily::Linux,
            "macos" | "ios" => OsFamily::Darwin,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Other,
        }
    }

    pub fn is_darwin(self) -> bool {
        self == OsFamily::Darwin
    }
}

/// Everything about the host that changes how requirements are resolved or
/// installed.
///
/// Detection happens once in [`Platform::detect`]; the rest of the crate
/// only reads this value, so tests can build one with [`Platform::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: OsFamily,
    pub tool: SystemTool,
    /// Prefix privileged commands with `sudo`.
    pub sudo: bool,
    /// Pass `-y` to the system tool.
    pub auto_yes: bool,
    /// Homebrew was selected but is not on `PATH` yet.
    pub brew_missing: bool,
}

impl Platform {
    pub fn new(os: OsFamily, tool: SystemTool, sudo: bool) -> Self {
        Self {
            os,
            tool,
            sudo,
            auto_yes: tool != SystemTool::Brew,
            brew_missing: false,
        }
    }

    /// Detects the system tool for the running OS.
    ///
    /// With `tool` set, PATH probing is skipped. Nothing is installed here;
    /// a missing Homebrew is only recorded, see [`Platform::bootstrap`].
    ///
    /// # Errors
    /// Fails on Windows or unknown systems, and on Linux when neither `apt`
    /// nor `dnf` is available.
    pub fn detect(tool: Option<SystemTool>) -> Result<Self> {
        Self::detect_with(tool, OsFamily::current(), is_command_available)
    }

    /// [`Platform::detect`] for a given OS, asking `available` whether a
    /// command is on `PATH`.
    pub fn detect_with<F>(tool: Option<SystemTool>, os: OsFamily, available: F) -> Result<Self>
    where
        F: Fn(&str) -> bool,
    {
        let mut brew_missing = false;
        let tool = match (tool, os) {
            (Some(tool), _) => {
                debug!("Using configured package tool {tool}");
                tool
            }
            (None, OsFamily::Linux) => {
                info!("Linux system detected");
                SystemTool::LINUX
                    .into_iter()
                    .find(|tool| available(tool.name()))
                    .ok_or_else(|| ReqsError::NoPackageTool {
                        tried: SystemTool::LINUX.map(SystemTool::name).join(", "),
                    })?
            }
            (None, OsFamily::Darwin) => {
                info!("Darwin system detected");
                brew_missing = !available(SystemTool::Brew.name());
                SystemTool::Brew
            }
            (None, OsFamily::Windows) => {
                return Err(ReqsError::UnsupportedPlatform("windows".into()));
            }
            (None, OsFamily::Other) => {
                return Err(ReqsError::UnsupportedPlatform(std::env::consts::OS.into()));
            }
        };
        let sudo = tool != SystemTool::Brew && !is_root();
        Ok(Self {
            brew_missing,
            ..Self::new(os, tool, sudo)
        })
    }

    /// Installs Homebrew if detection found it missing. Call this only on
    /// paths that are about to install packages.
    pub fn bootstrap(&mut self) -> Result<()> {
        if self.brew_missing {
            install_homebrew()?;
            self.brew_missing = false;
        }
        Ok(())
    }
}

/// Checks whether `name` resolves to a command in the current `PATH`.
pub fn is_command_available(name: &str) -> bool {
    Command::new("/bin/sh")
        .arg("-c")
        .arg(format!("command -v {name}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}
