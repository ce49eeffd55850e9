use std::fmt;
use std::str::FromStr;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A native system package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemTool {
    Apt,
    Dnf,
    Brew,
}

impl SystemTool {
    /// Linux tools in the order they are probed for.
    pub const LINUX: [SystemTool; 2] = [SystemTool::Apt, SystemTool::Dnf];

    pub fn name(self) -> &'static str {
        match self {
            SystemTool::Apt => "apt",
            SystemTool::Dnf => "dnf",
            SystemTool::Brew => "brew",
        }
    }

    /// The per-tool requirement file, e.g. `apt-requirements.txt`.
    pub fn requirements_file(self) -> String {
        format!("{}-requirements.txt", self.name())
    }
}

impl fmt::Display for SystemTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SystemTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apt" => Ok(SystemTool::Apt),
            "dnf" => Ok(SystemTool::Dnf),
            "brew" => Ok(SystemTool::Brew),
            other => Err(format!("unknown system tool: {other}")),
        }
    }
}

/// The ecosystem a requirement string is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    System(SystemTool),
    Pip,
    Pip3,
    Npm,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::System(tool) => tool.name(),
            Tool::Pip => "pip",
            Tool::Pip3 => "pip3",
            Tool::Npm => "npm",
        }
    }

    /// Manifest keys selected for this tool, in merge order.
    ///
    /// Only system tools share the `common` bucket.
    pub fn manifest_keys(self) -> Vec<ManifestKey> {
        match self {
            Tool::System(tool) => vec![ManifestKey::Common, ManifestKey::System(tool)],
            Tool::Pip => vec![ManifestKey::Pip],
            Tool::Pip3 => vec![ManifestKey::Pip3],
            Tool::Npm => vec![ManifestKey::Npm],
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A top-level key of a `reqs.yml` manifest.
///
/// Keys that name no known tool are kept as [`ManifestKey::Other`] so a
/// manifest survives a decode and re-encode, but they never match a tool.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManifestKey {
    Common,
    System(SystemTool),
    Pip,
    Pip3,
    Npm,
    Other(String),
}

impl ManifestKey {
    pub fn as_str(&self) -> &str {
        match self {
            ManifestKey::Common => "common",
            ManifestKey::System(tool) => tool.name(),
            ManifestKey::Pip => "pip",
            ManifestKey::Pip3 => "pip3",
            ManifestKey::Npm => "npm",
            ManifestKey::Other(name) => name,
        }
    }
}

impl From<&str> for ManifestKey {
    fn from(key: &str) -> Self {
        match key {
            "common" => ManifestKey::Common,
            "pip" => ManifestKey::Pip,
            "pip3" => ManifestKey::Pip3,
            "npm" => ManifestKey::Npm,
            other => match other.parse::<SystemTool>() {
                Ok(tool) => ManifestKey::System(tool),
                Err(_) => ManifestKey::Other(other.to_string()),
            },
        }
    }
}

impl fmt::Display for ManifestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
