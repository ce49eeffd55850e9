use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use colored::Colorize;
use tempfile::NamedTempFile;
use tracing::info;
use crate::error::{ReqsError, Result};
use crate::platform::Platform;
use crate::tool::SystemTool;

const HOMEBREW_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// A package-manager command line, built before it is run so it can be
/// logged and inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub dir: Option<PathBuf>,
}

impl Invocation {
    /// `program` with `args`, run through `sudo` when requested.
    pub fn new(program: &str, sudo: bool) -> Self {
        let (program, args) = if sudo {
            ("sudo".to_string(), vec![program.to_string()])
        } else {
            (program.to_string(), Vec::new())
        };
        Self {
            program,
            args,
            envs: Vec::new(),
            dir: None,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends each whitespace-separated token of `reqs`.
    pub fn requirements(mut self, reqs: &str) -> Self {
        self.args.extend(reqs.split_whitespace().map(String::from));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Runs the command to completion.
    ///
    /// Standard output streams to the terminal unless `quiet`; standard
    /// error is captured and returned in [`ReqsError::CommandFailed`].
    pub fn run(&self, quiet: bool) -> Result<()> {
        info!("{}", self.to_string().bold());
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(if quiet { Stdio::null() } else { Stdio::inherit() })
            .stderr(Stdio::piped());
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        let output = command.spawn()?.wait_with_output()?;
        if !output.status.success() {
            return Err(ReqsError::CommandFailed {
                command: self.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.envs {
            write!(f, "{key}={value} ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Installs system packages with the detected tool.
pub struct SystemInstaller<'a> {
    platform: &'a Platform,
    force: bool,
    quiet: bool,
}

impl<'a> SystemInstaller<'a> {
    pub fn new(platform: &'a Platform, force: bool, quiet: bool) -> Self {
        Self {
            platform,
            force,
            quiet,
        }
    }

    fn base(&self, sudo: bool) -> Invocation {
        let invocation = Invocation::new(self.platform.tool.name(), sudo);
        match self.platform.tool {
            SystemTool::Brew => invocation.env("HOMEBREW_NO_AUTO_UPDATE", "1"),
            _ => invocation,
        }
    }

    fn confirm(&self, invocation: Invocation) -> Invocation {
        if self.platform.auto_yes {
            invocation.arg("-y")
        } else {
            invocation
        }
    }

    pub fn install_command(&self, reqs: &str) -> Invocation {
        let subcommand = match (self.platform.tool, self.force) {
            (SystemTool::Dnf, true) => "reinstall",
            _ => "install",
        };
        let invocation = self.confirm(self.base(self.platform.sudo).arg(subcommand));
        let invocation = match (self.platform.tool, self.force) {
            (SystemTool::Apt, true) => invocation.arg("--reinstall"),
            (SystemTool::Brew, true) => invocation.arg("--force"),
            _ => invocation,
        };
        invocation.requirements(reqs)
    }

    /// `update` or `upgrade` for the system tool.
    pub fn refresh_command(&self, action: &str) -> Invocation {
        self.confirm(self.base(self.platform.sudo).arg(action))
    }

    pub fn install(&self, reqs: &str) -> Result<()> {
        info!("Installing system requirements with {}", self.platform.tool);
        self.install_command(reqs).run(self.quiet)
    }

    pub fn update(&self) -> Result<()> {
        info!("Running {} update", self.platform.tool);
        self.refresh_command("update").run(self.quiet)
    }

    pub fn upgrade(&self) -> Result<()> {
        info!("Running {} upgrade", self.platform.tool);
        self.refresh_command("upgrade").run(self.quiet)
    }
}

/// Writes one requirement per line to a temporary file.
///
/// The file is removed when the returned handle is dropped.
pub fn write_requirements_file(reqs: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("reqs-")
        .suffix(".txt")
        .tempfile()?;
    for req in reqs.split_whitespace() {
        writeln!(file, "{req}")?;
    }
    file.flush()?;
    Ok(file)
}

pub fn pip_install_command(reqs_file: &Path, pip: &str, sudo: bool, upgrade: bool, quiet: bool) -> Invocation {
    let mut invocation = Invocation::new(pip, sudo).arg("install");
    if upgrade {
        invocation = invocation.arg("--upgrade");
    }
    if quiet {
        invocation = invocation.arg("-q");
    }
    invocation.arg("-r").arg(reqs_file.to_string_lossy())
}

/// Installs pip requirements into the active environment through `-r`.
pub fn pip_install(reqs: &str, pip: &str, sudo: bool, upgrade: bool, quiet: bool) -> Result<()> {
    info!("Installing {pip} requirements to currently active environment");
    let reqs_file = write_requirements_file(reqs)?;
    pip_install_command(reqs_file.path(), pip, sudo, upgrade, quiet).run(quiet)
}

pub fn npm_install_command(reqs: &str, dir: Option<&Path>, sudo: bool, global: bool) -> Invocation {
    let mut invocation = Invocation::new("npm", sudo);
    if global {
        invocation = invocation.arg("-g");
    }
    invocation = invocation.arg("install").requirements(reqs);
    match dir {
        Some(dir) => invocation.current_dir(dir),
        None => invocation,
    }
}

/// Runs `npm install`, either globally for `reqs` or locally inside `dir`.
pub fn npm_install(reqs: &str, dir: Option<&Path>, sudo: bool, global: bool, quiet: bool) -> Result<()> {
    match (global, dir) {
        (true, _) => info!("Installing npm global requirements"),
        (false, Some(dir)) => info!("Running npm install in {}", dir.display()),
        (false, None) => info!("Running npm install"),
    }
    npm_install_command(reqs, dir, sudo, global).run(quiet)
}

pub fn install_homebrew() -> Result<()> {
    info!("Installing homebrew");
    Invocation::new("/bin/bash", false)
        .arg("-c")
        .arg(format!("/bin/bash -c \"$(curl -fsSL {HOMEBREW_INSTALL_SCRIPT})\""))
        .env("NONINTERACTIVE", "1")
        .run(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OsFamily;

    fn args(invocation: &Invocation) -> Vec<&str> {
        invocation.args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_apt_install_with_sudo_and_yes() {
        let platform = Platform::new(OsFamily::Linux, SystemTool::Apt, true);
        let cmd = SystemInstaller::new(&platform, false, false).install_command("git curl");
        assert_eq!(cmd.program, "sudo");
        assert_eq!(args(&cmd), ["apt", "install", "-y", "git", "curl"]);
        assert_eq!(cmd.to_string(), "sudo apt install -y git curl");
    }

    #[test]
    fn test_force_flags_per_tool() {
        let apt = Platform::new(OsFamily::Linux, SystemTool::Apt, false);
        let cmd = SystemInstaller::new(&apt, true, false).install_command("git");
        assert_eq!(cmd.to_string(), "apt install -y --reinstall git");

        let dnf = Platform::new(OsFamily::Linux, SystemTool::Dnf, false);
        let cmd = SystemInstaller::new(&dnf, true, false).install_command("git");
        assert_eq!(cmd.to_string(), "dnf reinstall -y git");

        let brew = Platform::new(OsFamily::Darwin, SystemTool::Brew, false);
        let cmd = SystemInstaller::new(&brew, true, false).install_command("git");
        assert_eq!(cmd.to_string(), "HOMEBREW_NO_AUTO_UPDATE=1 brew install --force git");
    }

    #[test]
    fn test_refresh_commands() {
        let dnf = Platform::new(OsFamily::Linux, SystemTool::Dnf, true);
        let cmd = SystemInstaller::new(&dnf, false, false).refresh_command("upgrade");
        assert_eq!(cmd.to_string(), "sudo dnf upgrade -y");

        let brew = Platform::new(OsFamily::Darwin, SystemTool::Brew, false);
        let cmd = SystemInstaller::new(&brew, false, false).refresh_command("update");
        assert_eq!(cmd.to_string(), "HOMEBREW_NO_AUTO_UPDATE=1 brew update");
    }

    #[test]
    fn test_requirements_file_is_removed_on_drop() {
        let file = write_requirements_file("requests==2.31.0 flask").unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "requests==2.31.0\nflask\n");
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_pip_install_command() {
        let cmd = pip_install_command(Path::new("/tmp/reqs-1.txt"), "pip3", true, true, true);
        assert_eq!(cmd.to_string(), "sudo pip3 install --upgrade -q -r /tmp/reqs-1.txt");
    }

    #[test]
    fn test_npm_install_commands() {
        let global = npm_install_command("typescript eslint", None, false, true);
        assert_eq!(global.to_string(), "npm -g install typescript eslint");
        assert!(global.dir.is_none());

        let local = npm_install_command("", Some(Path::new("web")), false, false);
        assert_eq!(args(&local), ["install"]);
        assert_eq!(local.dir.as_deref(), Some(Path::new("web")));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_reports_stderr() {
        let err = Invocation::new("/bin/sh", false)
            .arg("-c")
            .arg("echo broken >&2; exit 3")
            .run(true)
            .unwrap_err();
        match err {
            ReqsError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
