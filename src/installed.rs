use std::process::Command;
use regex::Regex;
use tracing::debug;
use crate::error::{ReqsError, Result};
use crate::merge::Requirements;
use crate::tool::SystemTool;

const APT_SOURCES: &str = "/etc/apt/sources.list";

/// Lists the packages installed by `tool`, one specifier per line.
///
/// With `with_version`, apt and dnf entries are written as `name=version`.
/// brew has no pinnable version syntax and always lists bare names. With
/// `sudo`, the query is run through `sudo`.
pub fn list_installed(tool: SystemTool, with_version: bool, sudo: bool) -> Result<String> {
    let args: &[&str] = match tool {
        SystemTool::Apt => &["list", "--installed"],
        SystemTool::Dnf => &["list", "installed"],
        SystemTool::Brew => &["list"],
    };
    let output = query(tool.name(), args, sudo)?;
    match tool {
        SystemTool::Apt => parse_apt_list(&output, with_version),
        SystemTool::Dnf => parse_dnf_list(&output, with_version),
        SystemTool::Brew => Ok(parse_brew_list(&output)),
    }
}

/// Parses `apt list --installed`.
///
/// Lines look like `git/jammy,now 1:2.34.1-1ubuntu1 amd64 [installed]`;
/// the `Listing...` header and warnings are skipped.
pub fn parse_apt_list(output: &str, with_version: bool) -> Result<String> {
    let line_re = Regex::new(r"^([^/\s]+)/\S+\s+(\S+)")?;
    let mut reqs = Requirements::new();
    for line in output.lines() {
        if let Some(caps) = line_re.captures(line.trim()) {
            let req = if with_version {
                format!("{}={}", &caps[1], &caps[2])
            } else {
                caps[1].to_string()
            };
            reqs.push_line(&req);
        }
    }
    Ok(reqs.to_text())
}

/// Parses `dnf list installed`.
///
/// Package lines are `name.arch  version  @repo`. The `Installed Packages`
/// header and metadata notices do not have that shape and are skipped.
pub fn parse_dnf_list(output: &str, with_version: bool) -> Result<String> {
    let line_re = Regex::new(r"^(\S+\.\S+)\s+(\S+)\s+@?\S+$")?;
    let mut reqs = Requirements::new();
    for line in output.lines() {
        if let Some(caps) = line_re.captures(line.trim()) {
            let req = if with_version {
                format!("{}={}", &caps[1], &caps[2])
            } else {
                caps[1].to_string()
            };
            reqs.push_line(&req);
        }
    }
    Ok(reqs.to_text())
}

/// Parses `brew list`, which prints whitespace-separated formula names.
pub fn parse_brew_list(output: &str) -> String {
    let mut reqs = Requirements::new();
    for name in output.split_whitespace() {
        reqs.push_line(name);
    }
    reqs.to_text()
}

/// Configured package sources: apt source lines or brew taps.
///
/// dnf has no equivalent and yields an empty string.
pub fn list_sources(tool: SystemTool) -> Result<String> {
    match tool {
        SystemTool::Apt => {
            let text = std::fs::read_to_string(APT_SOURCES).map_err(|source| ReqsError::Read {
                path: APT_SOURCES.into(),
                source,
            })?;
            Ok(parse_apt_sources(&text))
        }
        SystemTool::Brew => Ok(query("brew", &["tap"], false)?.trim().to_string()),
        SystemTool::Dnf => Ok(String::new()),
    }
}

/// Strips comments and blank lines from an apt `sources.list`.
pub fn parse_apt_sources(text: &str) -> String {
    Requirements::from_text(text).to_text()
}

fn query(program: &str, args: &[&str], sudo: bool) -> Result<String> {
    let mut command = if sudo {
        let mut command = Command::new("sudo");
        command.arg(program);
        command
    } else {
        Command::new(program)
    };
    command.args(args);
    debug!("Running {:?}", command);
    let output = command.output()?;
    if !output.status.success() {
        return Err(ReqsError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
