//! Requirement resolution.
//!
//! A [`Resolver`] turns a [`Source`] into the argument string for one
//! [`Tool`]. Directory sources go through file discovery, manifest decoding
//! and line merging. File and stdin sources are only whitespace-normalized.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::error::{ReqsError, Result};
use crate::locate::{
    file_name, locate, COMMON_REQUIREMENTS, MANIFEST_FILE, NPM_REQUIREMENTS, PIP_REQUIREMENTS,
    PIP_REQUIREMENTS_DARWIN,
};
use crate::manifest::Manifest;
use crate::merge::{flatten, Requirements};
use crate::platform::Platform;
use crate::tool::Tool;

/// Where requirements come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// One or more directories, resolved independently.
    Dirs(Vec<PathBuf>),
    /// A requirements file used verbatim.
    File(PathBuf),
    /// The first line of standard input.
    Stdin,
}

impl Source {
    /// The current directory.
    pub fn current_dir() -> Self {
        Source::Dirs(vec![PathBuf::from(".")])
    }
}

/// What to do when a source yields no requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Return [`ReqsError::NoRequirements`].
    Fail,
    /// Log a warning and return an empty string.
    Warn,
}

pub struct Resolver<'a> {
    platform: &'a Platform,
    recurse: bool,
    empty: EmptyPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(platform: &'a Platform, recurse: bool) -> Self {
        Self {
            platform,
            recurse,
            empty: EmptyPolicy::Fail,
        }
    }

    pub fn with_empty_policy(mut self, empty: EmptyPolicy) -> Self {
        self.empty = empty;
        self
    }

    /// Resolves `source` for `tool`.
    ///
    /// For several directories the result holds one line per directory that
    /// produced requirements; lines are not deduplicated against each other.
    pub fn resolve(&self, source: &Source, tool: Tool) -> Result<String> {
        match source {
            Source::Dirs(dirs) => self.resolve_dirs(dirs, tool),
            Source::File(path) => self.resolve_file(path),
            Source::Stdin => self.resolve_reader(std::io::stdin().lock()),
        }
    }

    pub fn resolve_dirs<P: AsRef<Path>>(&self, dirs: &[P], tool: Tool) -> Result<String> {
        let mut blocks = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let block = self.resolve_dir(dir.as_ref(), tool)?;
            if !block.is_empty() {
                blocks.push(block);
            }
        }
        Ok(blocks.join("\n"))
    }

    /// Resolves a single directory to a space-separated requirement string.
    pub fn resolve_dir(&self, dir: &Path, tool: Tool) -> Result<String> {
        let candidates = locate(dir, self.recurse, self.platform.os)?;
        let mut reqs = Requirements::new();

        for file in self.text_files(&candidates, tool) {
            info!("Found {}", file.display());
            reqs.extend_text(&read(file)?);
        }
        for file in candidates.iter().filter(|path| file_name(path) == MANIFEST_FILE && path.is_file()) {
            info!("Found {}", file.display());
            let manifest = Manifest::decode(file)?;
            for key in tool.manifest_keys() {
                for package in manifest.packages(&key) {
                    reqs.extend_text(package);
                }
            }
        }

        if reqs.is_empty() {
            self.on_empty(dir)?;
        }
        Ok(reqs.to_argument_string())
    }

    /// Reads an explicit requirements file.
    pub fn resolve_file(&self, path: &Path) -> Result<String> {
        let text = read(path)?;
        let reqs = flatten(&text);
        if reqs.is_empty() {
            self.on_empty(path)?;
        }
        Ok(reqs)
    }

    /// Reads the first line of `reader`.
    pub fn resolve_reader<R: BufRead>(&self, mut reader: R) -> Result<String> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let reqs = flatten(&line);
        if reqs.is_empty() {
            self.on_empty(Path::new("<stdin>"))?;
        }
        Ok(reqs)
    }

    /// Plain-text requirement files for `tool`, in merge order.
    fn text_files<'p>(&self, candidates: &'p [PathBuf], tool: Tool) -> Vec<&'p PathBuf> {
        let groups: Vec<String> = match tool {
            Tool::System(system) => vec![COMMON_REQUIREMENTS.to_string(), system.requirements_file()],
            Tool::Pip | Tool::Pip3 => {
                let mut names = vec![PIP_REQUIREMENTS.to_string()];
                if self.platform.os.is_darwin() {
                    names.push(PIP_REQUIREMENTS_DARWIN.to_string());
                }
                names
            }
            Tool::Npm => vec![NPM_REQUIREMENTS.to_string()],
        };
        groups
            .iter()
            .flat_map(|name| candidates.iter().filter(move |path| file_name(path) == name))
            .filter(|path| path.is_file())
            .collect()
    }

    fn on_empty(&self, path: &Path) -> Result<()> {
        match self.empty {
            EmptyPolicy::Fail => Err(ReqsError::NoRequirements {
                path: path.to_path_buf(),
            }),
            EmptyPolicy::Warn => {
                warn!("No requirements found in {}", path.display());
                Ok(())
            }
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ReqsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OsFamily;
    use crate::tool::SystemTool;
    use std::fs;
    use tempfile::tempdir;

    const APT: Tool = Tool::System(SystemTool::Apt);

    fn linux() -> Platform {
        Platform::new(OsFamily::Linux, SystemTool::Apt, false)
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_common_file_merged_before_tool_file() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("common-requirements.txt"), "git\ncurl\n");
        write(&dir.path().join("apt-requirements.txt"), "git\nhtop\n");

        let platform = linux();
        let reqs = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(reqs, "git curl htop");
    }

    #[test]
    fn test_manifest_common_then_tool() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("reqs.yml"), "apt:\n  - git\ncommon:\n  - vim\n");

        let platform = linux();
        let reqs = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(reqs, "vim git");
    }

    #[test]
    fn test_files_come_before_manifest_and_dedupe() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("reqs.yml"), "common:\n  - git\n  - vim\ndnf:\n  - tmux\n");
        write(&dir.path().join("apt-requirements.txt"), "# editors\ngit\n");
        write(&dir.path().join("dnf-requirements.txt"), "nano\n");

        let platform = linux();
        let reqs = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(reqs, "git vim");
    }

    #[test]
    fn test_multiple_dirs_are_not_merged() {
        let root = tempdir().unwrap();
        let a = root.path().join("a");
        let b = root.path().join("b");
        write(&a.join("apt-requirements.txt"), "git\n");
        write(&b.join("apt-requirements.txt"), "curl\ngit\n");

        let platform = linux();
        let resolver = Resolver::new(&platform, false);
        let reqs = resolver.resolve(&Source::Dirs(vec![a, b]), APT).unwrap();
        assert_eq!(reqs, "git\ncurl git");
    }

    #[test]
    fn test_recursive_collects_nested_files() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("common-requirements.txt"), "git\n");
        write(&dir.path().join("db").join("apt-requirements.txt"), "postgresql\n");
        write(&dir.path().join("web").join("reqs.yml"), "apt:\n  - nginx\n");

        let platform = linux();
        let flat = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(flat, "git");
        let deep = Resolver::new(&platform, true).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(deep, "git postgresql nginx");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_resolve_the_same_with_recurse() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("base.txt"), "git\n");
        std::os::unix::fs::symlink(dir.path().join("base.txt"), dir.path().join("common-requirements.txt")).unwrap();
        write(&dir.path().join("shared").join("reqs.yml"), "apt:\n  - curl\n");
        std::os::unix::fs::symlink(dir.path().join("shared").join("reqs.yml"), dir.path().join("reqs.yml")).unwrap();

        let platform = linux();
        let flat = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(flat, "git curl");
        let deep = Resolver::new(&platform, true).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(deep, "git curl");
    }

    #[test]
    fn test_directory_named_like_manifest_is_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("reqs.yml")).unwrap();
        write(&dir.path().join("apt-requirements.txt"), "git\n");

        let platform = linux();
        let reqs = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap();
        assert_eq!(reqs, "git");
    }

    #[test]
    fn test_empty_dir_fails_or_warns() {
        let dir = tempdir().unwrap();
        let platform = linux();

        let err = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap_err();
        assert!(matches!(err, ReqsError::NoRequirements { .. }));

        let reqs = Resolver::new(&platform, false)
            .with_empty_policy(EmptyPolicy::Warn)
            .resolve_dir(dir.path(), APT)
            .unwrap();
        assert_eq!(reqs, "");
    }

    #[test]
    fn test_pip_ignores_tool_prefixed_files() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("requirements.txt"), "requests\nflask\n");
        write(&dir.path().join("apt-requirements.txt"), "git\n");
        write(&dir.path().join("npm-requirements.txt"), "typescript\n");
        write(&dir.path().join("reqs.yml"), "common:\n  - vim\npip:\n  - click\npip3:\n  - httpx\n");

        let platform = linux();
        let resolver = Resolver::new(&platform, false).with_empty_policy(EmptyPolicy::Warn);
        assert_eq!(resolver.resolve_dir(dir.path(), Tool::Pip).unwrap(), "requests flask click");
        assert_eq!(resolver.resolve_dir(dir.path(), Tool::Pip3).unwrap(), "requests flask httpx");
    }

    #[test]
    fn test_pip_darwin_file_only_on_darwin() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("requirements.txt"), "requests\n");
        write(&dir.path().join("requirements-osx.txt"), "pyobjc\n");

        let linux = linux();
        let on_linux = Resolver::new(&linux, false).resolve_dir(dir.path(), Tool::Pip3).unwrap();
        assert_eq!(on_linux, "requests");

        let darwin = Platform::new(OsFamily::Darwin, SystemTool::Brew, false);
        let on_darwin = Resolver::new(&darwin, false).resolve_dir(dir.path(), Tool::Pip3).unwrap();
        assert_eq!(on_darwin, "requests pyobjc");
    }

    #[test]
    fn test_npm_uses_npm_file_and_key() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("npm-requirements.txt"), "typescript\neslint\n");
        write(&dir.path().join("reqs.yml"), "npm:\n  - eslint\n  - prettier\n");

        let platform = linux();
        let reqs = Resolver::new(&platform, false).resolve_dir(dir.path(), Tool::Npm).unwrap();
        assert_eq!(reqs, "typescript eslint prettier");
    }

    #[test]
    fn test_bad_manifest_aborts() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("apt-requirements.txt"), "git\n");
        write(&dir.path().join("reqs.yml"), "apt: [git\n");

        let platform = linux();
        let err = Resolver::new(&platform, false).resolve_dir(dir.path(), APT).unwrap_err();
        assert!(matches!(err, ReqsError::ManifestParse { .. }));
    }

    #[test]
    fn test_file_source_is_used_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.txt");
        write(&path, "git\n  git\n\n# not stripped\n");

        let platform = linux();
        let reqs = Resolver::new(&platform, false).resolve(&Source::File(path), APT).unwrap();
        assert_eq!(reqs, "git git # not stripped");
    }

    #[test]
    fn test_reader_takes_first_line_only() {
        let platform = linux();
        let input = "git curl htop\nvim\n".as_bytes();
        let reqs = Resolver::new(&platform, false).resolve_reader(input).unwrap();
        assert_eq!(reqs, "git curl htop");
    }
}
