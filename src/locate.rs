//! Discovery of requirement files and npm package directories.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use crate::error::{ReqsError, Result};
use crate::platform::OsFamily;

/// Shared system requirements, used with every system tool.
pub const COMMON_REQUIREMENTS: &str = "common-requirements.txt";
/// The YAML manifest.
pub const MANIFEST_FILE: &str = "reqs.yml";
/// Plain pip requirements.
pub const PIP_REQUIREMENTS: &str = "requirements.txt";
/// pip requirements only used on Darwin.
pub const PIP_REQUIREMENTS_DARWIN: &str = "requirements-osx.txt";
/// Global npm requirements.
pub const NPM_REQUIREMENTS: &str = "npm-requirements.txt";
/// Marks a directory as an npm package.
pub const PACKAGE_JSON: &str = "package.json";
/// Dependency caches skipped when looking for npm packages.
pub const DEFAULT_NPM_EXCLUDE: [&str; 2] = ["node_modules", "bower_components"];

/// Returns the file name of `path` as UTF-8, or `""`.
pub fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|name| name.to_str()).unwrap_or_default()
}

/// Whether a file name is one the resolver might read.
pub fn is_requirement_file(name: &str, os: OsFamily) -> bool {
    name.ends_with(PIP_REQUIREMENTS)
        || name == MANIFEST_FILE
        || (os.is_darwin() && name == PIP_REQUIREMENTS_DARWIN)
}

/// Lists candidate requirement files under `dir`.
///
/// Without `recurse`, every immediate child of `dir` is returned and the
/// caller picks what it needs. With `recurse`, the whole tree is walked and
/// only recognized requirement files are returned. Both modes sort by file
/// name, so repeated runs over the same tree agree.
///
/// # Errors
/// Returns an error if `dir` cannot be read, or if any entry of the walk
/// fails.
pub fn locate(dir: &Path, recurse: bool, os: OsFamily) -> Result<Vec<PathBuf>> {
    if recurse {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| ReqsError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            // path().is_file() follows symlinks, file_type() does not
            if entry.path().is_file() && is_requirement_file(file_name(entry.path()), os) {
                paths.push(entry.into_path());
            }
        }
        debug!("Found {} requirement files under {}", paths.len(), dir.display());
        Ok(paths)
    } else {
        let read_err = |source| ReqsError::Read {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            paths.push(entry.map_err(read_err)?.path());
        }
        paths.sort();
        Ok(paths)
    }
}

/// Finds directories holding a `package.json`.
///
/// Without `recurse` only `dir` itself is checked. With `recurse` the tree is
/// walked, and any directory named in `exclude` is pruned together with
/// everything below it.
pub fn find_package_dirs<S: AsRef<str>>(dir: &Path, recurse: bool, exclude: &[S]) -> Result<Vec<PathBuf>> {
    let mut package_dirs = Vec::new();
    if !recurse {
        if dir.join(PACKAGE_JSON).is_file() {
            info!("Found npm package directory {}", dir.display());
            package_dirs.push(dir.to_path_buf());
        }
        return Ok(package_dirs);
    }

    let excluded = |name: &str| exclude.iter().any(|ex| ex.as_ref() == name);
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !(entry.file_type().is_dir() && excluded(file_name(entry.path()))));
    for entry in walker {
        let entry = entry.map_err(|source| ReqsError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_file() && file_name(entry.path()) == PACKAGE_JSON {
            if let Some(parent) = entry.path().parent() {
                info!("Found npm package directory {}", parent.display());
                package_dirs.push(parent.to_path_buf());
            }
        }
    }
    Ok(package_dirs)
}
