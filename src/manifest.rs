use std::collections::BTreeMap;
use std::path::Path;
use crate::error::{ReqsError, Result};
use crate::tool::ManifestKey;

/// The contents of a `reqs.yml` file.
///
/// A manifest maps tool names (plus `common`) to ordered lists of package
/// specifiers:
///
/// ```yaml
/// common:
///   - git
/// apt:
///   - build-essential
/// pip3:
///   - requests==2.31.0
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Manifest {
    entries: BTreeMap<ManifestKey, Vec<String>>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and decodes a manifest file.
    ///
    /// # Errors
    /// Returns [`ReqsError::Read`] if the file can't be read and
    /// [`ReqsError::ManifestParse`] if it isn't a mapping of names to lists
    /// of strings.
    pub fn decode<P: AsRef<Path>>(path: P) -> Result<Manifest> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ReqsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Decodes manifest text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Manifest> {
        if text.trim().is_empty() {
            return Ok(Manifest::new());
        }
        let raw: BTreeMap<String, Vec<String>> =
            serde_yaml::from_str(text).map_err(|e| ReqsError::ManifestParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let mut manifest = Manifest::new();
        for (key, packages) in raw {
            manifest.insert(ManifestKey::from(key.as_str()), packages);
        }
        Ok(manifest)
    }

    /// Appends packages under `key`.
    pub fn insert(&mut self, key: ManifestKey, packages: Vec<String>) {
        self.entries.entry(key).or_default().extend(packages);
    }

    /// Packages listed under `key`, or an empty slice.
    pub fn packages(&self, key: &ManifestKey) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the manifest as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        let raw: BTreeMap<&str, &Vec<String>> =
            self.entries.iter().map(|(key, packages)| (key.as_str(), packages)).collect();
        serde_yaml::to_string(&raw).map_err(|e| ReqsError::ManifestParse {
            path: Path::new("<generated>").to_path_buf(),
            message: e.to_string(),
        })
    }
}
