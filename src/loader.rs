//! Resolves fixture paths and turns fixture files into cases.
//!
//! Fixture paths look like resource paths (`/integration/v1/x.yaml`) and are
//! resolved against a case root directory. Loading is all-or-nothing: a
//! missing, unreadable, malformed or inconsistent fixture yields an error and
//! no cases.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::case::{CaseFile, SqlCase};
use crate::diagnostics::HarnessError;

/// Anything that can turn a fixture path into cases.
pub trait CaseLoader {
    fn load(&self, path: &str) -> Result<Vec<SqlCase>, HarnessError>;
}

/// Loads fixtures from files under a root directory.
#[derive(Debug, Clone)]
pub struct FixtureLoader {
    root: PathBuf,
}

impl FixtureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a resource path onto the filesystem. Leading `/` is ignored.
    pub fn resolve(&self, resource: &str) -> PathBuf {
        let relative = Path::new(resource.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                resolved.push(part);
            }
        }
        resolved
    }

    /// Loads a fixture by filesystem path, bypassing resource resolution.
    pub fn load_file(&self, path: &Path) -> Result<Vec<SqlCase>, HarnessError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => HarnessError::NotFound {
                path: display.clone(),
                resolved: path.to_path_buf(),
            },
            _ => HarnessError::Io {
                path: display.clone(),
                source: e,
            },
        })?;
        parse_fixture(&display, &content)
    }
}

impl CaseLoader for FixtureLoader {
    fn load(&self, path: &str) -> Result<Vec<SqlCase>, HarnessError> {
        let resolved = self.resolve(path);
        if !resolved.is_file() {
            return Err(HarnessError::NotFound {
                path: path.to_string(),
                resolved,
            });
        }
        let content = fs::read_to_string(&resolved).map_err(|source| HarnessError::Io {
            path: path.to_string(),
            source,
        })?;
        let cases = parse_fixture(path, &content)?;
        debug!(fixture = path, cases = cases.len(), "fixture loaded");
        Ok(cases)
    }
}

/// Parses and validates fixture text. `name` is only used in errors.
///
/// A fixture must yield at least one case: blank documents, an empty `cases`
/// list and `debugs` entries matching nothing are all rejected.
pub fn parse_fixture(name: &str, content: &str) -> Result<Vec<SqlCase>, HarnessError> {
    if content.trim().is_empty() {
        return Err(HarnessError::unusable(name, content, "empty fixture document"));
    }
    let file: CaseFile = serde_yaml::from_str(content)
        .map_err(|e| HarnessError::malformed(name, content, e))?;
    if file.cases.is_empty() {
        return Err(HarnessError::unusable(name, content, "fixture declares no cases"));
    }
    let cases = file.into_cases();
    if cases.is_empty() {
        return Err(HarnessError::unusable(
            name,
            content,
            "no case matches the `debugs` list",
        ));
    }
    for case in &cases {
        case.validate().map_err(|message| HarnessError::InvalidCase {
            path: name.to_string(),
            case: case.name(),
            message,
        })?;
    }
    Ok(cases)
}

/// Recursively finds `.yaml`/`.yml` fixtures under `root`, sorted.
pub fn discover<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, HarnessError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .unwrap_or(root)
                .display()
                .to_string();
            match e.into_io_error() {
                Some(source) if source.kind() == io::ErrorKind::NotFound => {
                    HarnessError::NotFound {
                        path,
                        resolved: root.to_path_buf(),
                    }
                }
                Some(source) => HarnessError::Io { path, source },
                None => HarnessError::Io {
                    path,
                    source: io::Error::new(io::ErrorKind::Other, "filesystem loop"),
                },
            }
        })?;
        if entry.file_type().is_file() && is_fixture(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_fixture(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}
