use std::path::{Path, PathBuf};

use crate::error::RouteError;

/// Resolves a logical resource identifier to a local file.
pub trait FileLocator: Send + Sync {
    /// Locate `resource`, trying `current_dir` (the working directory when
    /// `None`) before any configured paths.
    fn locate(&self, resource: &str, current_dir: Option<&Path>) -> Result<PathBuf, RouteError>;
}

/// Filesystem locator with an ordered list of search directories.
#[derive(Debug, Clone, Default)]
pub struct FsLocator {
    paths: Vec<PathBuf>,
}

impl FsLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a locator searching `paths` in order.
    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// Strip a `file://` scheme; reject any other scheme.
fn local_path(resource: &str) -> Result<&str, RouteError> {
    if let Some(rest) = resource.strip_prefix("file://") {
        return Ok(rest);
    }
    match resource.find("://") {
        Some(idx)
            if idx > 0
                && resource[..idx]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            Err(RouteError::NotLocal {
                resource: resource.to_string(),
            })
        }
        _ => Ok(resource),
    }
}

impl FileLocator for FsLocator {
    fn locate(&self, resource: &str, current_dir: Option<&Path>) -> Result<PathBuf, RouteError> {
        let local = local_path(resource)?;
        let candidate = Path::new(local);

        if candidate.is_absolute() {
            if candidate.is_file() {
                return Ok(candidate.to_path_buf());
            }
            return Err(RouteError::ResourceNotFound {
                resource: resource.to_string(),
                searched: Vec::new(),
            });
        }

        // Top-level documents resolve against the working directory first.
        let base = match current_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => std::env::current_dir().ok(),
        };
        let searched: Vec<PathBuf> = base
            .into_iter()
            .chain(self.paths.iter().cloned())
            .collect();

        if let Some(found) = searched
            .iter()
            .map(|dir| dir.join(candidate))
            .find(|p| p.is_file())
        {
            return Ok(found);
        }

        Err(RouteError::ResourceNotFound {
            resource: resource.to_string(),
            searched,
        })
    }
}
