//! Multi-root file lookup.
//!
//! # Responsibilities
//! - Map a resource path onto each configured root, in order
//! - Return the first regular file found
//! - Distinguish "absent" (keep searching) from real I/O failures (abort)
//!
//! # Design Decisions
//! - First match wins even if a later root holds the same path
//! - Directories are never served; they count as absent
//! - Paths with `..` never resolve, so lookups cannot leave a root

use std::path::{Component, Path, PathBuf};

use tokio::fs::File;

use crate::assets::error::{is_absent, AssetError};

/// A regular file found under one of the roots. The handle is closed on drop.
#[derive(Debug)]
pub struct LocatedFile {
    pub file: File,
    pub path: PathBuf,
}

/// Ordered search across root directories.
#[derive(Debug, Clone)]
pub struct Locator {
    roots: Vec<PathBuf>,
}

impl Locator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Find `resource_path` in the first root that contains it as a file.
    #[tracing::instrument(name = "lookup_asset", level = "debug", skip(self))]
    pub async fn find(&self, resource_path: &str) -> Result<Option<LocatedFile>, AssetError> {
        let Some(relative) = relative_path(resource_path) else {
            tracing::debug!(path = resource_path, "Rejected non-normal path");
            return Ok(None);
        };

        for root in &self.roots {
            let candidate = root.join(&relative);
            match open_file(&candidate).await? {
                Some(located) => {
                    tracing::debug!(file = %candidate.display(), "Asset found");
                    return Ok(Some(located));
                }
                None => continue,
            }
        }

        Ok(None)
    }
}

async fn open_file(path: &Path) -> Result<Option<LocatedFile>, AssetError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if is_absent(&e) => return Ok(None),
        Err(e) => return Err(AssetError::from_io(path, e)),
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| AssetError::from_io(path, e))?;

    if metadata.is_dir() {
        return Ok(None);
    }

    Ok(Some(LocatedFile {
        file,
        path: path.to_path_buf(),
    }))
}

/// Turn `/a/b.js` into `a/b.js`, refusing anything but plain components.
///
/// A trailing `/` names a directory, which is never served. NUL cannot be
/// part of a file name on any supported platform.
fn relative_path(resource_path: &str) -> Option<PathBuf> {
    if resource_path.ends_with('/') || resource_path.contains('\0') {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(resource_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(relative)
}
