//! Content file management for the admin surface.
//!
//! All operations are scoped to the configured content directory. Filenames
//! coming from the editor are untrusted: anything containing a path
//! separator or a `..` component is rejected with [`StoreError::InvalidName`]
//! before any filesystem call, so a request can never reach outside the
//! directory.
//!
//! The directory is the source of truth — nothing is cached between calls.

use crate::frontmatter;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Content directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid filename: {0}")]
    InvalidName(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of the admin post listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub filename: String,
    /// Best-effort title from front matter; empty when absent or unreadable.
    pub title: String,
    /// Creation time as epoch seconds (modification time where the
    /// filesystem does not track creation).
    pub created_at: i64,
}

/// File operations scoped to one content directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List all files, newest created first. Titles are extracted from
    /// front matter where possible.
    pub fn list(&self) -> Result<Vec<PostSummary>, StoreError> {
        if !self.dir.is_dir() {
            return Err(StoreError::DirectoryNotFound(self.dir.clone()));
        }

        let mut posts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(filename) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            if filename.starts_with('.') {
                continue;
            }

            let created_at = file_created_at(&path);
            let title = fs::read_to_string(&path)
                .map(|content| {
                    let (meta, _) = frontmatter::parse(&content);
                    meta.get("title").cloned().unwrap_or_default()
                })
                .unwrap_or_default();

            posts.push(PostSummary {
                filename,
                title,
                created_at,
            });
        }

        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(posts)
    }

    pub fn read(&self, filename: &str) -> Result<String, StoreError> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(filename.to_string()));
        }
        Ok(fs::read_to_string(&path)?)
    }

    /// Create or overwrite a file.
    pub fn write(&self, filename: &str, content: &str) -> Result<(), StoreError> {
        let path = self.resolve(filename)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create an empty file. Creating an existing file is a no-op success.
    pub fn create(&self, filename: &str) -> Result<(), StoreError> {
        let path = self.resolve(filename)?;
        if path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, "")?;
        Ok(())
    }

    pub fn delete(&self, filename: &str) -> Result<(), StoreError> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(filename.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let old_path = self.resolve(old_name)?;
        let new_path = self.resolve(new_name)?;
        if !old_path.is_file() {
            return Err(StoreError::NotFound(old_name.to_string()));
        }
        fs::rename(&old_path, &new_path)?;
        Ok(())
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf, StoreError> {
        Ok(self.dir.join(sanitize_filename(filename)?))
    }
}

/// Reject any name that could escape the content directory.
fn sanitize_filename(name: &str) -> Result<&str, StoreError> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name)
}

fn file_created_at(path: &Path) -> i64 {
    let Ok(meta) = fs::metadata(path) else {
        return 0;
    };
    meta.created()
        .or_else(|_| meta.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
