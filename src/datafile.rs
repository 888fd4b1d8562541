//! Locked JSON document storage.
//!
//! Tokens, sessions, and rate-limit windows each live in a single small JSON
//! file that is loaded whole, mutated, and written back whole. Concurrent
//! requests from separate processes can race on that cycle, so every mutation
//! runs under an exclusive advisory lock: a sidecar `<name>.lock` file
//! created with `O_CREAT|O_EXCL`, removed when the guard drops. Writers then
//! replace the document atomically (write to a temp file, rename over), so a
//! reader never observes a truncated document.
//!
//! A lock left behind by a crashed process is taken over once it is older
//! than [`STALE_AFTER`]. A missing or unparseable document loads as the
//! type's `Default`, mirroring how a corrupt cache manifest falls back to an
//! empty one rather than aborting.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

/// How long to keep retrying for the lock before giving up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll interval while waiting on a held lock.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A lock file older than this is presumed abandoned and removed.
const STALE_AFTER: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum DataFileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Timed out waiting for lock: {0}")]
    LockTimeout(PathBuf),
}

/// A JSON document on disk with exclusive-lock read-modify-write access.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `mutate` on the document under the exclusive lock and persist the
    /// result atomically. Returns whatever the closure returns.
    pub fn update<T, R, F>(&self, mutate: F) -> Result<R, DataFileError>
    where
        T: Default + Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> R,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let _lock = LockFile::acquire(self.lock_path())?;

        let mut value: T = load_or_default(&self.path);
        let out = mutate(&mut value);

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, serde_json::to_vec(&value)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(out)
    }

    /// Read the current document without mutating it. Takes the lock so a
    /// concurrent writer's rename cannot interleave with the read.
    pub fn read<T>(&self) -> Result<T, DataFileError>
    where
        T: Default + DeserializeOwned,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let _lock = LockFile::acquire(self.lock_path())?;
        Ok(load_or_default(&self.path))
    }

    fn lock_path(&self) -> PathBuf {
        sidecar(&self.path, "lock")
    }
}

/// Missing file or corrupt JSON both load as the default document.
fn load_or_default<T: Default + DeserializeOwned>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => T::default(),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    sidecar(path, "tmp")
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{suffix}"))
}

/// Advisory lock held for the duration of one read-modify-write cycle.
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(path: PathBuf) -> Result<Self, DataFileError> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if lock_is_stale(&path) {
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    if started.elapsed() > ACQUIRE_TIMEOUT {
                        return Err(DataFileError::LockTimeout(path));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_is_stale(path: &Path) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        // Holder released between our open and this check; retry will win.
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age > STALE_AFTER)
        .unwrap_or(false)
}
