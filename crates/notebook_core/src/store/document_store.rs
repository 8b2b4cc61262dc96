//! Exclusive load/mutate/save cycles over one JSON document file.
//!
//! # Responsibility
//! - Create the backing file on first use.
//! - Run caller closures against a freshly loaded document.
//! - Persist with temp-file + fsync + rename so readers never see a torn file.
//!
//! # Invariants
//! - One lock per canonical document path, shared by every store in the
//!   process that points at that file.
//! - The lock is held from load until the rename completes.
//! - Closure errors and panics skip the save step entirely.
//! - No document state is cached between critical sections.

use super::{StoreError, StoreResult};
use crate::model::note::NoteDocument;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

type PathLock = Arc<Mutex<()>>;

static PATH_LOCKS: Lazy<Mutex<HashMap<PathBuf, PathLock>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Sole owner of the persisted note document.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    lock: PathLock,
}

impl DocumentStore {
    /// Binds a store to `path` without touching the file system.
    ///
    /// Stores bound to the same file share one process-wide lock. The key is
    /// resolved here, so create missing parent directories first (or use
    /// [`DocumentStore::open`]) when symlinks are involved.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock_for(&path);
        Self { path, lock }
    }

    /// Creates missing parent directories, binds a store to `path` and runs
    /// [`DocumentStore::initialize`].
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::write(parent, err))?;
        }
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty document file when none exists.
    ///
    /// Idempotent: an existing file is left untouched, whatever it holds.
    pub fn initialize(&self) -> StoreResult<()> {
        let _guard = self.acquire();
        if self.path.exists() {
            info!(
                "event=store_init module=store status=ok created=false path={}",
                self.path.display()
            );
            return Ok(());
        }

        self.save(&NoteDocument::default())?;
        info!(
            "event=store_init module=store status=ok created=true path={}",
            self.path.display()
        );
        Ok(())
    }

    /// Runs `f` against the loaded document and persists the result.
    ///
    /// The save only happens when `f` returns `Ok`. Storage failures are
    /// converted into the caller's error type.
    pub fn with_document<T, E>(
        &self,
        f: impl FnOnce(&mut NoteDocument) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.acquire();
        let started_at = Instant::now();
        let mut document = self.load()?;
        let value = f(&mut document)?;
        self.save(&document)?;
        debug!(
            "event=store_write module=store status=ok topics={} notes={} duration_ms={}",
            document.topics.len(),
            document.note_count(),
            started_at.elapsed().as_millis()
        );
        Ok(value)
    }

    /// Runs `f` against the loaded document without persisting.
    ///
    /// Takes the same exclusive lock as [`DocumentStore::with_document`].
    pub fn read_document<T>(&self, f: impl FnOnce(&NoteDocument) -> T) -> StoreResult<T> {
        let _guard = self.acquire();
        let document = self.load()?;
        Ok(f(&document))
    }

    fn acquire(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock only means a closure panicked before save; the file
        // on disk is still the last committed state.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> StoreResult<NoteDocument> {
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::NotFound => "document file is missing".to_string(),
                _ => err.to_string(),
            };
            self.log_failure("store_load", "storage_corruption", &reason);
            StoreError::corruption(&self.path, reason)
        })?;

        let document: NoteDocument = serde_json::from_str(&raw).map_err(|err| {
            self.log_failure("store_load", "storage_corruption", &err.to_string());
            StoreError::corruption(&self.path, err.to_string())
        })?;

        if let Some(name) = document.first_duplicate_topic() {
            let reason = format!("duplicate topic name `{name}`");
            self.log_failure("store_load", "storage_corruption", &reason);
            return Err(StoreError::corruption(&self.path, reason));
        }

        Ok(document)
    }

    fn save(&self, document: &NoteDocument) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(document).map_err(|err| {
            StoreError::write(&self.path, std::io::Error::new(ErrorKind::InvalidData, err))
        })?;

        let temp_path = self.temp_path();
        let result = write_synced(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));

        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path);
            self.log_failure("store_save", "storage_write", &err.to_string());
            return Err(StoreError::write(&self.path, err));
        }
        Ok(())
    }

    /// Per-process temp name; saves within the process are already
    /// serialized by the path lock.
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "notebook".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", std::process::id()))
    }

    fn log_failure(&self, event: &str, code: &str, reason: &str) {
        error!(
            "event={event} module=store status=error error_code={code} path={} error={reason}",
            self.path.display()
        );
    }
}

fn lock_for(path: &Path) -> PathLock {
    let key = lock_key(path);
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

/// Canonical form of `path`, resolving through the parent directory when the
/// file itself does not exist yet.
fn lock_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().ok().map(|dir| dir.join(name)),
        _ => None,
    };
    resolved.unwrap_or(absolute)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
