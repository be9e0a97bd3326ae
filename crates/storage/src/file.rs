//! File-backed code store.
//!
//! [`FileCodeStore`] persists the code set as a line-delimited text file (see
//! [`LineCodec`]) and keeps no in-memory copy: every read decodes the file, so
//! a store whose backing file disappears reports
//! [`StorageError::StorageUnavailable`] instead of serving stale data.
//!
//! # Concurrency
//!
//! Access to the file goes through a [`tokio::sync::RwLock`]. Readers share
//! it; writers hold it exclusively across the whole read-modify-write cycle.
//! The guard is moved into the blocking task that performs the I/O, so a
//! caller that drops its future mid-operation cannot release the lock before
//! the write has finished.
//!
//! # Durability
//!
//! | Operation | Strategy |
//! |-----------|----------|
//! | `insert` | Append one line, then `sync_data` |
//! | `remove`, `remove_all` | Write `<path>.tmp`, `sync_all`, rename over `<path>`, sync the directory |
//!
//! A failed append is truncated back to the last complete line. A crash
//! during an append can still leave an unterminated final line, and a crash
//! during a rewrite can leave `<path>.tmp` behind. [`FileCodeStore::open`]
//! repairs both before serving requests; an `insert` that finds a torn tail
//! rewrites the file instead of appending to it.
//!
//! # Example
//!
//! ```no_run
//! use codeguard_storage::{CodeStore, FileCodeStore, FileStoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FileStoreConfig::builder().path("/var/lib/codeguard/codes.txt").build()?;
//! let store = FileCodeStore::open(config).await?;
//!
//! store.insert("whxgpo").await?;
//! assert!(store.contains("WHXGPO").await?);
//! # Ok(())
//! # }
//! ```

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use async_trait::async_trait;
use fail::fail_point;
use fs2::FileExt;
use tokio::sync::RwLock;
use tracing::{Span, debug, info, warn};

use crate::{
    backend::CodeStore,
    code::Code,
    codec::{Decoded, LineCodec},
    config::FileStoreConfig,
    error::{StorageError, StorageResult},
    health::{HealthMetadata, HealthProbe, HealthStatus},
    limits::CodeLimits,
    set::CodeSet,
};

/// Durable [`CodeStore`] backed by a plain text file.
///
/// Share it between request handlers with an [`Arc`].
pub struct FileCodeStore {
    file: Arc<RwLock<CodeFile>>,
    limits: CodeLimits,
    /// Holds the advisory lock until the store is dropped.
    _lock: Option<File>,
}

/// Exclusive owner of the on-disk paths. Only reachable through the lock.
struct CodeFile {
    path: PathBuf,
    staging: PathBuf,
}

impl FileCodeStore {
    /// Opens the store, creating and initializing the file if absent.
    ///
    /// On first startup the file is created containing the configured seed
    /// codes (none by default). On later startups the existing file is
    /// decoded; a torn final line, a leftover staging file, or non-canonical
    /// entries are repaired with an atomic rewrite.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StorageUnavailable`] if the configuration is
    /// invalid, the directory or file cannot be created or read, or another
    /// process holds the lock. Returns [`StorageError::Corrupted`] if the
    /// existing file cannot be decoded.
    #[tracing::instrument(skip(config), fields(path = %config.path().display()))]
    pub async fn open(config: FileStoreConfig) -> StorageResult<Self> {
        config
            .validate()
            .map_err(|e| StorageError::unavailable_with_source("invalid store configuration", e))?;

        let span = Span::current();
        run_blocking(move || span.in_scope(|| Self::open_blocking(config))).await
    }

    fn open_blocking(config: FileStoreConfig) -> StorageResult<Self> {
        let file = CodeFile { path: config.path().to_path_buf(), staging: config.staging_path() };

        let parent = file.parent_dir();
        if !parent.exists() {
            fs::create_dir_all(&parent).map_err(|e| {
                StorageError::unavailable_with_source(
                    format!("failed to create directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let lock = if config.lock() { Some(acquire_lock(&config.lock_path())?) } else { None };

        if file.staging.exists() {
            info!(staging = %file.staging.display(), "discarding interrupted rewrite");
            fs::remove_file(&file.staging).map_err(|e| file.io_error("remove staging file", e))?;
        }

        if file.path.exists() {
            let decoded = file.load()?;
            if decoded.needs_rewrite() {
                warn!(
                    torn_tail_bytes = decoded.torn_tail.unwrap_or(0),
                    non_canonical = decoded.non_canonical,
                    codes = decoded.codes.len(),
                    "repairing code file"
                );
                file.replace(&decoded.codes)?;
            } else {
                info!(codes = decoded.codes.len(), "opened code file");
            }
        } else {
            let seeds: CodeSet = config
                .seed_codes()
                .iter()
                .map(|raw| Code::parse(raw, config.limits()))
                .collect::<StorageResult<_>>()?;
            file.replace(&seeds)?;
            info!(codes = seeds.len(), "created code file");
        }

        Ok(Self { file: Arc::new(RwLock::new(file)), limits: *config.limits(), _lock: lock })
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn limits(&self) -> &CodeLimits {
        &self.limits
    }

    /// Runs `op` with shared access to the file.
    async fn read<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CodeFile) -> StorageResult<T> + Send + 'static,
    {
        let guard = Arc::clone(&self.file).read_owned().await;
        let span = Span::current();
        run_blocking(move || span.in_scope(|| op(&*guard))).await
    }

    /// Runs `op` with exclusive access to the file.
    async fn write<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CodeFile) -> StorageResult<T> + Send + 'static,
    {
        let guard = Arc::clone(&self.file).write_owned().await;
        let span = Span::current();
        run_blocking(move || span.in_scope(|| op(&*guard))).await
    }
}

#[async_trait]
impl CodeStore for FileCodeStore {
    #[tracing::instrument(skip(self), fields(backend = "file"))]
    async fn contains(&self, code: &str) -> StorageResult<bool> {
        let code = Code::lookup(code)?;
        self.read(move |file| Ok(file.load()?.codes.contains(&code))).await
    }

    #[tracing::instrument(skip(self), fields(backend = "file"))]
    async fn insert(&self, code: &str) -> StorageResult<()> {
        let code = Code::parse(code, &self.limits)?;
        self.write(move |file| {
            let decoded = file.load()?;
            if decoded.codes.contains(&code) {
                debug!(%code, "code already present");
                return Ok(());
            }
            if let Some(torn) = decoded.torn_tail {
                // Appending now would fuse the new entry onto the fragment.
                warn!(torn_tail_bytes = torn, %code, "rewriting code file with torn tail");
                let mut codes = decoded.codes;
                codes.insert(code);
                return file.replace(&codes);
            }
            file.append(&code)?;
            debug!(%code, "code inserted");
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(backend = "file"))]
    async fn remove(&self, code: &str) -> StorageResult<()> {
        let code = Code::lookup(code)?;
        self.write(move |file| {
            let mut codes = file.load()?.codes;
            if !codes.remove(&code) {
                debug!(%code, "code not present");
                return Ok(());
            }
            file.replace(&codes)?;
            debug!(%code, "code removed");
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(backend = "file"))]
    async fn remove_all(&self) -> StorageResult<()> {
        self.write(|file| {
            // Never recreate a file that vanished underneath us.
            fs::metadata(&file.path).map_err(|e| file.io_error("stat", e))?;
            file.replace(&CodeSet::new())?;
            debug!("all codes removed");
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(backend = "file"))]
    async fn list(&self) -> StorageResult<Vec<String>> {
        self.read(|file| Ok(file.load()?.codes.to_strings())).await
    }

    #[tracing::instrument(skip(self), fields(backend = "file"))]
    async fn health_check(&self, probe: HealthProbe) -> StorageResult<HealthStatus> {
        let start = Instant::now();
        match probe {
            HealthProbe::Liveness => {
                Ok(HealthStatus::healthy(HealthMetadata::new(start.elapsed(), "file")))
            },
            HealthProbe::Readiness => {
                self.read(move |file| {
                    let metadata = HealthMetadata::new(start.elapsed(), "file")
                        .with_detail("path", file.path.display().to_string());
                    Ok(match file.load() {
                        Ok(decoded) => HealthStatus::healthy(
                            metadata.with_detail("code_count", decoded.codes.len().to_string()),
                        ),
                        Err(e) => HealthStatus::unhealthy(metadata, e.to_string()),
                    })
                })
                .await
            },
        }
    }
}

impl CodeFile {
    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn io_error(&self, action: &str, source: io::Error) -> StorageError {
        StorageError::unavailable_with_source(
            format!("failed to {action} {}", self.path.display()),
            source,
        )
    }

    /// Reads and decodes the current file.
    fn load(&self) -> StorageResult<Decoded> {
        let bytes = fs::read(&self.path).map_err(|e| self.io_error("read", e))?;
        LineCodec::decode(&bytes)
    }

    /// Appends one entry and flushes it to stable storage.
    ///
    /// The file must already exist; a missing file is a fault, not a cue to
    /// recreate it.
    fn append(&self, code: &Code) -> StorageResult<()> {
        fail_point!("code-file-append", |_| {
            Err(StorageError::unavailable("injected failure before append"))
        });

        let mut file =
            OpenOptions::new().append(true).open(&self.path).map_err(|e| self.io_error("open", e))?;
        let committed_len = file.metadata().map_err(|e| self.io_error("stat", e))?.len();

        if let Err(e) = write_entry(&mut file, &LineCodec::encode_entry(code)) {
            // Drop any partial entry so the file ends on a line boundary.
            if let Err(truncate_err) = file.set_len(committed_len) {
                warn!(error = %truncate_err, "failed to roll back partial append");
            }
            return Err(self.io_error("append to", e));
        }
        file.sync_data().map_err(|e| self.io_error("sync", e))
    }

    /// Atomically replaces the file with `codes`.
    ///
    /// Readers and a crash at any point observe either the old or the new
    /// contents, never a truncated file.
    fn replace(&self, codes: &CodeSet) -> StorageResult<()> {
        let staging_error = |action: &str, e: io::Error| {
            StorageError::unavailable_with_source(
                format!("failed to {action} {}", self.staging.display()),
                e,
            )
        };

        let mut staging = File::create(&self.staging).map_err(|e| staging_error("create", e))?;
        staging.write_all(&LineCodec::encode(codes)).map_err(|e| staging_error("write", e))?;
        staging.sync_all().map_err(|e| staging_error("sync", e))?;
        drop(staging);

        fail_point!("code-file-before-rename", |_| {
            let _ = fs::remove_file(&self.staging);
            Err(StorageError::unavailable("injected failure before rename"))
        });

        if let Err(e) = fs::rename(&self.staging, &self.path) {
            let _ = fs::remove_file(&self.staging);
            return Err(self.io_error("replace", e));
        }
        sync_dir(&self.parent_dir()).map_err(|e| self.io_error("sync directory of", e))
    }
}

fn write_entry(file: &mut File, entry: &[u8]) -> io::Result<()> {
    fail_point!("code-file-partial-append", |_| {
        file.write_all(&entry[..entry.len() / 2])?;
        Err(io::Error::other("injected failure mid-append"))
    });
    file.write_all(entry)
}

/// Makes a completed rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Takes an exclusive, non-blocking advisory lock. The OS releases it when the
/// returned handle is closed, including on crash.
fn acquire_lock(path: &Path) -> StorageResult<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| {
            StorageError::unavailable_with_source(
                format!("failed to create lock file {}", path.display()),
                e,
            )
        })?;
    file.try_lock_exclusive().map_err(|e| {
        StorageError::unavailable_with_source(
            format!("code file is locked by another process: {}", path.display()),
            e,
        )
    })?;
    Ok(file)
}

/// Runs blocking file I/O off the async runtime.
///
/// The task runs to completion even if the awaiting future is dropped.
async fn run_blocking<T, F>(op: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StorageResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StorageError::unavailable_with_source("storage task did not complete", e))?
}
