//! Durable state of the digest: rotation record, archive and rendered page.
//!
//! Each run reads fresh state at start and writes it back once at the end.
//! The rotation record and the archive are committed together as one
//! [`Snapshot`], so the archive can never advance without the rotation.
//!
//! # On-disk layout
//!
//! ```text
//! output_dir/
//! ├── state.json     # RotationState
//! ├── archive.json   # Archive, newest week first
//! └── index.html     # rendered page
//! ```
//!
//! # Commit protocol
//!
//! 1. write `archive.json.tmp`
//! 2. write `state.json.tmp`
//! 3. rename `archive.json.tmp` over `archive.json`
//! 4. rename `state.json.tmp` over `state.json`
//!
//! A crash leaves temp files behind that [`FileStore::load`] resolves before
//! reading: both temps present means nothing was renamed yet (roll back), a
//! lone state temp means the archive is already in place (roll forward).
//! [`FileStore::peek`] reads the same outcome without touching the directory.

use crate::archive::Archive;
use crate::rotation::RotationState;
use crate::utils::{temp_path_for, write_atomic, write_temp};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Result of reading one persisted artifact.
///
/// Keeps "never written" apart from "written but unreadable" so the caller can
/// warn about the latter while still falling back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Present(T),
    Absent,
    Corrupt { reason: String },
}

impl<T: Default> Loaded<T> {
    /// The loaded value, or the default for absent and corrupt artifacts.
    pub fn into_value(self) -> T {
        match self {
            Loaded::Present(value) => value,
            Loaded::Absent | Loaded::Corrupt { .. } => T::default(),
        }
    }
}

impl<T> Loaded<T> {
    pub fn corruption(&self) -> Option<&str> {
        match self {
            Loaded::Corrupt { reason } => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Everything read at the start of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub rotation: Loaded<RotationState>,
    pub archive: Loaded<Archive>,
}

/// Everything written at the end of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub rotation: RotationState,
    pub archive: Archive,
}

/// Storage for the digest's persisted state.
///
/// Single writer at a time: no locking is performed.
pub trait DigestStore {
    /// Read rotation record and archive. Never fails on missing or bad data.
    async fn load(&self) -> LoadedState;

    /// Replace the published page.
    async fn write_page(&self, html: &str) -> Result<(), Box<dyn Error>>;

    /// Persist rotation record and archive as one transaction.
    async fn commit(&self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>>;
}

/// [`DigestStore`] backed by JSON files in an output directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join("archive.json")
    }

    pub fn page_path(&self) -> PathBuf {
        self.dir.join("index.html")
    }

    /// What [`DigestStore::load`] would return, without modifying anything.
    ///
    /// Leftover temp files are interpreted the way recovery would resolve
    /// them, but stay where they are.
    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    pub async fn peek(&self) -> LoadedState {
        let state_tmp = temp_path_for(&self.state_path());
        let archive_tmp = temp_path_for(&self.archive_path());
        let has_archive_tmp = fs::try_exists(&archive_tmp).await.unwrap_or(false);

        let rotation = match read_json::<RotationState>(&state_tmp).await {
            Loaded::Present(pending) if !has_archive_tmp => {
                info!("Unfinished commit would be rolled forward");
                Loaded::Present(pending)
            }
            _ => read_json(&self.state_path()).await,
        };
        LoadedState {
            rotation,
            archive: read_json(&self.archive_path()).await,
        }
    }

    /// Resolve temp files left by a commit that did not finish.
    async fn recover_interrupted_commit(&self) -> Result<(), Box<dyn Error>> {
        let state_tmp = temp_path_for(&self.state_path());
        let archive_tmp = temp_path_for(&self.archive_path());
        let has_state_tmp = fs::try_exists(&state_tmp).await?;
        let has_archive_tmp = fs::try_exists(&archive_tmp).await?;

        match (has_archive_tmp, has_state_tmp) {
            (false, false) => {}
            (true, true) => {
                warn!("Found unfinished commit before archive rename; rolling back");
                fs::remove_file(&archive_tmp).await?;
                fs::remove_file(&state_tmp).await?;
            }
            (false, true) => {
                let parsed = fs::read_to_string(&state_tmp)
                    .await
                    .ok()
                    .and_then(|raw| serde_json::from_str::<RotationState>(&raw).ok());
                if parsed.is_some() {
                    warn!("Found unfinished commit after archive rename; rolling forward");
                    fs::rename(&state_tmp, self.state_path()).await?;
                } else {
                    warn!("Discarding unreadable state temp file");
                    fs::remove_file(&state_tmp).await?;
                }
            }
            (true, false) => {
                warn!("Discarding partial archive temp file");
                fs::remove_file(&archive_tmp).await?;
            }
        }
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    match fs::read_to_string(path).await {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Loaded::Present(value),
            Err(e) => Loaded::Corrupt {
                reason: format!("{}: {e}", path.display()),
            },
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Loaded::Absent,
        Err(e) => Loaded::Corrupt {
            reason: format!("{}: {e}", path.display()),
        },
    }
}

impl DigestStore for FileStore {
    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    async fn load(&self) -> LoadedState {
        if let Err(e) = self.recover_interrupted_commit().await {
            warn!(error = %e, "Could not recover unfinished commit");
        }
        LoadedState {
            rotation: read_json(&self.state_path()).await,
            archive: read_json(&self.archive_path()).await,
        }
    }

    #[instrument(level = "info", skip_all, fields(path = %self.page_path().display()))]
    async fn write_page(&self, html: &str) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&self.dir).await?;
        write_atomic(&self.page_path(), html.as_bytes()).await?;
        info!(bytes = html.len(), "Wrote page");
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    async fn commit(&self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(&self.dir).await?;

        let archive_json = serde_json::to_vec_pretty(&snapshot.archive)?;
        let state_json = serde_json::to_vec_pretty(&snapshot.rotation)?;

        let archive_tmp = write_temp(&self.archive_path(), &archive_json).await?;
        let state_tmp = write_temp(&self.state_path(), &state_json).await?;
        fs::rename(&archive_tmp, self.archive_path()).await?;
        fs::rename(&state_tmp, self.state_path()).await?;

        info!(
            weeks = snapshot.archive.week_count(),
            last_index = snapshot.rotation.last_index,
            "Committed state"
        );
        Ok(())
    }
}

/// In-memory [`DigestStore`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    rotation: Option<RotationState>,
    archive: Option<Archive>,
    page: Option<String>,
    commits: usize,
    fail_page_write: bool,
}

impl MemoryStore {
    pub fn with_state(rotation: RotationState, archive: Archive) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                rotation: Some(rotation),
                archive: Some(archive),
                ..MemoryInner::default()
            }),
        }
    }

    /// Make every subsequent [`DigestStore::write_page`] fail.
    #[cfg(test)]
    pub fn failing_page_writes(self) -> Self {
        self.lock().fail_page_write = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub fn rotation(&self) -> Option<RotationState> {
        self.lock().rotation.clone()
    }

    #[cfg(test)]
    pub fn archive(&self) -> Option<Archive> {
        self.lock().archive.clone()
    }

    #[cfg(test)]
    pub fn page(&self) -> Option<String> {
        self.lock().page.clone()
    }

    #[cfg(test)]
    pub fn commits(&self) -> usize {
        self.lock().commits
    }
}

impl DigestStore for MemoryStore {
    async fn load(&self) -> LoadedState {
        let inner = self.lock();
        LoadedState {
            rotation: inner.rotation.clone().map_or(Loaded::Absent, Loaded::Present),
            archive: inner.archive.clone().map_or(Loaded::Absent, Loaded::Present),
        }
    }

    async fn write_page(&self, html: &str) -> Result<(), Box<dyn Error>> {
        let mut inner = self.lock();
        if inner.fail_page_write {
            return Err("page write refused".into());
        }
        inner.page = Some(html.to_string());
        Ok(())
    }

    async fn commit(&self, snapshot: &Snapshot) -> Result<(), Box<dyn Error>> {
        let mut inner = self.lock();
        inner.rotation = Some(snapshot.rotation.clone());
        inner.archive = Some(snapshot.archive.clone());
        inner.commits += 1;
        Ok(())
    }
}
