//! Cached session loader for the dashboard runtime.
//!
//! Wraps [`analyze_file`] with a cache keyed on the input file's modification
//! time. Callers use [`SessionManager::get_session`] to obtain a
//! [`DashboardSession`]; the file is only read again when it changed on disk
//! or a refresh is forced.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use attribution_core::error::Result;
use attribution_data::analysis::analyze_file;

use crate::session::DashboardSession;

// ── SessionManager ────────────────────────────────────────────────────────────

/// File-backed cache of one [`DashboardSession`].
///
/// # Example
/// ```no_run
/// use attribution_runtime::data_manager::SessionManager;
///
/// let mut mgr = SessionManager::new("Customerattributiondata.csv");
/// let session = mgr.get_session(false)?;
/// println!("rows: {}", session.cleaned().len());
/// # Ok::<(), attribution_core::error::IngestError>(())
/// ```
pub struct SessionManager {
    /// Events file this manager loads.
    data_path: PathBuf,
    /// Most recently loaded session.
    session: Option<DashboardSession>,
    /// When the cache was last populated.
    loaded_at: Option<Instant>,
    /// Modification time of the file when it was last read.
    source_modified: Option<SystemTime>,
    /// Description of the last load failure.
    last_error: Option<String>,
}

impl SessionManager {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            session: None,
            loaded_at: None,
            source_modified: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the session for the configured file, loading it when needed.
    ///
    /// The cached session is reused unless `force_refresh` is set or the
    /// file's modification time differs from the one seen at the last load.
    /// Ingest failures are returned and remembered in [`Self::last_error`].
    pub fn get_session(&mut self, force_refresh: bool) -> Result<&DashboardSession> {
        let reuse = !force_refresh && self.is_cache_valid();

        let session = match self.session.take() {
            Some(session) if reuse => {
                tracing::debug!("returning cached session");
                session
            }
            _ => self.load()?,
        };

        Ok(self.session.insert(session))
    }

    /// Discard the current session, forcing the next call to reload.
    pub fn invalidate_cache(&mut self) {
        self.session = None;
        self.loaded_at = None;
        self.source_modified = None;
        tracing::debug!("cache invalidated");
    }

    /// Time since the cached session was loaded, `None` when nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.loaded_at.map(|ts| ts.elapsed())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when a session is cached and the file has not been touched since.
    fn is_cache_valid(&self) -> bool {
        match (self.session.as_ref(), self.source_modified) {
            (Some(_), Some(seen)) => modified_time(&self.data_path) == Some(seen),
            _ => false,
        }
    }

    /// Run the pipeline on the configured file and record the outcome.
    fn load(&mut self) -> Result<DashboardSession> {
        // Read the mtime first so a write racing the load triggers a reload.
        let modified = modified_time(&self.data_path);

        match analyze_file(&self.data_path) {
            Ok(result) => {
                tracing::debug!(
                    rows = result.metadata.rows_loaded,
                    load_secs = result.metadata.load_time_seconds,
                    "session cache updated"
                );
                self.loaded_at = Some(Instant::now());
                self.source_modified = modified;
                self.last_error = None;
                Ok(DashboardSession::new(result))
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %self.data_path.display(), "load failed");
                self.loaded_at = None;
                self.source_modified = None;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
