//! # File I/O
//!
//! Job and report files are JSON. Writes are atomic (temp file, fsync,
//! rename) and a job can be locked while a layout is being applied, so two
//! people on a shared drive don't apply the same job at once.
//!
//! | File                 | Contents                    |
//! |----------------------|-----------------------------|
//! | `job.rbj`            | [`LayoutJob`]               |
//! | `job.rbj.lock`       | [`LockInfo`] of the holder  |
//! | `job.layout.json`    | [`BatchReport`]             |
//!
//! ## Example
//!
//! ```rust,no_run
//! use rebar_core::file_io::{load_job, report_path_for, save_report, FileLock};
//! use rebar_core::job::Scope;
//! use std::path::Path;
//!
//! let path = Path::new("level2.rbj");
//! let lock = FileLock::acquire(path, "engineer@company.com")?;
//! let job = load_job(path)?;
//! let report = job.run(&Scope::All)?;
//! save_report(&report, &report_path_for(path))?;
//! drop(lock);
//! # Ok::<(), rebar_core::errors::RebarError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::batch::BatchReport;
use crate::errors::{RebarError, RebarResult};
use crate::job::{LayoutJob, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of the holder
const STALE_LOCK_HOURS: i64 = 24;

/// Who holds a job lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// True when the holding process is gone or the lock has expired.
    pub fn is_stale(&self) -> bool {
        if hostname().as_deref() == Some(self.machine.as_str()) && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive lock on a job file, released on drop.
///
/// Holds an OS-level lock on the `.lock` side file and writes the holder's
/// [`LockInfo`] into it so other users can see who has the job.
pub struct FileLock {
    job_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`.
    ///
    /// # Errors
    ///
    /// * `FileLocked` - a live lock is held by someone else
    /// * `FileError` - the lock file could not be written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> RebarResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(RebarError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(
                path = %path.display(),
                holder = %existing.user_id,
                "Taking over stale lock"
            );
        }

        let mut lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| RebarError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            RebarError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(|e| RebarError::serialization(e.to_string()))?;
        lock_file
            .write_all(json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| RebarError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            job_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// The live lock on `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }

    pub fn job_path(&self) -> &Path {
        &self.job_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `<path>.lock`
pub fn lock_path_for(path: &Path) -> PathBuf {
    with_suffix(path, ".lock")
}

/// Default report path for a job: `level2.rbj` -> `level2.layout.json`.
pub fn report_path_for(job_path: &Path) -> PathBuf {
    job_path.with_extension("layout.json")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Unreadable or malformed lock files count as no lock.
fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Serialize `value` and replace `path` atomically.
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> RebarResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| RebarError::serialization(e.to_string()))?;
    let tmp_path = with_suffix(path, ".tmp");

    let result = write_and_sync(&tmp_path, json.as_bytes()).and_then(|_| {
        fs::rename(&tmp_path, path)
            .map_err(|e| RebarError::file_error("rename to final", path.display().to_string(), e.to_string()))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_sync(tmp_path: &Path, bytes: &[u8]) -> RebarResult<()> {
    let mut tmp_file = File::create(tmp_path)
        .map_err(|e| RebarError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(bytes)
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| RebarError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> RebarResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| RebarError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| RebarError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))
}

pub fn save_job(job: &LayoutJob, path: &Path) -> RebarResult<()> {
    write_json_atomic(job, path)?;
    info!(path = %path.display(), beams = job.beam_count(), "Job saved");
    Ok(())
}

/// Load a job and check its schema version.
///
/// # Errors
///
/// * `FileError` - the file could not be read
/// * `SerializationError` - the file is not a valid job
/// * `VersionMismatch` - the file was written by an incompatible version
pub fn load_job(path: &Path) -> RebarResult<LayoutJob> {
    let job: LayoutJob = read_json(path)?;
    validate_version(&job.meta.version)?;
    info!(path = %path.display(), beams = job.beam_count(), "Job loaded");
    Ok(job)
}

/// Load a job along with the live lock on it, if someone holds one.
pub fn load_job_with_lock_check(path: &Path) -> RebarResult<(LayoutJob, Option<LockInfo>)> {
    let job = load_job(path)?;
    Ok((job, FileLock::check(path)))
}

pub fn save_report(report: &BatchReport, path: &Path) -> RebarResult<()> {
    write_json_atomic(report, path)?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}

/// Same major version; within 0.x the file's minor may not be newer.
fn validate_version(file_version: &str) -> RebarResult<()> {
    let parse = |v: &str| -> Option<(u32, u32)> {
        let mut parts = v.split('.').map(|p| p.parse::<u32>());
        let major = parts.next()?.ok()?;
        let minor = parts.next().unwrap_or(Ok(0)).ok()?;
        Some((major, minor))
    };
    let mismatch = || RebarError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (file_major, file_minor) = parse(file_version).ok_or_else(mismatch)?;
    let (major, minor) = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != major || (major == 0 && file_minor > minor) {
        return Err(mismatch());
    }
    Ok(())
}
