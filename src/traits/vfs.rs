//! The path-level backend contract.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::{AccessCheck, MAX_PATHNAME, OpenOptions, VfsError, VfsFile};

/// A storage backend: the object that actually opens files and touches paths.
///
/// The shim delegates every operation here; anything it does not mirror or
/// trace passes through unchanged. Implementations must be safe to share
/// across threads — all methods take `&self`.
///
/// # Example
///
/// ```rust
/// use mirrorfs::{Vfs, OpenOptions, FileRole, VfsError};
/// use std::path::Path;
///
/// fn database_size<V: Vfs>(backend: &V, path: &Path) -> Result<u64, VfsError> {
///     let opts = OpenOptions::read_only(FileRole::MainDatabase);
///     let (mut file, _) = backend.open(Some(path), &opts)?;
///     let size = file.file_size()?;
///     file.close()?;
///     Ok(size)
/// }
/// ```
pub trait Vfs: Send + Sync {
    /// The name this backend registers under.
    fn name(&self) -> &str;

    /// Open a file and return its handle plus the effective open options.
    ///
    /// `path` is `None` for anonymous temporary files; the backend picks a
    /// location of its own. The returned [`OpenOptions`] report what actually
    /// happened (a file requested read-write may come back read-only).
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the file is missing and `create` is false
    /// - [`VfsError::CantOpen`] if the file cannot be opened at all
    /// - [`VfsError::PermissionDenied`] if access is denied
    fn open(
        &self,
        path: Option<&Path>,
        opts: &OpenOptions,
    ) -> Result<(Box<dyn VfsFile>, OpenOptions), VfsError>;

    /// Delete the file at `path`.
    ///
    /// When `sync_dir` is true, the containing directory is synced before
    /// returning so the deletion is durable.
    fn delete(&self, path: &Path, sync_dir: bool) -> Result<(), VfsError>;

    /// Test whether `path` satisfies the given access check.
    fn access(&self, path: &Path, check: AccessCheck) -> Result<bool, VfsError>;

    /// Resolve `path` to a full canonical pathname.
    fn full_pathname(&self, path: &Path) -> Result<PathBuf, VfsError>;

    /// Fill `buf` with random bytes.
    fn randomness(&self, buf: &mut [u8]);

    /// Block the calling thread for roughly `duration`; returns the time
    /// actually slept.
    ///
    /// The shim's bounded open-retry loop sleeps through this method, so a
    /// test backend can make retries instantaneous.
    fn sleep(&self, duration: Duration) -> Duration;

    /// The current wall-clock time.
    fn current_time(&self) -> SystemTime;

    /// Longest pathname this backend accepts.
    fn max_pathname(&self) -> usize {
        MAX_PATHNAME
    }
}

impl<V: Vfs + ?Sized> Vfs for &V {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(
        &self,
        path: Option<&Path>,
        opts: &OpenOptions,
    ) -> Result<(Box<dyn VfsFile>, OpenOptions), VfsError> {
        (**self).open(path, opts)
    }

    fn delete(&self, path: &Path, sync_dir: bool) -> Result<(), VfsError> {
        (**self).delete(path, sync_dir)
    }

    fn access(&self, path: &Path, check: AccessCheck) -> Result<bool, VfsError> {
        (**self).access(path, check)
    }

    fn full_pathname(&self, path: &Path) -> Result<PathBuf, VfsError> {
        (**self).full_pathname(path)
    }

    fn randomness(&self, buf: &mut [u8]) {
        (**self).randomness(buf)
    }

    fn sleep(&self, duration: Duration) -> Duration {
        (**self).sleep(duration)
    }

    fn current_time(&self) -> SystemTime {
        (**self).current_time()
    }

    fn max_pathname(&self) -> usize {
        (**self).max_pathname()
    }
}

impl<V: Vfs + ?Sized> Vfs for Arc<V> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(
        &self,
        path: Option<&Path>,
        opts: &OpenOptions,
    ) -> Result<(Box<dyn VfsFile>, OpenOptions), VfsError> {
        (**self).open(path, opts)
    }

    fn delete(&self, path: &Path, sync_dir: bool) -> Result<(), VfsError> {
        (**self).delete(path, sync_dir)
    }

    fn access(&self, path: &Path, check: AccessCheck) -> Result<bool, VfsError> {
        (**self).access(path, check)
    }

    fn full_pathname(&self, path: &Path) -> Result<PathBuf, VfsError> {
        (**self).full_pathname(path)
    }

    fn randomness(&self, buf: &mut [u8]) {
        (**self).randomness(buf)
    }

    fn sleep(&self, duration: Duration) -> Duration {
        (**self).sleep(duration)
    }

    fn current_time(&self) -> SystemTime {
        (**self).current_time()
    }

    fn max_pathname(&self) -> usize {
        (**self).max_pathname()
    }
}
