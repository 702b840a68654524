//! Shim configuration: mirror root and open-retry policy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::mirror_path::strip_trailing_separators;
use crate::{MAX_PATHNAME, VfsError};

/// How many times a secondary open is attempted before mirroring degrades
/// to primary-only for that file.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 10;

/// Fixed delay between secondary open attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5);

/// Validated mirroring configuration, constructed once and owned by the shim.
///
/// [`MirrorConfig::new`] performs the pure string checks: non-empty, shorter
/// than [`MAX_PATHNAME`], trailing separators stripped. That the root refers
/// to an existing directory is checked once against the backend when the shim
/// is constructed, not per call.
///
/// ```rust
/// use mirrorfs::MirrorConfig;
///
/// let config = MirrorConfig::new("/backup/mirror///").unwrap();
/// assert_eq!(config.root().to_str().unwrap(), "/backup/mirror");
/// ```
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    root: PathBuf,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl MirrorConfig {
    /// Validate `root` and build a configuration with default retry policy.
    ///
    /// # Errors
    ///
    /// [`VfsError::InvalidConfig`] when the root is empty, too long, or
    /// nothing but separators.
    pub fn new(root: &str) -> Result<Self, VfsError> {
        if root.is_empty() {
            return Err(VfsError::InvalidConfig {
                reason: "mirror root is empty",
            });
        }
        if root.len() >= MAX_PATHNAME {
            return Err(VfsError::InvalidConfig {
                reason: "mirror root exceeds the maximum pathname length",
            });
        }
        let stripped = strip_trailing_separators(root);
        if stripped.len() < 2 {
            return Err(VfsError::InvalidConfig {
                reason: "mirror root is too short to name a directory",
            });
        }
        Ok(Self {
            root: PathBuf::from(stripped),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Override the secondary-open retry bound.
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts.max(1);
        self
    }

    /// Override the delay between secondary-open attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The validated mirror root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub(crate) fn delay(&self) -> Duration {
        self.retry_delay
    }
}
