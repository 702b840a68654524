//! The mirroring shim: a VFS that wraps another VFS.
//!
//! [`MirrorFs`] presents the same [`Vfs`] surface as the backend it wraps, so
//! the engine cannot tell them apart. On top of plain delegation it does two
//! things:
//!
//! 1. every open of a main database or main journal file also opens a copy
//!    under the configured mirror root, and every mutating operation on such
//!    a file is fanned out to that copy;
//! 2. every operation emits one trace line through the injected sink.
//!
//! The mirror is an auxiliary redundancy feature: its unavailability must
//! never prevent normal database operation. A primary failure is always
//! caller-visible; a mirror that cannot be opened merely degrades that file
//! to primary-only, visible in the trace and nowhere else.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::file::MirroredFile;
use crate::mirror_path::{file_tail, mirror_path};
use crate::trace::{Tracer, rc_str};
use crate::{AccessCheck, MirrorConfig, OpenOptions, TraceSink, Vfs, VfsError, VfsFile};

/// Logical name used for anonymous temporary files in trace output.
const TEMP_NAME: &str = "<temp>";

/// A write-mirroring, tracing VFS shim over any [`Vfs`] backend.
///
/// The backend is owned; wrap it in `Arc` (or pass a reference) when it must
/// be shared with other users — the blanket [`Vfs`] impls forward through
/// both. The shim introduces no threads or locks of its own: it runs
/// synchronously on whatever thread the engine calls it from, and all locking
/// semantics belong to the primary backend unchanged.
///
/// # Example
///
/// ```no_run
/// use mirrorfs::{MirrorFs, MirrorConfig, NativeFs, StderrSink};
/// use std::sync::Arc;
///
/// let config = MirrorConfig::new("/backup/mirror")?;
/// let shim = MirrorFs::new("mirror", NativeFs::new(), config, Arc::new(StderrSink))?;
/// # Ok::<(), mirrorfs::VfsError>(())
/// ```
pub struct MirrorFs<B> {
    backend: B,
    config: MirrorConfig,
    tracer: Arc<Tracer>,
}

impl<B: Vfs> MirrorFs<B> {
    /// Construct the shim, validating the mirror root against the backend.
    ///
    /// The root must already exist as a directory; a missing path or a plain
    /// file in its place is rejected here, not discovered open by open. On
    /// success an `enabled_for` banner is traced.
    ///
    /// # Errors
    ///
    /// [`VfsError::NotFound`] when the mirror root is not an existing
    /// directory on the backend, or whatever error the backend's access
    /// check reports.
    pub fn new(
        name: impl Into<String>,
        backend: B,
        config: MirrorConfig,
        sink: Arc<dyn TraceSink>,
    ) -> Result<Self, VfsError> {
        if !backend.access(config.root(), AccessCheck::Directory)? {
            return Err(VfsError::NotFound {
                path: config.root().to_path_buf(),
            });
        }
        let tracer = Arc::new(Tracer::new(name, sink));
        tracer.raw(&format!(
            "{}.enabled_for(\"{}\")",
            tracer.shim_name(),
            backend.name()
        ));
        Ok(Self {
            backend,
            config,
            tracer,
        })
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The active mirroring configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Open the secondary copy with bounded retry.
    ///
    /// Returns the handle on success; on exhaustion the last error, which the
    /// caller traces and then discards — mirror-open failure never escalates.
    fn open_secondary(
        &self,
        path: &Path,
        opts: &OpenOptions,
    ) -> Result<Box<dyn VfsFile>, VfsError> {
        let mut last = VfsError::CantOpen {
            path: path.to_path_buf(),
        };
        for attempt in 0..self.config.attempts() {
            if attempt > 0 {
                self.backend.sleep(self.config.delay());
            }
            match self.backend.open(Some(path), opts) {
                Ok((file, _)) => return Ok(file),
                Err(err) => last = err,
            }
        }
        Err(last)
    }
}

impl<B: Vfs> Vfs for MirrorFs<B> {
    fn name(&self) -> &str {
        self.tracer.shim_name()
    }

    fn open(
        &self,
        path: Option<&Path>,
        opts: &OpenOptions,
    ) -> Result<(Box<dyn VfsFile>, OpenOptions), VfsError> {
        let name = match path {
            Some(p) => file_tail(&p.to_string_lossy()).to_owned(),
            None => TEMP_NAME.to_owned(),
        };

        let primary = self.backend.open(path, opts);

        // The secondary is only attempted once the primary is open; a
        // primary failure fails the whole call.
        let mut mirror_rc: Option<Result<(), VfsError>> = None;
        let mut secondary = None;
        if primary.is_ok() && path.is_some() && opts.role.is_mirrored() {
            let replica = mirror_path(self.config.root(), &name);
            match self.open_secondary(&replica, opts) {
                Ok(file) => {
                    secondary = Some(file);
                    mirror_rc = Some(Ok(()));
                }
                // Exhausted retries: degrade to primary-only, trace only.
                Err(err) => mirror_rc = Some(Err(err)),
            }
        }

        let extra = mirror_rc
            .as_ref()
            .map(|rc| format!("mirror={}", rc_str(rc)));
        self.tracer.op_extra(
            "open",
            &name,
            format_args!("{opts}"),
            &rc_str(&primary),
            extra.as_deref(),
        );

        let (primary, out_opts) = primary?;
        let file = MirroredFile::new(Arc::clone(&self.tracer), name, primary, secondary);
        Ok((Box::new(file), out_opts))
    }

    fn delete(&self, path: &Path, sync_dir: bool) -> Result<(), VfsError> {
        let rc = self.backend.delete(path, sync_dir);
        // The mirror copy is removed unconditionally, but only the primary
        // outcome is caller-visible: a mirror file that was never created
        // must not fail a successful delete.
        let replica = mirror_path(self.config.root(), &path.to_string_lossy());
        let rc2 = self.backend.delete(&replica, sync_dir);
        self.tracer.op_extra(
            "delete",
            &format!("\"{}\"", path.display()),
            format_args!("sync_dir={sync_dir}"),
            &rc_str(&rc),
            Some(&format!("mirror={}", rc_str(&rc2))),
        );
        rc
    }

    fn access(&self, path: &Path, check: AccessCheck) -> Result<bool, VfsError> {
        let rc = self.backend.access(path, check);
        let extra = rc.as_ref().ok().map(|out| format!("out={out}"));
        self.tracer.op_extra(
            "access",
            &format!("\"{}\"", path.display()),
            format_args!("{check:?}"),
            &rc_str(&rc),
            extra.as_deref(),
        );
        rc
    }

    fn full_pathname(&self, path: &Path) -> Result<PathBuf, VfsError> {
        let rc = self.backend.full_pathname(path);
        let extra = rc
            .as_ref()
            .ok()
            .map(|full| format!("out=\"{}\"", full.display()));
        self.tracer.op_extra(
            "full_pathname",
            &format!("\"{}\"", path.display()),
            format_args!(""),
            &rc_str(&rc),
            extra.as_deref(),
        );
        rc
    }

    fn randomness(&self, buf: &mut [u8]) {
        self.backend.randomness(buf)
    }

    fn sleep(&self, duration: Duration) -> Duration {
        self.backend.sleep(duration)
    }

    fn current_time(&self) -> SystemTime {
        self.backend.current_time()
    }

    fn max_pathname(&self) -> usize {
        self.backend.max_pathname()
    }
}
