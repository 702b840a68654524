//! The native backend: `std::fs` behind the [`Vfs`] contract.
//!
//! This is the backend the registry installs as the process default. Locking
//! is advisory and per-handle (single-process semantics); cross-process lock
//! coordination is the territory of a platform-specific backend.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rand::Rng;

use crate::{
    AccessCheck, FileControl, LockLevel, OpenOptions, SyncFlags, Vfs, VfsError, VfsFile,
};

/// Backend name the registry default is installed under.
pub const NATIVE_NAME: &str = "native";

/// A [`Vfs`] implementation over the operating system's filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl NativeFs {
    /// Create the native backend.
    pub fn new() -> Self {
        Self
    }

    fn temp_path() -> PathBuf {
        let tag: u64 = rand::thread_rng().r#gen();
        std::env::temp_dir().join(format!("mirrorfs-{}-{tag:016x}", std::process::id()))
    }
}

/// Attach operation and path context to an I/O error.
fn io_err(operation: &'static str, path: &Path, source: std::io::Error) -> VfsError {
    match source.kind() {
        std::io::ErrorKind::NotFound => VfsError::NotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => VfsError::PermissionDenied {
            path: path.to_path_buf(),
            operation,
        },
        _ => VfsError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        },
    }
}

struct NativeFile {
    file: Option<fs::File>,
    path: PathBuf,
    delete_on_close: bool,
    lock: LockLevel,
}

impl NativeFile {
    fn file(&mut self, operation: &'static str) -> Result<&mut fs::File, VfsError> {
        self.file.as_mut().ok_or(VfsError::Closed { operation })
    }
}

impl VfsFile for NativeFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError> {
        let path = self.path.clone();
        let file = self.file("read_at")?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| io_err("read_at", &path, e))?;
        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err("read_at", &path, e)),
            }
        }
        Ok(total)
    }

    fn write_at(&mut self, data: &[u8], offset: u64) -> Result<(), VfsError> {
        let path = self.path.clone();
        let file = self.file("write_at")?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| io_err("write_at", &path, e))?;
        file.write_all(data)
            .map_err(|e| io_err("write_at", &path, e))
    }

    fn truncate(&mut self, size: u64) -> Result<(), VfsError> {
        let path = self.path.clone();
        self.file("truncate")?
            .set_len(size)
            .map_err(|e| io_err("truncate", &path, e))
    }

    fn sync(&mut self, flags: SyncFlags) -> Result<(), VfsError> {
        let path = self.path.clone();
        let file = self.file("sync")?;
        let rc = if flags.data_only {
            file.sync_data()
        } else {
            file.sync_all()
        };
        rc.map_err(|e| io_err("sync", &path, e))
    }

    fn file_size(&mut self) -> Result<u64, VfsError> {
        let path = self.path.clone();
        let meta = self
            .file("file_size")?
            .metadata()
            .map_err(|e| io_err("file_size", &path, e))?;
        Ok(meta.len())
    }

    fn lock(&mut self, level: LockLevel) -> Result<(), VfsError> {
        self.file("lock")?;
        self.lock = self.lock.max(level);
        Ok(())
    }

    fn unlock(&mut self, level: LockLevel) -> Result<(), VfsError> {
        self.file("unlock")?;
        self.lock = self.lock.min(level);
        Ok(())
    }

    fn check_reserved_lock(&mut self) -> Result<bool, VfsError> {
        self.file("check_reserved_lock")?;
        Ok(self.lock >= LockLevel::Reserved)
    }

    fn file_control(&mut self, op: &mut FileControl) -> Result<(), VfsError> {
        self.file("file_control")?;
        match op {
            FileControl::VfsName { out } => {
                *out = Some(NATIVE_NAME.to_owned());
                Ok(())
            }
            FileControl::LockState(state) => {
                *state = Some(self.lock);
                Ok(())
            }
            FileControl::TempFilename { out } => {
                *out = Some(NativeFs::temp_path().to_string_lossy().into_owned());
                Ok(())
            }
            // Allocation hints are advisory; accepting them is enough.
            FileControl::SizeHint(_) | FileControl::ChunkSize(_) => Ok(()),
            _ => Err(VfsError::NotSupported {
                operation: "file_control",
            }),
        }
    }

    fn close(&mut self) -> Result<(), VfsError> {
        if self.file.take().is_none() {
            return Err(VfsError::Closed { operation: "close" });
        }
        if self.delete_on_close {
            fs::remove_file(&self.path).map_err(|e| io_err("close", &self.path, e))?;
        }
        Ok(())
    }
}

impl Vfs for NativeFs {
    fn name(&self) -> &str {
        NATIVE_NAME
    }

    fn open(
        &self,
        path: Option<&Path>,
        opts: &OpenOptions,
    ) -> Result<(Box<dyn VfsFile>, OpenOptions), VfsError> {
        let (path, delete_on_close) = match path {
            Some(p) => (p.to_path_buf(), opts.delete_on_close),
            // Anonymous files get a private name and never outlive the handle.
            None => (Self::temp_path(), true),
        };

        let mut options = fs::OpenOptions::new();
        options
            .read(opts.read)
            .write(opts.write)
            .create(opts.create)
            .create_new(opts.exclusive);
        let mut out = *opts;

        let file = match options.open(&path) {
            Ok(file) => file,
            Err(e)
                if e.kind() == std::io::ErrorKind::PermissionDenied
                    && opts.write
                    && opts.read =>
            {
                // Fall back to read-only and report the downgrade in the
                // effective options.
                out.write = false;
                out.create = false;
                fs::OpenOptions::new()
                    .read(true)
                    .open(&path)
                    .map_err(|e| io_err("open", &path, e))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VfsError::NotFound { path });
            }
            Err(_) => {
                return Err(VfsError::CantOpen { path });
            }
        };

        Ok((
            Box::new(NativeFile {
                file: Some(file),
                path,
                delete_on_close,
                lock: LockLevel::Unlocked,
            }),
            out,
        ))
    }

    fn delete(&self, path: &Path, sync_dir: bool) -> Result<(), VfsError> {
        fs::remove_file(path).map_err(|e| io_err("delete", path, e))?;
        if sync_dir {
            #[cfg(unix)]
            if let Some(parent) = path.parent() {
                let dir = fs::File::open(parent).map_err(|e| io_err("delete", parent, e))?;
                dir.sync_all().map_err(|e| io_err("delete", parent, e))?;
            }
        }
        Ok(())
    }

    fn access(&self, path: &Path, check: AccessCheck) -> Result<bool, VfsError> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_err("access", path, e)),
        };
        Ok(match check {
            AccessCheck::Exists | AccessCheck::Read => true,
            AccessCheck::Directory => meta.is_dir(),
            AccessCheck::ReadWrite => !meta.permissions().readonly(),
        })
    }

    fn full_pathname(&self, path: &Path) -> Result<PathBuf, VfsError> {
        match fs::canonicalize(path) {
            Ok(full) => Ok(full),
            // The file may not exist yet; resolve against the working
            // directory instead.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if path.is_absolute() {
                    Ok(path.to_path_buf())
                } else {
                    let cwd = std::env::current_dir()
                        .map_err(|e| io_err("full_pathname", path, e))?;
                    Ok(cwd.join(path))
                }
            }
            Err(e) => Err(io_err("full_pathname", path, e)),
        }
    }

    fn randomness(&self, buf: &mut [u8]) {
        rand::thread_rng().fill(buf);
    }

    fn sleep(&self, duration: Duration) -> Duration {
        let start = std::time::Instant::now();
        std::thread::sleep(duration);
        start.elapsed()
    }

    fn current_time(&self) -> SystemTime {
        SystemTime::now()
    }
}
