//! # mirrorfs
//!
//! A write-mirroring storage shim: a virtual filesystem layer that keeps a
//! live secondary copy of designated database files while the engine above it
//! sees one ordinary filesystem.
//!
//! The shim wraps any backend implementing [`Vfs`]. Reads are served from the
//! primary alone; writes, truncations, syncs, and size hints fan out to a
//! second handle under a configured mirror directory. Every operation emits
//! one structured trace line through an injected [`TraceSink`].
//!
//! ---
//!
//! ## Quick Start
//!
//! Wrap the native backend, open a main database file, and every write lands
//! in both places:
//!
//! ```rust
//! use mirrorfs::{
//!     FileRole, MirrorConfig, MirrorFs, NativeFs, OpenOptions, StderrSink, Vfs, VfsFile,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let mirror_dir = dir.path().join("mirror");
//! std::fs::create_dir(&mirror_dir)?;
//!
//! let config = MirrorConfig::new(mirror_dir.to_str().unwrap())?;
//! let fs = MirrorFs::new("mirror", NativeFs::new(), config, Arc::new(StderrSink))?;
//!
//! let opts = OpenOptions::for_role(FileRole::MainDatabase);
//! let (mut file, _) = fs.open(Some(&dir.path().join("db.sqlite")), &opts)?;
//! file.write_at(b"hello", 0)?;
//! file.close()?;
//!
//! assert_eq!(std::fs::read(mirror_dir.join("db.sqlite"))?, b"hello");
//! # Ok(())
//! # }
//! ```
//!
//! Processes that configure mirroring once and look backends up by name can
//! use the registry instead:
//!
//! ```rust,no_run
//! // Installs a "mirror" shim over the default native backend, tracing to
//! // stderr. Write-once; later calls return false.
//! assert!(mirrorfs::set_mirror_root("/var/backup/mirror"));
//! let fs = mirrorfs::find(None).unwrap();
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Vfs`] | Filesystem backend contract — open, delete, access, pathnames |
//! | [`VfsFile`] | Open-file contract — positioned I/O, locks, sync, control |
//! | [`MirrorFs`] | The shim: wraps a `Vfs`, duplicates writes, traces |
//! | [`NativeFs`] | `std::fs`-backed reference backend |
//! | [`MirrorConfig`] | Validated mirror directory plus retry policy |
//! | [`TraceSink`] | Destination for trace lines (any `Fn(&str)` works) |
//! | [`VfsError`] | Error type with per-operation context |
//!
//! ---
//!
//! ## Mirroring Policy
//!
//! Only files opened with a role of [`FileRole::MainDatabase`] or
//! [`FileRole::MainJournal`] and a concrete path are mirrored. Journals for
//! temporary tables, WAL files, and anonymous temporaries pass through
//! untouched. A file's mirror lives at `<root>/<basename>`; see
//! [`mirror_path`] for the exact mapping.
//!
//! Mirroring degrades rather than fails: if the mirror handle cannot be
//! opened after the configured retries, the open still succeeds and the file
//! simply runs unmirrored. Once both handles exist, a mirror-side write
//! failure does surface, since silently diverging copies are worse than a
//! reported error.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, VfsError>`. Errors carry the path or
//! operation that produced them:
//!
//! ```rust
//! use mirrorfs::VfsError;
//! use std::path::PathBuf;
//!
//! let err = VfsError::NotFound { path: PathBuf::from("/missing.db") };
//! assert_eq!(err.to_string(), "not found: /missing.db");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`Vfs`] requires `Send + Sync` with `&self` methods, so backends and shims
//! share freely across threads behind `Arc`. [`VfsFile`] is `Send` with
//! `&mut self` methods: a handle moves between threads but is driven by one
//! at a time, matching how database engines serialize access to an open file.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`FileRole`], [`OpenOptions`], [`SyncFlags`], etc. |

// Private modules
mod config;
mod error;
mod file;
mod mirror_path;
mod native;
mod reconcile;
mod registry;
mod shim;
mod trace;
mod traits;
mod types;

// Public re-exports - error types
pub use error::VfsError;

// Public re-exports - core types
pub use types::{
    AccessCheck, DeviceCaps, FileControl, FileRole, LockLevel, OpenOptions, ShmLockOp, ShmRegion,
    SyncFlags, MAX_PATHNAME,
};

// Public re-exports - backend contract
pub use traits::{Vfs, VfsFile};

// Public re-exports - the shim and its configuration
pub use config::{MirrorConfig, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use shim::MirrorFs;

// Public re-exports - tracing
pub use trace::{StderrSink, TraceSink};

// Public re-exports - path mapping and result reconciliation
pub use mirror_path::{file_tail, mirror_path};
pub use reconcile::combine;

// Public re-exports - backends and the process-wide registry
pub use native::{NativeFs, NATIVE_NAME};
pub use registry::{find, register, register_mirror, set_mirror_root, Registry};
