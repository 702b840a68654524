//! Core types for the mirrorfs VFS abstraction.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Longest pathname (in bytes) a backend is required to accept.
pub const MAX_PATHNAME: usize = 512;

/// The role a file plays in the database's storage layout.
///
/// The engine tags every open with a role. Only the durable, named artifacts
/// that constitute persistent state — the main database and its rollback
/// journal — qualify for mirroring (see [`is_mirrored`](FileRole::is_mirrored)).
/// Ephemeral scratch files never get a mirror regardless of configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileRole {
    /// The main database file.
    MainDatabase,
    /// The rollback journal of the main database.
    MainJournal,
    /// The write-ahead log.
    Wal,
    /// A temporary database.
    TempDatabase,
    /// The journal of a temporary database.
    TempJournal,
    /// A statement sub-journal.
    SubJournal,
    /// A transient file with no name of its own.
    Transient,
}

impl FileRole {
    /// Whether files opened under this role get a mirror copy.
    ///
    /// Matches the main-database/main-journal mask; WAL files are coordinated
    /// through shared memory and are excluded.
    #[inline]
    pub const fn is_mirrored(&self) -> bool {
        matches!(self, FileRole::MainDatabase | FileRole::MainJournal)
    }

    /// Short uppercase name used in trace lines.
    pub const fn name(&self) -> &'static str {
        match self {
            FileRole::MainDatabase => "MAIN_DB",
            FileRole::MainJournal => "MAIN_JOURNAL",
            FileRole::Wal => "WAL",
            FileRole::TempDatabase => "TEMP_DB",
            FileRole::TempJournal => "TEMP_JOURNAL",
            FileRole::SubJournal => "SUBJOURNAL",
            FileRole::Transient => "TRANSIENT",
        }
    }
}

/// Flags for opening a file through a [`Vfs`](crate::Vfs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenOptions {
    /// The role this file plays for the engine.
    pub role: FileRole,
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file if it does not exist.
    pub create: bool,
    /// Fail if the file already exists.
    pub exclusive: bool,
    /// Remove the file when the handle is closed.
    pub delete_on_close: bool,
}

impl OpenOptions {
    /// Read-write create options for the given role.
    pub const fn for_role(role: FileRole) -> Self {
        Self {
            role,
            read: true,
            write: true,
            create: true,
            exclusive: false,
            delete_on_close: false,
        }
    }

    /// Read-only options for the given role.
    pub const fn read_only(role: FileRole) -> Self {
        Self {
            role,
            read: true,
            write: false,
            create: false,
            exclusive: false,
            delete_on_close: false,
        }
    }
}

impl fmt::Display for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role={}", self.role.name())?;
        let mut tags = String::new();
        for (set, tag) in [
            (self.read, "r"),
            (self.write, "w"),
            (self.create, "c"),
            (self.exclusive, "x"),
            (self.delete_on_close, "d"),
        ] {
            if set {
                tags.push_str(tag);
            }
        }
        if !tags.is_empty() {
            write!(f, ",{tags}")?;
        }
        Ok(())
    }
}

/// Flags controlling how a [`sync`](crate::VfsFile::sync) is performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncFlags {
    /// Request a full barrier sync rather than a normal sync.
    pub full: bool,
    /// Only file content needs to be durable, not its size.
    pub data_only: bool,
}

impl SyncFlags {
    /// A normal sync.
    pub const NORMAL: Self = Self {
        full: false,
        data_only: false,
    };

    /// A full barrier sync.
    pub const FULL: Self = Self {
        full: true,
        data_only: false,
    };
}

impl fmt::Display for SyncFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.full { "FULL" } else { "NORMAL" };
        if self.data_only {
            write!(f, "{mode}|DATAONLY")
        } else {
            f.write_str(mode)
        }
    }
}

/// The five-level file lock ladder.
///
/// The shim never interprets these; they are forwarded to the primary backend
/// unchanged. The secondary copy is never locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockLevel {
    /// No lock held.
    Unlocked,
    /// Shared read lock.
    Shared,
    /// Reserved lock — intending to write.
    Reserved,
    /// Pending lock — waiting for readers to clear.
    Pending,
    /// Exclusive write lock.
    Exclusive,
}

impl LockLevel {
    /// Symbolic name used in trace lines.
    pub const fn name(&self) -> &'static str {
        match self {
            LockLevel::Unlocked => "NONE",
            LockLevel::Shared => "SHARED",
            LockLevel::Reserved => "RESERVED",
            LockLevel::Pending => "PENDING",
            LockLevel::Exclusive => "EXCLUSIVE",
        }
    }
}

/// What an [`access`](crate::Vfs::access) check should test for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessCheck {
    /// Does the path exist at all?
    Exists,
    /// Is the path an existing directory?
    Directory,
    /// Is the path readable?
    Read,
    /// Is the path readable and writable?
    ReadWrite,
}

/// Device characteristic flags reported by a backend.
///
/// Stored as a raw bitmask so backends can report flags the shim does not
/// know about; the shim forwards the value unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceCaps(u32);

impl DeviceCaps {
    /// No special characteristics.
    pub const NONE: Self = Self(0);
    /// Writes of any size are atomic.
    pub const ATOMIC: Self = Self(1 << 0);
    /// Data is written in the order it is issued.
    pub const SEQUENTIAL: Self = Self(1 << 1);
    /// A write never changes bytes outside the written range.
    pub const SAFE_APPEND: Self = Self(1 << 2);

    /// Build from a raw bitmask.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bitmask.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set in `self`.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A shared-memory lock request forwarded to the primary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShmLockOp {
    /// Acquire a shared lock.
    LockShared,
    /// Acquire an exclusive lock.
    LockExclusive,
    /// Release a shared lock.
    UnlockShared,
    /// Release an exclusive lock.
    UnlockExclusive,
}

impl ShmLockOp {
    /// Symbolic name used in trace lines.
    pub const fn name(&self) -> &'static str {
        match self {
            ShmLockOp::LockShared => "LOCK|SHARED",
            ShmLockOp::LockExclusive => "LOCK|EXCLUSIVE",
            ShmLockOp::UnlockShared => "UNLOCK|SHARED",
            ShmLockOp::UnlockExclusive => "UNLOCK|EXCLUSIVE",
        }
    }
}

/// A mapped shared-memory region handed out by a backend.
///
/// Safe-Rust modeling of a shared page: all mappers of the same region share
/// the same buffer. The shim never reads or writes the contents.
pub type ShmRegion = Arc<Mutex<Vec<u8>>>;

/// A file-control request passed through [`file_control`](crate::VfsFile::file_control).
///
/// Requests that produce output carry an `out` slot the backend fills in on
/// success. Backend-specific opcodes travel as [`FileControl::Other`].
#[derive(Debug)]
pub enum FileControl {
    /// Hint that the file will grow to the given size.
    SizeHint(u64),
    /// Set the allocation chunk size.
    ChunkSize(u32),
    /// Query or set whether the WAL persists after close.
    PersistWal(Option<bool>),
    /// Query the current lock level; backend fills in the answer.
    LockState(Option<LockLevel>),
    /// Execute a pragma statement.
    Pragma {
        /// Pragma name.
        name: String,
        /// Optional pragma argument.
        value: Option<String>,
        /// Backend-provided result text, if any.
        out: Option<String>,
    },
    /// Query the name of the backend servicing this file.
    VfsName {
        /// Backend-provided name; the shim prefixes its own name on success.
        out: Option<String>,
    },
    /// Ask the backend for a fresh temporary filename.
    TempFilename {
        /// Backend-provided filename.
        out: Option<String>,
    },
    /// A backend-specific opcode the shim forwards blindly.
    Other(u32),
}

impl fmt::Display for FileControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileControl::SizeHint(n) => write!(f, "SIZE_HINT,{n}"),
            FileControl::ChunkSize(n) => write!(f, "CHUNK_SIZE,{n}"),
            FileControl::PersistWal(_) => f.write_str("PERSIST_WAL"),
            FileControl::LockState(_) => f.write_str("LOCKSTATE"),
            FileControl::Pragma { name, value, .. } => match value {
                Some(v) => write!(f, "PRAGMA,[{name},{v}]"),
                None => write!(f, "PRAGMA,[{name}]"),
            },
            FileControl::VfsName { .. } => f.write_str("VFSNAME"),
            FileControl::TempFilename { .. } => f.write_str("TEMPFILENAME"),
            FileControl::Other(op) => write!(f, "{op}"),
        }
    }
}
