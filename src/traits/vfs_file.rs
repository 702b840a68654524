//! The per-handle file contract.

use crate::{
    DeviceCaps, FileControl, LockLevel, ShmLockOp, ShmRegion, SyncFlags, VfsError,
};

/// An open file handle produced by [`Vfs::open`](crate::Vfs::open).
///
/// A handle is exclusively owned by whoever opened it: methods take
/// `&mut self` and only `Send` is required. Offsets are absolute — there is
/// no cursor.
///
/// Optional capabilities (file-control, shared memory, device queries) have
/// defaults so a minimal backend only implements the data path:
/// [`read_at`](VfsFile::read_at), [`write_at`](VfsFile::write_at),
/// [`truncate`](VfsFile::truncate), [`sync`](VfsFile::sync),
/// [`file_size`](VfsFile::file_size), the lock ladder and
/// [`close`](VfsFile::close).
pub trait VfsFile: Send {
    /// Read up to `buf.len()` bytes at `offset`; returns the byte count.
    ///
    /// Returns 0 at end of file.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError>;

    /// Write all of `data` at `offset`, extending the file if needed.
    ///
    /// Unlike `read_at` there is no short count: either every byte is
    /// written or an error is returned.
    fn write_at(&mut self, data: &[u8], offset: u64) -> Result<(), VfsError>;

    /// Truncate the file to exactly `size` bytes.
    fn truncate(&mut self, size: u64) -> Result<(), VfsError>;

    /// Flush file content (and metadata, unless `data_only`) to durable storage.
    fn sync(&mut self, flags: SyncFlags) -> Result<(), VfsError>;

    /// Current size of the file in bytes.
    fn file_size(&mut self) -> Result<u64, VfsError>;

    /// Raise the file lock to `level`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::Busy`] if another connection holds a conflicting lock
    fn lock(&mut self, level: LockLevel) -> Result<(), VfsError>;

    /// Lower the file lock to `level`.
    fn unlock(&mut self, level: LockLevel) -> Result<(), VfsError>;

    /// Whether any connection holds a reserved or stronger lock on this file.
    fn check_reserved_lock(&mut self) -> Result<bool, VfsError>;

    /// Handle a control request; out-parameters are filled in on success.
    fn file_control(&mut self, op: &mut FileControl) -> Result<(), VfsError> {
        let _ = op;
        Err(VfsError::NotSupported {
            operation: "file_control",
        })
    }

    /// The sector size of the underlying device.
    fn sector_size(&mut self) -> u32 {
        512
    }

    /// Device characteristic flags for the underlying storage.
    fn device_characteristics(&mut self) -> DeviceCaps {
        DeviceCaps::NONE
    }

    /// Map shared-memory region `region` of `region_size` bytes, creating it
    /// when `extend` is true.
    fn shm_map(
        &mut self,
        region: u32,
        region_size: u32,
        extend: bool,
    ) -> Result<ShmRegion, VfsError> {
        let _ = (region, region_size, extend);
        Err(VfsError::NotSupported {
            operation: "shm_map",
        })
    }

    /// Apply a shared-memory lock over `count` slots starting at `offset`.
    fn shm_lock(&mut self, offset: u32, count: u32, op: ShmLockOp) -> Result<(), VfsError> {
        let _ = (offset, count, op);
        Err(VfsError::NotSupported {
            operation: "shm_lock",
        })
    }

    /// Memory barrier for shared-memory writers.
    fn shm_barrier(&mut self) {}

    /// Unmap this handle's shared memory, deleting the region when `delete`
    /// is true and this was the last mapper.
    fn shm_unmap(&mut self, delete: bool) -> Result<(), VfsError> {
        let _ = delete;
        Ok(())
    }

    /// Close the handle, releasing its resources.
    ///
    /// Must be called exactly once; further operations on the handle return
    /// [`VfsError::Closed`].
    fn close(&mut self) -> Result<(), VfsError>;
}
