//! # Backend Traits
//!
//! The capability contracts a storage backend implements.
//!
//! ## Two Traits
//!
//! | Trait | Scope | Operations |
//! |-------|-------|------------|
//! | [`Vfs`] | Path level | open, delete, access, full_pathname, randomness, sleep, current_time |
//! | [`VfsFile`] | Handle level | read_at, write_at, truncate, sync, file_size, locks, file_control, shm |
//!
//! [`Vfs::open`] returns a boxed [`VfsFile`], so the two traits meet exactly
//! where a real VFS hands a file object back to the engine.
//!
//! ## Object Safety
//!
//! Both traits are object-safe: a registry can hold `Arc<dyn Vfs>` and a shim
//! can own `Box<dyn VfsFile>` handles without knowing the backend type.
//! Blanket impls forward `Vfs` through `&V` and `Arc<V>`, so a shim that owns
//! its backend generically (`MirrorFs<B>`) also works over a shared one
//! (`MirrorFs<Arc<dyn Vfs>>`).
//!
//! ## Thread Safety
//!
//! [`Vfs`] requires `Send + Sync` and takes `&self` — one backend serves many
//! threads. [`VfsFile`] requires only `Send` and takes `&mut self`: a handle
//! is exclusively owned by whoever opened it and is never shared across
//! concurrent calls.

mod vfs;
mod vfs_file;

pub use vfs::Vfs;
pub use vfs_file::VfsFile;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _vfs(_: &dyn Vfs) {}
        fn _file(_: &mut dyn VfsFile) {}
    }
}
