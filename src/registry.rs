//! Process-wide backend registry and one-shot mirror configuration.
//!
//! Engines look their storage backend up by name. The registry maps names to
//! shared [`Vfs`] instances and tracks which one is the default; the global
//! instance is seeded with [`NativeFs`] so a bare process always has a
//! working default.
//!
//! [`set_mirror_root`] is the whole configuration surface for the common
//! case: validate a directory, wrap the default backend in a [`MirrorFs`]
//! tracing to stderr, make it the new default. It is write-once; mirroring
//! policy is not renegotiable after files may already have been opened
//! through it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::native::{NATIVE_NAME, NativeFs};
use crate::{MirrorConfig, MirrorFs, StderrSink, TraceSink, Vfs, VfsError};

/// A named collection of backends with one default.
///
/// The process-wide instance is reached through the free functions in this
/// module; separate instances exist so the semantics stay testable without
/// global state.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
    // Guards the write-once semantics of set_mirror_root; held across the
    // whole install so racing callers cannot both succeed.
    mirror_configured: Mutex<bool>,
}

#[derive(Default)]
struct Inner {
    backends: HashMap<String, Arc<dyn Vfs>>,
    default: Option<String>,
}

impl Registry {
    /// An empty registry with no default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `vfs` under its own name, optionally making it the default.
    ///
    /// Re-registering a name replaces the previous entry, as a registry of
    /// live backends must allow a shim to shadow what it wraps.
    pub fn register(&self, vfs: Arc<dyn Vfs>, make_default: bool) {
        let mut inner = self.inner.lock().unwrap();
        let name = vfs.name().to_owned();
        if make_default || inner.default.is_none() {
            inner.default = Some(name.clone());
        }
        inner.backends.insert(name, vfs);
    }

    /// Look up a backend by name, or the default for `None`.
    pub fn find(&self, name: Option<&str>) -> Option<Arc<dyn Vfs>> {
        let inner = self.inner.lock().unwrap();
        let name = name.or(inner.default.as_deref())?;
        inner.backends.get(name).cloned()
    }

    /// Construct a [`MirrorFs`] over a registered backend and install it.
    ///
    /// `backend` names the backend to wrap; `None` wraps the current
    /// default. With `make_default` the shim becomes the default, so every
    /// subsequent nameless lookup goes through it.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if `backend` names no registered backend (or
    ///   there is no default), and when the mirror root is not an existing
    ///   directory
    /// - [`VfsError::InvalidConfig`] from configuration validation
    pub fn register_mirror(
        &self,
        name: &str,
        backend: Option<&str>,
        config: MirrorConfig,
        sink: Arc<dyn TraceSink>,
        make_default: bool,
    ) -> Result<(), VfsError> {
        let root = self.find(backend).ok_or(VfsError::NotFound {
            path: backend.unwrap_or("<default>").into(),
        })?;
        let shim = MirrorFs::new(name, root, config, sink)?;
        self.register(Arc::new(shim), make_default);
        Ok(())
    }

    /// One-shot mirror configuration; see the module docs.
    ///
    /// Returns `false`, leaving the registry untouched, when the root is
    /// invalid or does not exist, or when a mirror shim has already been
    /// configured through this entry point.
    pub fn set_mirror_root(&self, root: &str) -> bool {
        let mut configured = self.mirror_configured.lock().unwrap();
        if *configured {
            return false;
        }
        let Ok(config) = MirrorConfig::new(root) else {
            return false;
        };
        let installed = self
            .register_mirror("mirror", None, config, Arc::new(StderrSink), true)
            .is_ok();
        *configured = installed;
        installed
    }
}

fn global() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(|| {
        let registry = Registry::new();
        registry.register(Arc::new(NativeFs::new()), true);
        registry
    })
}

/// Register a backend in the process-wide registry.
pub fn register(vfs: Arc<dyn Vfs>, make_default: bool) {
    global().register(vfs, make_default)
}

/// Look up a backend in the process-wide registry by name (`None` for the
/// default). The registry starts out with [`NativeFs`] registered as
/// [`NATIVE_NAME`] and default.
pub fn find(name: Option<&str>) -> Option<Arc<dyn Vfs>> {
    global().find(name)
}

/// Install a [`MirrorFs`] over a registered backend, process-wide.
///
/// See [`Registry::register_mirror`].
pub fn register_mirror(
    name: &str,
    backend: Option<&str>,
    config: MirrorConfig,
    sink: Arc<dyn TraceSink>,
    make_default: bool,
) -> Result<(), VfsError> {
    global().register_mirror(name, backend, config, sink, make_default)
}

/// Configure mirroring for the process: validate `root`, install a shim
/// named `"mirror"` over the default backend with stderr tracing, and make it
/// the new default.
///
/// Write-once: returns `false` without touching anything on invalid input or
/// on any call after the first success.
pub fn set_mirror_root(root: &str) -> bool {
    global().set_mirror_root(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::test_sink::CollectSink;
    use crate::{AccessCheck, FileRole, OpenOptions, VfsFile};

    fn seeded() -> Registry {
        let registry = Registry::new();
        registry.register(Arc::new(NativeFs::new()), true);
        registry
    }

    #[test]
    fn first_registration_becomes_default() {
        let registry = seeded();
        let vfs = registry.find(None).expect("default must exist");
        assert_eq!(vfs.name(), NATIVE_NAME);
        assert!(registry.find(Some(NATIVE_NAME)).is_some());
    }

    #[test]
    fn find_unknown_name_is_none() {
        let registry = seeded();
        assert!(registry.find(Some("no-such-backend")).is_none());
    }

    #[test]
    fn register_mirror_unknown_backend_is_not_found() {
        let registry = seeded();
        let dir = tempfile::tempdir().unwrap();
        let config = MirrorConfig::new(dir.path().to_str().unwrap()).unwrap();
        let rc = registry.register_mirror(
            "mirror",
            Some("no-such-backend"),
            config,
            CollectSink::shared(),
            true,
        );
        assert!(matches!(rc, Err(VfsError::NotFound { .. })));
        // Default unchanged.
        assert_eq!(registry.find(None).unwrap().name(), NATIVE_NAME);
    }

    #[test]
    fn register_mirror_installs_shim_as_default() {
        let registry = seeded();
        let dir = tempfile::tempdir().unwrap();
        let config = MirrorConfig::new(dir.path().to_str().unwrap()).unwrap();
        registry
            .register_mirror("mirror", None, config, CollectSink::shared(), true)
            .unwrap();

        let shim = registry.find(None).unwrap();
        assert_eq!(shim.name(), "mirror");
        // The wrapped backend is still reachable by name.
        assert_eq!(registry.find(Some(NATIVE_NAME)).unwrap().name(), NATIVE_NAME);
    }

    #[test]
    fn installed_shim_mirrors_through_lookup() {
        let registry = seeded();
        let dir = tempfile::tempdir().unwrap();
        let mirror_dir = dir.path().join("mirror");
        std::fs::create_dir(&mirror_dir).unwrap();
        let config = MirrorConfig::new(mirror_dir.to_str().unwrap()).unwrap();
        registry
            .register_mirror("mirror", None, config, CollectSink::shared(), true)
            .unwrap();

        let shim = registry.find(None).unwrap();
        let db = dir.path().join("db.sqlite");
        let opts = OpenOptions::for_role(FileRole::MainDatabase);
        let (mut file, _) = shim.open(Some(&db), &opts).unwrap();
        file.write_at(b"abc", 0).unwrap();
        file.close().unwrap();

        assert!(
            shim.access(&mirror_dir.join("db.sqlite"), AccessCheck::Exists)
                .unwrap()
        );
    }

    #[test]
    fn set_mirror_root_is_write_once() {
        let registry = seeded();
        let dir = tempfile::tempdir().unwrap();
        assert!(registry.set_mirror_root(dir.path().to_str().unwrap()));
        // Second call is a no-op returning false, even with a valid root.
        assert!(!registry.set_mirror_root(dir.path().to_str().unwrap()));
    }

    #[test]
    fn set_mirror_root_rejects_missing_directory() {
        let registry = seeded();
        assert!(!registry.set_mirror_root("/no/such/directory/anywhere"));
        // A later valid call still works: the failed one configured nothing.
        let dir = tempfile::tempdir().unwrap();
        assert!(registry.set_mirror_root(dir.path().to_str().unwrap()));
    }

    #[test]
    fn set_mirror_root_rejects_file_as_root() {
        let registry = seeded();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("root");
        std::fs::write(&file, b"x").unwrap();

        assert!(!registry.set_mirror_root(file.to_str().unwrap()));
        // Nothing was configured; a directory root still succeeds afterwards.
        assert!(registry.set_mirror_root(dir.path().to_str().unwrap()));
    }

    #[test]
    fn set_mirror_root_rejects_invalid_strings() {
        let registry = seeded();
        assert!(!registry.set_mirror_root(""));
        assert!(!registry.set_mirror_root("///"));
        assert_eq!(registry.find(None).unwrap().name(), NATIVE_NAME);
    }

    #[test]
    fn global_registry_has_native_default() {
        let vfs = find(None).expect("global default must exist");
        // The global default is the native backend unless another test in
        // this process installed a shim; both are acceptable here.
        assert!(vfs.name() == NATIVE_NAME || vfs.name() == "mirror");
    }
}
