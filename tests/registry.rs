//! Process-global mirror configuration.
//!
//! `set_mirror_root` is write-once per process, so everything here lives in
//! one test function; a separate test binary keeps the global state away from
//! the rest of the suite.

use mirrorfs::{FileRole, OpenOptions, Vfs, VfsFile, NATIVE_NAME};

#[test]
fn set_mirror_root_configures_the_process_once() {
    // Before configuration the default backend is the native one.
    let vfs = mirrorfs::find(None).expect("native default");
    assert_eq!(vfs.name(), NATIVE_NAME);

    // Invalid roots configure nothing.
    assert!(!mirrorfs::set_mirror_root(""));
    assert!(!mirrorfs::set_mirror_root("/no/such/directory/anywhere"));
    assert_eq!(mirrorfs::find(None).unwrap().name(), NATIVE_NAME);

    // The first valid root wins and installs the shim as default.
    let dir = tempfile::tempdir().unwrap();
    let mirror_dir = dir.path().join("mirror");
    std::fs::create_dir(&mirror_dir).unwrap();
    assert!(mirrorfs::set_mirror_root(mirror_dir.to_str().unwrap()));

    let shim = mirrorfs::find(None).unwrap();
    assert_eq!(shim.name(), "mirror");
    // The native backend is still reachable by name underneath.
    assert_eq!(mirrorfs::find(Some(NATIVE_NAME)).unwrap().name(), NATIVE_NAME);

    // Later calls change nothing, valid root or not.
    let other = tempfile::tempdir().unwrap();
    assert!(!mirrorfs::set_mirror_root(other.path().to_str().unwrap()));

    // Opens through the configured default mirror into the chosen root.
    let db = dir.path().join("db.sqlite");
    let opts = OpenOptions::for_role(FileRole::MainDatabase);
    let (mut file, _) = shim.open(Some(&db), &opts).unwrap();
    file.write_at(b"abc", 0).unwrap();
    file.close().unwrap();
    assert_eq!(std::fs::read(mirror_dir.join("db.sqlite")).unwrap(), b"abc");
}
