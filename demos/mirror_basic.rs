//! Basic usage of the mirroring shim.
//!
//! Wraps the native backend, opens a main database file, writes through the
//! shim, and shows that the bytes land in both the primary location and the
//! mirror directory while trace lines describe every step.
//!
//! Run with: `cargo run --example mirror_basic`

use mirrorfs::{
    FileRole, MirrorConfig, MirrorFs, NativeFs, OpenOptions, SyncFlags, Vfs, VfsError, VfsFile,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Work area: a primary directory and a mirror directory beside it.
    let workspace = tempfile::tempdir()?;
    let mirror_dir = workspace.path().join("mirror");
    std::fs::create_dir(&mirror_dir)?;

    // The sink decides where trace lines go; stdout keeps the demo visible.
    let sink: Arc<dyn mirrorfs::TraceSink> = Arc::new(|line: &str| println!("trace: {line}"));

    let config = MirrorConfig::new(mirror_dir.to_str().unwrap())?;
    let fs = MirrorFs::new("mirror", NativeFs::new(), config, sink)?;

    // Main database files are mirrored; open one and write through the shim.
    let db_path = workspace.path().join("demo.sqlite");
    let opts = OpenOptions::for_role(FileRole::MainDatabase);
    let (mut db, _) = fs.open(Some(&db_path), &opts)?;

    db.write_at(b"page one", 0)?;
    db.write_at(b"page two", 4096)?;
    db.sync(SyncFlags::NORMAL)?;
    db.close()?;

    let primary = std::fs::read(&db_path)?;
    let mirror = std::fs::read(mirror_dir.join("demo.sqlite"))?;
    println!("primary bytes: {}", primary.len());
    println!("mirror bytes:  {}", mirror.len());
    assert_eq!(primary, mirror);

    // A temporary file passes straight through: no mirror copy appears.
    let tmp_path = workspace.path().join("scratch.db");
    let tmp_opts = OpenOptions::for_role(FileRole::TempDatabase);
    let (mut tmp, _) = fs.open(Some(&tmp_path), &tmp_opts)?;
    tmp.write_at(b"scratch", 0)?;
    tmp.close()?;
    assert!(!mirror_dir.join("scratch.db").exists());
    println!("temporary file was not mirrored");

    // Deleting through the shim removes both copies.
    fs.delete(&db_path, false)?;
    assert!(!db_path.exists());
    assert!(!mirror_dir.join("demo.sqlite").exists());
    println!("delete removed primary and mirror");

    // A primary error is reported as usual; mirroring never hides it.
    let missing = workspace.path().join("missing.db");
    let ro = OpenOptions::read_only(FileRole::MainDatabase);
    match fs.open(Some(&missing), &ro) {
        Err(VfsError::NotFound { path }) => {
            println!("open of missing file: not found: {}", path.display());
        }
        Err(other) => println!("unexpected error: {other}"),
        Ok(_) => println!("unexpected success"),
    }

    Ok(())
}
