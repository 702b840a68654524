//! Pure path derivation for mirror copies.
//!
//! The mirror of a primary file lives directly under the configured mirror
//! root, named after the final component of the primary path:
//!
//! ```text
//! /var/db/app.sqlite  +  /backup/mirror  ->  /backup/mirror/app.sqlite
//! ```
//!
//! Two primary files with the same basename in different directories collide
//! in the mirror. That is an accepted limitation of the flat layout, not a
//! fault.

use std::path::{Path, PathBuf};

/// Characters treated as path separators on every platform.
const SEPARATORS: &[char] = &['/', '\\'];

/// Return the tail of a pathname — the part after the last separator.
///
/// ```rust
/// use mirrorfs::file_tail;
///
/// assert_eq!(file_tail("/home/drh/xyzzy.txt"), "xyzzy.txt");
/// assert_eq!(file_tail("xyzzy.txt"), "xyzzy.txt");
/// ```
pub fn file_tail(path: &str) -> &str {
    match path.rfind(SEPARATORS) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Derive the mirror path for `primary` under `mirror_root`.
///
/// Only the final component of `primary` is used; the root is assumed to be
/// already validated (existing directory, trailing separators stripped).
/// Deterministic and side-effect-free.
pub fn mirror_path(mirror_root: &Path, primary: &str) -> PathBuf {
    mirror_root.join(file_tail(primary))
}

/// Strip every trailing path separator from `path`.
///
/// Returns the input unchanged when there is nothing to strip; a path that is
/// nothing but separators reduces to the empty string.
pub(crate) fn strip_trailing_separators(path: &str) -> &str {
    path.trim_end_matches(SEPARATORS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_of_absolute_path() {
        assert_eq!(file_tail("/home/drh/xyzzy.txt"), "xyzzy.txt");
    }

    #[test]
    fn tail_of_bare_filename() {
        assert_eq!(file_tail("xyzzy.txt"), "xyzzy.txt");
    }

    #[test]
    fn tail_handles_backslashes() {
        assert_eq!(file_tail(r"C:\data\db.sqlite"), "db.sqlite");
    }

    #[test]
    fn mirror_path_joins_root_and_tail() {
        let p = mirror_path(Path::new("/backup/mirror"), "/var/db/app.sqlite");
        assert_eq!(p, PathBuf::from("/backup/mirror/app.sqlite"));
    }

    #[test]
    fn mirror_path_ignores_primary_directory() {
        // Same basename from different directories collides. Accepted.
        let a = mirror_path(Path::new("/m"), "/one/db.sqlite");
        let b = mirror_path(Path::new("/m"), "/two/db.sqlite");
        assert_eq!(a, b);
    }

    #[test]
    fn strip_removes_all_trailing_separators() {
        assert_eq!(strip_trailing_separators("/backup/mirror///"), "/backup/mirror");
        assert_eq!(strip_trailing_separators(r"C:\mirror\\"), r"C:\mirror");
        assert_eq!(strip_trailing_separators("/backup/mirror"), "/backup/mirror");
    }

    #[test]
    fn strip_of_only_separators_is_empty() {
        assert_eq!(strip_trailing_separators("///"), "");
    }
}
