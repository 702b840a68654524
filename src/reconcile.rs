//! Reconciliation of dual-target operation results.

use crate::VfsError;

/// Merge the results of a dual-target operation into one caller-visible result.
///
/// Precedence:
/// - a primary failure always dominates and is never masked by the secondary
///   outcome;
/// - when the primary succeeds, a failing secondary surfaces as the combined
///   outcome, so no mirror failure is silently swallowed;
/// - when both agree (including both-success), either is returned.
///
/// Used uniformly by write, truncate, sync, close and file-control. Reads and
/// size queries are never dual-targeted and never go through here.
///
/// ```rust
/// use mirrorfs::{combine, VfsError};
///
/// assert!(combine::<()>(Ok(()), Ok(())).is_ok());
///
/// let rc = combine(Ok(7), Err(VfsError::Busy { operation: "sync" }));
/// assert!(matches!(rc, Err(VfsError::Busy { .. })));
/// ```
pub fn combine<T>(
    primary: Result<T, VfsError>,
    secondary: Result<(), VfsError>,
) -> Result<T, VfsError> {
    match (primary, secondary) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), _) => Err(err),
    }
}
