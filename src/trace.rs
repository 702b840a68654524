//! Trace sink contract and event formatting.
//!
//! Every shim operation emits one text line of the shape
//!
//! ```text
//! {shim}.{op}({file}[,{args}]) -> {code}[, {extra}]
//! ```
//!
//! where `{code}` is the symbolic result-code name when known, else the
//! numeric backend code. Dual-target operations carry the mirror outcome in
//! the extra slot (`mirror={code}`).
//!
//! The sink is injected at shim construction and shared by every file handle
//! the shim creates. Where the output goes — stderr, a file, a socket, a
//! buffer — is entirely up to the sink.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::VfsError;

/// Receives formatted trace lines.
///
/// Implemented for any `Fn(&str) + Send + Sync` closure, so a capturing
/// closure covers the callback-plus-context pattern directly:
///
/// ```rust
/// use mirrorfs::TraceSink;
/// use std::sync::{Arc, Mutex};
///
/// let lines = Arc::new(Mutex::new(Vec::new()));
/// let captured = Arc::clone(&lines);
/// let sink: Arc<dyn TraceSink> =
///     Arc::new(move |line: &str| captured.lock().unwrap().push(line.to_owned()));
/// sink.emit("mirror.open(db.sqlite,role=MAIN_DB,rwc) -> OK");
/// assert_eq!(lines.lock().unwrap().len(), 1);
/// ```
pub trait TraceSink: Send + Sync {
    /// Output one trace line (no trailing newline).
    fn emit(&self, line: &str);
}

impl<F> TraceSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, line: &str) {
        self(line);
    }
}

/// Default diagnostic sink: one line per event on standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl TraceSink for StderrSink {
    fn emit(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Render a result as its trace code: `OK`, a symbolic name, or the numeric
/// value for backend-defined codes.
pub(crate) fn rc_str<T>(result: &Result<T, VfsError>) -> Cow<'static, str> {
    match result {
        Ok(_) => Cow::Borrowed("OK"),
        Err(err) => err_str(err),
    }
}

/// Render an error as its trace code.
pub(crate) fn err_str(err: &VfsError) -> Cow<'static, str> {
    match err {
        VfsError::Code(n) => Cow::Owned(n.to_string()),
        other => Cow::Borrowed(other.code_name()),
    }
}

/// Shared by a shim and all file handles it creates: the shim name plus the
/// injected sink, with the line formatting in one place.
pub(crate) struct Tracer {
    shim: String,
    sink: Arc<dyn TraceSink>,
}

impl Tracer {
    pub(crate) fn new(shim: impl Into<String>, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            shim: shim.into(),
            sink,
        }
    }

    /// The shim's registered name.
    pub(crate) fn shim_name(&self) -> &str {
        &self.shim
    }

    /// Emit one operation event.
    pub(crate) fn op(&self, op: &str, file: &str, args: fmt::Arguments<'_>, rc: &str) {
        self.op_extra(op, file, args, rc, None);
    }

    /// Emit one operation event with an extra detail after the result code.
    pub(crate) fn op_extra(
        &self,
        op: &str,
        file: &str,
        args: fmt::Arguments<'_>,
        rc: &str,
        extra: Option<&str>,
    ) {
        let args = args.to_string();
        let mut line = if args.is_empty() {
            format!("{}.{op}({file}) -> {rc}", self.shim)
        } else {
            format!("{}.{op}({file},{args}) -> {rc}", self.shim)
        };
        if let Some(extra) = extra {
            line.push_str(", ");
            line.push_str(extra);
        }
        self.sink.emit(&line);
    }

    /// Emit a preformatted line (registration banner, file-control returns).
    pub(crate) fn raw(&self, line: &str) {
        self.sink.emit(line);
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("shim", &self.shim).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_sink::CollectSink;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn op_line_shape_with_args() {
        let sink = CollectSink::shared();
        let tracer = Tracer::new("mirror", sink.clone());
        tracer.op("write", "db.sqlite", format_args!("n=3,ofst=0"), "OK");
        assert_eq!(sink.take(), vec!["mirror.write(db.sqlite,n=3,ofst=0) -> OK"]);
    }

    #[test]
    fn op_line_shape_without_args() {
        let sink = CollectSink::shared();
        let tracer = Tracer::new("mirror", sink.clone());
        tracer.op("close", "db.sqlite", format_args!(""), "OK");
        assert_eq!(sink.take(), vec!["mirror.close(db.sqlite) -> OK"]);
    }

    #[test]
    fn op_line_with_extra() {
        let sink = CollectSink::shared();
        let tracer = Tracer::new("mirror", sink.clone());
        tracer.op_extra(
            "write",
            "db.sqlite",
            format_args!("n=3,ofst=0"),
            "OK",
            Some("mirror=BUSY"),
        );
        assert_eq!(
            sink.take(),
            vec!["mirror.write(db.sqlite,n=3,ofst=0) -> OK, mirror=BUSY"]
        );
    }

    #[test]
    fn rc_str_renders_codes() {
        assert_eq!(rc_str::<()>(&Ok(())), "OK");
        assert_eq!(
            rc_str::<()>(&Err(VfsError::NotFound {
                path: PathBuf::new()
            })),
            "NOT_FOUND"
        );
        assert_eq!(rc_str::<()>(&Err(VfsError::Code(-42))), "-42");
    }

    #[test]
    fn closures_are_sinks() {
        let sink: Arc<dyn TraceSink> = Arc::new(|_line: &str| {});
        sink.emit("anything");
    }
}
