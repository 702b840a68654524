//! The mirrored file handle: one logical file over two backend handles.
//!
//! A [`MirroredFile`] always owns a primary handle and, for qualifying files
//! whose mirror opened, a secondary one. Mutating operations fan out to both
//! — primary first, then secondary, strictly sequential — and the two results
//! are merged by [`combine`]. Reads, size queries, locks and shared-memory
//! operations go to the primary alone: the secondary is a write-only shadow
//! copy, never a read source, so a diverged or half-broken mirror can never
//! affect what the engine observes.

use std::sync::Arc;

use crate::reconcile::combine;
use crate::trace::{Tracer, rc_str};
use crate::{
    DeviceCaps, FileControl, LockLevel, ShmLockOp, ShmRegion, SyncFlags, VfsError, VfsFile,
};

/// A file handle that shadows every write onto a secondary copy.
///
/// Created by [`MirrorFs::open`](crate::MirrorFs); the secondary handle is
/// present if and only if the file qualified for mirroring and its open
/// succeeded within the retry bound. When it is absent, every operation
/// degrades to primary-only for the lifetime of the handle.
pub(crate) struct MirroredFile {
    tracer: Arc<Tracer>,
    name: String,
    primary: Box<dyn VfsFile>,
    secondary: Option<Box<dyn VfsFile>>,
}

impl MirroredFile {
    pub(crate) fn new(
        tracer: Arc<Tracer>,
        name: String,
        primary: Box<dyn VfsFile>,
        secondary: Option<Box<dyn VfsFile>>,
    ) -> Self {
        Self {
            tracer,
            name,
            primary,
            secondary,
        }
    }

    /// Render the mirror outcome for the trace extra slot.
    fn mirror_extra(secondary_rc: Option<&Result<(), VfsError>>) -> Option<String> {
        secondary_rc.map(|rc| format!("mirror={}", rc_str(rc)))
    }
}

impl VfsFile for MirroredFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError> {
        let rc = self.primary.read_at(buf, offset);
        self.tracer.op(
            "read",
            &self.name,
            format_args!("n={},ofst={offset}", buf.len()),
            &rc_str(&rc),
        );
        rc
    }

    fn write_at(&mut self, data: &[u8], offset: u64) -> Result<(), VfsError> {
        let rc = self.primary.write_at(data, offset);
        let rc2 = self.secondary.as_mut().map(|s| s.write_at(data, offset));
        self.tracer.op_extra(
            "write",
            &self.name,
            format_args!("n={},ofst={offset}", data.len()),
            &rc_str(&rc),
            Self::mirror_extra(rc2.as_ref()).as_deref(),
        );
        combine(rc, rc2.unwrap_or(Ok(())))
    }

    fn truncate(&mut self, size: u64) -> Result<(), VfsError> {
        let rc = self.primary.truncate(size);
        let rc2 = self.secondary.as_mut().map(|s| s.truncate(size));
        self.tracer.op_extra(
            "truncate",
            &self.name,
            format_args!("{size}"),
            &rc_str(&rc),
            Self::mirror_extra(rc2.as_ref()).as_deref(),
        );
        combine(rc, rc2.unwrap_or(Ok(())))
    }

    fn sync(&mut self, flags: SyncFlags) -> Result<(), VfsError> {
        let rc = self.primary.sync(flags);
        let rc2 = self.secondary.as_mut().map(|s| s.sync(flags));
        self.tracer.op_extra(
            "sync",
            &self.name,
            format_args!("{flags}"),
            &rc_str(&rc),
            Self::mirror_extra(rc2.as_ref()).as_deref(),
        );
        combine(rc, rc2.unwrap_or(Ok(())))
    }

    fn file_size(&mut self) -> Result<u64, VfsError> {
        let rc = self.primary.file_size();
        let extra = rc.as_ref().ok().map(|size| format!("size={size}"));
        self.tracer.op_extra(
            "file_size",
            &self.name,
            format_args!(""),
            &rc_str(&rc),
            extra.as_deref(),
        );
        rc
    }

    fn lock(&mut self, level: LockLevel) -> Result<(), VfsError> {
        let rc = self.primary.lock(level);
        self.tracer.op(
            "lock",
            &self.name,
            format_args!("{}", level.name()),
            &rc_str(&rc),
        );
        rc
    }

    fn unlock(&mut self, level: LockLevel) -> Result<(), VfsError> {
        let rc = self.primary.unlock(level);
        self.tracer.op(
            "unlock",
            &self.name,
            format_args!("{}", level.name()),
            &rc_str(&rc),
        );
        rc
    }

    fn check_reserved_lock(&mut self) -> Result<bool, VfsError> {
        let rc = self.primary.check_reserved_lock();
        let extra = rc.as_ref().ok().map(|held| format!("out={held}"));
        self.tracer.op_extra(
            "check_reserved_lock",
            &self.name,
            format_args!(""),
            &rc_str(&rc),
            extra.as_deref(),
        );
        rc
    }

    fn file_control(&mut self, op: &mut FileControl) -> Result<(), VfsError> {
        let op_desc = op.to_string();
        let rc = self.primary.file_control(op);
        let rc2 = self.secondary.as_mut().map(|s| s.file_control(op));
        self.tracer.op_extra(
            "file_control",
            &self.name,
            format_args!("{op_desc}"),
            &rc_str(&rc),
            Self::mirror_extra(rc2.as_ref()).as_deref(),
        );
        if rc.is_ok() {
            match op {
                FileControl::VfsName { out: Some(inner) } => {
                    *inner = format!("{}/{inner}", self.tracer.shim_name());
                }
                FileControl::Pragma { out: Some(text), .. }
                | FileControl::TempFilename { out: Some(text) } => {
                    self.tracer.raw(&format!(
                        "{}.file_control({},{op_desc}) returns {text}",
                        self.tracer.shim_name(),
                        self.name,
                    ));
                }
                _ => {}
            }
        }
        combine(rc, rc2.unwrap_or(Ok(())))
    }

    fn sector_size(&mut self) -> u32 {
        let size = self.primary.sector_size();
        self.tracer.op(
            "sector_size",
            &self.name,
            format_args!(""),
            &size.to_string(),
        );
        size
    }

    fn device_characteristics(&mut self) -> DeviceCaps {
        let caps = self.primary.device_characteristics();
        self.tracer.op(
            "device_characteristics",
            &self.name,
            format_args!(""),
            &format!("0x{:08x}", caps.bits()),
        );
        caps
    }

    fn shm_map(
        &mut self,
        region: u32,
        region_size: u32,
        extend: bool,
    ) -> Result<ShmRegion, VfsError> {
        let rc = self.primary.shm_map(region, region_size, extend);
        self.tracer.op(
            "shm_map",
            &self.name,
            format_args!("region={region},size={region_size},extend={extend}"),
            &rc_str(&rc),
        );
        rc
    }

    fn shm_lock(&mut self, offset: u32, count: u32, op: ShmLockOp) -> Result<(), VfsError> {
        let rc = self.primary.shm_lock(offset, count, op);
        self.tracer.op(
            "shm_lock",
            &self.name,
            format_args!("ofst={offset},n={count},{}", op.name()),
            &rc_str(&rc),
        );
        rc
    }

    fn shm_barrier(&mut self) {
        self.primary.shm_barrier();
        self.tracer.raw(&format!(
            "{}.shm_barrier({})",
            self.tracer.shim_name(),
            self.name
        ));
    }

    fn shm_unmap(&mut self, delete: bool) -> Result<(), VfsError> {
        let rc = self.primary.shm_unmap(delete);
        self.tracer.op(
            "shm_unmap",
            &self.name,
            format_args!("delete={delete}"),
            &rc_str(&rc),
        );
        rc
    }

    fn close(&mut self) -> Result<(), VfsError> {
        // Both closes are always issued; both handles are released afterwards
        // whatever the individual outcomes.
        let rc = self.primary.close();
        let rc2 = self.secondary.as_mut().map(|s| s.close());
        self.secondary = None;
        self.tracer.op_extra(
            "close",
            &self.name,
            format_args!(""),
            &rc_str(&rc),
            Self::mirror_extra(rc2.as_ref()).as_deref(),
        );
        combine(rc, rc2.unwrap_or(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::test_sink::CollectSink;
    use std::sync::Mutex;

    /// Shared call log so tests can see which handle served which call.
    type Log = Arc<Mutex<Vec<String>>>;

    /// Configurable in-memory handle for exercising the fan-out paths.
    struct MockFile {
        tag: &'static str,
        data: Arc<Mutex<Vec<u8>>>,
        log: Log,
        fail_sync: bool,
        fail_close: bool,
        panic_on_read_path: bool,
    }

    impl MockFile {
        fn new(tag: &'static str, log: &Log) -> Self {
            Self {
                tag,
                data: Arc::new(Mutex::new(Vec::new())),
                log: Arc::clone(log),
                fail_sync: false,
                fail_close: false,
                panic_on_read_path: false,
            }
        }

        fn record(&self, call: &str) {
            self.log.lock().unwrap().push(format!("{}:{call}", self.tag));
        }
    }

    impl VfsFile for MockFile {
        fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError> {
            if self.panic_on_read_path {
                panic!("secondary handle must never serve reads");
            }
            self.record("read_at");
            let data = self.data.lock().unwrap();
            let offset = offset as usize;
            if offset >= data.len() {
                return Ok(0);
            }
            let n = buf.len().min(data.len() - offset);
            buf[..n].copy_from_slice(&data[offset..offset + n]);
            Ok(n)
        }

        fn write_at(&mut self, data: &[u8], offset: u64) -> Result<(), VfsError> {
            self.record("write_at");
            let mut stored = self.data.lock().unwrap();
            let end = offset as usize + data.len();
            if end > stored.len() {
                stored.resize(end, 0);
            }
            stored[offset as usize..end].copy_from_slice(data);
            Ok(())
        }

        fn truncate(&mut self, size: u64) -> Result<(), VfsError> {
            self.record("truncate");
            self.data.lock().unwrap().truncate(size as usize);
            Ok(())
        }

        fn sync(&mut self, _flags: SyncFlags) -> Result<(), VfsError> {
            self.record("sync");
            if self.fail_sync {
                return Err(VfsError::Busy { operation: "sync" });
            }
            Ok(())
        }

        fn file_size(&mut self) -> Result<u64, VfsError> {
            if self.panic_on_read_path {
                panic!("secondary handle must never serve size queries");
            }
            self.record("file_size");
            Ok(self.data.lock().unwrap().len() as u64)
        }

        fn lock(&mut self, _level: LockLevel) -> Result<(), VfsError> {
            self.record("lock");
            Ok(())
        }

        fn unlock(&mut self, _level: LockLevel) -> Result<(), VfsError> {
            self.record("unlock");
            Ok(())
        }

        fn check_reserved_lock(&mut self) -> Result<bool, VfsError> {
            self.record("check_reserved_lock");
            Ok(false)
        }

        fn file_control(&mut self, op: &mut FileControl) -> Result<(), VfsError> {
            self.record("file_control");
            match op {
                FileControl::VfsName { out } => *out = Some("mock".to_owned()),
                FileControl::Pragma { out, .. } => *out = Some("ok".to_owned()),
                _ => {}
            }
            Ok(())
        }

        fn close(&mut self) -> Result<(), VfsError> {
            self.record("close");
            if self.fail_close {
                return Err(VfsError::Io {
                    operation: "close",
                    path: Default::default(),
                    source: std::io::Error::other("close failed"),
                });
            }
            Ok(())
        }
    }

    fn dual(
        log: &Log,
        configure: impl Fn(&mut MockFile, &mut MockFile),
    ) -> (MirroredFile, Arc<CollectSink>, Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<u8>>>) {
        let sink = CollectSink::shared();
        let tracer = Arc::new(Tracer::new("mirror", sink.clone()));
        let mut primary = MockFile::new("primary", log);
        let mut secondary = MockFile::new("secondary", log);
        configure(&mut primary, &mut secondary);
        let p_data = Arc::clone(&primary.data);
        let s_data = Arc::clone(&secondary.data);
        let file = MirroredFile::new(
            tracer,
            "db.sqlite".to_owned(),
            Box::new(primary),
            Some(Box::new(secondary)),
        );
        (file, sink, p_data, s_data)
    }

    #[test]
    fn write_fans_out_identical_bytes() {
        let log = Log::default();
        let (mut file, _sink, p_data, s_data) = dual(&log, |_, _| {});

        file.write_at(b"abc", 0).unwrap();
        file.write_at(b"xyz", 5).unwrap();

        assert_eq!(*p_data.lock().unwrap(), *s_data.lock().unwrap());
        assert_eq!(&p_data.lock().unwrap()[..], b"abc\0\0xyz");
    }

    #[test]
    fn primary_is_written_before_secondary() {
        let log = Log::default();
        let (mut file, _sink, _, _) = dual(&log, |_, _| {});
        file.write_at(b"abc", 0).unwrap();

        let calls = log.lock().unwrap();
        assert_eq!(*calls, vec!["primary:write_at", "secondary:write_at"]);
    }

    #[test]
    fn reads_and_size_never_touch_secondary() {
        let log = Log::default();
        let (mut file, _sink, p_data, _) = dual(&log, |_, secondary| {
            secondary.panic_on_read_path = true;
        });
        p_data.lock().unwrap().extend_from_slice(b"hello");

        let mut buf = [0u8; 5];
        assert_eq!(file.read_at(&mut buf, 0).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(file.file_size().unwrap(), 5);
    }

    #[test]
    fn secondary_sync_failure_surfaces() {
        let log = Log::default();
        let (mut file, _sink, _, _) = dual(&log, |_, secondary| {
            secondary.fail_sync = true;
        });

        let rc = file.sync(SyncFlags::NORMAL);
        assert!(matches!(rc, Err(VfsError::Busy { .. })));
    }

    #[test]
    fn close_closes_both_even_when_primary_fails() {
        let log = Log::default();
        let (mut file, _sink, _, _) = dual(&log, |primary, _| {
            primary.fail_close = true;
        });

        let rc = file.close();
        assert!(matches!(rc, Err(VfsError::Io { .. })));

        let calls = log.lock().unwrap();
        assert!(calls.contains(&"primary:close".to_owned()));
        assert!(calls.contains(&"secondary:close".to_owned()));
    }

    #[test]
    fn truncate_fans_out() {
        let log = Log::default();
        let (mut file, _sink, p_data, s_data) = dual(&log, |_, _| {});
        file.write_at(b"0123456789", 0).unwrap();
        file.truncate(4).unwrap();
        assert_eq!(&p_data.lock().unwrap()[..], b"0123");
        assert_eq!(&s_data.lock().unwrap()[..], b"0123");
    }

    #[test]
    fn vfs_name_is_prefixed_with_shim_name() {
        let log = Log::default();
        let (mut file, _sink, _, _) = dual(&log, |_, _| {});

        let mut op = FileControl::VfsName { out: None };
        file.file_control(&mut op).unwrap();
        match op {
            FileControl::VfsName { out: Some(name) } => assert_eq!(name, "mirror/mock"),
            other => panic!("unexpected file-control state: {other:?}"),
        }
    }

    #[test]
    fn pragma_result_is_traced() {
        let log = Log::default();
        let (mut file, sink, _, _) = dual(&log, |_, _| {});

        let mut op = FileControl::Pragma {
            name: "journal_mode".into(),
            value: Some("wal".into()),
            out: None,
        };
        file.file_control(&mut op).unwrap();

        let lines = sink.take();
        assert!(
            lines
                .iter()
                .any(|l| l.contains("PRAGMA,[journal_mode,wal]) returns ok")),
            "missing pragma return line in {lines:?}"
        );
    }

    #[test]
    fn dual_write_trace_reports_mirror_outcome() {
        let log = Log::default();
        let (mut file, sink, _, _) = dual(&log, |_, _| {});
        file.write_at(b"abc", 0).unwrap();

        let lines = sink.take();
        assert_eq!(
            lines,
            vec!["mirror.write(db.sqlite,n=3,ofst=0) -> OK, mirror=OK"]
        );
    }

    #[test]
    fn primary_only_handle_omits_mirror_extra() {
        let sink = CollectSink::shared();
        let tracer = Arc::new(Tracer::new("mirror", sink.clone()));
        let log = Log::default();
        let mut file = MirroredFile::new(
            tracer,
            "scratch".to_owned(),
            Box::new(MockFile::new("primary", &log)),
            None,
        );
        file.write_at(b"abc", 0).unwrap();

        assert_eq!(sink.take(), vec!["mirror.write(scratch,n=3,ofst=0) -> OK"]);
    }
}
