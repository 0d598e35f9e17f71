#![warn(missing_docs)]

//! State image support.
//!
//! A state image is a flat capture of the kernel tables the Keyhole
//! engine knows how to dump, written by the kernel's capture hook or by
//! [`ImageBuilder`] on the host. [`StateImage`] serves the
//! [`KernelQuery`] trait from such a buffer, handing out a fresh copy of
//! a section at every call the way a live kernel would.

use std::mem;

use thiserror::Error;
use zerocopy::FromBytes;

use keyhole_core::query::{InfoKind, KernelQuery, QueryError};
use keyhole_core::ring::MessageRing;
use keyhole_core::tables::{
    ImageTable, IrqTable, KernelInfo, Machine, MemChunkTable, ProcTable, RawImageEntry,
    RawIrqHook, RawMemChunk, RawProc, SchedSnapshot, KMESG_BUF, NR_BOOT_IMAGE, NR_IRQ_HOOKS,
    NR_MEM_CHUNKS, NR_SLOTS, PARAMS_BUF,
};

mod builder;
mod format;

pub use builder::ImageBuilder;
pub use format::{
    ImageHeader, E_BAD_IMAGE, E_NO_SECTION, FORMAT_VERSION, IMAGE_LEN, IMAGE_MAGIC,
};

use format::{RawLogHead, RawQueueHeads};

/// State image error.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The buffer does not start with the image magic.
    #[error("bad image magic {:#x}", .0)]
    BadMagic(u32),

    /// The image was written by an unknown format version.
    #[error("unsupported image version {}", .0)]
    BadVersion(u32),

    /// The buffer ends before the header does.
    #[error("image truncated, only {} bytes", .0)]
    Truncated(usize),

    /// IO error
    #[error(transparent)]
    FileError(#[from] std::io::Error),
}

/// Image-backed kernel state source.
///
/// Borrows the raw buffer, typically a mapped file, and copies sections
/// out on demand. A truncated capture parses fine as long as the header
/// is whole, queries for sections past the end fail individually with
/// [`E_NO_SECTION`].
pub struct StateImage<'a> {
    bytes: &'a [u8],
    header: ImageHeader,
}

impl<'a> StateImage<'a> {

    /// Wrap a raw image buffer, validating the header.
    pub fn new(bytes: &'a [u8]) -> Result<Self, ImageError> {
        let header =
            ImageHeader::read_from_prefix(bytes).ok_or(ImageError::Truncated(bytes.len()))?;
        if header.magic != IMAGE_MAGIC {
            return Err(ImageError::BadMagic(header.magic));
        }
        if header.version != FORMAT_VERSION {
            return Err(ImageError::BadVersion(header.version));
        }
        Ok(StateImage { bytes, header })
    }

    /// The image header.
    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    fn section(&self, kind: InfoKind, offset: usize, len: usize) -> Result<&'a [u8], QueryError> {
        self.bytes
            .get(offset..offset + len)
            .ok_or(QueryError::Refused(kind, E_NO_SECTION))
    }

    fn record<T: FromBytes>(&self, kind: InfoKind, offset: usize) -> Result<T, QueryError> {
        let bytes = self.section(kind, offset, mem::size_of::<T>())?;
        T::read_from(bytes).ok_or(QueryError::Malformed(kind, E_BAD_IMAGE))
    }

    fn record_slice<T: FromBytes>(
        &self,
        kind: InfoKind,
        offset: usize,
        count: usize,
    ) -> Result<Vec<T>, QueryError> {
        let bytes = self.section(kind, offset, count * mem::size_of::<T>())?;
        bytes
            .chunks_exact(mem::size_of::<T>())
            .map(|chunk| T::read_from(chunk).ok_or(QueryError::Malformed(kind, E_BAD_IMAGE)))
            .collect()
    }

}

impl KernelQuery for StateImage<'_> {

    fn get_proc_table(&self) -> Result<ProcTable, QueryError> {
        let slots: Vec<RawProc> =
            self.record_slice(InfoKind::ProcTable, format::OFF_PROCS, NR_SLOTS)?;
        Ok(ProcTable::new(slots))
    }

    fn get_sched_info(&self) -> Result<SchedSnapshot, QueryError> {
        let slots: Vec<RawProc> =
            self.record_slice(InfoKind::SchedInfo, format::OFF_PROCS, NR_SLOTS)?;
        let heads: RawQueueHeads = self.record(InfoKind::SchedInfo, format::OFF_HEADS)?;
        Ok(SchedSnapshot::new(ProcTable::new(slots), heads.heads))
    }

    fn get_image_table(&self) -> Result<ImageTable, QueryError> {
        let entries: Vec<RawImageEntry> =
            self.record_slice(InfoKind::BootImage, format::OFF_IMAGE, NR_BOOT_IMAGE)?;
        Ok(ImageTable::new(entries))
    }

    fn get_irq_hooks(&self) -> Result<IrqTable, QueryError> {
        let hooks: Vec<RawIrqHook> =
            self.record_slice(InfoKind::IrqHooks, format::OFF_IRQ, NR_IRQ_HOOKS)?;
        Ok(IrqTable::new(hooks))
    }

    fn get_kernel_info(&self) -> Result<KernelInfo, QueryError> {
        self.record(InfoKind::KernelInfo, format::OFF_KINFO)
    }

    fn get_machine(&self) -> Result<Machine, QueryError> {
        self.record(InfoKind::Machine, format::OFF_MACHINE)
    }

    fn get_mem_chunks(&self) -> Result<MemChunkTable, QueryError> {
        let chunks: Vec<RawMemChunk> =
            self.record_slice(InfoKind::MemChunks, format::OFF_CHUNKS, NR_MEM_CHUNKS)?;
        Ok(MemChunkTable::new(chunks))
    }

    fn get_mon_params(&self) -> Result<Vec<u8>, QueryError> {
        let bytes = self.section(InfoKind::BootParams, format::OFF_PARAMS, PARAMS_BUF)?;
        Ok(bytes.to_vec())
    }

    fn get_kernel_log(&self) -> Result<MessageRing, QueryError> {
        let head: RawLogHead = self.record(InfoKind::KernelLog, format::OFF_LOG_HEAD)?;
        let buf = self.section(InfoKind::KernelLog, format::OFF_LOG_BUF, KMESG_BUF)?;
        MessageRing::from_parts(buf.to_vec(), head.next as usize, head.size as usize)
            .map_err(|_| QueryError::Malformed(InfoKind::KernelLog, E_BAD_IMAGE))
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    use keyhole_core::tables::{CLASS_SERVER, CLASS_TASK, CLASS_USER, IRQ_REENABLE};

    fn sample_kinfo() -> KernelInfo {
        let mut kinfo = KernelInfo {
            code_base: 0x0000_0000_0010_0000,
            code_size: 0x0002_4000,
            data_base: 0x0000_0000_0013_0000,
            data_size: 0x0001_8000,
            proc_addr: 0xffff_8000_0020_0000,
            nil_ptr: 0,
            params_base: 0x0000_0000_0009_0000,
            params_size: PARAMS_BUF as u64,
            nr_procs: 56,
            nr_tasks: 8,
            ..Default::default()
        };
        kinfo.release[..3].copy_from_slice(b"2.0");
        kinfo.version[..1].copy_from_slice(b"4");
        kinfo
    }

    fn sample_builder() -> ImageBuilder {
        let mut builder = ImageBuilder::new(sample_kinfo());
        builder.machine.processor = 586;
        builder.machine.protected = 1;

        builder.set_proc(0, RawProc::new(-8, "clock", CLASS_TASK, 0));
        builder.set_proc(1, RawProc::new(-7, "tty", CLASS_TASK, 0));
        builder.set_proc(9, RawProc::new(1, "fs", CLASS_SERVER, 3));
        builder.set_proc(12, RawProc::new(4, "sh", CLASS_USER, 6));
        builder.link_ready_queue(0, &[0, 1]);
        builder.link_ready_queue(3, &[9]);

        let mut entry = RawImageEntry {
            nr: -8,
            class: CLASS_TASK,
            stack_size: 0x800,
            ..Default::default()
        };
        entry.name[..5].copy_from_slice(b"clock");
        builder.add_image_entry(entry);

        builder.add_irq_hook(RawIrqHook {
            id: 1,
            owner: -8,
            irq: 0,
            policy: IRQ_REENABLE,
        });
        builder.add_mem_chunk(0x800, 0x9f);
        builder.add_mem_chunk(0x1000, 0x3c00);

        builder.append_log("keyhole sample kernel\n");
        builder.append_log("boot complete\n");
        builder.set_param("rootdev", "904");
        builder.set_param("memory", "64M");
        builder
    }

    #[test]
    fn built_image_round_trips() {
        let bytes = sample_builder().to_bytes();
        assert_eq!(bytes.len(), IMAGE_LEN);

        let image = StateImage::new(&bytes).unwrap();
        assert_eq!(image.header().image_len as usize, IMAGE_LEN);

        let table = image.get_proc_table().unwrap();
        assert_eq!(table.occupied().count(), 4);
        assert_eq!(table.name_of(1), "fs");

        let kinfo = image.get_kernel_info().unwrap();
        assert_eq!(kinfo.release_str(), "2.0");
        assert_eq!(kinfo.proc_addr, 0xffff_8000_0020_0000);

        let machine = image.get_machine().unwrap();
        assert_eq!(machine.processor, 586);

        let chunks = image.get_mem_chunks().unwrap();
        assert_eq!(chunks.total_clicks(), 0x9f + 0x3c00);

        let irqs = image.get_irq_hooks().unwrap();
        assert_eq!(irqs.hooks().iter().filter(|h| h.in_use()).count(), 1);

        let boot = image.get_image_table().unwrap();
        assert_eq!(boot.used().count(), 1);

        let log = image.get_kernel_log().unwrap();
        assert_eq!(log.extract_text(), "keyhole sample kernel\nboot complete\n");

        let params = image.get_mon_params().unwrap();
        assert_eq!(params.len(), PARAMS_BUF);
        let text = String::from_utf8_lossy(&params);
        assert!(text.contains("rootdev=904\0"));
        assert!(text.contains("memory=64M\0"));
    }

    #[test]
    fn queue_links_survive_capture_and_relocation() {
        let bytes = sample_builder().to_bytes();
        let image = StateImage::new(&bytes).unwrap();

        let kinfo = image.get_kernel_info().unwrap();
        let mut sched = image.get_sched_info().unwrap();
        sched.relocate(&kinfo).unwrap();

        assert_eq!(sched.walk_queue(0).unwrap(), vec![-8, -7]);
        assert_eq!(sched.walk_queue(3).unwrap(), vec![1]);
        assert_eq!(sched.walk_queue(6).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = sample_builder().to_bytes();
        bytes[0] = 0x00;
        match StateImage::new(&bytes) {
            Err(ImageError::BadMagic(_)) => (),
            other => panic!("expected a bad magic error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = sample_builder().to_bytes();
        bytes[4] = 0x7f;
        match StateImage::new(&bytes) {
            Err(ImageError::BadVersion(_)) => (),
            other => panic!("expected a bad version error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn short_buffer_is_rejected() {
        let bytes = sample_builder().to_bytes();
        match StateImage::new(&bytes[..8]) {
            Err(ImageError::Truncated(8)) => (),
            other => panic!("expected a truncation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn truncated_capture_fails_query_by_query() {
        let bytes = sample_builder().to_bytes();
        let short = &bytes[..format::OFF_HEADS];
        let image = StateImage::new(short).unwrap();

        assert!(image.get_proc_table().is_ok());
        match image.get_sched_info() {
            Err(err) => {
                assert_eq!(err.kind(), InfoKind::SchedInfo);
                assert_eq!(err.code(), E_NO_SECTION);
            }
            Ok(_) => panic!("sched info should be missing"),
        }
        match image.get_kernel_log() {
            Err(err) => assert_eq!(err.code(), E_NO_SECTION),
            Ok(_) => panic!("kernel log should be missing"),
        }
    }

    #[test]
    fn corrupt_log_cursor_is_malformed() {
        let mut bytes = sample_builder().to_bytes();
        // write cursor far outside the ring capacity
        bytes[format::OFF_LOG_HEAD..format::OFF_LOG_HEAD + 4]
            .copy_from_slice(&0xffff_0000u32.to_le_bytes());
        let image = StateImage::new(&bytes).unwrap();
        match image.get_kernel_log() {
            Err(QueryError::Malformed(InfoKind::KernelLog, code)) => {
                assert_eq!(code, E_BAD_IMAGE);
            }
            other => panic!("expected a malformed log, got {:?}", other.map(|_| ())),
        }
    }

}
