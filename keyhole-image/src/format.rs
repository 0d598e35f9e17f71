//! On-disk layout of a state image.
//!
//! An image is one flat buffer: a small header followed by every kernel
//! section at a fixed offset. Offsets are derived from the record sizes
//! so the layout constants below cannot drift from the types.

use std::mem;

use custom_debug::Debug;
use zerocopy::{AsBytes, FromBytes};

use keyhole_core::tables::{
    KernelInfo, Machine, RawImageEntry, RawIrqHook, RawMemChunk, RawProc, KMESG_BUF,
    NR_BOOT_IMAGE, NR_IRQ_HOOKS, NR_MEM_CHUNKS, NR_SCHED_QUEUES, NR_SLOTS, PARAMS_BUF,
};

/// Image magic, "KEYH" in little endian.
pub const IMAGE_MAGIC: u32 = 0x4859_454b;

/// Current image format version.
pub const FORMAT_VERSION: u32 = 1;

/// Status code for a section missing from the image.
pub const E_NO_SECTION: i32 = -101;

/// Status code for a section that is present but does not decode.
pub const E_BAD_IMAGE: i32 = -102;

/// Image file header.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct ImageHeader {
    /// Must be [`IMAGE_MAGIC`].
    #[debug(format = "{:#010x}")]
    pub magic: u32,
    /// Must be [`FORMAT_VERSION`].
    pub version: u32,
    /// Total image length the writer produced.
    pub image_len: u32,
    /// Keeps the record free of implicit padding.
    pub reserved: u32,
}

/// Write cursor and fill count of the kernel message ring.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct RawLogHead {
    /// Index the next byte would be written at.
    pub next: u32,
    /// Live bytes in the ring.
    pub size: u32,
}

/// The ready-queue heads section.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct RawQueueHeads {
    /// Kernel address of the first ready process per queue.
    pub heads: [u64; NR_SCHED_QUEUES],
}

/// Offset of the kernel info section.
pub const OFF_KINFO: usize = mem::size_of::<ImageHeader>();
/// Offset of the machine section.
pub const OFF_MACHINE: usize = OFF_KINFO + mem::size_of::<KernelInfo>();
/// Offset of the process table section.
pub const OFF_PROCS: usize = OFF_MACHINE + mem::size_of::<Machine>();
/// Offset of the ready-queue heads section.
pub const OFF_HEADS: usize = OFF_PROCS + NR_SLOTS * mem::size_of::<RawProc>();
/// Offset of the boot image table section.
pub const OFF_IMAGE: usize = OFF_HEADS + mem::size_of::<RawQueueHeads>();
/// Offset of the interrupt hook table section.
pub const OFF_IRQ: usize = OFF_IMAGE + NR_BOOT_IMAGE * mem::size_of::<RawImageEntry>();
/// Offset of the memory chunk list section.
pub const OFF_CHUNKS: usize = OFF_IRQ + NR_IRQ_HOOKS * mem::size_of::<RawIrqHook>();
/// Offset of the kernel log ring head.
pub const OFF_LOG_HEAD: usize = OFF_CHUNKS + NR_MEM_CHUNKS * mem::size_of::<RawMemChunk>();
/// Offset of the kernel log ring buffer.
pub const OFF_LOG_BUF: usize = OFF_LOG_HEAD + mem::size_of::<RawLogHead>();
/// Offset of the boot monitor parameter area.
pub const OFF_PARAMS: usize = OFF_LOG_BUF + KMESG_BUF;
/// Total length of a complete image.
pub const IMAGE_LEN: usize = OFF_PARAMS + PARAMS_BUF;
