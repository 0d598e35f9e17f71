//! State image writer.

use std::io::{BufWriter, Write};
use std::mem;

use zerocopy::AsBytes;

use keyhole_core::ring::MessageRing;
use keyhole_core::tables::{
    KernelInfo, Machine, RawImageEntry, RawIrqHook, RawMemChunk, RawProc, KMESG_BUF,
    NR_BOOT_IMAGE, NR_IRQ_HOOKS, NR_MEM_CHUNKS, NR_SCHED_QUEUES, NR_SLOTS, PARAMS_BUF,
};

use crate::format::{
    ImageHeader, RawLogHead, RawQueueHeads, FORMAT_VERSION, IMAGE_LEN, IMAGE_MAGIC, OFF_CHUNKS,
    OFF_HEADS, OFF_IMAGE, OFF_IRQ, OFF_KINFO, OFF_LOG_BUF, OFF_LOG_HEAD, OFF_MACHINE, OFF_PARAMS,
    OFF_PROCS,
};
use crate::ImageError;

/// Assembles a state image on the host.
///
/// Starts from an empty kernel: every process slot free, every table
/// empty, every queue head at the sentinel taken from the kernel info
/// handed to [`new`](ImageBuilder::new). Queue links are fabricated in
/// kernel space, based at `kinfo.proc_addr`, exactly as a capture of the
/// real table would hold them.
pub struct ImageBuilder {
    /// Kernel description written into the image.
    pub kinfo: KernelInfo,
    /// Machine description written into the image.
    pub machine: Machine,
    procs: Vec<RawProc>,
    heads: [u64; NR_SCHED_QUEUES],
    image: Vec<RawImageEntry>,
    irqs: Vec<RawIrqHook>,
    chunks: Vec<RawMemChunk>,
    log: MessageRing,
    params: Vec<u8>,
}

impl ImageBuilder {

    /// A builder for an image of the kernel described by `kinfo`.
    pub fn new(kinfo: KernelInfo) -> Self {
        ImageBuilder {
            heads: [kinfo.nil_ptr; NR_SCHED_QUEUES],
            kinfo,
            machine: Machine::default(),
            procs: vec![RawProc::free(); NR_SLOTS],
            image: Vec::new(),
            irqs: Vec::new(),
            chunks: Vec::new(),
            log: MessageRing::new(KMESG_BUF),
            params: Vec::new(),
        }
    }

    /// Place a process in a table slot. `index` must be below
    /// [`NR_SLOTS`].
    pub fn set_proc(&mut self, index: usize, slot: RawProc) {
        self.procs[index] = slot;
    }

    /// Chain the given slots onto a ready queue, in order.
    ///
    /// Writes the queue head and the `next_ready` links as kernel
    /// addresses, the last slot pointing at the sentinel. An empty slot
    /// list leaves the queue empty.
    pub fn link_ready_queue(&mut self, queue: usize, slots: &[usize]) {
        let base = self.kinfo.proc_addr;
        let nil = self.kinfo.nil_ptr;
        let stride = mem::size_of::<RawProc>() as u64;
        for pair in slots.windows(2) {
            self.procs[pair[0]].next_ready = base + pair[1] as u64 * stride;
        }
        if let Some(&last) = slots.last() {
            self.procs[last].next_ready = nil;
        }
        self.heads[queue] = match slots.first() {
            Some(&first) => base + first as u64 * stride,
            None => nil,
        };
    }

    /// Add a boot image table entry. Entries beyond [`NR_BOOT_IMAGE`]
    /// are dropped at write time.
    pub fn add_image_entry(&mut self, entry: RawImageEntry) {
        self.image.push(entry);
    }

    /// Add an interrupt hook. Hooks beyond [`NR_IRQ_HOOKS`] are dropped
    /// at write time.
    pub fn add_irq_hook(&mut self, hook: RawIrqHook) {
        self.irqs.push(hook);
    }

    /// Add a free memory chunk, units in clicks.
    pub fn add_mem_chunk(&mut self, base: u64, size: u64) {
        self.chunks.push(RawMemChunk { base, size });
    }

    /// Append text to the kernel message ring, oldest bytes rotating
    /// out once the ring is full.
    pub fn append_log(&mut self, text: &str) {
        self.log.append(text.as_bytes());
    }

    /// Record one boot monitor parameter as a `name=value` pair.
    ///
    /// Ignored once the parameter area is full, the way the monitor's
    /// own bounded area drops late settings.
    pub fn set_param(&mut self, name: &str, value: &str) {
        let entry_len = name.len() + value.len() + 2;
        if self.params.len() + entry_len > PARAMS_BUF {
            return;
        }
        self.params.extend_from_slice(name.as_bytes());
        self.params.push(b'=');
        self.params.extend_from_slice(value.as_bytes());
        self.params.push(0);
    }

    /// Serialize the image into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; IMAGE_LEN];

        let header = ImageHeader {
            magic: IMAGE_MAGIC,
            version: FORMAT_VERSION,
            image_len: IMAGE_LEN as u32,
            reserved: 0,
        };
        bytes[..OFF_KINFO].copy_from_slice(header.as_bytes());
        bytes[OFF_KINFO..OFF_MACHINE].copy_from_slice(self.kinfo.as_bytes());
        bytes[OFF_MACHINE..OFF_PROCS].copy_from_slice(self.machine.as_bytes());

        let stride = mem::size_of::<RawProc>();
        for (index, slot) in self.procs.iter().enumerate() {
            let offset = OFF_PROCS + index * stride;
            bytes[offset..offset + stride].copy_from_slice(slot.as_bytes());
        }

        let heads = RawQueueHeads { heads: self.heads };
        bytes[OFF_HEADS..OFF_IMAGE].copy_from_slice(heads.as_bytes());

        write_records(&mut bytes, OFF_IMAGE, &self.image, NR_BOOT_IMAGE);
        write_records(&mut bytes, OFF_IRQ, &self.irqs, NR_IRQ_HOOKS);
        // unused hook slots must carry the no-owner marker, zeroes
        // would read as hooks owned by process zero
        let hook_len = mem::size_of::<RawIrqHook>();
        for index in self.irqs.len().min(NR_IRQ_HOOKS)..NR_IRQ_HOOKS {
            let offset = OFF_IRQ + index * hook_len;
            bytes[offset..offset + hook_len].copy_from_slice(RawIrqHook::unused().as_bytes());
        }
        write_records(&mut bytes, OFF_CHUNKS, &self.chunks, NR_MEM_CHUNKS);

        let (ring_buf, ring_next, ring_size) = self.log.raw_parts();
        let log_head = RawLogHead {
            next: ring_next as u32,
            size: ring_size as u32,
        };
        bytes[OFF_LOG_HEAD..OFF_LOG_BUF].copy_from_slice(log_head.as_bytes());
        bytes[OFF_LOG_BUF..OFF_LOG_BUF + KMESG_BUF].copy_from_slice(ring_buf);

        bytes[OFF_PARAMS..OFF_PARAMS + self.params.len()].copy_from_slice(&self.params);

        bytes
    }

    /// Write the image to a file.
    pub fn write_to<P>(&self, path: P) -> Result<(), ImageError>
    where
        P: AsRef<std::path::Path>,
    {
        let mut fp = BufWriter::new(std::fs::File::create(&path)?);
        fp.write_all(&self.to_bytes())?;
        Ok(())
    }

}

fn write_records<T: AsBytes>(bytes: &mut [u8], base: usize, records: &[T], capacity: usize) {
    let stride = mem::size_of::<T>();
    for (index, record) in records.iter().take(capacity).enumerate() {
        let offset = base + index * stride;
        bytes[offset..offset + stride].copy_from_slice(record.as_bytes());
    }
}
