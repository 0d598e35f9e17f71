//! Kernel table snapshots.
//!
//! Wire records mirror the kernel's own structure layouts byte for byte,
//! so a query source can fill them straight from a state copy. The
//! surrounding table types own fixed-capacity copies of those records and
//! keep every lookup in bounds.

use std::mem;

use zerocopy::{AsBytes, FromBytes};

use crate::reloc::{self, RelocationError};

/// Kernel task slots at the bottom of the process table.
pub const NR_TASKS: usize = 8;

/// User and server process slots.
pub const NR_PROCS: usize = 56;

/// Total process table slots.
pub const NR_SLOTS: usize = NR_TASKS + NR_PROCS;

/// Scheduling queues, highest priority first.
pub const NR_SCHED_QUEUES: usize = 8;

/// Boot image table entries.
pub const NR_BOOT_IMAGE: usize = 16;

/// Interrupt hook table entries.
pub const NR_IRQ_HOOKS: usize = 16;

/// Free memory chunk list entries.
pub const NR_MEM_CHUNKS: usize = 8;

/// Capacity of the kernel message ring in bytes.
pub const KMESG_BUF: usize = 2048;

/// Size of the boot monitor parameter area in bytes.
pub const PARAMS_BUF: usize = 1024;

/// Wildcard process number, matches any sender.
pub const ANY_PROC: i32 = 0x7ace;

/// Process number that never matches a slot.
pub const NONE_PROC: i32 = 0x6ace;

/// log2 of the allocation click size.
pub const CLICK_SHIFT: u32 = 12;

/// Slot is not in use.
pub const F_SLOT_FREE: u32 = 0x01;
/// Slot has no memory map yet.
pub const F_NO_MAP: u32 = 0x02;
/// Process is blocked sending.
pub const F_SENDING: u32 = 0x04;
/// Process is blocked receiving.
pub const F_RECEIVING: u32 = 0x08;
/// Signal delivery pending.
pub const F_SIG_PENDING: u32 = 0x10;
/// Process is stopped.
pub const F_STOPPED: u32 = 0x20;

/// Idle slot class.
pub const CLASS_IDLE: u32 = 0;
/// Kernel task class.
pub const CLASS_TASK: u32 = 1;
/// System process class.
pub const CLASS_SYSTEM: u32 = 2;
/// Device driver class.
pub const CLASS_DRIVER: u32 = 3;
/// Server process class.
pub const CLASS_SERVER: u32 = 4;
/// Ordinary user process class.
pub const CLASS_USER: u32 = 5;

/// Text segment index in a memory map.
pub const SEG_TEXT: usize = 0;
/// Data segment index in a memory map.
pub const SEG_DATA: usize = 1;
/// Stack segment index in a memory map.
pub const SEG_STACK: usize = 2;

/// Interrupt hook policy bit, line is reenabled after the handler ran.
pub const IRQ_REENABLE: u32 = 0x01;

/// Display names for the scheduling queues, highest priority first.
pub const SCHED_QUEUE_NAMES: [&str; NR_SCHED_QUEUES] = [
    "task", "higher", "high", "normal", "low", "lower", "user", "idle",
];

/// Convert a click count to kibibytes, rounding to nearest.
pub const fn click_to_kb(clicks: u64) -> u64 {
    ((clicks << CLICK_SHIFT) + 512) >> 10
}

fn cstr(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// One segment of a process memory map, all units in clicks.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawSegment {
    /// Virtual base address.
    pub vir: u32,
    /// Physical base address.
    pub phys: u32,
    /// Segment length.
    pub len: u32,
}

/// One process table slot, as the kernel lays it out.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct RawProc {
    /// Saved program counter.
    pub pc: u64,
    /// Saved stack pointer.
    pub sp: u64,
    /// Ticks spent in user mode.
    pub user_time: u64,
    /// Ticks spent in system calls.
    pub sys_time: u64,
    /// Kernel address of the next ready process, or the link sentinel.
    pub next_ready: u64,
    /// Allowed message destinations, one bit per slot.
    pub sendmask: u64,
    /// Text, data and stack segments.
    pub memmap: [RawSegment; 3],
    /// Status flag bits.
    pub flags: u32,
    /// Scheduling queue this slot runs on.
    pub queue: u32,
    /// Slot class, task or server or user.
    pub class: u32,
    /// Process number, negative for kernel tasks.
    pub nr: i32,
    /// Who the process receives from when blocked, or a wildcard.
    pub getfrom: i32,
    /// Who the process is sending to when blocked.
    pub sendto: i32,
    /// Process name, NUL padded.
    pub name: [u8; 16],
    /// Keeps the record free of implicit padding.
    pub reserved: u32,
}

impl RawProc {

    /// An unused slot.
    pub fn free() -> Self {
        RawProc {
            flags: F_SLOT_FREE,
            ..Default::default()
        }
    }

    /// A minimal live slot, mostly for building synthetic tables.
    pub fn new(nr: i32, name: &str, class: u32, queue: u32) -> Self {
        let mut slot = RawProc {
            nr,
            class,
            queue,
            ..Default::default()
        };
        for (dst, src) in slot.name.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        slot
    }

    /// Whether the slot holds a process.
    pub fn in_use(&self) -> bool {
        self.flags & F_SLOT_FREE == 0
    }

    /// Process name with the NUL padding stripped.
    pub fn name_str(&self) -> String {
        cstr(&self.name)
    }

}

/// Base addresses, sizes and table locations of the running kernel.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct KernelInfo {
    /// Kernel text base.
    pub code_base: u64,
    /// Kernel text size.
    pub code_size: u64,
    /// Kernel data base.
    pub data_base: u64,
    /// Kernel data size.
    pub data_size: u64,
    /// Kernel address of the process table.
    pub proc_addr: u64,
    /// Sentinel value terminating ready-queue links.
    pub nil_ptr: u64,
    /// Base of kernel memory.
    pub kmem_base: u64,
    /// Size of kernel memory.
    pub kmem_size: u64,
    /// Boot device image base.
    pub bootdev_base: u64,
    /// Boot device image size.
    pub bootdev_size: u64,
    /// Boot monitor parameter area base.
    pub params_base: u64,
    /// Boot monitor parameter area size.
    pub params_size: u64,
    /// Process slots the kernel was built with.
    pub nr_procs: u32,
    /// Task slots the kernel was built with.
    pub nr_tasks: u32,
    /// Release string, NUL padded.
    pub release: [u8; 6],
    /// Version string, NUL padded.
    pub version: [u8; 6],
    /// Keeps the record free of implicit padding.
    pub reserved: [u8; 4],
}

impl KernelInfo {

    /// Release string with the NUL padding stripped.
    pub fn release_str(&self) -> String {
        cstr(&self.release)
    }

    /// Version string with the NUL padding stripped.
    pub fn version_str(&self) -> String {
        cstr(&self.version)
    }

}

/// Machine description as probed at boot.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct Machine {
    /// Nonzero on AT style hardware.
    pub pc_at: u32,
    /// Nonzero on MCA bus hardware.
    pub ps_mca: u32,
    /// Processor family number.
    pub processor: u32,
    /// Nonzero when running in protected mode.
    pub protected: u32,
    /// Nonzero with an EGA display.
    pub vdu_ega: u32,
    /// Nonzero with a VGA display.
    pub vdu_vga: u32,
}

/// One boot image table entry.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct RawImageEntry {
    /// Initial program counter.
    pub entry_pc: u64,
    /// Stack size in bytes.
    pub stack_size: u64,
    /// Initial send mask.
    pub sendmask: u64,
    /// Process number the entry boots into.
    pub nr: i32,
    /// Slot class the entry boots with.
    pub class: u32,
    /// Scheduling queue the entry starts on.
    pub queue: u32,
    /// Keeps the record free of implicit padding.
    pub reserved: u32,
    /// Entry name, NUL padded. An all-NUL name marks an unused entry.
    pub name: [u8; 16],
}

impl RawImageEntry {

    /// Whether the entry is part of the boot image.
    pub fn in_use(&self) -> bool {
        self.name[0] != 0
    }

    /// Entry name with the NUL padding stripped.
    pub fn name_str(&self) -> String {
        cstr(&self.name)
    }

}

/// One interrupt hook table entry.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct RawIrqHook {
    /// Hook id handed out at registration.
    pub id: u32,
    /// Owning process number, [`NONE_PROC`] when the hook is unused.
    pub owner: i32,
    /// Interrupt line the hook is attached to.
    pub irq: u32,
    /// Policy bits, see [`IRQ_REENABLE`].
    pub policy: u32,
}

impl RawIrqHook {

    /// An unused hook entry.
    pub fn unused() -> Self {
        RawIrqHook {
            owner: NONE_PROC,
            ..Default::default()
        }
    }

    /// Whether the hook is attached to an owner.
    pub fn in_use(&self) -> bool {
        self.owner != NONE_PROC
    }

}

/// One free memory chunk, units in clicks.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy)]
pub struct RawMemChunk {
    /// Chunk base.
    pub base: u64,
    /// Chunk size, zero marks an empty list entry.
    pub size: u64,
}

/// A private copy of the whole process table.
///
/// Always holds exactly [`NR_SLOTS`] slots. The backing storage never
/// moves once constructed, so its base address can serve as a relocation
/// target for kernel pointers into the original table.
#[derive(Debug)]
pub struct ProcTable {
    slots: Box<[RawProc]>,
}

impl ProcTable {

    /// Build a table from up to [`NR_SLOTS`] slots, padding the rest
    /// with free slots.
    pub fn new(mut slots: Vec<RawProc>) -> Self {
        slots.truncate(NR_SLOTS);
        slots.resize_with(NR_SLOTS, RawProc::free);
        ProcTable {
            slots: slots.into_boxed_slice(),
        }
    }

    /// All slots in table order.
    pub fn slots(&self) -> &[RawProc] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [RawProc] {
        &mut self.slots
    }

    /// Slot by index.
    pub fn get(&self, index: usize) -> Option<&RawProc> {
        self.slots.get(index)
    }

    /// Occupied slots in table order, with their indices.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &RawProc)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.in_use())
    }

    /// Base address of the local copy.
    pub fn local_base(&self) -> u64 {
        self.slots.as_ptr() as u64
    }

    /// Display name for a process number.
    ///
    /// Resolves the wildcards, then falls back to a slot scan. Unknown
    /// numbers come back as `"??"` rather than failing, a dump should
    /// survive a table that is garbage.
    pub fn name_of(&self, nr: i32) -> String {
        if nr == ANY_PROC {
            return "ANY".to_string();
        }
        if nr == NONE_PROC {
            return "NONE".to_string();
        }
        self.occupied()
            .find(|(_, slot)| slot.nr == nr)
            .map(|(_, slot)| slot.name_str())
            .unwrap_or_else(|| "??".to_string())
    }

}

/// Process table plus ready-queue heads, captured together.
///
/// Fresh from a query the queue links still hold kernel addresses and
/// cannot be followed. [`relocate`](SchedSnapshot::relocate) rebases them
/// onto the local copy, exactly once, after which
/// [`walk_queue`](SchedSnapshot::walk_queue) can chase them safely.
#[derive(Debug)]
pub struct SchedSnapshot {
    procs: ProcTable,
    heads: [u64; NR_SCHED_QUEUES],
    nil: u64,
    relocated: bool,
}

impl SchedSnapshot {

    /// Wrap a freshly copied table and its queue heads.
    pub fn new(procs: ProcTable, heads: [u64; NR_SCHED_QUEUES]) -> Self {
        SchedSnapshot {
            procs,
            heads,
            nil: 0,
            relocated: false,
        }
    }

    /// The process table held by this snapshot.
    pub fn procs(&self) -> &ProcTable {
        &self.procs
    }

    /// The queue head addresses, kernel-space before relocation.
    pub fn heads(&self) -> &[u64; NR_SCHED_QUEUES] {
        &self.heads
    }

    /// Whether the links have been rebased onto the local copy.
    pub fn is_relocated(&self) -> bool {
        self.relocated
    }

    /// Rebase every queue link from kernel space onto the local copy.
    ///
    /// Applies one uniform offset to all queue heads and all `next_ready`
    /// links, skipping the sentinel taken from `kinfo`. Fails if called a
    /// second time, the links would end up pointing nowhere.
    pub fn relocate(&mut self, kinfo: &KernelInfo) -> Result<(), RelocationError> {
        if self.relocated {
            return Err(RelocationError::AlreadyRelocated);
        }
        let offset = reloc::relocation_offset(self.procs.local_base(), kinfo.proc_addr);
        let nil = kinfo.nil_ptr;
        debug!("rebasing queue links by {:#x}", offset);
        for head in self.heads.iter_mut() {
            *head = reloc::relocate_addr(*head, nil, offset);
        }
        for slot in self.procs.slots_mut() {
            slot.next_ready = reloc::relocate_addr(slot.next_ready, nil, offset);
        }
        self.nil = nil;
        self.relocated = true;
        Ok(())
    }

    /// Follow one ready queue and collect the process numbers on it.
    ///
    /// Requires a relocated snapshot. Every link is checked against the
    /// local copy bounds and the hop count is capped at [`NR_SLOTS`], a
    /// corrupt queue yields an error instead of a wild read.
    pub fn walk_queue(&self, queue: usize) -> Result<Vec<i32>, RelocationError> {
        if !self.relocated {
            return Err(RelocationError::NotRelocated);
        }
        if queue >= NR_SCHED_QUEUES {
            return Err(RelocationError::BadQueue(queue));
        }
        let mut numbers = Vec::new();
        let mut addr = self.heads[queue];
        while addr != self.nil {
            if numbers.len() >= NR_SLOTS {
                return Err(RelocationError::QueueCycle(queue));
            }
            let index = self.slot_of_addr(addr)?;
            let slot = &self.procs.slots()[index];
            numbers.push(slot.nr);
            addr = slot.next_ready;
        }
        Ok(numbers)
    }

    fn slot_of_addr(&self, addr: u64) -> Result<usize, RelocationError> {
        let base = self.procs.local_base();
        let stride = mem::size_of::<RawProc>() as u64;
        let offset = addr.wrapping_sub(base);
        if offset % stride != 0 {
            return Err(RelocationError::BadAddress(addr));
        }
        let index = offset / stride;
        if index >= NR_SLOTS as u64 {
            return Err(RelocationError::BadAddress(addr));
        }
        Ok(index as usize)
    }

}

/// A private copy of the boot image table.
#[derive(Debug)]
pub struct ImageTable {
    entries: Box<[RawImageEntry]>,
}

impl ImageTable {

    /// Build a table from up to [`NR_BOOT_IMAGE`] entries.
    pub fn new(mut entries: Vec<RawImageEntry>) -> Self {
        entries.truncate(NR_BOOT_IMAGE);
        entries.resize_with(NR_BOOT_IMAGE, Default::default);
        ImageTable {
            entries: entries.into_boxed_slice(),
        }
    }

    /// All entries in table order.
    pub fn entries(&self) -> &[RawImageEntry] {
        &self.entries
    }

    /// Entries that are part of the boot image, with their indices.
    pub fn used(&self) -> impl Iterator<Item = (usize, &RawImageEntry)> {
        self.entries.iter().enumerate().filter(|(_, entry)| entry.in_use())
    }

}

/// A private copy of the interrupt hook table.
#[derive(Debug)]
pub struct IrqTable {
    hooks: Box<[RawIrqHook]>,
}

impl IrqTable {

    /// Build a table from up to [`NR_IRQ_HOOKS`] hooks.
    pub fn new(mut hooks: Vec<RawIrqHook>) -> Self {
        hooks.truncate(NR_IRQ_HOOKS);
        hooks.resize_with(NR_IRQ_HOOKS, RawIrqHook::unused);
        IrqTable {
            hooks: hooks.into_boxed_slice(),
        }
    }

    /// All hook entries in table order.
    pub fn hooks(&self) -> &[RawIrqHook] {
        &self.hooks
    }

}

/// A private copy of the free memory chunk list.
#[derive(Debug)]
pub struct MemChunkTable {
    chunks: Box<[RawMemChunk]>,
}

impl MemChunkTable {

    /// Build a list from up to [`NR_MEM_CHUNKS`] chunks.
    pub fn new(mut chunks: Vec<RawMemChunk>) -> Self {
        chunks.truncate(NR_MEM_CHUNKS);
        chunks.resize_with(NR_MEM_CHUNKS, Default::default);
        MemChunkTable {
            chunks: chunks.into_boxed_slice(),
        }
    }

    /// All list entries in order.
    pub fn chunks(&self) -> &[RawMemChunk] {
        &self.chunks
    }

    /// Total clicks across the non-empty chunks.
    pub fn total_clicks(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.size).sum()
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    fn stride() -> u64 {
        mem::size_of::<RawProc>() as u64
    }

    #[test]
    fn records_are_padding_free() {
        assert_eq!(mem::size_of::<RawProc>(), 128);
        assert_eq!(mem::size_of::<KernelInfo>(), 120);
        assert_eq!(mem::size_of::<Machine>(), 24);
        assert_eq!(mem::size_of::<RawImageEntry>(), 56);
        assert_eq!(mem::size_of::<RawIrqHook>(), 16);
        assert_eq!(mem::size_of::<RawMemChunk>(), 16);
    }

    #[test]
    fn proc_table_pads_to_capacity() {
        let table = ProcTable::new(vec![
            RawProc::new(-8, "clock", CLASS_TASK, 0),
            RawProc::new(0, "mm", CLASS_SERVER, 3),
        ]);
        assert_eq!(table.slots().len(), NR_SLOTS);
        assert_eq!(table.occupied().count(), 2);
        assert!(!table.slots()[2].in_use());
    }

    #[test]
    fn name_resolution() {
        let table = ProcTable::new(vec![
            RawProc::new(-8, "clock", CLASS_TASK, 0),
            RawProc::new(3, "init", CLASS_USER, 6),
        ]);
        assert_eq!(table.name_of(ANY_PROC), "ANY");
        assert_eq!(table.name_of(NONE_PROC), "NONE");
        assert_eq!(table.name_of(-8), "clock");
        assert_eq!(table.name_of(3), "init");
        assert_eq!(table.name_of(42), "??");
    }

    fn linked_snapshot(kernel_base: u64, nil: u64) -> (SchedSnapshot, KernelInfo) {
        // queue 2 holds slot 5 then slot 9
        let mut slots = vec![RawProc::free(); NR_SLOTS];
        slots[5] = RawProc::new(-3, "tty", CLASS_TASK, 2);
        slots[5].next_ready = kernel_base + 9 * stride();
        slots[9] = RawProc::new(1, "fs", CLASS_SERVER, 2);
        slots[9].next_ready = nil;
        let mut heads = [nil; NR_SCHED_QUEUES];
        heads[2] = kernel_base + 5 * stride();
        let snapshot = SchedSnapshot::new(ProcTable::new(slots), heads);
        let kinfo = KernelInfo {
            proc_addr: kernel_base,
            nil_ptr: nil,
            ..Default::default()
        };
        (snapshot, kinfo)
    }

    #[test]
    fn relocate_then_walk() {
        let kernel_base = 0xffff_8000_0020_0000;
        let (mut snapshot, kinfo) = linked_snapshot(kernel_base, 0);
        snapshot.relocate(&kinfo).unwrap();

        let local = snapshot.procs().local_base();
        assert_eq!(snapshot.heads()[2], local + 5 * stride());
        assert_eq!(snapshot.walk_queue(2).unwrap(), vec![-3, 1]);
        assert_eq!(snapshot.walk_queue(0).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn sentinel_survives_relocation() {
        let nil = 0x1111_2222_3333_4444;
        let (mut snapshot, kinfo) = linked_snapshot(0x0020_0000, nil);
        snapshot.relocate(&kinfo).unwrap();

        assert_eq!(snapshot.heads()[0], nil);
        assert_eq!(snapshot.walk_queue(2).unwrap(), vec![-3, 1]);
    }

    #[test]
    fn relocating_twice_fails() {
        let (mut snapshot, kinfo) = linked_snapshot(0x0020_0000, 0);
        snapshot.relocate(&kinfo).unwrap();
        assert_eq!(snapshot.relocate(&kinfo), Err(RelocationError::AlreadyRelocated));
    }

    #[test]
    fn walking_before_relocation_fails() {
        let (snapshot, _) = linked_snapshot(0x0020_0000, 0);
        assert_eq!(snapshot.walk_queue(2), Err(RelocationError::NotRelocated));
    }

    #[test]
    fn bad_queue_index() {
        let (mut snapshot, kinfo) = linked_snapshot(0x0020_0000, 0);
        snapshot.relocate(&kinfo).unwrap();
        assert_eq!(snapshot.walk_queue(NR_SCHED_QUEUES), Err(RelocationError::BadQueue(NR_SCHED_QUEUES)));
    }

    #[test]
    fn misaligned_link_is_rejected() {
        let kernel_base = 0x0020_0000;
        let mut slots = vec![RawProc::free(); NR_SLOTS];
        slots[5] = RawProc::new(-3, "tty", CLASS_TASK, 2);
        slots[5].next_ready = kernel_base + 9 * stride() + 4;
        let mut heads = [0; NR_SCHED_QUEUES];
        heads[2] = kernel_base + 5 * stride();
        let mut snapshot = SchedSnapshot::new(ProcTable::new(slots), heads);
        let kinfo = KernelInfo {
            proc_addr: kernel_base,
            nil_ptr: 0,
            ..Default::default()
        };
        snapshot.relocate(&kinfo).unwrap();
        let bad = snapshot.procs().local_base() + 9 * stride() + 4;
        assert_eq!(snapshot.walk_queue(2), Err(RelocationError::BadAddress(bad)));
    }

    #[test]
    fn out_of_table_link_is_rejected() {
        let kernel_base = 0x0020_0000;
        let mut slots = vec![RawProc::free(); NR_SLOTS];
        slots[5] = RawProc::new(-3, "tty", CLASS_TASK, 2);
        slots[5].next_ready = kernel_base + NR_SLOTS as u64 * stride();
        let mut heads = [0; NR_SCHED_QUEUES];
        heads[2] = kernel_base + 5 * stride();
        let mut snapshot = SchedSnapshot::new(ProcTable::new(slots), heads);
        let kinfo = KernelInfo {
            proc_addr: kernel_base,
            nil_ptr: 0,
            ..Default::default()
        };
        snapshot.relocate(&kinfo).unwrap();
        match snapshot.walk_queue(2) {
            Err(RelocationError::BadAddress(_)) => (),
            other => panic!("expected a bad address, got {:?}", other),
        }
    }

    #[test]
    fn queue_cycle_is_bounded() {
        let kernel_base = 0x0020_0000;
        let mut slots = vec![RawProc::free(); NR_SLOTS];
        slots[5] = RawProc::new(-3, "tty", CLASS_TASK, 2);
        slots[5].next_ready = kernel_base + 9 * stride();
        slots[9] = RawProc::new(1, "fs", CLASS_SERVER, 2);
        slots[9].next_ready = kernel_base + 5 * stride();
        let mut heads = [0; NR_SCHED_QUEUES];
        heads[2] = kernel_base + 5 * stride();
        let mut snapshot = SchedSnapshot::new(ProcTable::new(slots), heads);
        let kinfo = KernelInfo {
            proc_addr: kernel_base,
            nil_ptr: 0,
            ..Default::default()
        };
        snapshot.relocate(&kinfo).unwrap();
        assert_eq!(snapshot.walk_queue(2), Err(RelocationError::QueueCycle(2)));
    }

    #[test]
    fn click_conversion_rounds() {
        assert_eq!(click_to_kb(0), 0);
        assert_eq!(click_to_kb(1), 4);
        assert_eq!(click_to_kb(256), 1024);
    }

}
