use std::collections::HashSet;
use std::mem;

use keyhole_core::query::{InfoKind, KernelQuery, QueryError};
use keyhole_core::ring::MessageRing;
use keyhole_core::tables::{
    ImageTable, IrqTable, KernelInfo, Machine, MemChunkTable, ProcTable, RawImageEntry,
    RawIrqHook, RawMemChunk, RawProc, SchedSnapshot, CLASS_SERVER, CLASS_TASK, CLASS_USER,
    IRQ_REENABLE, KMESG_BUF, NR_SCHED_QUEUES, NR_SLOTS,
};

/// Status code the scripted source fails with.
pub const E_REFUSED: i32 = -5;

/// Scriptable kernel state source.
///
/// Hands out fresh copies built from its public fields at every call,
/// the way a real kernel fills a destination buffer. Kinds listed in
/// `refuse` fail with [`E_REFUSED`].
pub struct TestQuery {
    pub slots: Vec<RawProc>,
    pub heads: [u64; NR_SCHED_QUEUES],
    pub kinfo: KernelInfo,
    pub machine: Machine,
    pub image: Vec<RawImageEntry>,
    pub hooks: Vec<RawIrqHook>,
    pub chunks: Vec<RawMemChunk>,
    pub log: MessageRing,
    pub params: Vec<u8>,
    pub refuse: HashSet<InfoKind>,
}

impl TestQuery {

    /// An empty kernel, every slot free and every table empty.
    pub fn new() -> Self {
        TestQuery {
            slots: vec![RawProc::free(); NR_SLOTS],
            heads: [0; NR_SCHED_QUEUES],
            kinfo: KernelInfo::default(),
            machine: Machine::default(),
            image: Vec::new(),
            hooks: Vec::new(),
            chunks: Vec::new(),
            log: MessageRing::new(KMESG_BUF),
            params: Vec::new(),
            refuse: HashSet::new(),
        }
    }

    fn check(&self, kind: InfoKind) -> Result<(), QueryError> {
        if self.refuse.contains(&kind) {
            Err(QueryError::Refused(kind, E_REFUSED))
        } else {
            Ok(())
        }
    }

}

impl KernelQuery for TestQuery {

    fn get_proc_table(&self) -> Result<ProcTable, QueryError> {
        self.check(InfoKind::ProcTable)?;
        Ok(ProcTable::new(self.slots.clone()))
    }

    fn get_sched_info(&self) -> Result<SchedSnapshot, QueryError> {
        self.check(InfoKind::SchedInfo)?;
        Ok(SchedSnapshot::new(ProcTable::new(self.slots.clone()), self.heads))
    }

    fn get_image_table(&self) -> Result<ImageTable, QueryError> {
        self.check(InfoKind::BootImage)?;
        Ok(ImageTable::new(self.image.clone()))
    }

    fn get_irq_hooks(&self) -> Result<IrqTable, QueryError> {
        self.check(InfoKind::IrqHooks)?;
        Ok(IrqTable::new(self.hooks.clone()))
    }

    fn get_kernel_info(&self) -> Result<KernelInfo, QueryError> {
        self.check(InfoKind::KernelInfo)?;
        Ok(self.kinfo)
    }

    fn get_machine(&self) -> Result<Machine, QueryError> {
        self.check(InfoKind::Machine)?;
        Ok(self.machine)
    }

    fn get_mem_chunks(&self) -> Result<MemChunkTable, QueryError> {
        self.check(InfoKind::MemChunks)?;
        Ok(MemChunkTable::new(self.chunks.clone()))
    }

    fn get_mon_params(&self) -> Result<Vec<u8>, QueryError> {
        self.check(InfoKind::BootParams)?;
        Ok(self.params.clone())
    }

    fn get_kernel_log(&self) -> Result<MessageRing, QueryError> {
        self.check(InfoKind::KernelLog)?;
        Ok(self.log.clone())
    }

}

/// A small linked kernel scene shared by the dump tests.
///
/// Slots 0 and 1 hold tasks chained on queue 0, slot 9 a server alone
/// on queue 3, slot 12 a user process that is ready on queue 6 as well.
pub fn sample_kernel() -> TestQuery {
    let mut query = TestQuery::new();
    let kernel_base = 0xffff_8000_0020_0000;
    let stride = mem::size_of::<RawProc>() as u64;

    query.kinfo.proc_addr = kernel_base;
    query.kinfo.nil_ptr = 0;
    query.kinfo.nr_tasks = 8;
    query.kinfo.nr_procs = 56;
    query.kinfo.code_base = 0x10_0000;
    query.kinfo.code_size = 0x2_4000;
    query.kinfo.release[..3].copy_from_slice(b"2.0");
    query.kinfo.version[..1].copy_from_slice(b"4");
    query.machine.processor = 586;
    query.machine.protected = 1;
    query.machine.pc_at = 1;
    query.machine.vdu_vga = 1;

    query.slots[0] = RawProc::new(-8, "clock", CLASS_TASK, 0);
    query.slots[1] = RawProc::new(-7, "tty", CLASS_TASK, 0);
    query.slots[9] = RawProc::new(1, "fs", CLASS_SERVER, 3);
    query.slots[12] = RawProc::new(4, "sh", CLASS_USER, 6);

    // clock may message tty and fs, tty only fs
    query.slots[0].sendmask = 1 << 1 | 1 << 9;
    query.slots[1].sendmask = 1 << 9;

    query.slots[0].next_ready = kernel_base + stride;
    query.slots[1].next_ready = 0;
    query.slots[9].next_ready = 0;
    query.slots[12].next_ready = 0;
    query.heads[0] = kernel_base;
    query.heads[3] = kernel_base + 9 * stride;
    query.heads[6] = kernel_base + 12 * stride;

    let mut entry = RawImageEntry {
        nr: -8,
        class: CLASS_TASK,
        stack_size: 0x800,
        ..Default::default()
    };
    entry.name[..5].copy_from_slice(b"clock");
    query.image.push(entry);

    query.hooks.push(RawIrqHook {
        id: 1,
        owner: -8,
        irq: 0,
        policy: IRQ_REENABLE,
    });
    query.hooks.push(RawIrqHook {
        id: 2,
        owner: -7,
        irq: 1,
        policy: 0,
    });

    query.chunks.push(RawMemChunk { base: 0x800, size: 0x9f });
    query.chunks.push(RawMemChunk { base: 0x1000, size: 0x3c00 });

    query.log.append(b"keyhole test kernel\n");
    query.log.append(b"boot complete\n");
    query.params.extend_from_slice(b"rootdev=904\0memory=64M\0");
    query
}
