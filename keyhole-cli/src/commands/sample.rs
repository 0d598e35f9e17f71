use clap::Clap;
use color_eyre::Report;

use keyhole_core::tables::{
    KernelInfo, RawImageEntry, RawIrqHook, RawProc, RawSegment, ANY_PROC, CLASS_IDLE,
    CLASS_SERVER, CLASS_SYSTEM, CLASS_TASK, CLASS_USER, F_RECEIVING, IRQ_REENABLE, PARAMS_BUF,
};
use keyhole_image::ImageBuilder;

use crate::helpers;

/// Write a small sample state image.
#[derive(Clap, Debug)]
pub(crate) struct Sample {
    /// Output path
    #[clap(parse(from_os_str))]
    pub path: std::path::PathBuf,
}

impl Sample {

    pub(crate) fn run(&self) -> Result<(), Report> {
        let progress = helpers::start();
        let progress = progress.enter("Building sample image");

        progress.single("Populating kernel tables");
        let builder = sample_image();

        progress.single(format!("Writing {}", self.path.display()));
        builder.write_to(&self.path)?;
        Ok(())
    }

}

fn seg(vir: u32, phys: u32, len: u32) -> RawSegment {
    RawSegment { vir, phys, len }
}

fn waiting(mut slot: RawProc, getfrom: i32) -> RawProc {
    slot.flags |= F_RECEIVING;
    slot.getfrom = getfrom;
    slot
}

fn boot_entry(name: &str, nr: i32, class: u32, queue: u32, pc: u64, stack: u64) -> RawImageEntry {
    let mut entry = RawImageEntry {
        entry_pc: pc,
        stack_size: stack,
        sendmask: !0,
        nr,
        class,
        queue,
        ..Default::default()
    };
    for (dst, src) in entry.name.iter_mut().zip(name.bytes()) {
        *dst = src;
    }
    entry
}

/// A small machine mid-boot: eight tasks, three servers, three user
/// processes, a handful of them ready.
fn sample_image() -> ImageBuilder {
    let mut kinfo = KernelInfo {
        code_base: 0x0000_0000_0010_0000,
        code_size: 0x0002_4000,
        data_base: 0x0000_0000_0013_0000,
        data_size: 0x0001_8000,
        proc_addr: 0xffff_8000_0020_0000,
        nil_ptr: 0,
        kmem_base: 0x0000_0000_0014_8000,
        kmem_size: 0x0008_0000,
        bootdev_base: 0x0000_0000_0060_0000,
        bootdev_size: 0x0014_0000,
        params_base: 0x0000_0000_0009_0000,
        params_size: PARAMS_BUF as u64,
        nr_procs: 56,
        nr_tasks: 8,
        ..Default::default()
    };
    kinfo.release[..3].copy_from_slice(b"2.0");
    kinfo.version[..1].copy_from_slice(b"4");

    let mut builder = ImageBuilder::new(kinfo);
    builder.machine.pc_at = 1;
    builder.machine.processor = 586;
    builder.machine.protected = 1;
    builder.machine.vdu_vga = 1;

    // kernel tasks
    let mut clock = RawProc::new(-8, "clock", CLASS_TASK, 0);
    clock.pc = 0x10_2a40;
    clock.sp = 0x14_9f00;
    clock.sys_time = 1842;
    clock.sendmask = !0;
    builder.set_proc(0, clock);

    let mut tty = RawProc::new(-7, "tty", CLASS_TASK, 0);
    tty.pc = 0x10_5118;
    tty.sp = 0x14_9300;
    tty.sys_time = 377;
    tty.sendmask = !0;
    builder.set_proc(1, tty);

    builder.set_proc(2, waiting(RawProc::new(-6, "disk", CLASS_TASK, 0), ANY_PROC));
    builder.set_proc(3, waiting(RawProc::new(-5, "net", CLASS_TASK, 0), ANY_PROC));
    builder.set_proc(4, waiting(RawProc::new(-4, "memory", CLASS_TASK, 0), ANY_PROC));
    builder.set_proc(5, waiting(RawProc::new(-3, "printer", CLASS_TASK, 0), ANY_PROC));
    builder.set_proc(6, waiting(RawProc::new(-2, "system", CLASS_SYSTEM, 0), ANY_PROC));

    let mut idle = RawProc::new(-1, "idle", CLASS_IDLE, 7);
    idle.user_time = 52_114;
    builder.set_proc(7, idle);

    // servers
    let mut mm = RawProc::new(0, "mm", CLASS_SERVER, 3);
    mm.pc = 0x3a62;
    mm.sp = 0xf_fb20;
    mm.user_time = 12;
    mm.sys_time = 48;
    mm.sendmask = 0xffff;
    mm.memmap = [seg(0, 0x120, 6), seg(6, 0x126, 0x14), seg(0x3f0, 0x136, 4)];
    builder.set_proc(8, mm);

    let mut fs = RawProc::new(1, "fs", CLASS_SERVER, 3);
    fs.pc = 0x51b8;
    fs.sp = 0xf_f6a0;
    fs.user_time = 30;
    fs.sys_time = 112;
    fs.sendmask = 0xffff;
    fs.memmap = [seg(0, 0x13a, 0xb), seg(0xb, 0x145, 0x5e), seg(0x3e8, 0x1a3, 8)];
    builder.set_proc(9, fs);

    let mut is = waiting(RawProc::new(2, "is", CLASS_SERVER, 3), ANY_PROC);
    is.sendmask = 0xffff;
    is.memmap = [seg(0, 0x1ab, 4), seg(4, 0x1af, 0xc), seg(0x3f8, 0x1bb, 2)];
    builder.set_proc(10, is);

    // user processes
    let mut init = waiting(RawProc::new(3, "init", CLASS_USER, 6), ANY_PROC);
    init.sendmask = 1 << 8 | 1 << 9;
    init.memmap = [seg(0, 0x1bd, 3), seg(3, 0x1c0, 6), seg(0x3fc, 0x1c6, 1)];
    builder.set_proc(11, init);

    let mut sh = RawProc::new(4, "sh", CLASS_USER, 6);
    sh.pc = 0x1f2e;
    sh.sp = 0xf_fd80;
    sh.user_time = 8;
    sh.sys_time = 3;
    sh.sendmask = 1 << 8 | 1 << 9;
    sh.memmap = [seg(0, 0x1c7, 0x10), seg(0x10, 0x1d7, 0x22), seg(0x3e0, 0x1f9, 6)];
    builder.set_proc(12, sh);

    builder.set_proc(13, waiting(RawProc::new(5, "getty", CLASS_USER, 6), -7));

    builder.link_ready_queue(0, &[0, 1]);
    builder.link_ready_queue(3, &[8, 9]);
    builder.link_ready_queue(6, &[12]);
    builder.link_ready_queue(7, &[7]);

    for (name, nr, class, queue, pc, stack) in &[
        ("clock", -8, CLASS_TASK, 0, 0x10_2a00u64, 0x800u64),
        ("tty", -7, CLASS_TASK, 0, 0x10_5000, 0x800),
        ("disk", -6, CLASS_TASK, 0, 0x10_7c00, 0x800),
        ("net", -5, CLASS_TASK, 0, 0x10_9400, 0x800),
        ("memory", -4, CLASS_TASK, 0, 0x10_a200, 0x800),
        ("printer", -3, CLASS_TASK, 0, 0x10_b000, 0x800),
        ("system", -2, CLASS_SYSTEM, 0, 0x10_0400, 0x1000),
        ("idle", -1, CLASS_IDLE, 7, 0x10_0200, 0x200),
        ("mm", 0, CLASS_SERVER, 3, 0x3a00, 0x1000),
        ("fs", 1, CLASS_SERVER, 3, 0x5100, 0x1000),
        ("is", 2, CLASS_SERVER, 3, 0x2200, 0x1000),
        ("init", 3, CLASS_USER, 6, 0x1000, 0x400),
    ] {
        builder.add_image_entry(boot_entry(name, *nr, *class, *queue, *pc, *stack));
    }

    builder.add_irq_hook(RawIrqHook { id: 1, owner: -8, irq: 0, policy: IRQ_REENABLE });
    builder.add_irq_hook(RawIrqHook { id: 2, owner: -7, irq: 1, policy: 0 });
    builder.add_irq_hook(RawIrqHook { id: 3, owner: -5, irq: 3, policy: IRQ_REENABLE });
    builder.add_irq_hook(RawIrqHook { id: 4, owner: -6, irq: 14, policy: 0 });

    builder.add_mem_chunk(0x800, 0x9f);
    builder.add_mem_chunk(0x1000, 0x3c00);

    builder.append_log("keyhole 2.0.4 boot\n");
    builder.append_log("592 kb base memory, 61440 kb extended\n");
    builder.append_log("clock: tick rate 60 hz\n");
    builder.append_log("fs: root device 9,4 mounted\n");
    builder.append_log("init: starting getty on tty0\n");

    builder.set_param("rootdev", "904");
    builder.set_param("ramimagedev", "904");
    builder.set_param("ramsize", "0");
    builder.set_param("processor", "586");
    builder.set_param("memory", "800:9f,1000:3c00");

    builder
}
