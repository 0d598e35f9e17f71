//! The dump engine.

use thiserror::Error;

use keyhole_core::cursor::{self, Cursor};
use keyhole_core::query::{KernelQuery, QueryError};
use keyhole_core::reloc::RelocationError;
use keyhole_core::ring::MessageRing;
use keyhole_core::tables::{
    click_to_kb, ProcTable, RawProc, CLASS_DRIVER, CLASS_IDLE, CLASS_SERVER, CLASS_SYSTEM,
    CLASS_TASK, F_RECEIVING, F_SENDING, IRQ_REENABLE, NR_SCHED_QUEUES, SCHED_QUEUE_NAMES,
    SEG_DATA, SEG_STACK, SEG_TEXT,
};

use crate::fkey::{DumpKind, Fkey};
use crate::page::Page;

/// Capacity of the local diagnostics ring in bytes.
pub const DIAG_BUF: usize = 1024;

// rows per page, tuned to a 25-line console
const PROC_ROWS: usize = 23;
const MAP_ROWS: usize = 23;
const MASK_ROWS: usize = 20;

/// Interrupt line names on classic AT hardware, blank where the line
/// has no conventional owner.
const IRQ_NAMES: [&str; 16] = [
    "clock", "keyboard", "cascade", "eth/rs232", "rs232", "xt_wini", "floppy", "printer", "", "",
    "", "", "", "", "at_wini_0", "at_wini_1",
];

/// Dump engine error.
#[derive(Debug, Error)]
pub enum DumpError {
    /// A kernel query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Copied kernel pointers could not be followed.
    #[error(transparent)]
    Relocation(#[from] RelocationError),
}

/// Function-key driven dump engine over a kernel state source.
///
/// Holds the pagination cursors of the three paginated dumps and the
/// local diagnostics ring. Everything else is fetched fresh from the
/// source at every invocation, so consecutive pages of one pass can
/// disagree if the kernel moved underneath, and a page is always
/// rendered from one single fetch.
pub struct Dumper<S> {
    source: S,
    proc_cursor: Cursor,
    map_cursor: Cursor,
    mask_cursor: Cursor,
    diag: MessageRing,
}

impl<S: KernelQuery> Dumper<S> {

    /// An engine over the given source, cursors at the start.
    pub fn new(source: S) -> Self {
        Dumper {
            source,
            proc_cursor: Cursor::AtStart,
            map_cursor: Cursor::AtStart,
            mask_cursor: Cursor::AtStart,
            diag: MessageRing::new(DIAG_BUF),
        }
    }

    /// The kernel state source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the kernel state source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Store one diagnostic message in the local ring.
    ///
    /// The ring keeps the most recent [`DIAG_BUF`] bytes, the F9 dump
    /// renders them.
    pub fn record_diagnostic(&mut self, text: &str) {
        self.diag.append(text.as_bytes());
    }

    /// Handle one function-key notification.
    ///
    /// Returns the rendered page, or `None` for codes outside the key
    /// range, keys without a binding and dumps that failed. Failures
    /// are logged, never fatal, and leave every pagination cursor as it
    /// was.
    pub fn on_key(&mut self, code: u32) -> Option<Page> {
        let key = match Fkey::from_code(code) {
            Some(key) => key,
            None => {
                info!("unrecognized trigger code {:#x}, ignoring", code);
                return None;
            }
        };
        let kind = match key.binding() {
            Some(kind) => kind,
            None => {
                info!("{} has no dump bound", key);
                return None;
            }
        };
        debug!("{} triggers a {} dump", key, kind);
        match self.run(kind) {
            Ok(page) => Some(page),
            Err(err) => {
                warn!("{} dump failed: {}", kind, err);
                None
            }
        }
    }

    /// Produce one dump, surfacing the failure to the caller.
    pub fn run(&mut self, kind: DumpKind) -> Result<Page, DumpError> {
        match kind {
            DumpKind::ProcTab => self.proc_tab(),
            DumpKind::MemMap => self.mem_map(),
            DumpKind::BootImage => self.boot_image(),
            DumpKind::SendMask => self.send_mask(),
            DumpKind::BootParams => self.boot_params(),
            DumpKind::IrqHooks => self.irq_hooks(),
            DumpKind::KernelLog => self.kernel_log(),
            DumpKind::Diagnostics => self.diagnostics(),
            DumpKind::KernelEnv => self.kernel_env(),
            DumpKind::MemChunks => self.mem_chunks(),
            DumpKind::SchedQueues => self.sched_queues(),
        }
    }

    fn proc_tab(&mut self) -> Result<Page, DumpError> {
        let table = self.source.get_proc_table()?;
        let scan = cursor::scan(table.slots(), RawProc::in_use, self.proc_cursor, PROC_ROWS);

        let mut page = Page::new("process table");
        page.push(format!(
            "{:>6} {:>3} {:>12} {:>12} {:>8} {:>8} {:>6} {:>6} {:>6} {:>4} {:<10} {}",
            "--nr--", "-q-", "-----pc-----", "-----sp-----", "--user--", "--sys---",
            "-text-", "-data-", "-size-", "-fl-", "-blocked--", "-name-"
        ));
        for &index in &scan.rows {
            page.push(proc_row(&table, &table.slots()[index]));
        }
        self.proc_cursor = scan.cursor;
        page.more = scan.more;
        Ok(page)
    }

    fn mem_map(&mut self) -> Result<Page, DumpError> {
        let table = self.source.get_proc_table()?;
        let scan = cursor::scan(table.slots(), RawProc::in_use, self.map_cursor, MAP_ROWS);

        let mut page = Page::new("process memory maps");
        page.push(format!(
            "{:>5} {:<10} {:>23} {:>23} {:>23} {:>6}",
            "-nr--", "-name-----", "---------text----------", "---------data----------",
            "---------stack---------", "-size-"
        ));
        for &index in &scan.rows {
            let slot = &table.slots()[index];
            let mut line = format!("{:>5} {:<10}", slot.nr, slot.name_str());
            for seg in &[SEG_TEXT, SEG_DATA, SEG_STACK] {
                let map = &slot.memmap[*seg];
                line.push_str(&format!(" {:>7x} {:>7x} {:>7x}", map.vir, map.phys, map.len));
            }
            line.push_str(&format!(" {:>5}K", click_to_kb(total_clicks(slot))));
            page.push(line);
        }
        self.map_cursor = scan.cursor;
        page.more = scan.more;
        Ok(page)
    }

    fn boot_image(&mut self) -> Result<Page, DumpError> {
        let table = self.source.get_image_table()?;

        let mut page = Page::new("boot image table");
        page.push(format!(
            "{:<12} {:>4} {:<7} {:>3} {:>12} {:>7} {:>16}",
            "-name-------", "-nr-", "-class-", "-q-", "---entry----", "-stack-", "----sendmask----"
        ));
        for (_, entry) in table.used() {
            page.push(format!(
                "{:<12} {:>4} {:<7} {:>3} {:>12x} {:>7} {:>16x}",
                entry.name_str(),
                entry.nr,
                class_name(entry.class),
                entry.queue,
                entry.entry_pc,
                entry.stack_size,
                entry.sendmask,
            ));
        }
        Ok(page)
    }

    fn send_mask(&mut self) -> Result<Page, DumpError> {
        let table = self.source.get_proc_table()?;
        let scan = cursor::scan(table.slots(), RawProc::in_use, self.mask_cursor, MASK_ROWS);

        // destination columns come from the same snapshot as the rows,
        // a page is internally consistent even if the kernel moved
        let dsts: Vec<usize> = table.occupied().map(|(index, _)| index).collect();

        let mut page = Page::new("send permission matrix");
        let mut header = format!("{:>6} {:<10} dst:", "-src--", "-name-----");
        for &dst in &dsts {
            header.push_str(&format!("{:>5}", table.slots()[dst].nr));
        }
        page.push(header);
        for &index in &scan.rows {
            let slot = &table.slots()[index];
            let mut line = format!(
                "{:>6} {:<10}     ",
                class_brackets(slot.class, slot.nr),
                slot.name_str()
            );
            for &dst in &dsts {
                let allowed = slot.sendmask >> dst & 1 == 1;
                line.push_str(if allowed { "    1" } else { "    ." });
            }
            page.push(line);
        }
        self.mask_cursor = scan.cursor;
        page.more = scan.more;
        Ok(page)
    }

    fn boot_params(&mut self) -> Result<Page, DumpError> {
        let params = self.source.get_mon_params()?;

        let mut page = Page::new("boot monitor parameters");
        for setting in params.split(|&b| b == 0) {
            if setting.is_empty() {
                continue;
            }
            page.push(String::from_utf8_lossy(setting).into_owned());
        }
        Ok(page)
    }

    fn irq_hooks(&mut self) -> Result<Page, DumpError> {
        let table = self.source.get_irq_hooks()?;

        let mut page = Page::new("interrupt hooks");
        page.push(format!(
            "{:>4} {:>4} {:<11} {:>7} {}",
            "-id-", "-irq", "-name------", "-owner-", "-policy-"
        ));
        let mut used = 0;
        for hook in table.hooks().iter().filter(|hook| hook.in_use()) {
            used += 1;
            page.push(format!(
                "{:>4} {:>4} {:<11} {:>7} {}",
                hook.id,
                hook.irq,
                irq_name(hook.irq),
                hook.owner,
                if hook.policy & IRQ_REENABLE != 0 { "reenable" } else { "oneshot" },
            ));
        }
        page.push(format!("{} of {} hooks in use", used, table.hooks().len()));
        Ok(page)
    }

    fn kernel_log(&mut self) -> Result<Page, DumpError> {
        let ring = self.source.get_kernel_log()?;

        let mut page = Page::new("kernel messages");
        for line in ring.extract_text().lines() {
            page.push(line.to_string());
        }
        Ok(page)
    }

    fn diagnostics(&mut self) -> Result<Page, DumpError> {
        let mut page = Page::new("diagnostics");
        for line in self.diag.extract_text().lines() {
            page.push(line.to_string());
        }
        Ok(page)
    }

    fn kernel_env(&mut self) -> Result<Page, DumpError> {
        let kinfo = self.source.get_kernel_info()?;
        let machine = self.source.get_machine()?;

        let mut page = Page::new("kernel environment");
        page.push(format!(
            "release {} version {}",
            kinfo.release_str(),
            kinfo.version_str()
        ));
        page.push(format!("{:<14} {:#12x} +{:#x}", "code", kinfo.code_base, kinfo.code_size));
        page.push(format!("{:<14} {:#12x} +{:#x}", "data", kinfo.data_base, kinfo.data_size));
        page.push(format!("{:<14} {:#12x} +{:#x}", "kernel memory", kinfo.kmem_base, kinfo.kmem_size));
        page.push(format!("{:<14} {:#12x} +{:#x}", "boot device", kinfo.bootdev_base, kinfo.bootdev_size));
        page.push(format!("{:<14} {:#12x} +{:#x}", "parameters", kinfo.params_base, kinfo.params_size));
        page.push(format!(
            "{:<14} {:#12x} ({} tasks, {} procs)",
            "process table", kinfo.proc_addr, kinfo.nr_tasks, kinfo.nr_procs
        ));
        page.push(format!(
            "processor {}, {}, {} bus",
            machine.processor,
            if machine.protected != 0 { "protected mode" } else { "real mode" },
            if machine.ps_mca != 0 { "MCA" } else if machine.pc_at != 0 { "AT" } else { "XT" },
        ));
        page.push(format!(
            "video {}",
            if machine.vdu_vga != 0 {
                "vga"
            } else if machine.vdu_ega != 0 {
                "ega"
            } else {
                "mono"
            }
        ));
        Ok(page)
    }

    fn mem_chunks(&mut self) -> Result<Page, DumpError> {
        let table = self.source.get_mem_chunks()?;

        let mut page = Page::new("free memory chunks");
        for (index, chunk) in table.chunks().iter().enumerate() {
            if chunk.size == 0 {
                continue;
            }
            page.push(format!(
                "chunk {}: base {:>8x}, size {:>8x} ({}K)",
                index,
                chunk.base,
                chunk.size,
                click_to_kb(chunk.size)
            ));
        }
        page.push(format!("total {}K free", click_to_kb(table.total_clicks())));
        Ok(page)
    }

    fn sched_queues(&mut self) -> Result<Page, DumpError> {
        let kinfo = self.source.get_kernel_info()?;
        let mut sched = self.source.get_sched_info()?;
        sched.relocate(&kinfo)?;

        let mut page = Page::new("scheduling queues");
        for queue in 0..NR_SCHED_QUEUES {
            let numbers = sched.walk_queue(queue)?;
            let list: Vec<String> = numbers.iter().map(|nr| nr.to_string()).collect();
            page.push(format!("{:>6}: {}", SCHED_QUEUE_NAMES[queue], list.join(", ")));
        }
        Ok(page)
    }

}

fn proc_row(table: &ProcTable, slot: &RawProc) -> String {
    let map = &slot.memmap;
    let text_clicks = map[SEG_TEXT].len as u64;
    let data_clicks = map[SEG_DATA].len as u64;
    format!(
        "{:>6} {:>3} {:>12x} {:>12x} {:>8} {:>8} {:>5}K {:>5}K {:>5}K {:>4x} {:<10} {}",
        class_brackets(slot.class, slot.nr),
        slot.queue,
        slot.pc,
        slot.sp,
        slot.user_time,
        slot.sys_time,
        click_to_kb(text_clicks),
        click_to_kb(data_clicks),
        click_to_kb(total_clicks(slot)),
        slot.flags,
        blocked_on(table, slot),
        slot.name_str(),
    )
}

// full image size: text plus everything from the data base up to the
// stack top, gaps included
fn total_clicks(slot: &RawProc) -> u64 {
    let map = &slot.memmap;
    let text = map[SEG_TEXT].len as u64;
    let stack_top = map[SEG_STACK].phys as u64 + map[SEG_STACK].len as u64;
    text + stack_top.saturating_sub(map[SEG_DATA].phys as u64)
}

fn class_brackets(class: u32, nr: i32) -> String {
    match class {
        CLASS_IDLE => format!("/{}/", nr),
        CLASS_TASK => format!("[{}]", nr),
        CLASS_SYSTEM => format!("<{}>", nr),
        CLASS_DRIVER => format!("{{{}}}", nr),
        CLASS_SERVER => format!("({})", nr),
        _ => format!(" {} ", nr),
    }
}

fn class_name(class: u32) -> &'static str {
    match class {
        CLASS_IDLE => "idle",
        CLASS_TASK => "task",
        CLASS_SYSTEM => "system",
        CLASS_DRIVER => "driver",
        CLASS_SERVER => "server",
        _ => "user",
    }
}

fn blocked_on(table: &ProcTable, slot: &RawProc) -> String {
    if slot.flags & F_RECEIVING != 0 {
        format!("r:{}", table.name_of(slot.getfrom))
    } else if slot.flags & F_SENDING != 0 {
        format!("s:{}", table.name_of(slot.sendto))
    } else {
        String::new()
    }
}

fn irq_name(irq: u32) -> String {
    match IRQ_NAMES.get(irq as usize) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("irq {}", irq),
    }
}
