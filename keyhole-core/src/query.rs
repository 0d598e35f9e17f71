//! Kernel state queries.
//!
//! The dump engine never reaches into kernel memory itself. Everything it
//! shows comes through [`KernelQuery`], one call per kind of state, each
//! call returning a fresh private copy the caller owns.

use thiserror::Error;

use crate::ring::MessageRing;
use crate::tables::{ImageTable, IrqTable, KernelInfo, Machine, MemChunkTable, ProcTable, SchedSnapshot};

/// The kinds of kernel state a [`KernelQuery`] source can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKind {
    /// Process table slots
    ProcTable,
    /// Process table plus ready-queue heads
    SchedInfo,
    /// Boot image table
    BootImage,
    /// Interrupt hook table
    IrqHooks,
    /// Kernel base addresses and sizes
    KernelInfo,
    /// Machine description
    Machine,
    /// Free memory chunk list
    MemChunks,
    /// Boot monitor parameter area
    BootParams,
    /// Kernel message ring
    KernelLog,
}

impl std::fmt::Display for InfoKind {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InfoKind::ProcTable => "process table",
            InfoKind::SchedInfo => "scheduling info",
            InfoKind::BootImage => "boot image",
            InfoKind::IrqHooks => "irq hooks",
            InfoKind::KernelInfo => "kernel info",
            InfoKind::Machine => "machine info",
            InfoKind::MemChunks => "memory chunks",
            InfoKind::BootParams => "boot parameters",
            InfoKind::KernelLog => "kernel log",
        };
        f.write_str(name)
    }

}

/// Failure reported by a [`KernelQuery`] source.
///
/// Both variants keep the status code handed back by the source so the
/// operator sees the same number a kernel debugger would.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The source refused or failed the query outright.
    #[error("{} query refused (status {})", .0, .1)]
    Refused(InfoKind, i32),

    /// The source answered, but the payload does not hold together.
    #[error("{} snapshot malformed (status {})", .0, .1)]
    Malformed(InfoKind, i32),
}

impl QueryError {

    /// Kind of state the failed query was after.
    pub fn kind(&self) -> InfoKind {
        match self {
            QueryError::Refused(kind, _) => *kind,
            QueryError::Malformed(kind, _) => *kind,
        }
    }

    /// Status code reported by the source.
    pub fn code(&self) -> i32 {
        match self {
            QueryError::Refused(_, code) => *code,
            QueryError::Malformed(_, code) => *code,
        }
    }

}

/// Source of kernel state snapshots.
///
/// Implementations copy state out at call time; two calls can disagree and
/// the engine re-fetches at every dump rather than caching. Methods take
/// `&self` so a source can be shared, but nothing here synchronizes the
/// underlying kernel.
pub trait KernelQuery {

    /// Copy out the whole process table.
    fn get_proc_table(&self) -> Result<ProcTable, QueryError>;

    /// Copy out the process table together with the ready-queue heads.
    ///
    /// The returned snapshot still holds kernel-space pointers, see
    /// [`SchedSnapshot::relocate`].
    fn get_sched_info(&self) -> Result<SchedSnapshot, QueryError>;

    /// Copy out the boot image table.
    fn get_image_table(&self) -> Result<ImageTable, QueryError>;

    /// Copy out the interrupt hook table.
    fn get_irq_hooks(&self) -> Result<IrqTable, QueryError>;

    /// Copy out kernel base addresses, sizes and the link sentinel.
    fn get_kernel_info(&self) -> Result<KernelInfo, QueryError>;

    /// Copy out the machine description.
    fn get_machine(&self) -> Result<Machine, QueryError>;

    /// Copy out the free memory chunk list.
    fn get_mem_chunks(&self) -> Result<MemChunkTable, QueryError>;

    /// Copy out the raw boot monitor parameter area.
    fn get_mon_params(&self) -> Result<Vec<u8>, QueryError>;

    /// Copy out the kernel message ring.
    fn get_kernel_log(&self) -> Result<MessageRing, QueryError>;

}
