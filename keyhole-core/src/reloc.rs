//! Pointer relocation.
//!
//! A copied kernel structure still holds addresses that are only valid in
//! kernel space. Because the copy preserves the kernel's record layout,
//! one uniform offset maps every embedded pointer onto the copy. The
//! sentinel value terminating linked lists carries no address and must
//! come through untouched.

use thiserror::Error;

/// Failure while rebasing or following copied kernel pointers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelocationError {
    /// The snapshot links were already rebased once.
    #[error("snapshot links already relocated")]
    AlreadyRelocated,

    /// The snapshot links still hold kernel addresses.
    #[error("snapshot links not relocated yet")]
    NotRelocated,

    /// A link does not land on a slot of the local copy.
    #[error("link address {:#x} points outside the local copy", .0)]
    BadAddress(u64),

    /// A queue walk exceeded the slot count, the links loop.
    #[error("ready queue {} does not terminate", .0)]
    QueueCycle(usize),

    /// No such scheduling queue.
    #[error("no scheduling queue {}", .0)]
    BadQueue(usize),
}

/// Offset that maps kernel addresses onto a local copy.
///
/// Computed as `local_base - kernel_base` in wrapping arithmetic, so a
/// copy living below the kernel image comes out negative.
pub fn relocation_offset(local_base: u64, kernel_base: u64) -> i64 {
    local_base.wrapping_sub(kernel_base) as i64
}

/// Apply a relocation offset to one address, preserving the sentinel.
pub fn relocate_addr(addr: u64, nil: u64, offset: i64) -> u64 {
    if addr == nil {
        addr
    } else {
        addr.wrapping_add(offset as u64)
    }
}
