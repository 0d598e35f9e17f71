//! Slot table pagination.
//!
//! Dumps over fixed tables show a bounded number of rows per invocation
//! and pick up where they left off the next time the same dump fires.
//! The cursor is the only state carried between invocations, the table
//! itself is re-fetched every time.

/// Resume point of a paginated dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// The next invocation starts a fresh pass over the table.
    AtStart,
    /// The next invocation resumes scanning at this slot index.
    MidPass(usize),
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::AtStart
    }
}

/// Outcome of one paginated scan.
#[derive(Debug, PartialEq, Eq)]
pub struct Scan {
    /// Indices of the slots to render, in table order.
    pub rows: Vec<usize>,
    /// Cursor to persist for the next invocation.
    pub cursor: Cursor,
    /// Whether occupied slots remain beyond this page.
    pub more: bool,
}

/// Scan a slot table from a cursor, taking up to `budget` occupied slots.
///
/// Empty slots are skipped without counting against the budget. Once the
/// budget is spent the remainder of the table is peeked: if another
/// occupied slot exists the returned cursor resumes right after the last
/// emitted slot, otherwise the pass is complete and the cursor returns
/// to the start. A stale cursor pointing past the table also starts a
/// fresh pass. A `budget` of zero means no limit.
pub fn scan<T, F>(slots: &[T], occupied: F, cursor: Cursor, budget: usize) -> Scan
where
    F: Fn(&T) -> bool,
{
    let start = match cursor {
        Cursor::AtStart => 0,
        Cursor::MidPass(index) if index < slots.len() => index,
        Cursor::MidPass(_) => 0,
    };
    let mut rows = Vec::new();
    for (index, slot) in slots.iter().enumerate().skip(start) {
        if !occupied(slot) {
            continue;
        }
        rows.push(index);
        if rows.len() == budget {
            let resume = index + 1;
            if slots[resume..].iter().any(&occupied) {
                return Scan {
                    rows,
                    cursor: Cursor::MidPass(resume),
                    more: true,
                };
            }
            break;
        }
    }
    Scan {
        rows,
        cursor: Cursor::AtStart,
        more: false,
    }
}
