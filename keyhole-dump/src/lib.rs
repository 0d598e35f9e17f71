#![warn(missing_docs)]

//! Function-key dump engine.
//!
//! Each function key is bound to one diagnostic dump over a kernel state
//! source. Dumps over large tables are paginated, repeated presses of the
//! same key walk the table page by page and wrap around at the end.

#[macro_use]
extern crate log;

pub mod dumper;
pub mod fkey;
pub mod page;
pub mod report;
