#![warn(missing_docs)]

//! Core of the Keyhole kernel introspection engine.
//!
//! Provides the query trait used to pull state out of a running kernel,
//! plus the snapshot containers and the algorithms (circular buffer
//! linearization, pointer relocation, cursor scans) the dump engine is
//! built on.

#[macro_use]
extern crate log;

pub mod cursor;
pub mod error;
pub mod query;
pub mod reloc;
pub mod ring;
pub mod tables;
