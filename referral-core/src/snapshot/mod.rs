//! Snapshot Cache
//!
//! Writes full earnings snapshots after each live computation and screens
//! cached rows before they are served.

mod writer;

pub use writer::*;
