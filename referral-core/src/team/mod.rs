//! Team View
//!
//! Labeled per-level tree of a user's recruits for "my team" pages.

mod builder;

pub use builder::*;
