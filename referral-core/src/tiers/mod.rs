//! Tier Resolution
//!
//! Derives a user's level-1..n active identifier sets from the directory.

mod resolver;

pub use resolver::*;
