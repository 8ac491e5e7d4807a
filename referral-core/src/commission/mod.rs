//! Commission Engine
//!
//! Static per-tier rates and the pure count-to-earnings conversion.

mod calculator;
mod rates;

pub use calculator::*;
pub use rates::*;
