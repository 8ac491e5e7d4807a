//! Referrer Leaderboard
//!
//! Scoring and assembly of the platform-wide referrer listing.

mod listing;
mod scoring;

pub use listing::*;
pub use scoring::*;
