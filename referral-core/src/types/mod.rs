//! Referral Core Types

mod common;
mod earnings;
mod leaderboard;
mod snapshot;
mod tree;
mod user;

pub use common::*;
pub use earnings::*;
pub use leaderboard::*;
pub use snapshot::*;
pub use tree::*;
pub use user::*;
