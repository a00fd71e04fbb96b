// src/feed/mod.rs
pub mod espn;
pub mod extract;
pub mod normalize;
pub mod types;

pub use espn::EspnActivityFeed;
pub use normalize::normalize_activities;
pub use types::{ActivityFeed, RawActivity, Transaction, TxKind};
