//! Types as stored by the election store.

pub mod admin;
pub mod candidate;
pub mod voter;
