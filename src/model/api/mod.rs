//! API-friendly types: what is sent to and received from clients.

pub mod auth;
pub mod candidate;
pub mod ledger;
pub mod phase;
pub mod vote;
