//! The append-only, hash-chained vote ledger.
//!
//! Every entry's hash covers its predecessor's hash, so rewriting, reordering or
//! deleting a past entry breaks the chain for everything after it.

mod entry;
mod hash;
mod verify;

pub use entry::{ledger_timestamp, LedgerEntry, TIMESTAMP_FORMAT};
pub use hash::{ChainHash, HASH_HEX_LEN};
pub use verify::{reconcile_tallies, verify_chain, ChainVerdict};

#[cfg(test)]
pub use entry::examples;
