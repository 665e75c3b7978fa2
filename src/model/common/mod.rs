//! Types shared between the database, API and core election models.

pub mod candidate;
pub mod clock;
pub mod phase;
