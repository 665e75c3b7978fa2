use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{is_duplicate_key_error, Coll};

/// ID of the counter that hands out candidate IDs.
pub const CANDIDATE_ID_COUNTER_ID: &str = "candidate_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Create a new `Counter` with the given ID, starting at the given value.
    pub fn new(id: impl Into<String>, start: u32) -> Self {
        Self {
            id: id.into(),
            next: start,
        }
    }

    /// Atomically retrieve the next value of the counter with the given ID.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::Persistence(format!("Failed to find counter with ID {id}")))?;
        Ok(counter.next)
    }
}

/// Create the candidate ID counter, unless it already exists.
///
/// This operation is idempotent.
pub async fn ensure_candidate_id_counter_exists(
    counters: &Coll<Counter>,
) -> std::result::Result<(), DbError> {
    debug!("Ensuring candidate ID counter exists");
    let counter = Counter::new(CANDIDATE_ID_COUNTER_ID, 1);
    match counters.insert_one(counter, None).await {
        Err(e) if !is_duplicate_key_error(&e) => Err(e),
        _ => Ok(()),
    }
}
