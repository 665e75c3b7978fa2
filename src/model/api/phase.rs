use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::phase::{Phase, Timeline};

/// Where the election currently stands, as reported to any visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDesc {
    pub phase: Phase,
    /// Whole seconds until the next boundary, if one is being counted down to.
    pub countdown_seconds: Option<i64>,
    pub timeline: Timeline,
}

impl PhaseDesc {
    pub fn at(now: DateTime<Utc>, timeline: &Timeline) -> Self {
        Self {
            phase: Phase::at(now, timeline),
            countdown_seconds: timeline.countdown(now).map(|left| left.num_seconds()),
            timeline: timeline.clone(),
        }
    }
}
