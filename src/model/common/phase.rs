use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The configured boundaries of an election. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub voting_start: DateTime<Utc>,
    pub voting_end: DateTime<Utc>,
}

/// Where an election is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing is open yet.
    PreRegistration,
    /// Candidates may register.
    RegistrationOpen,
    /// Registration has closed; voting has not begun.
    CountdownToVoting,
    /// Voters may cast their vote.
    VotingOpen,
    /// Voting has closed; results may be published.
    Results,
}

impl Phase {
    /// The phase of an election with the given timeline at time `now`.
    pub fn at(now: DateTime<Utc>, timeline: &Timeline) -> Self {
        if now < timeline.registration_start {
            Self::PreRegistration
        } else if now <= timeline.registration_end {
            Self::RegistrationOpen
        } else if now < timeline.voting_start {
            Self::CountdownToVoting
        } else if now <= timeline.voting_end {
            Self::VotingOpen
        } else {
            Self::Results
        }
    }
}

impl Timeline {
    /// Check the boundaries are in chronological order.
    pub fn validate(&self) -> Result<(), String> {
        let ordered = self.registration_start <= self.registration_end
            && self.registration_end <= self.voting_start
            && self.voting_start <= self.voting_end;
        if ordered {
            Ok(())
        } else {
            Err(format!(
                "timeline out of order: registration {} to {}, voting {} to {}",
                self.registration_start, self.registration_end, self.voting_start, self.voting_end
            ))
        }
    }

    /// Time remaining until the next boundary worth counting down to: the end of
    /// registration while it is open, or the start of voting while waiting for it.
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Duration> {
        match Phase::at(now, self) {
            Phase::RegistrationOpen => Some(self.registration_end - now),
            Phase::CountdownToVoting => Some(self.voting_start - now),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_the_timeline() {
        let timeline = Timeline::example();
        for phase in [
            Phase::PreRegistration,
            Phase::RegistrationOpen,
            Phase::CountdownToVoting,
            Phase::VotingOpen,
            Phase::Results,
        ] {
            assert_eq!(Phase::at(Timeline::example_time_in(phase), &timeline), phase);
        }
    }

    #[test]
    fn boundaries_are_inclusive() {
        let timeline = Timeline::example();
        let second = Duration::seconds(1);
        assert_eq!(
            Phase::at(timeline.registration_start, &timeline),
            Phase::RegistrationOpen
        );
        assert_eq!(
            Phase::at(timeline.registration_end, &timeline),
            Phase::RegistrationOpen
        );
        assert_eq!(
            Phase::at(timeline.registration_end + second, &timeline),
            Phase::CountdownToVoting
        );
        assert_eq!(Phase::at(timeline.voting_start, &timeline), Phase::VotingOpen);
        assert_eq!(Phase::at(timeline.voting_end, &timeline), Phase::VotingOpen);
        assert_eq!(
            Phase::at(timeline.voting_end + second, &timeline),
            Phase::Results
        );
    }

    #[test]
    fn countdown_targets_next_boundary() {
        let timeline = Timeline::example();

        let now = timeline.registration_end - Duration::minutes(5);
        assert_eq!(timeline.countdown(now), Some(Duration::minutes(5)));

        let now = timeline.voting_start - Duration::hours(2);
        assert_eq!(timeline.countdown(now), Some(Duration::hours(2)));

        assert_eq!(
            timeline.countdown(Timeline::example_time_in(Phase::VotingOpen)),
            None
        );
        assert_eq!(
            timeline.countdown(Timeline::example_time_in(Phase::PreRegistration)),
            None
        );
    }

    #[test]
    fn out_of_order_timeline_is_rejected() {
        assert!(Timeline::example().validate().is_ok());

        let mut timeline = Timeline::example();
        timeline.voting_start = timeline.registration_start - Duration::days(1);
        assert!(timeline.validate().is_err());
    }
}
