//! Controller job-status codes
//!
//! Every changed-device record carries the status of the last job the
//! controller ran for that device. Codes are documented with the Luup
//! requests: <http://wiki.micasaverde.com/index.php/Luup_Requests>

use std::fmt;

/// Job status reported for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    NoJob,
    WaitingToStart,
    InProgress,
    Error,
    Aborted,
    Done,
    WaitingForCallback,
    Requeue,
    PendingData,
    /// Any code the controller documents no meaning for
    Unknown(i32),
}

/// What the poll loop does with a record in a given job state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Job still running; look again next cycle
    Pending,
    /// Device state is settled; update it and fire callbacks
    Success,
    /// Job failed or the code is unrecognized; drop the record
    Failed,
}

impl JobState {
    pub const NO_JOB: i32 = -1;
    pub const WAITING_TO_START: i32 = 0;
    pub const IN_PROGRESS: i32 = 1;
    pub const ERROR: i32 = 2;
    pub const ABORTED: i32 = 3;
    pub const DONE: i32 = 4;
    pub const WAITING_FOR_CALLBACK: i32 = 5;
    pub const REQUEUE: i32 = 6;
    pub const PENDING_DATA: i32 = 7;

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::NO_JOB => JobState::NoJob,
            Self::WAITING_TO_START => JobState::WaitingToStart,
            Self::IN_PROGRESS => JobState::InProgress,
            Self::ERROR => JobState::Error,
            Self::ABORTED => JobState::Aborted,
            Self::DONE => JobState::Done,
            Self::WAITING_FOR_CALLBACK => JobState::WaitingForCallback,
            Self::REQUEUE => JobState::Requeue,
            Self::PENDING_DATA => JobState::PendingData,
            other => JobState::Unknown(other),
        }
    }

    /// A record without a `state` key means no job ran
    pub fn from_record_state(state: Option<i32>) -> Self {
        Self::from_code(state.unwrap_or(Self::NO_JOB))
    }

    pub fn code(self) -> i32 {
        match self {
            JobState::NoJob => Self::NO_JOB,
            JobState::WaitingToStart => Self::WAITING_TO_START,
            JobState::InProgress => Self::IN_PROGRESS,
            JobState::Error => Self::ERROR,
            JobState::Aborted => Self::ABORTED,
            JobState::Done => Self::DONE,
            JobState::WaitingForCallback => Self::WAITING_FOR_CALLBACK,
            JobState::Requeue => Self::REQUEUE,
            JobState::PendingData => Self::PENDING_DATA,
            JobState::Unknown(code) => code,
        }
    }

    pub fn outcome(self) -> JobOutcome {
        match self {
            JobState::WaitingToStart
            | JobState::InProgress
            | JobState::WaitingForCallback
            | JobState::Requeue
            | JobState::PendingData => JobOutcome::Pending,
            JobState::NoJob | JobState::Done => JobOutcome::Success,
            JobState::Error | JobState::Aborted | JobState::Unknown(_) => JobOutcome::Failed,
        }
    }
}

impl From<i32> for JobState {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in -1..=7 {
            let state = JobState::from_code(code);
            assert!(!matches!(state, JobState::Unknown(_)), "code {} should be known", code);
            assert_eq!(state.code(), code);
        }
    }

    #[test]
    fn test_missing_state_is_no_job() {
        assert_eq!(JobState::from_record_state(None), JobState::NoJob);
        assert_eq!(JobState::from_record_state(None).outcome(), JobOutcome::Success);
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(JobState::Done.outcome(), JobOutcome::Success);
        assert_eq!(JobState::InProgress.outcome(), JobOutcome::Pending);
        assert_eq!(JobState::Error.outcome(), JobOutcome::Failed);
        assert_eq!(JobState::Aborted.outcome(), JobOutcome::Failed);
    }

    #[test]
    fn test_display_is_numeric_code() {
        assert_eq!(JobState::NoJob.to_string(), "-1");
        assert_eq!(JobState::Unknown(99).to_string(), "99");
    }

    proptest! {
        #[test]
        fn prop_codes_outside_table_fail(code in any::<i32>().prop_filter("outside known range", |c| !(-1..=7).contains(c))) {
            let state = JobState::from_code(code);
            prop_assert_eq!(state, JobState::Unknown(code));
            prop_assert_eq!(state.outcome(), JobOutcome::Failed);
        }

        #[test]
        fn prop_code_is_preserved(code in any::<i32>()) {
            prop_assert_eq!(JobState::from_code(code).code(), code);
        }
    }
}
