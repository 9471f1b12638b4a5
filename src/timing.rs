//! Attestation timing rules.
//!
//! The escrow contract only accepts an attestation while the block timestamp lies inside the
//! window for the attested outcome. The functions here mirror those interval checks exactly, so a
//! window approved off-chain is never rejected on-chain for timing reasons. Everything in this
//! module is pure.

use crate::constants::{COMPLETED_ATTESTATION_GRACE, SECONDS_PER_MINUTE};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Schedule parameters of a slot that the attestation windows derive from.
///
/// Callers guarantee `duration_mins > grace_mins`; the window math assumes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSchedule {
    /// Scheduled start, unix seconds.
    pub start_time: u64,
    /// Nominal session length in minutes.
    pub duration_mins: u64,
    /// Delay after start before a no-show is attestable, in minutes.
    pub grace_mins: u64,
    /// Minimum joint presence for a completed session, in minutes.
    pub min_overlap_mins: u64,
}

/// Instants bounding when each outcome may be attested. All bounds are inclusive unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationWindows {
    /// First instant a no-show may be attested.
    pub no_show_earliest: u64,
    /// Last instant a no-show may be attested.
    pub no_show_latest: u64,
    /// First instant a completed session may be attested.
    pub completed_earliest: u64,
    /// Last instant a completed session may be attested.
    pub completed_latest: u64,
}

impl AttestationWindows {
    /// Computes the windows for a slot schedule.
    ///
    /// Bounds saturate at `u64::MAX` instead of overflowing.
    pub fn new(schedule: &SlotSchedule) -> Self {
        let SlotSchedule { start_time, duration_mins, grace_mins, min_overlap_mins } = *schedule;
        let after = |mins: u64| start_time.saturating_add(mins.saturating_mul(SECONDS_PER_MINUTE));
        Self {
            no_show_earliest: after(grace_mins),
            no_show_latest: after(grace_mins.saturating_add(duration_mins)),
            completed_earliest: after(min_overlap_mins),
            completed_latest: after(duration_mins)
                .saturating_add(COMPLETED_ATTESTATION_GRACE.as_secs()),
        }
    }

    /// Returns the inclusive `(earliest, latest)` bounds for an outcome.
    pub fn bounds(&self, kind: OutcomeKind) -> (u64, u64) {
        match kind {
            OutcomeKind::NoShowHost | OutcomeKind::NoShowGuest => {
                (self.no_show_earliest, self.no_show_latest)
            }
            OutcomeKind::Completed => (self.completed_earliest, self.completed_latest),
        }
    }
}

/// Computes the attestation windows for a slot schedule.
pub fn attestation_windows(schedule: &SlotSchedule) -> AttestationWindows {
    AttestationWindows::new(schedule)
}

/// Outcomes whose attestation is governed by a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    /// The host did not show up.
    NoShowHost,
    /// The guest did not show up.
    NoShowGuest,
    /// The session took place.
    Completed,
}

impl OutcomeKind {
    /// All outcome kinds.
    pub const ALL: [Self; 3] = [Self::NoShowHost, Self::NoShowGuest, Self::Completed];

    /// Returns the kebab-case name of the outcome.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoShowHost => "no-show-host",
            Self::NoShowGuest => "no-show-guest",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeKind {
    type Err = UnknownOutcomeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownOutcomeKind(s.into()))
    }
}

/// Returned when parsing an unknown outcome kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outcome kind `{0}`, expected one of no-show-host, no-show-guest, completed")]
pub struct UnknownOutcomeKind(pub String);

/// Reasons an attestation falls outside its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TimingError {
    /// The no-show grace period has not elapsed yet.
    #[error("grace_not_over")]
    GraceNotOver,
    /// The minimum overlap cannot have been reached yet.
    #[error("overlap_not_met")]
    OverlapNotMet,
    /// The no-show window has closed.
    #[error("no_show_too_late")]
    NoShowTooLate,
    /// The completed window has closed.
    #[error("completed_too_late")]
    CompletedTooLate,
}

impl TimingError {
    /// All timing errors.
    pub const ALL: [Self; 4] =
        [Self::GraceNotOver, Self::OverlapNotMet, Self::NoShowTooLate, Self::CompletedTooLate];

    /// Returns the stable machine-readable code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GraceNotOver => "grace_not_over",
            Self::OverlapNotMet => "overlap_not_met",
            Self::NoShowTooLate => "no_show_too_late",
            Self::CompletedTooLate => "completed_too_late",
        }
    }

    /// How a scheduler should react to this error.
    pub const fn scheduler_timing(&self) -> SchedulerTiming {
        match self {
            Self::GraceNotOver | Self::OverlapNotMet => SchedulerTiming::NotDueYet,
            Self::NoShowTooLate | Self::CompletedTooLate => SchedulerTiming::WindowMissed,
        }
    }
}

impl FromStr for TimingError {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|err| err.as_str() == s).ok_or(())
    }
}

/// Scheduler-facing classification of a timing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerTiming {
    /// The window has not opened yet. Retry after a delay.
    NotDueYet,
    /// The window has permanently closed. Stop retrying.
    WindowMissed,
}

impl SchedulerTiming {
    /// Returns the snake_case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotDueYet => "not_due_yet",
            Self::WindowMissed => "window_missed",
        }
    }
}

impl fmt::Display for SchedulerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks whether `now` lies within the window for `kind`. Both bounds are inclusive.
pub fn validate_attestation_window(
    kind: OutcomeKind,
    now: u64,
    windows: &AttestationWindows,
) -> Result<(), TimingError> {
    let (earliest, latest) = windows.bounds(kind);
    let (too_early, too_late) = match kind {
        OutcomeKind::NoShowHost | OutcomeKind::NoShowGuest => {
            (TimingError::GraceNotOver, TimingError::NoShowTooLate)
        }
        OutcomeKind::Completed => (TimingError::OverlapNotMet, TimingError::CompletedTooLate),
    };

    if now < earliest {
        Err(too_early)
    } else if now > latest {
        Err(too_late)
    } else {
        Ok(())
    }
}

/// Maps a failure reason code onto a scheduler action.
///
/// Returns `None` for reasons that are not timing related, e.g. `booking_not_found`, which the
/// caller handles as a data problem.
pub fn classify_attestation_timing_for_scheduler(reason: &str) -> Option<SchedulerTiming> {
    reason.parse::<TimingError>().ok().map(|err| err.scheduler_timing())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: SlotSchedule = SlotSchedule {
        start_time: 1_700_000_000,
        duration_mins: 30,
        grace_mins: 5,
        min_overlap_mins: 10,
    };

    #[test]
    fn fixture_windows() {
        assert_eq!(
            attestation_windows(&FIXTURE),
            AttestationWindows {
                no_show_earliest: 1_700_000_300,
                no_show_latest: 1_700_002_100,
                completed_earliest: 1_700_000_600,
                completed_latest: 1_700_009_000,
            }
        );
    }

    #[test]
    fn far_future_schedule_saturates() {
        let schedule = SlotSchedule {
            start_time: u64::MAX - 100,
            duration_mins: 30,
            grace_mins: 5,
            min_overlap_mins: 1,
        };
        let w = AttestationWindows::new(&schedule);
        assert_eq!(w.no_show_earliest, u64::MAX);
        assert_eq!(w.no_show_latest, u64::MAX);
        assert_eq!(w.completed_earliest, u64::MAX - 40);
        assert_eq!(w.completed_latest, u64::MAX);
        assert_eq!(
            validate_attestation_window(OutcomeKind::Completed, u64::MAX - 41, &w),
            Err(TimingError::OverlapNotMet)
        );

        let w = AttestationWindows::new(&SlotSchedule { duration_mins: u64::MAX, ..schedule });
        assert_eq!(w.completed_latest, u64::MAX);
    }

    #[test]
    fn window_ordering() {
        for duration_mins in [1, 2, 15, 30, 60, 240] {
            for grace_mins in (0..duration_mins).step_by(3) {
                for min_overlap_mins in [0, 1, duration_mins / 2, duration_mins] {
                    let schedule = SlotSchedule {
                        start_time: 1_000,
                        duration_mins,
                        grace_mins,
                        min_overlap_mins,
                    };
                    let w = AttestationWindows::new(&schedule);
                    assert!(w.no_show_earliest <= w.no_show_latest, "{schedule:?}");
                    assert!(w.completed_earliest <= w.completed_latest, "{schedule:?}");
                    assert!(w.no_show_earliest < w.completed_latest, "{schedule:?}");
                }
            }
        }
    }

    #[test]
    fn no_show_bounds_are_inclusive() {
        let w = attestation_windows(&FIXTURE);
        for kind in [OutcomeKind::NoShowHost, OutcomeKind::NoShowGuest] {
            assert_eq!(
                validate_attestation_window(kind, w.no_show_earliest - 1, &w),
                Err(TimingError::GraceNotOver)
            );
            assert_eq!(validate_attestation_window(kind, w.no_show_earliest, &w), Ok(()));
            assert_eq!(validate_attestation_window(kind, w.no_show_latest, &w), Ok(()));
            assert_eq!(
                validate_attestation_window(kind, w.no_show_latest + 1, &w),
                Err(TimingError::NoShowTooLate)
            );
        }
    }

    #[test]
    fn completed_bounds_are_inclusive() {
        let w = attestation_windows(&FIXTURE);
        let kind = OutcomeKind::Completed;
        assert_eq!(
            validate_attestation_window(kind, w.completed_earliest - 1, &w),
            Err(TimingError::OverlapNotMet)
        );
        assert_eq!(validate_attestation_window(kind, w.completed_earliest, &w), Ok(()));
        assert_eq!(validate_attestation_window(kind, w.completed_latest, &w), Ok(()));
        assert_eq!(
            validate_attestation_window(kind, w.completed_latest + 1, &w),
            Err(TimingError::CompletedTooLate)
        );
    }

    #[test]
    fn completed_accepted_after_no_show_window_closes() {
        let w = attestation_windows(&FIXTURE);
        let now = w.no_show_latest + 60;
        assert_eq!(
            validate_attestation_window(OutcomeKind::NoShowGuest, now, &w),
            Err(TimingError::NoShowTooLate)
        );
        assert_eq!(validate_attestation_window(OutcomeKind::Completed, now, &w), Ok(()));
    }

    #[test]
    fn scheduler_classification() {
        assert_eq!(
            classify_attestation_timing_for_scheduler("grace_not_over"),
            Some(SchedulerTiming::NotDueYet)
        );
        assert_eq!(
            classify_attestation_timing_for_scheduler("overlap_not_met"),
            Some(SchedulerTiming::NotDueYet)
        );
        assert_eq!(
            classify_attestation_timing_for_scheduler("no_show_too_late"),
            Some(SchedulerTiming::WindowMissed)
        );
        assert_eq!(
            classify_attestation_timing_for_scheduler("completed_too_late"),
            Some(SchedulerTiming::WindowMissed)
        );
        assert_eq!(classify_attestation_timing_for_scheduler("booking_not_found"), None);
        assert_eq!(classify_attestation_timing_for_scheduler(""), None);
        assert_eq!(classify_attestation_timing_for_scheduler("GRACE_NOT_OVER"), None);
    }

    #[test]
    fn every_timing_error_is_classified() {
        for err in TimingError::ALL {
            assert_eq!(err.to_string(), err.as_str());
            assert_eq!(
                classify_attestation_timing_for_scheduler(&err.to_string()),
                Some(err.scheduler_timing())
            );
        }
    }

    #[test]
    fn outcome_kind_names() {
        for kind in OutcomeKind::ALL {
            assert_eq!(kind.as_str().parse::<OutcomeKind>(), Ok(kind));
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", kind.as_str())
            );
        }
        assert!("no_show_host".parse::<OutcomeKind>().is_err());
    }
}
