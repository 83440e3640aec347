//! Speaker availability workflow.
//!
//! Two states, cycling `available -> scheduled -> available`. Scheduling
//! stamps the acting user as locker; releasing clears date, time and locker.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::model::{required, Availability, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityState {
    Available,
    Scheduled,
}

impl std::fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityState::Available => write!(f, "available"),
            AvailabilityState::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl Availability {
    pub fn state(&self) -> AvailabilityState {
        match self {
            Availability::Available => AvailabilityState::Available,
            Availability::Scheduled { .. } => AvailabilityState::Scheduled,
        }
    }
}

/// Validate an availability transition is allowed.
pub fn validate_transition(from: AvailabilityState, to: AvailabilityState) -> Result<()> {
    let valid = match from {
        AvailabilityState::Available => to == AvailabilityState::Scheduled,
        AvailabilityState::Scheduled => to == AvailabilityState::Available,
    };

    if valid {
        Ok(())
    } else {
        Err(DataError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Body of `PATCH /speakers/:id/availability`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_time: Option<String>,
    #[serde(default)]
    pub make_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl AvailabilityRequest {
    pub fn schedule(program_date: NaiveDate, program_time: NaiveTime) -> Self {
        Self {
            program_date: Some(program_date.format("%Y-%m-%d").to_string()),
            program_time: Some(program_time.format(crate::model::PROGRAM_TIME_FORMAT).to_string()),
            make_available: false,
            expected_version: None,
        }
    }

    pub fn release() -> Self {
        Self {
            make_available: true,
            ..Default::default()
        }
    }

    /// Resolve the request into a validated change. Date and time are ignored on release.
    pub fn to_change(&self) -> Result<AvailabilityChange> {
        if self.make_available {
            return Ok(AvailabilityChange::Release);
        }
        let date = required(self.program_date.as_deref(), "programDate")?;
        let time = required(self.program_time.as_deref(), "programTime")?;
        Ok(AvailabilityChange::Schedule {
            program_date: parse_program_date(date)?,
            program_time: parse_program_time(time)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityChange {
    Schedule {
        program_date: NaiveDate,
        program_time: NaiveTime,
    },
    Release,
}

impl AvailabilityChange {
    pub fn target(&self) -> AvailabilityState {
        match self {
            AvailabilityChange::Schedule { .. } => AvailabilityState::Scheduled,
            AvailabilityChange::Release => AvailabilityState::Available,
        }
    }

    /// Compute the next availability, rejecting the change if `current` does not permit it.
    pub fn apply(&self, current: &Availability, actor: &User) -> Result<Availability> {
        validate_transition(current.state(), self.target())?;
        Ok(match self {
            AvailabilityChange::Schedule {
                program_date,
                program_time,
            } => Availability::Scheduled {
                program_date: *program_date,
                program_time: *program_time,
                locked_by: actor.to_ref(),
            },
            AvailabilityChange::Release => Availability::Available,
        })
    }
}

/// Parse a program date. Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_program_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| DataError::InvalidDate(s.to_string()))
}

/// Parse a program time. Accepts `HH:MM` or `HH:MM:SS`; seconds are dropped.
pub fn parse_program_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
        .ok_or_else(|| DataError::InvalidTime(s.to_string()))
}

/// Client-side guard mirroring the date picker minimum.
pub fn check_not_in_past(program_date: NaiveDate, today: NaiveDate) -> Result<()> {
    if program_date < today {
        Err(DataError::DateInPast(program_date))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn actor() -> User {
        User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            role: Role::User,
            created_at: "2026-10-19T00:00:00Z".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_transitions() {
        assert!(validate_transition(AvailabilityState::Available, AvailabilityState::Scheduled).is_ok());
        assert!(validate_transition(AvailabilityState::Scheduled, AvailabilityState::Available).is_ok());
        assert!(validate_transition(AvailabilityState::Available, AvailabilityState::Available).is_err());
        assert!(validate_transition(AvailabilityState::Scheduled, AvailabilityState::Scheduled).is_err());
    }

    #[test]
    fn test_schedule_stamps_locker() {
        let change = AvailabilityRequest::schedule(
            date(2026, 11, 2),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        )
        .to_change()
        .unwrap();

        let next = change.apply(&Availability::Available, &actor()).unwrap();
        match next {
            Availability::Scheduled {
                program_date,
                program_time,
                locked_by,
            } => {
                assert_eq!(program_date, date(2026, 11, 2));
                assert_eq!(program_time.format("%H:%M").to_string(), "18:30");
                assert_eq!(locked_by.username, "alice");
            }
            Availability::Available => panic!("expected scheduled"),
        }
    }

    #[test]
    fn test_schedule_twice_is_rejected() {
        let change = AvailabilityRequest::schedule(
            date(2026, 11, 2),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .to_change()
        .unwrap();
        let scheduled = change.apply(&Availability::Available, &actor()).unwrap();

        let err = change.apply(&scheduled, &actor()).unwrap_err();
        assert_eq!(err.to_string(), "Speaker is already scheduled");
    }

    #[test]
    fn test_release_round_trip_restores_available() {
        let schedule = AvailabilityRequest::schedule(
            date(2026, 12, 1),
            NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
        )
        .to_change()
        .unwrap();
        let scheduled = schedule.apply(&Availability::Available, &actor()).unwrap();

        let released = AvailabilityChange::Release
            .apply(&scheduled, &actor())
            .unwrap();
        assert_eq!(released, Availability::Available);
    }

    #[test]
    fn test_release_of_available_is_rejected() {
        let result = AvailabilityChange::Release.apply(&Availability::Available, &actor());
        assert!(matches!(result, Err(DataError::InvalidTransition { .. })));
    }

    #[test]
    fn test_schedule_requires_date_and_time() {
        let missing_date = AvailabilityRequest {
            program_time: Some("10:00".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            missing_date.to_change(),
            Err(DataError::MissingField("programDate"))
        ));

        let missing_time = AvailabilityRequest {
            program_date: Some("2026-11-02".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            missing_time.to_change(),
            Err(DataError::MissingField("programTime"))
        ));
    }

    #[test]
    fn test_release_ignores_date_and_time() {
        let request = AvailabilityRequest {
            program_date: Some("not a date".to_string()),
            make_available: true,
            ..Default::default()
        };
        assert_eq!(request.to_change().unwrap(), AvailabilityChange::Release);
    }

    #[test]
    fn test_parse_program_date_formats() {
        assert_eq!(parse_program_date("2026-11-02").unwrap(), date(2026, 11, 2));
        assert_eq!(
            parse_program_date("2026-11-02T00:00:00.000Z").unwrap(),
            date(2026, 11, 2)
        );
        assert!(parse_program_date("02/11/2026").is_err());
    }

    #[test]
    fn test_parse_program_time_drops_seconds() {
        let t = parse_program_time("18:30:45").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert!(parse_program_time("25:00").is_err());
        assert!(parse_program_time("evening").is_err());
    }

    #[test]
    fn test_check_not_in_past() {
        let today = date(2026, 10, 19);
        assert!(check_not_in_past(today, today).is_ok());
        assert!(check_not_in_past(date(2026, 10, 20), today).is_ok());
        assert!(matches!(
            check_not_in_past(date(2026, 10, 18), today),
            Err(DataError::DateInPast(_))
        ));
    }
}
