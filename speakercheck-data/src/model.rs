use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Role flag distinguishing admins from regular users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DataError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(DataError::InvalidRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}

/// The slice of a user embedded in other records (e.g. `lockedBy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub order: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    #[serde(rename = "_id")]
    pub id: String,
    pub page_id: String,
    pub name: String,
    pub area: String,
    pub phone_number: String,
    pub availability: Availability,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Availability of a speaker. Either fully available or scheduled with
/// date, time and the user who locked it; partial states are unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AvailabilityRecord", try_from = "AvailabilityRecord")]
pub enum Availability {
    Available,
    Scheduled {
        program_date: NaiveDate,
        program_time: NaiveTime,
        locked_by: UserRef,
    },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Flat wire shape of [`Availability`]: `{isAvailable, programDate?, programTime?, lockedBy?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<UserRef>,
}

pub const PROGRAM_TIME_FORMAT: &str = "%H:%M";

impl From<Availability> for AvailabilityRecord {
    fn from(availability: Availability) -> Self {
        match availability {
            Availability::Available => AvailabilityRecord {
                is_available: true,
                ..Default::default()
            },
            Availability::Scheduled {
                program_date,
                program_time,
                locked_by,
            } => AvailabilityRecord {
                is_available: false,
                program_date: Some(program_date),
                program_time: Some(program_time.format(PROGRAM_TIME_FORMAT).to_string()),
                locked_by: Some(locked_by),
            },
        }
    }
}

impl TryFrom<AvailabilityRecord> for Availability {
    type Error = DataError;

    fn try_from(record: AvailabilityRecord) -> Result<Self> {
        match record {
            AvailabilityRecord {
                is_available: true,
                program_date: None,
                program_time: None,
                locked_by: None,
            } => Ok(Availability::Available),
            AvailabilityRecord {
                is_available: true,
                ..
            } => Err(DataError::IncompleteAvailability(
                "an available speaker cannot carry program details",
            )),
            AvailabilityRecord {
                is_available: false,
                program_date: Some(program_date),
                program_time: Some(program_time),
                locked_by: Some(locked_by),
            } => Ok(Availability::Scheduled {
                program_date,
                program_time: crate::availability::parse_program_time(&program_time)?,
                locked_by,
            }),
            AvailabilityRecord { .. } => Err(DataError::IncompleteAvailability(
                "a scheduled speaker needs programDate, programTime and lockedBy",
            )),
        }
    }
}

/// Body of `POST /pages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Body of `PUT /pages/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Body of `POST /speakers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpeaker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

/// Body of `PUT /speakers/:id`. Availability is only changed through the workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response of login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Presence-only validation: the trimmed value must be non-empty.
pub fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DataError::MissingField(field)),
    }
}
