use rusqlite::{params, Connection};
use tracing::debug;

use super::{new_id, now, pages, OptionalExt};
use crate::availability::{parse_program_date, AvailabilityRequest};
use crate::error::{DataError, Result};
use crate::model::{
    required, Availability, AvailabilityRecord, NewSpeaker, Speaker, SpeakerUpdate, User, UserRef,
    PROGRAM_TIME_FORMAT,
};

const SPEAKER_SELECT: &str = "
    SELECT s.id, s.page_id, s.name, s.area, s.phone_number,
           s.is_available, s.program_date, s.program_time, s.locked_by, u.username,
           s.version, s.created_at, s.updated_at
    FROM speakers s
    LEFT JOIN users u ON u.id = s.locked_by";

/// List speakers, optionally restricted to one page, oldest first.
pub fn list(conn: &Connection, page_id: Option<&str>) -> Result<Vec<Speaker>> {
    let speakers = match page_id {
        Some(page_id) => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE s.page_id = ?1 ORDER BY s.created_at, s.name",
                SPEAKER_SELECT
            ))?;
            let rows = stmt.query_map(params![page_id], row_to_speaker)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "{} ORDER BY s.created_at, s.name",
                SPEAKER_SELECT
            ))?;
            let rows = stmt.query_map([], row_to_speaker)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(speakers)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Speaker>> {
    let speaker = conn
        .query_row(
            &format!("{} WHERE s.id = ?1", SPEAKER_SELECT),
            params![id],
            row_to_speaker,
        )
        .optional()?;
    Ok(speaker)
}

/// Create an available speaker on an existing page.
pub fn create(conn: &Connection, new: &NewSpeaker) -> Result<Speaker> {
    let name = required(new.name.as_deref(), "name")?;
    let area = required(new.area.as_deref(), "area")?;
    let phone_number = required(new.phone_number.as_deref(), "phoneNumber")?;
    let page_id = required(new.page_id.as_deref(), "pageId")?;

    if pages::get(conn, page_id)?.is_none() {
        return Err(DataError::not_found("Page", page_id));
    }

    let timestamp = now();
    let speaker = Speaker {
        id: new_id(),
        page_id: page_id.to_string(),
        name: name.to_string(),
        area: area.to_string(),
        phone_number: phone_number.to_string(),
        availability: Availability::Available,
        version: 1,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };
    conn.execute(
        "INSERT INTO speakers (id, page_id, name, area, phone_number, is_available, version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8)",
        params![
            speaker.id,
            speaker.page_id,
            speaker.name,
            speaker.area,
            speaker.phone_number,
            speaker.version,
            speaker.created_at,
            speaker.updated_at,
        ],
    )?;
    Ok(speaker)
}

/// Update contact details or move a speaker to another page. Availability is untouched.
pub fn update(conn: &Connection, id: &str, update: &SpeakerUpdate) -> Result<Speaker> {
    let mut speaker = get(conn, id)?.ok_or_else(|| DataError::not_found("Speaker", id))?;

    if update.name.is_some() {
        speaker.name = required(update.name.as_deref(), "name")?.to_string();
    }
    if update.area.is_some() {
        speaker.area = required(update.area.as_deref(), "area")?.to_string();
    }
    if update.phone_number.is_some() {
        speaker.phone_number = required(update.phone_number.as_deref(), "phoneNumber")?.to_string();
    }
    if update.page_id.is_some() {
        let page_id = required(update.page_id.as_deref(), "pageId")?;
        if pages::get(conn, page_id)?.is_none() {
            return Err(DataError::not_found("Page", page_id));
        }
        speaker.page_id = page_id.to_string();
    }
    speaker.version += 1;
    speaker.updated_at = now();

    conn.execute(
        "UPDATE speakers SET name = ?1, area = ?2, phone_number = ?3, page_id = ?4, version = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            speaker.name,
            speaker.area,
            speaker.phone_number,
            speaker.page_id,
            speaker.version,
            speaker.updated_at,
            speaker.id,
        ],
    )?;
    Ok(speaker)
}

/// Apply a schedule or release request on behalf of `actor`.
///
/// Runs read-check-write in one transaction. When the request carries an
/// expected version it must match the stored one.
pub fn update_availability(
    conn: &Connection,
    id: &str,
    request: &AvailabilityRequest,
    actor: &User,
) -> Result<Speaker> {
    let change = request.to_change()?;

    let tx = conn.unchecked_transaction()?;
    let mut speaker = get(&tx, id)?.ok_or_else(|| DataError::not_found("Speaker", id))?;

    if let Some(expected) = request.expected_version {
        if expected != speaker.version {
            return Err(DataError::VersionConflict {
                expected,
                actual: speaker.version,
            });
        }
    }

    speaker.availability = change.apply(&speaker.availability, actor)?;
    speaker.version += 1;
    speaker.updated_at = now();

    let (is_available, program_date, program_time, locked_by) = match &speaker.availability {
        Availability::Available => (true, None, None, None),
        Availability::Scheduled {
            program_date,
            program_time,
            locked_by,
        } => (
            false,
            Some(program_date.format("%Y-%m-%d").to_string()),
            Some(program_time.format(PROGRAM_TIME_FORMAT).to_string()),
            Some(locked_by.id.clone()),
        ),
    };

    tx.execute(
        "UPDATE speakers SET is_available = ?1, program_date = ?2, program_time = ?3, locked_by = ?4,
                version = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            is_available,
            program_date,
            program_time,
            locked_by,
            speaker.version,
            speaker.updated_at,
            speaker.id,
        ],
    )?;
    tx.commit()?;

    debug!(speaker = %speaker.id, state = %speaker.availability.state(), version = speaker.version, "availability updated");
    Ok(speaker)
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn.execute("DELETE FROM speakers WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DataError::not_found("Speaker", id));
    }
    Ok(())
}

fn row_to_speaker(row: &rusqlite::Row) -> rusqlite::Result<Speaker> {
    let program_date: Option<String> = row.get(6)?;
    let locked_by_id: Option<String> = row.get(8)?;
    let locked_by_name: Option<String> = row.get(9)?;

    let record = AvailabilityRecord {
        is_available: row.get(5)?,
        program_date: program_date
            .as_deref()
            .map(parse_program_date)
            .transpose()
            .map_err(|e| conversion_error(6, e))?,
        program_time: row.get(7)?,
        locked_by: locked_by_id.zip(locked_by_name).map(|(id, username)| UserRef { id, username }),
    };

    Ok(Speaker {
        id: row.get(0)?,
        page_id: row.get(1)?,
        name: row.get(2)?,
        area: row.get(3)?,
        phone_number: row.get(4)?,
        availability: Availability::try_from(record).map_err(|e| conversion_error(5, e))?,
        version: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn conversion_error(column: usize, err: DataError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_db, users};
    use crate::model::{NewPage, Role};
    use chrono::{NaiveDate, NaiveTime};

    fn setup(conn: &Connection) -> (String, User) {
        let page = pages::create(
            conn,
            &NewPage {
                name: Some("Weekly Speakers".to_string()),
                order: None,
            },
        )
        .unwrap();
        let actor = users::insert(conn, "alice", "hash", Role::User).unwrap();
        (page.id, actor)
    }

    fn new_speaker(page_id: &str, name: &str) -> NewSpeaker {
        NewSpeaker {
            name: Some(name.to_string()),
            area: Some("North".to_string()),
            phone_number: Some("555-0101".to_string()),
            page_id: Some(page_id.to_string()),
        }
    }

    fn schedule_request() -> AvailabilityRequest {
        AvailabilityRequest::schedule(
            NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_create_starts_available() {
        let conn = test_db();
        let (page_id, _) = setup(&conn);

        let speaker = create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();
        assert_eq!(speaker.availability, Availability::Available);
        assert_eq!(speaker.version, 1);
        assert_eq!(get(&conn, &speaker.id).unwrap(), Some(speaker));
    }

    #[test]
    fn test_create_without_page_id_fails() {
        let conn = test_db();
        let (page_id, _) = setup(&conn);
        let mut new = new_speaker(&page_id, "Ravi");
        new.page_id = None;

        assert!(matches!(
            create(&conn, &new),
            Err(DataError::MissingField("pageId"))
        ));
        assert!(list(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_create_with_unknown_page_fails() {
        let conn = test_db();
        setup(&conn);
        let err = create(&conn, &new_speaker("nope", "Ravi")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { kind: "Page", .. }));
    }

    #[test]
    fn test_create_requires_every_field() {
        let conn = test_db();
        let (page_id, _) = setup(&conn);

        let mut missing_area = new_speaker(&page_id, "Ravi");
        missing_area.area = Some(String::new());
        assert!(matches!(
            create(&conn, &missing_area),
            Err(DataError::MissingField("area"))
        ));

        let mut missing_phone = new_speaker(&page_id, "Ravi");
        missing_phone.phone_number = None;
        assert!(matches!(
            create(&conn, &missing_phone),
            Err(DataError::MissingField("phoneNumber"))
        ));
    }

    #[test]
    fn test_list_filters_by_page() {
        let conn = test_db();
        let (page_id, _) = setup(&conn);
        let other = pages::create(
            &conn,
            &NewPage {
                name: Some("ICA Speakers".to_string()),
                order: None,
            },
        )
        .unwrap();

        create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();
        create(&conn, &new_speaker(&other.id, "Meera")).unwrap();

        let on_page = list(&conn, Some(&page_id)).unwrap();
        assert_eq!(on_page.len(), 1);
        assert_eq!(on_page[0].name, "Ravi");
        assert_eq!(list(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn test_schedule_then_release_round_trip() {
        let conn = test_db();
        let (page_id, actor) = setup(&conn);
        let speaker = create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();
        let before = speaker.availability.clone();

        let scheduled = update_availability(&conn, &speaker.id, &schedule_request(), &actor).unwrap();
        match &scheduled.availability {
            Availability::Scheduled { locked_by, .. } => assert_eq!(locked_by.username, "alice"),
            Availability::Available => panic!("expected scheduled"),
        }
        assert_eq!(get(&conn, &speaker.id).unwrap().unwrap(), scheduled);

        let released =
            update_availability(&conn, &speaker.id, &AvailabilityRequest::release(), &actor).unwrap();
        assert_eq!(released.availability, before);
        assert_eq!(released.version, 3);
    }

    #[test]
    fn test_schedule_scheduled_speaker_is_rejected_without_change() {
        let conn = test_db();
        let (page_id, actor) = setup(&conn);
        let speaker = create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();
        let scheduled = update_availability(&conn, &speaker.id, &schedule_request(), &actor).unwrap();

        let other = users::insert(&conn, "bob", "hash", Role::User).unwrap();
        let mut again = schedule_request();
        again.program_time = Some("09:00".to_string());
        let err = update_availability(&conn, &speaker.id, &again, &other).unwrap_err();
        assert!(matches!(err, DataError::InvalidTransition { .. }));

        assert_eq!(get(&conn, &speaker.id).unwrap().unwrap(), scheduled);
    }

    #[test]
    fn test_expected_version_mismatch_is_rejected() {
        let conn = test_db();
        let (page_id, actor) = setup(&conn);
        let speaker = create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();

        let mut stale = schedule_request();
        stale.expected_version = Some(speaker.version + 1);
        let err = update_availability(&conn, &speaker.id, &stale, &actor).unwrap_err();
        assert!(matches!(
            err,
            DataError::VersionConflict {
                expected: 2,
                actual: 1
            }
        ));

        let mut fresh = schedule_request();
        fresh.expected_version = Some(speaker.version);
        assert!(update_availability(&conn, &speaker.id, &fresh, &actor).is_ok());
    }

    #[test]
    fn test_update_changes_details_only() {
        let conn = test_db();
        let (page_id, actor) = setup(&conn);
        let speaker = create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();
        update_availability(&conn, &speaker.id, &schedule_request(), &actor).unwrap();

        let updated = update(
            &conn,
            &speaker.id,
            &SpeakerUpdate {
                phone_number: Some("555-0199".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.phone_number, "555-0199");
        assert_eq!(updated.name, "Ravi");
        assert!(!updated.availability.is_available());

        let blank = SpeakerUpdate {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update(&conn, &speaker.id, &blank),
            Err(DataError::MissingField("name"))
        ));
    }

    #[test]
    fn test_delete() {
        let conn = test_db();
        let (page_id, _) = setup(&conn);
        let speaker = create(&conn, &new_speaker(&page_id, "Ravi")).unwrap();

        delete(&conn, &speaker.id).unwrap();
        assert!(get(&conn, &speaker.id).unwrap().is_none());
        assert!(matches!(
            delete(&conn, &speaker.id),
            Err(DataError::NotFound { .. })
        ));
    }
}
