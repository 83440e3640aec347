//! Validation and resolution of command-line arguments before they are sent.

use chrono::NaiveDate;

use speakercheck_data::availability::{check_not_in_past, parse_program_date, parse_program_time};
use speakercheck_data::{AvailabilityRequest, Page};

/// Build a schedule request, rejecting malformed values and dates before `today`.
pub fn schedule_request(
    date: &str,
    time: &str,
    today: NaiveDate,
) -> speakercheck_data::Result<AvailabilityRequest> {
    let program_date = parse_program_date(date)?;
    let program_time = parse_program_time(time)?;
    check_not_in_past(program_date, today)?;
    Ok(AvailabilityRequest::schedule(program_date, program_time))
}

/// Find a page by id, or by case-insensitive name.
pub fn find_page<'a>(pages: &'a [Page], key: &str) -> Option<&'a Page> {
    pages
        .iter()
        .find(|page| page.id == key)
        .or_else(|| pages.iter().find(|page| page.name.eq_ignore_ascii_case(key.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use speakercheck_data::DataError;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn page(id: &str, name: &str) -> Page {
        Page {
            id: id.to_string(),
            name: name.to_string(),
            order: 0,
            created_at: "2026-10-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_schedule_request_today_is_allowed() {
        let request = schedule_request("2026-10-19", "18:30", today()).unwrap();
        assert_eq!(request.program_date.as_deref(), Some("2026-10-19"));
        assert_eq!(request.program_time.as_deref(), Some("18:30"));
        assert!(!request.make_available);
    }

    #[test]
    fn test_schedule_request_rejects_past_date() {
        let err = schedule_request("2026-10-18", "18:30", today()).unwrap_err();
        assert!(matches!(err, DataError::DateInPast(_)));
    }

    #[test]
    fn test_schedule_request_rejects_bad_time() {
        let err = schedule_request("2026-10-20", "6pm", today()).unwrap_err();
        assert!(matches!(err, DataError::InvalidTime(_)));
    }

    #[test]
    fn test_find_page_by_id_or_name() {
        let pages = vec![page("p1", "Weekly Speakers"), page("p2", "ICA Speakers")];
        assert_eq!(find_page(&pages, "p2").unwrap().name, "ICA Speakers");
        assert_eq!(find_page(&pages, "weekly speakers").unwrap().id, "p1");
        assert!(find_page(&pages, "Monthly").is_none());
    }
}
