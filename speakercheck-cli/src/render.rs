//! Plain-text rendering of API records for the terminal.

use std::fmt::Write;

use chrono::NaiveDate;

use speakercheck_data::model::PROGRAM_TIME_FORMAT;
use speakercheck_data::{Availability, Page, Speaker, User};

/// `19 Oct 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// One-line availability summary used in speaker listings.
pub fn availability_summary(availability: &Availability) -> String {
    match availability {
        Availability::Available => "Available".to_string(),
        Availability::Scheduled {
            program_date,
            program_time,
            ..
        } => format!(
            "Scheduled {} {}",
            format_date(*program_date),
            program_time.format(PROGRAM_TIME_FORMAT)
        ),
    }
}

pub fn page_table(pages: &[Page]) -> String {
    if pages.is_empty() {
        return "No pages.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<26} {:<6} {}", "ID", "ORDER", "NAME");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for page in pages {
        let _ = writeln!(out, "{:<26} {:<6} {}", page.id, page.order, page.name);
    }
    out
}

pub fn speaker_table(speakers: &[Speaker]) -> String {
    if speakers.is_empty() {
        return "No speakers.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<26} {:<24} {:<16} {:<16} {}",
        "ID", "NAME", "AREA", "PHONE", "STATUS"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));
    for speaker in speakers {
        let _ = writeln!(
            out,
            "{:<26} {:<24} {:<16} {:<16} {}",
            speaker.id,
            truncate(&speaker.name, 24),
            truncate(&speaker.area, 16),
            speaker.phone_number,
            availability_summary(&speaker.availability)
        );
    }
    out
}

pub fn speaker_detail(speaker: &Speaker) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", speaker.name);
    let _ = writeln!(out, "  Area:         {}", speaker.area);
    let _ = writeln!(out, "  Phone:        {}", speaker.phone_number);
    match &speaker.availability {
        Availability::Available => {
            let _ = writeln!(out, "  Status:       Available");
        }
        Availability::Scheduled {
            program_date,
            program_time,
            locked_by,
        } => {
            let _ = writeln!(out, "  Status:       Scheduled");
            let _ = writeln!(out, "  Date:         {}", format_date(*program_date));
            let _ = writeln!(
                out,
                "  Time:         {}",
                program_time.format(PROGRAM_TIME_FORMAT)
            );
            let _ = writeln!(out, "  Assigned by:  {}", locked_by.username);
        }
    }
    out
}

pub fn user_line(user: &User) -> String {
    format!("{} ({})", user.username, user.role)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
