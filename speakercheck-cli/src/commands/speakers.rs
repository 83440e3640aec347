use anyhow::Result;

use speakercheck_cli::input::schedule_request;
use speakercheck_cli::render::{format_date, speaker_detail, speaker_table};
use speakercheck_data::{Availability, AvailabilityRequest, NewSpeaker, SpeakerUpdate};

use super::{pages, OrFallback, Session};

pub async fn list(session: &Session, page_key: &str) -> Result<()> {
    let page = pages::resolve(session, page_key).await?;
    let speakers = session
        .client
        .list_speakers(Some(&page.id))
        .await
        .or_fallback("Failed to load speakers")?;
    println!("{}", page.name);
    print!("{}", speaker_table(&speakers));
    Ok(())
}

pub async fn show(session: &Session, id: &str) -> Result<()> {
    let speaker = session
        .client
        .get_speaker(id)
        .await
        .or_fallback("Failed to load speaker")?;
    print!("{}", speaker_detail(&speaker));
    Ok(())
}

pub async fn add(
    session: &Session,
    page_key: &str,
    name: &str,
    area: &str,
    phone: &str,
) -> Result<()> {
    let page = pages::resolve(session, page_key).await?;
    let new = NewSpeaker {
        name: Some(name.to_string()),
        area: Some(area.to_string()),
        phone_number: Some(phone.to_string()),
        page_id: Some(page.id),
    };
    let speaker = session
        .client
        .create_speaker(&new)
        .await
        .or_fallback("Failed to create speaker")?;
    println!("Added {} to {} ({})", speaker.name, page.name, speaker.id);
    Ok(())
}

pub async fn update(
    session: &Session,
    id: &str,
    name: Option<String>,
    area: Option<String>,
    phone: Option<String>,
    page_key: Option<&str>,
) -> Result<()> {
    let page_id = match page_key {
        Some(key) => Some(pages::resolve(session, key).await?.id),
        None => None,
    };
    let update = SpeakerUpdate {
        name,
        area,
        phone_number: phone,
        page_id,
    };
    let speaker = session
        .client
        .update_speaker(id, &update)
        .await
        .or_fallback("Failed to update speaker")?;
    print!("{}", speaker_detail(&speaker));
    Ok(())
}

pub async fn delete(session: &Session, id: &str) -> Result<()> {
    let speaker = session
        .client
        .get_speaker(id)
        .await
        .or_fallback("Failed to load speaker")?;
    if !session.confirm(&format!("Delete speaker {}?", speaker.name))? {
        println!("Cancelled");
        return Ok(());
    }
    let message = session
        .client
        .delete_speaker(id)
        .await
        .or_fallback("Failed to delete speaker")?;
    println!("{}", message);
    Ok(())
}

pub async fn schedule(session: &Session, id: &str, date: &str, time: &str) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let request = schedule_request(date, time, today)?;
    let speaker = session
        .client
        .update_availability(id, &request)
        .await
        .or_fallback("Failed to update availability")?;
    if let Availability::Scheduled { program_date, .. } = &speaker.availability {
        println!("Scheduled {} for {}", speaker.name, format_date(*program_date));
    }
    Ok(())
}

pub async fn release(session: &Session, id: &str) -> Result<()> {
    let speaker = session
        .client
        .get_speaker(id)
        .await
        .or_fallback("Failed to load speaker")?;
    if !session.confirm(&format!("Make {} available again?", speaker.name))? {
        println!("Cancelled");
        return Ok(());
    }
    let request = AvailabilityRequest {
        expected_version: Some(speaker.version),
        ..AvailabilityRequest::release()
    };
    let speaker = session
        .client
        .update_availability(id, &request)
        .await
        .or_fallback("Failed to update availability")?;
    println!("{} is available", speaker.name);
    Ok(())
}
