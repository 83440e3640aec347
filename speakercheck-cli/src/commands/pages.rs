use anyhow::{anyhow, Result};

use speakercheck_cli::input::find_page;
use speakercheck_cli::render::page_table;
use speakercheck_data::{NewPage, Page, PageUpdate};

use super::{OrFallback, Session};

/// Resolve a page argument (id or name) against the server's list.
pub async fn resolve(session: &Session, key: &str) -> Result<Page> {
    let pages = session
        .client
        .list_pages()
        .await
        .or_fallback("Failed to load pages")?;
    find_page(&pages, key)
        .cloned()
        .ok_or_else(|| anyhow!("Page '{}' not found", key))
}

pub async fn list(session: &Session) -> Result<()> {
    let pages = session
        .client
        .list_pages()
        .await
        .or_fallback("Failed to load pages")?;
    print!("{}", page_table(&pages));
    Ok(())
}

pub async fn add(session: &Session, name: &str) -> Result<()> {
    let existing = session
        .client
        .list_pages()
        .await
        .or_fallback("Failed to load pages")?;
    let page = NewPage {
        name: Some(name.to_string()),
        order: Some(existing.len() as i64),
    };
    let page = session
        .client
        .create_page(&page)
        .await
        .or_fallback("Failed to create page")?;
    println!("Created page '{}' ({})", page.name, page.id);
    Ok(())
}

pub async fn rename(session: &Session, key: &str, name: &str) -> Result<()> {
    let page = resolve(session, key).await?;
    let update = PageUpdate {
        name: Some(name.to_string()),
        order: None,
    };
    let page = session
        .client
        .update_page(&page.id, &update)
        .await
        .or_fallback("Failed to update page")?;
    println!("Renamed page to '{}'", page.name);
    Ok(())
}

pub async fn delete(session: &Session, key: &str) -> Result<()> {
    let page = resolve(session, key).await?;
    if !session.confirm(&format!("Delete page '{}'?", page.name))? {
        println!("Cancelled");
        return Ok(());
    }
    let message = session
        .client
        .delete_page(&page.id)
        .await
        .or_fallback("Failed to delete page")?;
    println!("{}", message);
    Ok(())
}
