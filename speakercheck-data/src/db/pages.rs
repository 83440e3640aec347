use rusqlite::{params, Connection};

use super::{new_id, now, OptionalExt};
use crate::error::{DataError, Result};
use crate::model::{required, NewPage, Page, PageUpdate};

const PAGE_COLUMNS: &str = "id, name, sort_order, created_at";

/// List all pages by their explicit order, oldest first on ties.
pub fn list(conn: &Connection) -> Result<Vec<Page>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM pages ORDER BY sort_order, created_at",
        PAGE_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_page)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Page>> {
    let page = conn
        .query_row(
            &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
            params![id],
            row_to_page,
        )
        .optional()?;
    Ok(page)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?)
}

/// Create a page. `order` defaults to the current number of pages.
pub fn create(conn: &Connection, new: &NewPage) -> Result<Page> {
    let name = required(new.name.as_deref(), "name")?;
    let order = match new.order {
        Some(order) => order,
        None => count(conn)?,
    };

    let page = Page {
        id: new_id(),
        name: name.to_string(),
        order,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO pages (id, name, sort_order, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![page.id, page.name, page.order, page.created_at],
    )?;
    Ok(page)
}

/// Update name and/or order of a page.
pub fn update(conn: &Connection, id: &str, update: &PageUpdate) -> Result<Page> {
    let mut page = get(conn, id)?.ok_or_else(|| DataError::not_found("Page", id))?;

    if update.name.is_some() {
        page.name = required(update.name.as_deref(), "name")?.to_string();
    }
    if let Some(order) = update.order {
        page.order = order;
    }

    conn.execute(
        "UPDATE pages SET name = ?1, sort_order = ?2 WHERE id = ?3",
        params![page.name, page.order, page.id],
    )?;
    Ok(page)
}

/// Delete a page. Fails while the page still owns speakers.
pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    if get(conn, id)?.is_none() {
        return Err(DataError::not_found("Page", id));
    }

    let speakers = speaker_count(conn, id)?;
    if speakers > 0 {
        return Err(DataError::PageNotEmpty(speakers));
    }

    conn.execute("DELETE FROM pages WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn speaker_count(conn: &Connection, id: &str) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM speakers WHERE page_id = ?1",
        params![id],
        |row| row.get(0),
    )?)
}

fn row_to_page(row: &rusqlite::Row) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        name: row.get(1)?,
        order: row.get(2)?,
        created_at: row.get(3)?,
    })
}
