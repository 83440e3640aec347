use rusqlite::{params, Connection};

use super::{now, OptionalExt};
use crate::auth::{generate_token, hash_token};
use crate::error::Result;
use crate::model::User;

/// Open a session for a user and return the plain bearer token.
pub fn create(conn: &Connection, user_id: &str) -> Result<String> {
    let token = generate_token();
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![hash_token(&token), user_id, now()],
    )?;
    Ok(token)
}

/// Resolve a bearer token to its user.
pub fn user_for_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    let user_id: Option<String> = conn
        .query_row(
            "SELECT user_id FROM sessions WHERE token_hash = ?1",
            params![hash_token(token)],
            |row| row.get(0),
        )
        .optional()?;

    match user_id {
        Some(id) => super::users::get(conn, &id),
        None => Ok(None),
    }
}

/// Delete the session for a token. Returns whether one existed.
pub fn revoke(conn: &Connection, token: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![hash_token(token)],
    )?;
    Ok(deleted > 0)
}
