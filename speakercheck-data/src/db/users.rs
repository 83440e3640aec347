use rusqlite::{params, Connection};

use super::{new_id, now, OptionalExt};
use crate::auth;
use crate::error::{DataError, Result};
use crate::model::{required, Credentials, Role, User};

const USER_COLUMNS: &str = "id, username, role, created_at";

/// Check that both fields are present. The username comes back trimmed, the
/// password exactly as supplied.
pub fn validate_credentials(credentials: &Credentials) -> Result<(&str, &str)> {
    let username = required(credentials.username.as_deref(), "username")?;
    required(credentials.password.as_deref(), "password")?;
    Ok((username, credentials.password.as_deref().unwrap_or_default()))
}

/// Create a user from credentials. The first user of an empty database becomes admin.
pub fn register(conn: &Connection, credentials: &Credentials, bcrypt_cost: u32) -> Result<User> {
    let (username, password) = validate_credentials(credentials)?;
    let password_hash = auth::hash_password(password, bcrypt_cost)?;
    register_hashed(conn, username, &password_hash)
}

/// Second half of [`register`] for callers that hash the password themselves.
pub fn register_hashed(conn: &Connection, username: &str, password_hash: &str) -> Result<User> {
    if find_by_username(conn, username)?.is_some() {
        return Err(DataError::UsernameTaken(username.to_string()));
    }

    let role = if count(conn)? == 0 { Role::Admin } else { Role::User };
    insert(conn, username, password_hash, role)
}

/// Check credentials, returning the matching user.
pub fn verify_login(conn: &Connection, credentials: &Credentials) -> Result<User> {
    let (username, password) = validate_credentials(credentials)?;
    let (user, hash) = find_by_username(conn, username)?.ok_or(DataError::InvalidCredentials)?;
    check_password(user, password, &hash)
}

/// Return `user` if `password` matches `hash`.
pub fn check_password(user: User, password: &str, hash: &str) -> Result<User> {
    if auth::verify_password(password, hash)? {
        Ok(user)
    } else {
        Err(DataError::InvalidCredentials)
    }
}

/// Insert a user with an already hashed password.
pub fn insert(conn: &Connection, username: &str, password_hash: &str, role: Role) -> Result<User> {
    let user = User {
        id: new_id(),
        username: username.to_string(),
        role,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO users (id, username, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id,
            user.username,
            password_hash,
            user.role.to_string(),
            user.created_at
        ],
    )?;
    Ok(user)
}

/// Find a user and their password hash by username.
pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<(User, String)>> {
    let found = conn
        .query_row(
            &format!("SELECT {}, password_hash FROM users WHERE username = ?1", USER_COLUMNS),
            params![username],
            |row| Ok((row_to_user(row)?, row.get::<_, String>(4)?)),
        )
        .optional()?;
    Ok(found)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

/// Change a user's role.
pub fn set_role(conn: &Connection, username: &str, role: Role) -> Result<User> {
    let changed = conn.execute(
        "UPDATE users SET role = ?1 WHERE username = ?2",
        params![role.to_string(), username],
    )?;
    if changed == 0 {
        return Err(DataError::not_found("User", username));
    }
    let (user, _) = find_by_username(conn, username)?
        .ok_or_else(|| DataError::not_found("User", username))?;
    Ok(user)
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role: String = row.get(2)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        role: role.parse().map_err(|e: DataError| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get(3)?,
    })
}
