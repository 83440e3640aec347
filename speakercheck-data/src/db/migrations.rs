use rusqlite::Connection;

/// Run all pending migrations on the database.
///
/// Uses `PRAGMA user_version` to track which migrations have been applied.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        migrate_v0_to_v1(conn)?;
    }

    if version < 2 {
        migrate_v1_to_v2(conn)?;
    }

    Ok(())
}

/// Version counter on speakers, bumped on every write.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        ALTER TABLE speakers ADD COLUMN version INTEGER NOT NULL DEFAULT 1;

        PRAGMA user_version = 2;
        ",
    )?;
    Ok(())
}

fn migrate_v0_to_v1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE users (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,
            role            TEXT NOT NULL CHECK (role IN ('admin', 'user')),
            created_at      TEXT NOT NULL
        );

        CREATE TABLE sessions (
            token_hash      TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users ON DELETE CASCADE,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE pages (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            sort_order      INTEGER NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE speakers (
            id              TEXT PRIMARY KEY,
            page_id         TEXT NOT NULL REFERENCES pages,
            name            TEXT NOT NULL,
            area            TEXT NOT NULL,
            phone_number    TEXT NOT NULL,
            is_available    INTEGER NOT NULL DEFAULT 1,
            program_date    TEXT,
            program_time    TEXT,
            locked_by       TEXT REFERENCES users,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            CHECK (
                (is_available = 1 AND program_date IS NULL AND program_time IS NULL AND locked_by IS NULL)
                OR
                (is_available = 0 AND program_date IS NOT NULL AND program_time IS NOT NULL AND locked_by IS NOT NULL)
            )
        );

        CREATE INDEX idx_sessions_user ON sessions(user_id);
        CREATE INDEX idx_pages_order ON pages(sort_order, created_at);
        CREATE INDEX idx_speakers_page ON speakers(page_id);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}
