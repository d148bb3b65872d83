use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            -- Exactly one attribution column is set per row.
            CREATE TABLE IF NOT EXISTS quizzes (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER REFERENCES users(id) ON DELETE CASCADE,
                creator_name    TEXT,
                name            TEXT NOT NULL CHECK (length(name) > 0),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                CHECK ((user_id IS NULL) <> (creator_name IS NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_quizzes_user
                ON quizzes(user_id, created_at);

            CREATE TABLE IF NOT EXISTS photos (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                quiz_id         INTEGER NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
                image_path      TEXT NOT NULL,
                location_lat    REAL NOT NULL,
                location_lon    REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_photos_quiz
                ON photos(quiz_id, id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
