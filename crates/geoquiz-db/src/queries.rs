use crate::models::{Attribution, NewPhoto, PhotoRow, QuizRow, QuizScope, UserRow};
use crate::{Database, DbError, Result};
use geoquiz_types::models::{Location, PHOTOS_PER_QUIZ};
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Insert the user unless the username exists, then return its id either way.
    pub fn ensure_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (username, password_hash) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            let id = conn.query_row(
                "SELECT id FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )?;
            Ok(id)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Quizzes --

    /// Insert a bare quiz row. Callers that also write photos should use
    /// [`Database::create_quiz_with_photos`] so both land in one transaction.
    pub fn create_quiz(&self, attribution: &Attribution, name: &str) -> Result<i64> {
        self.with_conn(|conn| insert_quiz(conn, attribution, name))
    }

    pub fn insert_photo(&self, quiz_id: i64, photo: &NewPhoto) -> Result<i64> {
        self.with_conn(|conn| insert_photo_row(conn, quiz_id, photo))
    }

    /// Quiz row plus its five photos, all or nothing.
    pub fn create_quiz_with_photos(
        &self,
        attribution: &Attribution,
        name: &str,
        photos: &[NewPhoto; PHOTOS_PER_QUIZ],
    ) -> Result<i64> {
        self.with_tx(|tx| {
            let quiz_id = insert_quiz(tx, attribution, name)?;
            for photo in photos {
                insert_photo_row(tx, quiz_id, photo)?;
            }
            Ok(quiz_id)
        })
    }

    pub fn get_quiz(&self, quiz_id: i64) -> Result<Option<QuizRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, creator_name, name, created_at FROM quizzes WHERE id = ?1",
                [quiz_id],
                map_quiz_row,
            )
            .optional()
        })
    }

    pub fn count_quizzes(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM quizzes", [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    /// Newest first. Ties on `created_at` fall back to the newer id.
    pub fn list_quizzes(&self, scope: QuizScope) -> Result<Vec<QuizRow>> {
        self.with_conn(|conn| {
            let rows = match scope {
                QuizScope::All => {
                    let mut stmt = conn.prepare(
                        "SELECT id, user_id, creator_name, name, created_at FROM quizzes
                         ORDER BY created_at DESC, id DESC",
                    )?;
                    let rows = stmt
                        .query_map([], map_quiz_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
                QuizScope::OwnedBy(user_id) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, user_id, creator_name, name, created_at FROM quizzes
                         WHERE user_id = ?1
                         ORDER BY created_at DESC, id DESC",
                    )?;
                    let rows = stmt
                        .query_map([user_id], map_quiz_row)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
    }

    /// Removes the quiz; the foreign key cascade drops its photos in the same statement.
    /// Returns the removed image references, or `None` if there was no such quiz.
    pub fn delete_quiz(&self, quiz_id: i64) -> Result<Option<Vec<String>>> {
        self.with_tx(|tx| {
            let paths = image_paths(tx, quiz_id)?;
            let deleted = tx.execute("DELETE FROM quizzes WHERE id = ?1", [quiz_id])?;
            Ok((deleted > 0).then_some(paths))
        })
    }

    // -- Photos --

    /// Ordered by id, which is insertion order.
    pub fn list_photos(&self, quiz_id: i64) -> Result<Vec<PhotoRow>> {
        self.with_conn(|conn| photo_rows(conn, quiz_id))
    }

    /// The quiz row and its photos read under one lock, so a concurrent
    /// delete or replace is seen either fully or not at all.
    pub fn get_quiz_with_photos(&self, quiz_id: i64) -> Result<Option<(QuizRow, Vec<PhotoRow>)>> {
        self.with_conn(|conn| {
            let Some(quiz) = conn
                .query_row(
                    "SELECT id, user_id, creator_name, name, created_at FROM quizzes WHERE id = ?1",
                    [quiz_id],
                    map_quiz_row,
                )
                .optional()?
            else {
                return Ok(None);
            };
            let photos = photo_rows(conn, quiz_id)?;
            Ok(Some((quiz, photos)))
        })
    }

    pub fn count_photos(&self, quiz_id: i64) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM photos WHERE quiz_id = ?1",
                [quiz_id],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Swap the full photo set of a quiz. Returns the image references that were replaced.
    pub fn replace_photos(
        &self,
        quiz_id: i64,
        photos: &[NewPhoto; PHOTOS_PER_QUIZ],
    ) -> Result<Vec<String>> {
        self.update_quiz(quiz_id, None, Some(photos))
    }

    /// Rename and/or replace photos in one transaction. The delete of the old
    /// photo rows and the inserts of the new ones either both commit or neither does.
    pub fn update_quiz(
        &self,
        quiz_id: i64,
        name: Option<&str>,
        photos: Option<&[NewPhoto; PHOTOS_PER_QUIZ]>,
    ) -> Result<Vec<String>> {
        self.with_tx(|tx| {
            if let Some(name) = name {
                let renamed = tx.execute(
                    "UPDATE quizzes SET name = ?1 WHERE id = ?2",
                    rusqlite::params![name, quiz_id],
                )?;
                if renamed == 0 {
                    return Err(DbError::NotFound);
                }
            }

            let Some(photos) = photos else {
                return Ok(vec![]);
            };

            let replaced = image_paths(tx, quiz_id)?;
            tx.execute("DELETE FROM photos WHERE quiz_id = ?1", [quiz_id])?;
            for photo in photos {
                insert_photo_row(tx, quiz_id, photo)?;
            }
            Ok(replaced)
        })
    }
}

fn insert_quiz(conn: &Connection, attribution: &Attribution, name: &str) -> Result<i64> {
    let (user_id, creator_name) = match attribution {
        Attribution::Owner(id) => (Some(*id), None),
        Attribution::Creator(creator) => (None, Some(creator.as_str())),
    };
    conn.execute(
        "INSERT INTO quizzes (user_id, creator_name, name) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, creator_name, name],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_photo_row(conn: &Connection, quiz_id: i64, photo: &NewPhoto) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO photos (quiz_id, image_path, location_lat, location_lon) VALUES (?1, ?2, ?3, ?4)",
    )?;
    stmt.execute(rusqlite::params![
        quiz_id,
        &photo.image_path,
        photo.location.lat,
        photo.location.lon
    ])?;
    Ok(conn.last_insert_rowid())
}

fn photo_rows(conn: &Connection, quiz_id: i64) -> Result<Vec<PhotoRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, quiz_id, image_path, location_lat, location_lon
         FROM photos
         WHERE quiz_id = ?1
         ORDER BY id",
    )?;
    let rows = stmt
        .query_map([quiz_id], |row| {
            Ok(PhotoRow {
                id: row.get(0)?,
                quiz_id: row.get(1)?,
                image_path: row.get(2)?,
                location: Location::new(row.get(3)?, row.get(4)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn image_paths(conn: &Connection, quiz_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT image_path FROM photos WHERE quiz_id = ?1 ORDER BY id")?;
    let paths = stmt
        .query_map([quiz_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(paths)
}

fn map_quiz_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuizRow> {
    Ok(QuizRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        creator_name: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::from(e)),
        }
    }
}
