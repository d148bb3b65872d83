/// Database row types. These map directly to SQLite rows.
/// Distinct from geoquiz-types API models to keep the DB layer independent.
use chrono::{DateTime, NaiveDateTime, Utc};
use geoquiz_types::models::Location;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct QuizRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub creator_name: Option<String>,
    pub name: String,
    pub created_at: String,
}

impl QuizRow {
    /// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS[.fff]" without timezone.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRow {
    pub id: i64,
    pub quiz_id: i64,
    pub image_path: String,
    pub location: Location,
}

/// A photo about to be written: the stored image reference and its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhoto {
    pub image_path: String,
    pub location: Location,
}

/// Who a quiz is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    Owner(i64),
    Creator(String),
}

/// Which quizzes a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizScope {
    All,
    OwnedBy(i64),
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
