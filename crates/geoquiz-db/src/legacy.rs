//! One-shot import of the legacy `photos.json` document into the ledger.
//!
//! The document is an array of games, each an array of five `{image, location}`
//! entries. It is imported only when the quiz table is empty, so restarting
//! against a populated database never duplicates anything.

use std::path::Path;

use geoquiz_types::legacy::LegacyPhoto;
use geoquiz_types::models::{Location, PHOTOS_PER_QUIZ};
use tracing::{info, warn};

use crate::models::{Attribution, NewPhoto};
use crate::{Database, Result};

/// Fixed account that owns imported quizzes in authenticated deployments.
pub const MIGRATION_USERNAME: &str = "migration_user";
pub const MIGRATION_PASSWORD: &str = "changeme123";
/// Creator name stamped on imported quizzes in anonymous deployments.
pub const MIGRATION_CREATOR: &str = "migration";

/// Who imported quizzes are attributed to.
pub enum ImportOwner {
    /// Create (or reuse) this account and make it the owner.
    Account {
        username: String,
        password_hash: String,
    },
    Creator(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub skipped: bool,
    pub imported: usize,
    pub failed: usize,
}

pub fn import_if_empty(db: &Database, path: &Path, owner: &ImportOwner) -> Result<ImportReport> {
    let existing = db.count_quizzes()?;
    if existing > 0 {
        info!(quizzes = existing, "Ledger already populated, skipping legacy import");
        return Ok(ImportReport {
            skipped: true,
            ..Default::default()
        });
    }

    if !path.exists() {
        info!(path = %path.display(), "No legacy document found, skipping import");
        return Ok(ImportReport {
            skipped: true,
            ..Default::default()
        });
    }

    info!(path = %path.display(), "Starting legacy import");

    let raw = std::fs::read_to_string(path)?;
    let games: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

    let attribution = match owner {
        ImportOwner::Account {
            username,
            password_hash,
        } => Attribution::Owner(db.ensure_user(username, password_hash)?),
        ImportOwner::Creator(name) => Attribution::Creator(name.clone()),
    };

    let mut report = ImportReport::default();

    for (index, game) in games.into_iter().enumerate() {
        let name = format!("Quiz {}", index + 1);

        let photos = match parse_game(game) {
            Ok(photos) => photos,
            Err(reason) => {
                warn!(game = index + 1, "Skipping legacy game: {}", reason);
                report.failed += 1;
                continue;
            }
        };

        // One transaction per game: a failing game rolls back alone.
        match db.create_quiz_with_photos(&attribution, &name, &photos) {
            Ok(quiz_id) => {
                report.imported += 1;
                info!(quiz_id, "Imported legacy game as '{}'", name);
            }
            Err(e) => {
                warn!(game = index + 1, "Failed to import legacy game: {}", e);
                report.failed += 1;
            }
        }
    }

    info!(
        imported = report.imported,
        failed = report.failed,
        "Legacy import completed"
    );

    Ok(report)
}

fn parse_game(game: serde_json::Value) -> std::result::Result<[NewPhoto; PHOTOS_PER_QUIZ], String> {
    let entries: Vec<LegacyPhoto> =
        serde_json::from_value(game).map_err(|e| format!("malformed entries: {e}"))?;

    let photos = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry.location.as_slice() {
            [lat, lon] if lat.is_finite() && lon.is_finite() => Ok(NewPhoto {
                image_path: entry.image,
                location: Location::new(*lat, *lon),
            }),
            _ => Err(format!("invalid location at entry {}", i + 1)),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let count = photos.len();
    photos
        .try_into()
        .map_err(|_| format!("expected {PHOTOS_PER_QUIZ} photos, found {count}"))
}
