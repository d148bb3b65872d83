//! Quiz lifecycle: validation, ownership and the five-photo invariant.
//!
//! Every request is validated in full before the ledger is touched. Multi-row
//! writes go through the ledger's transactional operations only.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use geoquiz_db::models::{Attribution, NewPhoto, QuizRow, QuizScope};
use geoquiz_db::{Database, DbError};
use geoquiz_types::api::{Claims, QuizRef};
use geoquiz_types::models::{AttributionMode, Location, PHOTOS_PER_QUIZ, PhotoView, QuizSummary};
use tracing::{error, info, warn};

use crate::error::{ServiceError, ServiceResult};

/// Who is making a request. Resolved from the session token, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    User { id: i64, username: String },
    Anonymous,
}

impl From<&Claims> for Caller {
    fn from(claims: &Claims) -> Self {
        Self::User {
            id: claims.sub,
            username: claims.username.clone(),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Claims>()
            .map(Caller::from)
            .unwrap_or(Caller::Anonymous))
    }
}

/// Create input as handed over by the upload layer.
#[derive(Debug, Clone, Default)]
pub struct CreateQuiz {
    pub name: String,
    pub creator_name: Option<String>,
    /// Raw JSON array of `{ "location": [lat, lon] }` entries.
    pub game_data: Option<String>,
    /// Stored image references, in upload order.
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateQuiz {
    pub name: Option<String>,
    pub game_data: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub quiz: QuizRef,
    /// Image references that are no longer attached to any photo.
    pub replaced_images: Vec<String>,
}

#[derive(Clone)]
pub struct QuizService {
    db: Arc<Database>,
    mode: AttributionMode,
}

impl QuizService {
    pub fn new(db: Arc<Database>, mode: AttributionMode) -> Self {
        Self { db, mode }
    }

    pub fn mode(&self) -> AttributionMode {
        self.mode
    }

    pub async fn list_quizzes(&self, caller: &Caller) -> ServiceResult<Vec<QuizSummary>> {
        let scope = match self.mode {
            AttributionMode::Authenticated => QuizScope::OwnedBy(self.user_id(caller)?),
            AttributionMode::Anonymous => QuizScope::All,
        };

        let rows = self.run(move |db| db.list_quizzes(scope)).await?;
        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    pub async fn list_photos(&self, caller: &Caller, quiz_id: i64) -> ServiceResult<Vec<PhotoView>> {
        let user_id = self.owner_filter(caller)?;

        let (quiz, rows) = self
            .run(move |db| db.get_quiz_with_photos(quiz_id))
            .await?
            .ok_or(ServiceError::NotFound)?;
        check_owner(user_id, &quiz)?;

        Ok(rows
            .into_iter()
            .map(|row| PhotoView {
                id: row.id,
                image: row.image_path,
                location: row.location,
            })
            .collect())
    }

    pub async fn create_quiz(&self, caller: &Caller, req: CreateQuiz) -> ServiceResult<QuizRef> {
        let attribution = match self.mode {
            AttributionMode::Authenticated => Attribution::Owner(self.user_id(caller)?),
            AttributionMode::Anonymous => {
                let creator = req
                    .creator_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| invalid("Creator name required"))?;
                Attribution::Creator(creator.to_string())
            }
        };

        let name = require_name(&req.name)?;

        if req.images.len() != PHOTOS_PER_QUIZ {
            return Err(invalid(format!(
                "Exactly {PHOTOS_PER_QUIZ} images required (received {})",
                req.images.len()
            )));
        }

        let game_data = req
            .game_data
            .as_deref()
            .ok_or_else(|| invalid("Invalid game data format"))?;
        let locations = parse_locations(game_data)?;
        if locations.len() != PHOTOS_PER_QUIZ {
            return Err(invalid(format!(
                "Must provide exactly {PHOTOS_PER_QUIZ} photos with location data (received {})",
                locations.len()
            )));
        }

        let photos = bind_photos(req.images, locations)?;

        let quiz_name = name.clone();
        let quiz_id = self
            .run(move |db| db.create_quiz_with_photos(&attribution, &quiz_name, &photos))
            .await?;

        info!(quiz_id, "Quiz \"{}\" created with {} photos", name, PHOTOS_PER_QUIZ);
        Ok(QuizRef { id: quiz_id, name })
    }

    pub async fn update_quiz(
        &self,
        caller: &Caller,
        quiz_id: i64,
        req: UpdateQuiz,
    ) -> ServiceResult<UpdateOutcome> {
        let existing = self.authorize(caller, quiz_id).await?;

        // Blank or absent name keeps the current one.
        let new_name = req
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let photos = if req.images.is_empty() {
            None
        } else {
            let locations = match req.game_data.as_deref() {
                Some(raw) if !raw.trim().is_empty() => parse_locations(raw)?,
                _ => vec![],
            };
            Some(bind_photos(req.images, locations)?)
        };

        let name_update = new_name.clone();
        let replacing = photos.is_some();
        let replaced_images = self
            .run(move |db| db.update_quiz(quiz_id, name_update.as_deref(), photos.as_ref()))
            .await
            .map_err(|e| match e {
                // The quiz vanished between the ownership check and the write.
                ServiceError::Storage(DbError::ForeignKeyViolation | DbError::NotFound) => {
                    ServiceError::NotFound
                }
                other => other,
            })?;

        let name = new_name.unwrap_or(existing.name);
        info!(quiz_id, replaced_photos = replacing, "Quiz \"{}\" updated", name);

        Ok(UpdateOutcome {
            quiz: QuizRef { id: quiz_id, name },
            replaced_images,
        })
    }

    /// Returns the image references of the deleted photos.
    pub async fn delete_quiz(&self, caller: &Caller, quiz_id: i64) -> ServiceResult<Vec<String>> {
        self.authorize(caller, quiz_id).await?;

        let removed = self
            .run(move |db| db.delete_quiz(quiz_id))
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(quiz_id, photos = removed.len(), "Quiz deleted");
        Ok(removed)
    }

    /// Load the quiz and check the caller may touch it. Runs before any write.
    async fn authorize(&self, caller: &Caller, quiz_id: i64) -> ServiceResult<QuizRow> {
        let user_id = self.owner_filter(caller)?;

        let quiz = self
            .run(move |db| db.get_quiz(quiz_id))
            .await?
            .ok_or(ServiceError::NotFound)?;
        check_owner(user_id, &quiz)?;

        Ok(quiz)
    }

    /// The user a quiz must belong to, or `None` when ownership is not tracked.
    fn owner_filter(&self, caller: &Caller) -> ServiceResult<Option<i64>> {
        match self.mode {
            AttributionMode::Authenticated => Ok(Some(self.user_id(caller)?)),
            AttributionMode::Anonymous => Ok(None),
        }
    }

    fn user_id(&self, caller: &Caller) -> ServiceResult<i64> {
        match caller {
            Caller::User { id, .. } => Ok(*id),
            Caller::Anonymous => Err(ServiceError::Unauthorized("Access token required".into())),
        }
    }

    /// Run a blocking ledger call off the async runtime.
    async fn run<F, T>(&self, f: F) -> ServiceResult<T>
    where
        F: FnOnce(&Database) -> geoquiz_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                ServiceError::Internal("ledger task failed".into())
            })?
            .map_err(ServiceError::from)
    }
}

fn check_owner(user_id: Option<i64>, quiz: &QuizRow) -> ServiceResult<()> {
    if let Some(user_id) = user_id {
        if quiz.user_id != Some(user_id) {
            warn!(quiz_id = quiz.id, user_id, "Rejected access to quiz owned by another user");
            return Err(ServiceError::Forbidden);
        }
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ServiceError {
    let msg = msg.into();
    warn!("Rejected request: {}", msg);
    ServiceError::InvalidInput(msg)
}

fn require_name(raw: &str) -> ServiceResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(invalid("Quiz name required"));
    }
    Ok(name.to_string())
}

/// Parse the `gameData` payload into coordinates. Every entry is checked;
/// the first malformed one rejects the whole payload.
pub fn parse_locations(game_data: &str) -> ServiceResult<Vec<Location>> {
    let value: serde_json::Value =
        serde_json::from_str(game_data).map_err(|_| invalid("Invalid game data format"))?;
    let entries = value
        .as_array()
        .ok_or_else(|| invalid("Invalid game data format"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let pair = entry
                .get("location")
                .and_then(|loc| loc.as_array())
                .filter(|loc| loc.len() == 2)
                .ok_or_else(|| invalid(format!("Invalid location data at index {i}")))?;

            match (pair[0].as_f64(), pair[1].as_f64()) {
                (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                    Ok(Location::new(lat, lon))
                }
                _ => Err(invalid(format!(
                    "Location coordinates must be numbers at index {i}"
                ))),
            }
        })
        .collect()
}

/// Pair stored images with coordinates by position: the n-th upload gets the
/// n-th location.
pub fn bind_photos(
    images: Vec<String>,
    locations: Vec<Location>,
) -> ServiceResult<[NewPhoto; PHOTOS_PER_QUIZ]> {
    if images.len() != locations.len() {
        return Err(invalid(format!(
            "Number of location data ({}) must match number of images ({})",
            locations.len(),
            images.len()
        )));
    }

    let count = images.len();
    let photos: Vec<NewPhoto> = images
        .into_iter()
        .zip(locations)
        .map(|(image_path, location)| NewPhoto { image_path, location })
        .collect();

    photos.try_into().map_err(|_| {
        invalid(format!(
            "Exactly {PHOTOS_PER_QUIZ} photos required (received {count})"
        ))
    })
}

fn summary_from_row(row: QuizRow) -> QuizSummary {
    let created_at = row.created_at_utc().unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on quiz {}", row.created_at, row.id);
        chrono::DateTime::default()
    });
    QuizSummary {
        id: row.id,
        name: row.name,
        created_at,
        creator_name: row.creator_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY_TOUR: &str =
        r#"[{"location":[48.8,2.3]},{"location":[51.5,-0.1]},{"location":[40.7,-74.0]},{"location":[35.6,139.7]},{"location":[-33.8,151.2]}]"#;

    fn images(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("images/photo_{i}.jpg")).collect()
    }

    fn service(mode: AttributionMode) -> (QuizService, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        (QuizService::new(db.clone(), mode), db)
    }

    fn user(db: &Database, name: &str) -> Caller {
        let id = db.create_user(name, "hash").unwrap();
        Caller::User {
            id,
            username: name.to_string(),
        }
    }

    fn city_tour_request() -> CreateQuiz {
        CreateQuiz {
            name: "City Tour".into(),
            creator_name: None,
            game_data: Some(CITY_TOUR.into()),
            images: images(5),
        }
    }

    #[tokio::test]
    async fn create_binds_locations_in_upload_order() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");

        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();
        assert_eq!(quiz.name, "City Tour");

        let photos = svc.list_photos(&alice, quiz.id).await.unwrap();
        let locations: Vec<[f64; 2]> = photos.iter().map(|p| p.location.into()).collect();
        assert_eq!(
            locations,
            vec![[48.8, 2.3], [51.5, -0.1], [40.7, -74.0], [35.6, 139.7], [-33.8, 151.2]]
        );
        let paths: Vec<&str> = photos.iter().map(|p| p.image.as_str()).collect();
        assert_eq!(paths, images(5));
    }

    #[tokio::test]
    async fn create_rejects_wrong_image_counts_without_writing() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");

        for count in [4, 6] {
            let req = CreateQuiz {
                images: images(count),
                ..city_tour_request()
            };
            let err = svc.create_quiz(&alice, req).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "got {err:?}");
        }
        assert_eq!(db.count_quizzes().unwrap(), 0);
    }

    #[tokio::test]
    async fn create_rejects_malformed_metadata_without_writing() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");

        let bad_payloads = [
            "not json".to_string(),
            r#"{"location":[1,2]}"#.to_string(),
            CITY_TOUR.replace("[35.6,139.7]", r#"["35.6",139.7]"#),
            CITY_TOUR.replace("[35.6,139.7]", "[35.6]"),
            CITY_TOUR.replace(r#",{"location":[-33.8,151.2]}"#, ""),
        ];

        for payload in bad_payloads {
            let req = CreateQuiz {
                game_data: Some(payload.clone()),
                ..city_tour_request()
            };
            let err = svc.create_quiz(&alice, req).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{payload}: {err:?}");
        }

        let missing = CreateQuiz {
            game_data: None,
            ..city_tour_request()
        };
        assert!(svc.create_quiz(&alice, missing).await.is_err());
        assert_eq!(db.count_quizzes().unwrap(), 0);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let req = CreateQuiz {
            name: "   ".into(),
            ..city_tour_request()
        };
        let err = svc.create_quiz(&alice, req).await.unwrap_err();
        assert_eq!(err.to_string(), "Quiz name required");
    }

    #[tokio::test]
    async fn other_users_are_forbidden() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();

        assert!(matches!(
            svc.list_photos(&bob, quiz.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            svc.update_quiz(&bob, quiz.id, UpdateQuiz { name: Some("Mine".into()), ..Default::default() }).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            svc.delete_quiz(&bob, quiz.id).await,
            Err(ServiceError::Forbidden)
        ));

        assert!(svc.list_quizzes(&bob).await.unwrap().is_empty());
        assert_eq!(db.get_quiz(quiz.id).unwrap().unwrap().name, "City Tour");
        assert_eq!(db.count_photos(quiz.id).unwrap(), 5);
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        assert!(matches!(svc.list_photos(&alice, 7).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.delete_quiz(&alice, 7).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn anonymous_caller_needs_a_token_in_authenticated_mode() {
        let (svc, _db) = service(AttributionMode::Authenticated);
        let err = svc.list_quizzes(&Caller::Anonymous).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn update_with_mismatched_counts_touches_nothing() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();

        let req = UpdateQuiz {
            name: Some("Renamed".into()),
            game_data: Some(CITY_TOUR.into()),
            images: images(3),
        };
        let err = svc.update_quiz(&alice, quiz.id, req).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let photos = db.list_photos(quiz.id).unwrap();
        assert_eq!(photos.len(), 5);
        assert_eq!(db.get_quiz(quiz.id).unwrap().unwrap().name, "City Tour");
    }

    #[tokio::test]
    async fn update_replaces_full_photo_set() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();

        let new_images: Vec<String> = (0..5).map(|i| format!("images/new_{i}.jpg")).collect();
        let req = UpdateQuiz {
            name: Some("  ".into()),
            game_data: Some(
                r#"[{"location":[1,1]},{"location":[2,2]},{"location":[3,3]},{"location":[4,4]},{"location":[5,5]}]"#.into(),
            ),
            images: new_images.clone(),
        };
        let outcome = svc.update_quiz(&alice, quiz.id, req).await.unwrap();

        assert_eq!(outcome.quiz.name, "City Tour");
        assert_eq!(outcome.replaced_images, images(5));

        let photos = db.list_photos(quiz.id).unwrap();
        assert_eq!(photos.len(), 5);
        assert_eq!(photos[0].image_path, new_images[0]);
        assert_eq!(photos[4].location, Location::new(5.0, 5.0));
    }

    #[tokio::test]
    async fn update_name_only_keeps_photos() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();

        let req = UpdateQuiz {
            name: Some(" Night Tour ".into()),
            ..Default::default()
        };
        let outcome = svc.update_quiz(&alice, quiz.id, req).await.unwrap();
        assert_eq!(outcome.quiz.name, "Night Tour");
        assert!(outcome.replaced_images.is_empty());
        assert_eq!(db.list_photos(quiz.id).unwrap()[0].image_path, "images/photo_0.jpg");
    }

    #[tokio::test]
    async fn update_rejects_fewer_than_five_even_when_counts_match() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();

        let req = UpdateQuiz {
            name: None,
            game_data: Some(r#"[{"location":[1,1]},{"location":[2,2]}]"#.into()),
            images: images(2),
        };
        assert!(svc.update_quiz(&alice, quiz.id, req).await.is_err());
        assert_eq!(db.count_photos(quiz.id).unwrap(), 5);
    }

    #[tokio::test]
    async fn delete_removes_quiz_and_photos() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();

        let removed = svc.delete_quiz(&alice, quiz.id).await.unwrap();
        assert_eq!(removed.len(), 5);
        assert!(matches!(
            svc.list_photos(&alice, quiz.id).await,
            Err(ServiceError::NotFound)
        ));
        assert_eq!(db.count_photos(quiz.id).unwrap(), 0);
    }

    #[tokio::test]
    async fn anonymous_mode_requires_creator_and_lists_everything() {
        let (svc, _db) = service(AttributionMode::Anonymous);

        let err = svc
            .create_quiz(&Caller::Anonymous, city_tour_request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Creator name required");

        let req = CreateQuiz {
            creator_name: Some("Dana".into()),
            ..city_tour_request()
        };
        let quiz = svc.create_quiz(&Caller::Anonymous, req).await.unwrap();

        let listed = svc.list_quizzes(&Caller::Anonymous).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, quiz.id);
        assert_eq!(listed[0].creator_name.as_deref(), Some("Dana"));

        svc.delete_quiz(&Caller::Anonymous, quiz.id).await.unwrap();
    }

    #[tokio::test]
    async fn update_of_quiz_deleted_after_authorize_is_not_found() {
        let (svc, db) = service(AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz = svc.create_quiz(&alice, city_tour_request()).await.unwrap();
        // The ownership check passed; the quiz vanishes before the write.
        db.delete_quiz(quiz.id).unwrap();

        let err = db.update_quiz(quiz.id, Some("Ghost"), None).unwrap_err();
        assert!(matches!(err, DbError::NotFound), "got {err:?}");

        let req = UpdateQuiz {
            name: Some("Ghost".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_quiz(&alice, quiz.id, req).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn interleaved_requests_keep_five_photos() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::open(&dir.path().join("quiz.db")).unwrap());
        let svc = QuizService::new(db.clone(), AttributionMode::Authenticated);
        let alice = user(&db, "alice");
        let quiz_id = svc.create_quiz(&alice, city_tour_request()).await.unwrap().id;

        let mut tasks = tokio::task::JoinSet::new();

        for round in 0..8 {
            let (svc, alice) = (svc.clone(), alice.clone());
            tasks.spawn(async move {
                let req = UpdateQuiz {
                    name: Some(format!("Round {round}")),
                    game_data: Some(CITY_TOUR.into()),
                    images: (0..5).map(|i| format!("images/r{round}_{i}.jpg")).collect(),
                };
                match svc.update_quiz(&alice, quiz_id, req).await {
                    Ok(outcome) => assert_eq!(outcome.replaced_images.len(), 5),
                    Err(ServiceError::NotFound) => {}
                    Err(e) => panic!("update failed: {e:?}"),
                }
            });
        }

        for _ in 0..4 {
            let (svc, alice) = (svc.clone(), alice.clone());
            tasks.spawn(async move {
                for _ in 0..25 {
                    match svc.list_photos(&alice, quiz_id).await {
                        Ok(photos) => assert_eq!(photos.len(), 5),
                        Err(ServiceError::NotFound) => {}
                        Err(e) => panic!("read failed: {e:?}"),
                    }
                    tokio::task::yield_now().await;
                }
            });
        }

        {
            let (svc, alice) = (svc.clone(), alice.clone());
            tasks.spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                match svc.delete_quiz(&alice, quiz_id).await {
                    Ok(removed) => assert_eq!(removed.len(), 5),
                    Err(e) => panic!("delete failed: {e:?}"),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        assert!(db.get_quiz(quiz_id).unwrap().is_none());
        assert_eq!(db.count_photos(quiz_id).unwrap(), 0);
    }

    #[test]
    fn bind_pairs_by_position() {
        let locations = vec![Location::new(1.0, 1.0); 5];
        let photos = bind_photos(images(5), locations).unwrap();
        assert_eq!(photos[3].image_path, "images/photo_3.jpg");

        assert!(bind_photos(images(5), vec![Location::new(0.0, 0.0); 4]).is_err());
    }

    #[test]
    fn parse_reports_first_bad_index() {
        let err = parse_locations(r#"[{"location":[1,2]},{"location":[1,"x"]}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Location coordinates must be numbers at index 1");

        let err = parse_locations(r#"[{"where":[1,2]}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid location data at index 0");
    }
}
