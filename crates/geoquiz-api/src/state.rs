use std::sync::Arc;

use geoquiz_db::Database;
use geoquiz_types::models::AttributionMode;

use crate::images::ImageStore;
use crate::service::QuizService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub quizzes: QuizService,
    pub images: ImageStore,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
}

impl AppStateInner {
    pub fn new(
        db: Arc<Database>,
        images: ImageStore,
        mode: AttributionMode,
        jwt_secret: String,
        token_ttl: chrono::Duration,
    ) -> AppState {
        Arc::new(Self {
            quizzes: QuizService::new(db.clone(), mode),
            db,
            images,
            jwt_secret,
            token_ttl,
        })
    }

    pub fn mode(&self) -> AttributionMode {
        self.quizzes.mode()
    }
}
