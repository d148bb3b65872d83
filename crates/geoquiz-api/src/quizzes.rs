//! HTTP handlers for quizzes, including the multipart upload binding.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, warn};

use geoquiz_types::api::{
    MessageResponse, PhotoListResponse, QuizListResponse, QuizMutationResponse,
};
use geoquiz_types::models::PHOTOS_PER_QUIZ;

use crate::error::{ServiceError, ServiceResult};
use crate::images::ImageStore;
use crate::service::{Caller, CreateQuiz, UpdateQuiz};
use crate::state::AppState;

/// An image part held in memory until the whole form has been read.
struct ImagePart {
    file_name: Option<String>,
    data: Bytes,
}

/// Multipart body of create/update requests. `images` keeps part order.
#[derive(Default)]
struct QuizForm {
    quiz_name: Option<String>,
    game_data: Option<String>,
    creator_name: Option<String>,
    images: Vec<ImagePart>,
}

pub async fn list_quizzes(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<QuizListResponse>, ServiceError> {
    let quizzes = state.quizzes.list_quizzes(&caller).await?;
    Ok(Json(QuizListResponse {
        success: true,
        quizzes,
    }))
}

pub async fn list_photos(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    caller: Caller,
) -> Result<Json<PhotoListResponse>, ServiceError> {
    let photos = state.quizzes.list_photos(&caller, quiz_id).await?;
    Ok(Json(PhotoListResponse {
        success: true,
        photos,
    }))
}

/// POST /api/quizzes: `quizName`, `gameData`, five `images` (and `creatorName`
/// in anonymous deployments).
pub async fn create_quiz(
    State(state): State<AppState>,
    caller: Caller,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = read_form(multipart).await?;
    let images = store_images(&state.images, form.images).await?;

    let req = CreateQuiz {
        name: form.quiz_name.unwrap_or_default(),
        creator_name: form.creator_name,
        game_data: form.game_data,
        images: images.clone(),
    };

    match state.quizzes.create_quiz(&caller, req).await {
        Ok(quiz) => Ok((
            StatusCode::CREATED,
            Json(QuizMutationResponse {
                success: true,
                message: "Quiz created successfully!".into(),
                quiz,
            }),
        )),
        Err(e) => {
            // Nothing references these files now.
            state.images.remove_all(&images).await;
            Err(e)
        }
    }
}

/// PUT /api/quizzes/{id}: optional `quizName`; optional `images` with a
/// matching `gameData` array to replace the photo set.
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    caller: Caller,
    multipart: Multipart,
) -> Result<Json<QuizMutationResponse>, ServiceError> {
    let form = read_form(multipart).await?;
    let images = store_images(&state.images, form.images).await?;

    let req = UpdateQuiz {
        name: form.quiz_name,
        game_data: form.game_data,
        images: images.clone(),
    };

    match state.quizzes.update_quiz(&caller, quiz_id, req).await {
        Ok(outcome) => {
            state.images.remove_all(&outcome.replaced_images).await;
            Ok(Json(QuizMutationResponse {
                success: true,
                message: "Quiz updated successfully!".into(),
                quiz: outcome.quiz,
            }))
        }
        Err(e) => {
            state.images.remove_all(&images).await;
            Err(e)
        }
    }
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    caller: Caller,
) -> Result<Json<MessageResponse>, ServiceError> {
    let removed = state.quizzes.delete_quiz(&caller, quiz_id).await?;
    state.images.remove_all(&removed).await;

    Ok(Json(MessageResponse {
        success: true,
        message: "Quiz deleted successfully".into(),
    }))
}

async fn read_form(mut multipart: Multipart) -> ServiceResult<QuizForm> {
    let mut form = QuizForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(malformed)?;
                form.images.push(ImagePart { file_name, data });
            }
            "quizName" => form.quiz_name = Some(field.text().await.map_err(malformed)?),
            "gameData" => form.game_data = Some(field.text().await.map_err(malformed)?),
            "creatorName" => form.creator_name = Some(field.text().await.map_err(malformed)?),
            other => warn!("Ignoring unexpected multipart field '{}'", other),
        }
    }

    // No request ever carries more than a full photo set.
    if form.images.len() > PHOTOS_PER_QUIZ {
        warn!("Rejected upload with {} images", form.images.len());
        return Err(ServiceError::InvalidInput(format!(
            "Exactly {PHOTOS_PER_QUIZ} images required (received {})",
            form.images.len()
        )));
    }

    Ok(form)
}

/// Persist the uploaded parts in order. If one write fails, the ones already
/// written are removed again.
async fn store_images(store: &ImageStore, parts: Vec<ImagePart>) -> ServiceResult<Vec<String>> {
    let mut stored = Vec::with_capacity(parts.len());

    for part in parts {
        match store.save(part.file_name.as_deref(), &part.data).await {
            Ok(reference) => stored.push(reference),
            Err(e) => {
                error!("Failed to store uploaded image: {}", e);
                store.remove_all(&stored).await;
                return Err(ServiceError::Internal(format!("image storage failed: {e}")));
            }
        }
    }

    Ok(stored)
}

fn malformed(e: axum::extract::multipart::MultipartError) -> ServiceError {
    warn!("Malformed multipart body: {}", e);
    ServiceError::InvalidInput("Malformed multipart body".into())
}
