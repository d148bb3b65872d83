use serde::{Deserialize, Serialize};

use crate::models::{PhotoView, QuizSummary};

// -- JWT Claims --

/// Session token claims. `sub` is the integer user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

// -- Quizzes --

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizListResponse {
    pub success: bool,
    pub quizzes: Vec<QuizSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoListResponse {
    pub success: bool,
    pub photos: Vec<PhotoView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRef {
    pub id: i64,
    pub name: String,
}

/// Returned by create and update.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuizMutationResponse {
    pub success: bool,
    pub message: String,
    pub quiz: QuizRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}
