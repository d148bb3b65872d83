use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{error, info, warn};

use geoquiz_types::api::{AuthResponse, Claims, LoginRequest, SignupRequest, UserInfo};

use crate::error::{ServiceError, ServiceResult};
use crate::state::{AppState, AppStateInner};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = create_account(&state, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(authenticate(&state, req).await?))
}

/// Validate, hash and insert a new account, then issue a session token.
pub async fn create_account(state: &AppStateInner, req: SignupRequest) -> ServiceResult<AuthResponse> {
    validate_credentials(&req.username, &req.password)?;

    let db = state.db.clone();
    let username = req.username.clone();
    let user_id = tokio::task::spawn_blocking(move || {
        // Hash password with Argon2id
        let password_hash = hash_password(&req.password)?;
        // The UNIQUE constraint is the authority on taken usernames.
        db.create_user(&req.username, &password_hash).map_err(|e| {
            if e.is_unique_violation() {
                ServiceError::Conflict("Username already exists".into())
            } else {
                ServiceError::from(e)
            }
        })
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ServiceError::Internal("signup task failed".into())
    })??;

    let token = create_token(&state.jwt_secret, state.token_ttl, user_id, &username)?;
    info!(user_id, "Account created for {}", username);

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo {
            id: user_id,
            username,
        },
    })
}

/// Check credentials and issue a session token. Unknown user and wrong
/// password are indistinguishable to the caller.
pub async fn authenticate(state: &AppStateInner, req: LoginRequest) -> ServiceResult<AuthResponse> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ServiceError::InvalidInput("Username and password required".into()));
    }

    let db = state.db.clone();
    let user = tokio::task::spawn_blocking(move || {
        let user = db.get_user_by_username(&req.username)?;
        Ok::<_, ServiceError>(user.filter(|u| verify_password(&req.password, &u.password_hash)))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ServiceError::Internal("login task failed".into())
    })??
    .ok_or_else(|| {
        warn!("Failed login attempt");
        ServiceError::Unauthorized("Invalid username or password".into())
    })?;

    let token = create_token(&state.jwt_secret, state.token_ttl, user.id, &user.username)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    })
}

pub fn validate_credentials(username: &str, password: &str) -> ServiceResult<()> {
    if username.is_empty() || password.is_empty() {
        return Err(ServiceError::InvalidInput("Username and password required".into()));
    }
    if username.len() < MIN_USERNAME_LEN || username.len() > MAX_USERNAME_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "Username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ServiceError::InvalidInput(
            "Username can only contain letters, numbers, underscores, and hyphens".into(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn create_token(
    secret: &str,
    ttl: chrono::Duration,
    user_id: i64,
    username: &str,
) -> ServiceResult<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(ttl)
        .and_then(|expires| usize::try_from(expires.timestamp()).ok())
        .ok_or_else(|| ServiceError::Internal(format!("invalid token lifetime {ttl}")))?;

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Internal(format!("token encoding failed: {e}")))
}

pub fn decode_token(secret: &str, token: &str) -> ServiceResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ServiceError::Unauthorized("Invalid or expired token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageStore;
    use geoquiz_db::Database;
    use geoquiz_types::models::AttributionMode;
    use std::sync::Arc;

    const SECRET: &str = "test-secret";

    async fn state(dir: &tempfile::TempDir) -> AppState {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let images = ImageStore::new(dir.path().join("images")).await.unwrap();
        AppStateInner::new(
            db,
            images,
            AttributionMode::Authenticated,
            SECRET.into(),
            chrono::Duration::hours(24),
        )
    }

    fn signup_req(username: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn credential_rules() {
        assert!(validate_credentials("ab", "longenough").is_err());
        assert!(validate_credentials("has space", "longenough").is_err());
        assert!(validate_credentials("émile", "longenough").is_err());
        assert!(validate_credentials("alice", "short").is_err());
        assert!(validate_credentials("", "").is_err());
        assert!(validate_credentials("al_ice-9", "longenough").is_ok());
    }

    #[test]
    fn token_round_trip_and_tamper() {
        let token = create_token(SECRET, chrono::Duration::hours(1), 42, "alice").unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");

        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(SECRET, chrono::Duration::hours(-2), 1, "alice").unwrap();
        assert!(matches!(
            decode_token(SECRET, &token),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn expiry_before_the_epoch_is_an_error() {
        // A negative timestamp must not wrap to a far-future expiry.
        let err = create_token(SECRET, chrono::Duration::hours(-600_000), 1, "alice").unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn signup_then_login() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;

        let created = create_account(&state, signup_req("alice", "password123")).await.unwrap();
        assert_eq!(created.user.username, "alice");
        assert_eq!(decode_token(SECRET, &created.token).unwrap().sub, created.user.id);

        let logged_in = authenticate(
            &state,
            LoginRequest {
                username: "alice".into(),
                password: "password123".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user.id, created.user.id);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;

        create_account(&state, signup_req("alice", "password123")).await.unwrap();
        let err = create_account(&state, signup_req("alice", "different1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        create_account(&state, signup_req("alice", "password123")).await.unwrap();

        let wrong = authenticate(
            &state,
            LoginRequest {
                username: "alice".into(),
                password: "password124".into(),
            },
        )
        .await
        .unwrap_err();
        let unknown = authenticate(
            &state,
            LoginRequest {
                username: "nobody".into(),
                password: "password123".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong, ServiceError::Unauthorized(_)));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }
}
