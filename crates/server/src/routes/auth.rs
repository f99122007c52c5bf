use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use argon2::{PasswordHasher, PasswordVerifier};

use crate::error::ApiError;
use crate::middleware::auth::{extract_token, SESSION_COOKIE};
use crate::models::{SessionResponse, SessionUser, SignInRequest, SignUpRequest};
use crate::AppState;

/// POST /api/auth/sign-up/email
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.trim().to_lowercase();
    let username = body.username.trim().to_string();

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidInput("A valid email is required".into()));
    }
    ripple_shared::validation::validate_username(&username).map_err(ApiError::InvalidInput)?;
    ripple_shared::validation::validate_password(&body.password).map_err(ApiError::InvalidInput)?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;
    if exists > 0 {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(&username)
        .fetch_one(&state.db)
        .await?;
    if exists > 0 {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let salt = argon2::password_hash::SaltString::generate(&mut rand::rngs::OsRng);
    let password_hash = argon2::Argon2::default()
        .hash_password(body.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hash failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, username, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(&username)
    .bind(&email)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    sqlx::query(
        "INSERT INTO accounts (id, user_id, provider, password_hash, created_at) \
         VALUES (?, ?, 'credential', ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(&user_id)
    .bind(&password_hash)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let (token, headers) = create_session(&state, &user_id).await?;

    Ok((
        StatusCode::OK,
        headers,
        Json(SessionResponse {
            user: SessionUser {
                id: user_id,
                email,
                username,
                image: None,
            },
            token: Some(token),
        }),
    ))
}

/// POST /api/auth/sign-in/email
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, (String, String, String, Option<String>)>(
        "SELECT id, email, username, image FROM users WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    let (user_id, user_email, username, image) = match user {
        Some(u) => u,
        None => return Err(ApiError::Unauthorized),
    };

    let stored_hash = sqlx::query_scalar::<_, String>(
        "SELECT password_hash FROM accounts WHERE user_id = ? AND provider = 'credential'",
    )
    .bind(&user_id)
    .fetch_optional(&state.db)
    .await?;

    let stored_hash = match stored_hash {
        Some(h) => h,
        None => return Err(ApiError::Unauthorized),
    };

    let parsed_hash = argon2::PasswordHash::new(&stored_hash)
        .map_err(|e| ApiError::Internal(format!("corrupt password hash: {}", e)))?;

    if argon2::Argon2::default()
        .verify_password(body.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::Unauthorized);
    }

    let (token, headers) = create_session(&state, &user_id).await?;

    Ok((
        StatusCode::OK,
        headers,
        Json(SessionResponse {
            user: SessionUser {
                id: user_id,
                email: user_email,
                username,
                image,
            },
            token: Some(token),
        }),
    ))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_token(&headers) {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(&token)
            .execute(&state.db)
            .await?;
    }

    // Clear cookie
    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    let mut resp_headers = HeaderMap::new();
    resp_headers.insert("set-cookie", cookie.parse().unwrap());

    Ok((StatusCode::OK, resp_headers, Json(serde_json::json!({}))))
}

/// GET /api/auth/get-session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = match extract_token(&headers) {
        Some(t) => t,
        None => return Ok(Json(serde_json::json!(null))),
    };

    let row = sqlx::query_as::<_, (String, String, String, Option<String>, String)>(
        "SELECT u.id, u.email, u.username, u.image, s.expires_at
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?",
    )
    .bind(&token)
    .fetch_optional(&state.db)
    .await?;

    match row {
        Some((id, email, username, image, expires_at)) => {
            let now = chrono::Utc::now().to_rfc3339();
            if expires_at < now {
                return Ok(Json(serde_json::json!(null)));
            }
            Ok(Json(serde_json::json!({
                "user": {
                    "id": id,
                    "email": email,
                    "username": username,
                    "image": image,
                }
            })))
        }
        None => Ok(Json(serde_json::json!(null))),
    }
}

async fn create_session(
    state: &AppState,
    user_id: &str,
) -> Result<(String, HeaderMap), ApiError> {
    let token = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now();
    let ttl = chrono::Duration::days(state.config.session_ttl_days);

    sqlx::query(
        "INSERT INTO sessions (id, user_id, token, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(&token)
    .bind((now + ttl).to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(&state.db)
    .await?;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        "set-cookie",
        cookie
            .parse()
            .map_err(|_| ApiError::Internal("invalid cookie header".into()))?,
    );

    Ok((token, headers))
}
