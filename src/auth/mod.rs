mod principal;
mod token;

pub use principal::Principal;
pub use token::JwtKeys;

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::model::User;
use crate::store::Store;

/// Credential issuance lives here, at the edge; the message core never sees
/// passwords or tokens, only the resolved principal.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/auth/login", post(login))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    username: Option<String>,
    password: Option<String>,
    birthdate: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(store): State<Store>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = match req.username.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_owned(),
        _ => return Err(ApiError::Validation("Missing username".into())),
    };
    let password = match req.password.as_deref() {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(ApiError::Validation("Missing password".into())),
    };
    tracing::info!("received registration request for {username}");

    // An email is optional, but a present one must be non-blank and unique.
    if matches!(req.email.as_deref(), Some(e) if e.trim().is_empty()) {
        return Err(ApiError::Validation(
            "Email cannot be empty if provided".into(),
        ));
    }

    if store.user_by_username(&username).await?.is_some() {
        return Err(ApiError::Validation("Username already registered".into()));
    }
    if let Some(email) = req.email.as_deref() {
        if store.user_by_email(email).await?.is_some() {
            return Err(ApiError::Validation("Email already registered".into()));
        }
    }

    // Birthdates arrive as dd-MM-yyyy.
    let birthdate = match req.birthdate.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(s) => Some(NaiveDate::parse_from_str(s, "%d-%m-%Y").map_err(|_| {
            ApiError::Validation(format!("Invalid birthdate format: {s}"))
        })?),
    };

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Storage(format!("Failed to hash password: {e}")))?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.clone(),
        password_hash,
        birthdate,
        email: req.email,
        phone: req.phone,
        avatar_url: req.avatar_url,
    };
    store.create_user(&user).await?;
    tracing::info!("registered user {} ({})", user.username, user.id);

    Ok(Json(json!({
        "message": "User registered successfully",
        "id": user.id,
        "username": user.username,
        "email": user.email,
    })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(store): State<Store>,
    State(keys): State<JwtKeys>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(username), Some(password)) = (req.username.as_deref(), req.password.as_deref())
    else {
        return Err(ApiError::Validation("Missing username or password".into()));
    };
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Missing username or password".into()));
    }
    tracing::info!("authenticating user: {username}");

    let user = store
        .user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::Authorization("Invalid credentials".into()))?;

    let verified = bcrypt::verify(password, &user.password_hash)
        .map_err(|e| ApiError::Storage(format!("Failed to verify password: {e}")))?;
    if !verified {
        return Err(ApiError::Authorization("Invalid credentials".into()));
    }

    let token = keys.issue(&user.username)?;
    tracing::info!("authentication successful for user: {username}");
    Ok(Json(json!({ "token": token })))
}
