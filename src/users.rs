use axum::{
    Json, Router, debug_handler,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::AppState;
use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::service::ChatService;
use crate::store::Store;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/count", get(user_count))
        .route("/api/users/myInfo", get(my_info))
        .route("/api/users/{user_id}", get(get_user))
}

// A miss here is a 404, unlike the message paths where unknown users come
// back as 400.
#[debug_handler(state = AppState)]
pub(crate) async fn get_user(
    State(store): State<Store>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("fetching user with id: {user_id}");
    let user = store
        .user_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound(format!("User not found: {user_id}")))?;

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "birthdate": user.birthdate.map(|d| d.to_string()),
        "email": user.email,
        "phone": user.phone,
        "avatarUrl": user.avatar_url,
    })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_users(State(store): State<Store>) -> ApiResult<impl IntoResponse> {
    let users = store
        .all_users()
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    tracing::info!("retrieved {} users", users.len());

    let listing: Vec<_> = users
        .iter()
        .map(|u| json!({ "id": u.id, "username": u.username }))
        .collect();
    Ok(Json(listing))
}

#[debug_handler(state = AppState)]
pub(crate) async fn user_count(State(store): State<Store>) -> ApiResult<impl IntoResponse> {
    let count = store
        .count_users()
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    Ok(Json(json!({ "count": count })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn my_info(
    State(service): State<ChatService>,
    principal: Principal,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("fetching id for authenticated user: {}", principal.0);
    let user = service.verifier().resolve(&principal.0).await?;
    Ok(Json(json!({ "id": user.id })))
}
