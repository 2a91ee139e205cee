use axum::{
    Json, Router, debug_handler, extract::State, response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::model::Group;
use crate::store::Store;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/groups/create", post(create_group))
        .route("/api/groups", get(list_groups))
}

#[derive(Deserialize)]
pub(crate) struct CreateGroupRequest {
    name: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_group(
    State(store): State<Store>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = match req.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_owned(),
        _ => return Err(ApiError::Validation("Missing group name".into())),
    };
    tracing::info!("received group creation request: {name}");

    if store.group_by_name(&name).await?.is_some() {
        return Err(ApiError::Validation("Group name already exists".into()));
    }

    let group = Group {
        id: Uuid::new_v4().to_string(),
        name,
    };
    store.create_group(&group).await?;

    Ok(Json(json!({
        "message": "Group created successfully",
        "id": group.id,
        "name": group.name,
    })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_groups(State(store): State<Store>) -> ApiResult<impl IntoResponse> {
    let groups = store
        .all_groups()
        .await
        .map_err(|e| ApiError::Storage(e.to_string()))?;
    tracing::info!("retrieved {} groups", groups.len());

    let listing: Vec<_> = groups
        .iter()
        .map(|g| json!({ "id": g.id, "name": g.name }))
        .collect();
    Ok(Json(listing))
}
