use axum::{Json, debug_handler, extract::State, response::IntoResponse};
use serde_json::json;

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::model::{ChatType, MessageDraft};
use crate::service::ChatService;
use crate::AppState;

#[debug_handler(state = AppState)]
pub(crate) async fn send_private(
    State(service): State<ChatService>,
    principal: Principal,
    Json(draft): Json<MessageDraft>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("processing private message request from {}", principal.0);
    service
        .send(Some(&principal.0), &draft, ChatType::Private)
        .await?;
    Ok(Json(json!({ "message": "Message sent successfully" })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_group(
    State(service): State<ChatService>,
    principal: Principal,
    Json(draft): Json<MessageDraft>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!("processing group message request from {}", principal.0);
    service
        .send(Some(&principal.0), &draft, ChatType::Group)
        .await?;
    Ok(Json(json!({ "message": "Message sent successfully" })))
}
