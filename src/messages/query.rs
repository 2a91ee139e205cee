use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::model::Message;
use crate::service::ChatService;
use crate::AppState;

#[derive(Deserialize)]
pub(crate) struct ConversationQuery {
    since: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct SearchQuery {
    keyword: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    State(service): State<ChatService>,
    principal: Principal,
    Path(other_user_id): Path<String>,
    Query(ConversationQuery { since }): Query<ConversationQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    tracing::info!(
        "fetching new private messages for conversation with {other_user_id}, since: {since:?}"
    );
    let messages = service
        .conversation(Some(&principal.0), &other_user_id, since.as_deref())
        .await?;
    Ok(Json(messages))
}

#[debug_handler(state = AppState)]
pub(crate) async fn history(
    State(service): State<ChatService>,
    principal: Principal,
    Path(other_user_id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    tracing::info!("fetching chat history with {other_user_id}");
    let messages = service.history(Some(&principal.0), &other_user_id).await?;
    Ok(Json(messages))
}

// No principal: the group feed is readable without one.
#[debug_handler(state = AppState)]
pub(crate) async fn group_feed(
    State(service): State<ChatService>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    tracing::info!("fetching group messages for {group_id}");
    let messages = service.group_feed(&group_id).await?;
    Ok(Json(messages))
}

#[debug_handler(state = AppState)]
pub(crate) async fn search(
    State(service): State<ChatService>,
    principal: Principal,
    Query(SearchQuery { keyword, start, end }): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    tracing::info!("searching messages with keyword: {keyword:?}, start: {start:?}, end: {end:?}");
    let messages = service
        .search(
            Some(&principal.0),
            keyword.as_deref(),
            start.as_deref(),
            end.as_deref(),
        )
        .await?;
    Ok(Json(messages))
}
