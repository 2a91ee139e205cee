pub mod assemble;
mod query;
mod send;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// The `/api/messages` surface.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/private", post(send::send_private))
        .route("/group", post(send::send_group))
        .route("/private/conversation/{other_user_id}", get(query::conversation))
        .route("/private/history/{other_user_id}", get(query::history))
        .route("/group/{group_id}", get(query::group_feed))
        .route("/search", get(query::search))
}

/// The `/api/ws` surface: push-channel subscriptions.
pub fn ws_router() -> Router<AppState> {
    Router::new()
        .route("/private/{user_id}", get(ws::private_ws))
        .route("/group/{group_id}", get(ws::group_ws))
}
