use axum::{
    debug_handler,
    extract::{Path, State, WebSocketUpgrade, ws::WebSocket},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::AppState;
use crate::fanout::{Channel, Fanout};
use crate::model::Message;

#[debug_handler(state = AppState)]
pub(crate) async fn private_ws(
    Path(user_id): Path<String>,
    State(fanout): State<Fanout>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = fanout.subscribe(Channel::Private(user_id));
    ws.on_upgrade(move |socket| forward(socket, rx))
}

#[debug_handler(state = AppState)]
pub(crate) async fn group_ws(
    Path(group_id): Path<String>,
    State(fanout): State<Fanout>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = fanout.subscribe(Channel::Group(group_id));
    ws.on_upgrade(move |socket| forward(socket, rx))
}

/// Pushes every broadcast item down the socket as a JSON text frame. The
/// receive side only drains client frames so closes are noticed; inbound
/// traffic is otherwise ignored, sending goes through the HTTP endpoints.
async fn forward(socket: WebSocket, mut rx: broadcast::Receiver<Message>) {
    let (mut sender, mut receiver) = socket.split();

    let mut push_task = tokio::spawn(async move {
        while let Ok(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(text.into()).await.is_err() {
                break;
            }
        }
    });

    let mut drain_task = tokio::spawn(async move {
        while let Some(Ok(_)) = receiver.next().await {}
    });

    tokio::select! {
        _ = &mut push_task => drain_task.abort(),
        _ = &mut drain_task => push_task.abort(),
    };
}
