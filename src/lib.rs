pub mod auth;
pub mod db;
pub mod error;
pub mod fanout;
pub mod groups;
pub mod identity;
pub mod messages;
pub mod model;
pub mod service;
pub mod store;
pub mod users;

use axum::{Router, extract::FromRef};
use sqlx::SqlitePool;

use crate::auth::JwtKeys;
use crate::fanout::Fanout;
use crate::identity::IdentityVerifier;
use crate::service::ChatService;
use crate::store::Store;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub service: ChatService,
    pub store: Store,
    pub fanout: Fanout,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Explicit wiring: the service gets its collaborators handed to it, and
    /// the state keeps clones of the shared ones for the edge handlers.
    pub fn new(pool: SqlitePool, jwt_secret: &[u8]) -> Self {
        let store = Store::new(pool);
        let verifier = IdentityVerifier::new(store.clone());
        let fanout = Fanout::new();
        let service = ChatService::new(store.clone(), verifier, fanout.clone());
        Self {
            service,
            store,
            fanout,
            jwt: JwtKeys::from_secret(jwt_secret),
        }
    }
}

/// The full route table over a given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/messages", messages::router())
        .nest("/api/ws", messages::ws_router())
        .merge(auth::router())
        .merge(users::router())
        .merge(groups::router())
        .with_state(state)
}
