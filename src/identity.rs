use crate::error::{ApiError, ApiResult};
use crate::model::User;
use crate::store::Store;

/// Maps the externally-authenticated principal (a username) to the internal
/// user record. Authorization decisions downstream compare resolved ids,
/// never the transport-layer identity string.
#[derive(Clone)]
pub struct IdentityVerifier {
    store: Store,
}

impl IdentityVerifier {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, username: &str) -> ApiResult<User> {
        self.store
            .user_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User not found: {username}")))
    }
}
