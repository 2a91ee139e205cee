use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::JwtKeys;
use crate::error::ApiError;

/// The identity string the auth layer established for this request. Handlers
/// take it as an explicit parameter; nothing downstream reaches into request
/// context for "the current user".
#[derive(Debug, Clone)]
pub struct Principal(pub String);

impl<S> FromRequestParts<S> for Principal
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| keys.verify(token))
            .map(Principal)
            .ok_or_else(|| ApiError::Authorization("No authenticated user found".into()))
    }
}
