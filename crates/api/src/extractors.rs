//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use lodgebook_shared::types::UserId;

use crate::ApiError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user performing a mutating request.
///
/// There is no authentication; the id is recorded as an audit value on
/// whatever the request writes.
///
/// ```ignore
/// async fn handler(user: ActingUser) -> impl IntoResponse {
///     let user_id = user.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

impl ActingUser {
    /// Returns the acting user's id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::validation("X-User-Id header is required"))?;

        raw.trim()
            .parse::<UserId>()
            .map(ActingUser)
            .map_err(|_| ApiError::validation("X-User-Id must be a UUID"))
    }
}
