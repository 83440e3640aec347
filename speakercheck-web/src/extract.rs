use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use speakercheck_data::auth::{authorize, Action};
use speakercheck_data::db::sessions;
use speakercheck_data::{DataError, User};

use crate::error::ApiError;
use crate::state::AppState;

/// The user behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    pub fn authorize(&self, action: Action) -> Result<(), ApiError> {
        authorize(&self.user, action).map_err(|err| {
            tracing::warn!(user = %self.user.username, %action, "forbidden");
            ApiError::from(err)
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(DataError::Unauthenticated)?
            .to_string();

        let conn = state.conn().await;
        let user = sessions::user_for_token(&conn, &token)?.ok_or(DataError::Unauthenticated)?;
        Ok(CurrentUser { user, token })
    }
}
