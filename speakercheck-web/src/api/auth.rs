use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use speakercheck_data::auth;
use speakercheck_data::db::{sessions, users};
use speakercheck_data::{AuthResponse, Credentials, DataError, User};

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// POST /auth/login
///
/// The connection lock is released while bcrypt runs on the blocking pool.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(credentials) = body?;
    let (username, password) = users::validate_credentials(&credentials)?;

    let (user, hash) = users::find_by_username(&*state.conn().await, username)?
        .ok_or(DataError::InvalidCredentials)?;
    let password = password.to_string();
    let user =
        tokio::task::spawn_blocking(move || users::check_password(user, &password, &hash))
            .await??;

    let token = sessions::create(&*state.conn().await, &user.id)?;
    info!(user = %user.username, "logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(credentials) = body?;
    let (username, password) = users::validate_credentials(&credentials)?;

    let password = password.to_string();
    let cost = state.bcrypt_cost();
    let password_hash =
        tokio::task::spawn_blocking(move || auth::hash_password(&password, cost)).await??;

    let conn = state.conn().await;
    let user = users::register_hashed(&conn, username, &password_hash)?;
    let token = sessions::create(&conn, &user.id)?;
    info!(user = %user.username, role = %user.role, "registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// GET /auth/me
pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let conn = state.conn().await;
    sessions::revoke(&conn, &current.token)?;
    info!(user = %current.user.username, "logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use speakercheck_data::Role;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let state = AppState::in_memory(4).unwrap();

        let (status, registered) = register(State(state.clone()), Ok(Json(creds("root", "pw"))))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(registered.user.role, Role::Admin);

        let logged_in = login(State(state), Ok(Json(creds("root", "pw"))))
            .await
            .unwrap();
        assert_eq!(logged_in.user, registered.user);
        assert_ne!(logged_in.token, registered.token);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let state = AppState::in_memory(4).unwrap();
        register(State(state.clone()), Ok(Json(creds("root", "pw"))))
            .await
            .unwrap();

        let err = login(State(state), Ok(Json(creds("root", "bad"))))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Data(DataError::InvalidCredentials)));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_keeps_password_whitespace() {
        let state = AppState::in_memory(4).unwrap();
        register(State(state.clone()), Ok(Json(creds("root", " pw "))))
            .await
            .unwrap();

        let err = login(State(state.clone()), Ok(Json(creds("root", "pw"))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let ok = login(State(state), Ok(Json(creds("root", " pw "))))
            .await
            .unwrap();
        assert_eq!(ok.user.username, "root");
    }

    #[tokio::test]
    async fn test_lock_is_free_while_hashing() {
        let state = AppState::in_memory(10).unwrap();
        let registering = tokio::spawn(register(
            State(state.clone()),
            Ok(Json(creds("root", "pw"))),
        ));

        // A cost-10 hash takes far longer than this lock acquisition.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let guard = tokio::time::timeout(std::time::Duration::from_millis(50), state.conn())
            .await
            .expect("connection lock should not be held during bcrypt");
        drop(guard);

        let (status, _) = registering.await.unwrap().unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }
}
