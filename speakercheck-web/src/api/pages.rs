use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use speakercheck_data::auth::Action;
use speakercheck_data::db::pages;
use speakercheck_data::{DataError, NewPage, Page, PageUpdate};

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// GET /pages
pub async fn list_pages(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<Vec<Page>>, ApiError> {
    current.authorize(Action::ViewPages)?;
    let conn = state.conn().await;
    Ok(Json(pages::list(&conn)?))
}

/// POST /pages
pub async fn create_page(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    body: Result<Json<NewPage>, JsonRejection>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    current.authorize(Action::CreatePage)?;
    let Json(new) = body?;
    let conn = state.conn().await;

    let page = pages::create(&conn, &new)?;
    info!(actor = %current.user.username, page = %page.id, name = %page.name, "page created");
    Ok((StatusCode::CREATED, Json(page)))
}

/// PUT /pages/:id
pub async fn update_page(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<PageUpdate>, JsonRejection>,
) -> Result<Json<Page>, ApiError> {
    current.authorize(Action::UpdatePage)?;
    let Json(update) = body?;
    let conn = state.conn().await;

    let page = pages::update(&conn, &id, &update)?;
    info!(actor = %current.user.username, page = %page.id, "page updated");
    Ok(Json(page))
}

/// DELETE /pages/:id
pub async fn delete_page(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    current.authorize(Action::DeletePage)?;
    let conn = state.conn().await;

    match pages::delete(&conn, &id) {
        Ok(()) => {
            info!(actor = %current.user.username, page = %id, "page deleted");
            Ok(MessageResponse::new("Page deleted successfully"))
        }
        Err(err @ DataError::PageNotEmpty(_)) => {
            info!(actor = %current.user.username, page = %id, "refused to delete non-empty page");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speakercheck_data::db::{sessions, users};
    use speakercheck_data::{Role, User};

    async fn user_with_role(state: &Arc<AppState>, name: &str, role: Role) -> CurrentUser {
        let conn = state.conn().await;
        let user: User = users::insert(&conn, name, "hash", role).unwrap();
        let token = sessions::create(&conn, &user.id).unwrap();
        CurrentUser { user, token }
    }

    fn named(name: &str) -> NewPage {
        NewPage {
            name: Some(name.to_string()),
            order: None,
        }
    }

    #[tokio::test]
    async fn test_list_pages_empty() {
        let state = AppState::in_memory(4).unwrap();
        let user = user_with_role(&state, "alice", Role::User).await;
        let response = list_pages(State(state), user).await.unwrap();
        assert!(response.0.is_empty());
    }

    #[tokio::test]
    async fn test_admin_creates_and_renames_page() {
        let state = AppState::in_memory(4).unwrap();
        let admin = user_with_role(&state, "root", Role::Admin).await;

        let (status, page) = create_page(State(state.clone()), admin.clone(), Ok(Json(named("Weekly"))))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(page.order, 0);

        let renamed = update_page(
            State(state.clone()),
            admin.clone(),
            Path(page.id.clone()),
            Ok(Json(PageUpdate {
                name: Some("Weekly Speakers".to_string()),
                order: None,
            })),
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Weekly Speakers");

        let pages = list_pages(State(state), admin).await.unwrap();
        assert_eq!(pages.0.len(), 1);
        assert_eq!(pages.0[0].name, "Weekly Speakers");
    }

    #[tokio::test]
    async fn test_regular_user_cannot_create_page() {
        let state = AppState::in_memory(4).unwrap();
        let user = user_with_role(&state, "alice", Role::User).await;

        let err = create_page(State(state.clone()), user, Ok(Json(named("Weekly"))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(pages::count(&*state.conn().await).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_page_returns_404() {
        let state = AppState::in_memory(4).unwrap();
        let admin = user_with_role(&state, "root", Role::Admin).await;
        let err = delete_page(State(state), admin, Path("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
