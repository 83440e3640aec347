use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use tracing::info;

use speakercheck_data::auth::Action;
use speakercheck_data::db::speakers;
use speakercheck_data::{AvailabilityRequest, DataError, NewSpeaker, Speaker, SpeakerUpdate};

use super::MessageResponse;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerListParams {
    pub page_id: Option<String>,
}

/// GET /speakers?pageId=
pub async fn list_speakers(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Query(params): Query<SpeakerListParams>,
) -> Result<Json<Vec<Speaker>>, ApiError> {
    current.authorize(Action::ViewSpeakers)?;
    let conn = state.conn().await;
    let page_id = params.page_id.as_deref().filter(|id| !id.is_empty());
    Ok(Json(speakers::list(&conn, page_id)?))
}

/// GET /speakers/:id
pub async fn get_speaker(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Speaker>, ApiError> {
    current.authorize(Action::ViewSpeakers)?;
    let conn = state.conn().await;
    speakers::get(&conn, &id)?
        .map(Json)
        .ok_or_else(|| DataError::not_found("Speaker", id).into())
}

/// POST /speakers
pub async fn create_speaker(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    body: Result<Json<NewSpeaker>, JsonRejection>,
) -> Result<(StatusCode, Json<Speaker>), ApiError> {
    current.authorize(Action::CreateSpeaker)?;
    let Json(new) = body?;
    let conn = state.conn().await;

    let speaker = speakers::create(&conn, &new)?;
    info!(actor = %current.user.username, speaker = %speaker.id, page = %speaker.page_id, "speaker created");
    Ok((StatusCode::CREATED, Json(speaker)))
}

/// PUT /speakers/:id
pub async fn update_speaker(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<SpeakerUpdate>, JsonRejection>,
) -> Result<Json<Speaker>, ApiError> {
    current.authorize(Action::UpdateSpeaker)?;
    let Json(update) = body?;
    let conn = state.conn().await;

    let speaker = speakers::update(&conn, &id, &update)?;
    info!(actor = %current.user.username, speaker = %speaker.id, "speaker updated");
    Ok(Json(speaker))
}

/// PATCH /speakers/:id/availability
pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> Result<Json<Speaker>, ApiError> {
    current.authorize(Action::UpdateAvailability)?;
    let Json(request) = body?;
    let conn = state.conn().await;

    let speaker = speakers::update_availability(&conn, &id, &request, &current.user)?;
    info!(
        actor = %current.user.username,
        speaker = %speaker.id,
        state = %speaker.availability.state(),
        "availability changed"
    );
    Ok(Json(speaker))
}

/// DELETE /speakers/:id
pub async fn delete_speaker(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    current.authorize(Action::DeleteSpeaker)?;
    let conn = state.conn().await;

    speakers::delete(&conn, &id)?;
    info!(actor = %current.user.username, speaker = %id, "speaker deleted");
    Ok(MessageResponse::new("Speaker deleted successfully"))
}
