//! Activity track handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use domain_billing::ActivityTrack;

use crate::dto::tracks::*;
use crate::{error::ApiError, AppState};

/// Logs a span of work on a project
pub async fn create_track(
    State(state): State<AppState>,
    Json(request): Json<CreateTrackRequest>,
) -> Result<(StatusCode, Json<TrackResponse>), ApiError> {
    request.validate()?;

    let track = ActivityTrack::new(
        request.user_id.into(),
        request.project_id.into(),
        request.from,
        request.to,
        request.description,
    )?;

    state.port.insert_track(&track).await?;

    Ok((StatusCode::CREATED, Json(TrackResponse::from(&track))))
}
