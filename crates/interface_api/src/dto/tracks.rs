//! Activity track DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::ActivityTrack;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrackRequest {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ActivityTrack> for TrackResponse {
    fn from(track: &ActivityTrack) -> Self {
        Self {
            id: track.id.to_string(),
            user_id: track.user_id.to_string(),
            project_id: track.project_id.to_string(),
            from: track.from,
            to: track.to,
            description: track.description.clone(),
            created_at: track.created_at,
        }
    }
}
