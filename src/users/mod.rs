use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::Role},
    state::AppState,
};

/// Public part of the user profile; no credential material.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "profilePicture", skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

#[instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let user = state
        .store
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "profile lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        profile_picture: user.profile_picture,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_response_serialization() {
        let resp = ProfileResponse {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Learner,
            profile_picture: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(!json.contains("profilePicture"));
    }
}
