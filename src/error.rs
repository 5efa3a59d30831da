use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Error taxonomy surfaced at the auth service boundary.
///
/// Every variant maps to a fixed status and a client-safe message; store and
/// provider internals stay in the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    Conflict,
    #[error("Invalid email or password")]
    Authentication,
    #[error("Google sign-in failed")]
    FederatedAuth,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Clients expect a 400 for a taken email, not a 409.
            ApiError::Validation(_) | ApiError::Conflict | ApiError::FederatedAuth => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Authentication => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "internal error");
        }
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_wire_contract() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Authentication.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::FederatedAuth.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_body_is_opaque() {
        let msg = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3")).to_string();
        assert_eq!(msg, "Internal server error");
    }

    #[test]
    fn authentication_message_is_fixed() {
        assert_eq!(ApiError::Authentication.to_string(), "Invalid email or password");
    }
}
