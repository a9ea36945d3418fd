//! Authentication middleware
//!
//! Turns a bearer token into the [`ParticipantId`] the battle handlers act for.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{error::AppError, models::ParticipantId, services::AuthService, state::AppState};

/// Participant resolved from the request's JWT
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub participant: ParticipantId,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Reject requests without a valid bearer token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let Some(auth_header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        debug!(path = %path, "Auth failed: No Authorization header");
        return Err(AppError::Unauthorized);
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        debug!(path = %path, "Auth failed: expected 'Bearer <token>'");
        return Err(AppError::Unauthorized);
    };

    let participant = AuthService::participant_from_token(token, &state.config().auth.jwt_secret)
        .map_err(|e| {
            debug!(path = %path, error = ?e, "Auth failed: token rejected");
            AppError::Unauthorized
        })?;

    debug!(path = %path, participant = %participant, "Participant authenticated");

    request
        .extensions_mut()
        .insert(AuthenticatedUser { participant });
    Ok(next.run(request).await)
}
