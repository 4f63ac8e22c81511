use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_models::auth::SessionClaims;
use shared_models::error::AppError;

use crate::jwt::TokenService;

/// Pulls the token out of `Authorization: Bearer <token>`. A missing header
/// or an empty bearer value is `MissingToken`; anything else unreadable is
/// `Unauthorized`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_value = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        (Some(scheme), None) if scheme.eq_ignore_ascii_case("bearer") => Err(AppError::MissingToken),
        (None, _) => Err(AppError::MissingToken),
        _ => Err(AppError::Unauthorized),
    }
}

// Access guard: verifies the session token and attaches its claims.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let claims: SessionClaims = tokens.verify(token).map_err(|e| {
        debug!("Rejecting request: {}", e);
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

pub fn require_admin(caller: &SessionClaims) -> Result<(), AppError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::NotAuthorized)
    }
}

pub fn require_patient(caller: &SessionClaims) -> Result<(), AppError> {
    if caller.is_patient() {
        Ok(())
    } else {
        Err(AppError::NotAuthorized)
    }
}
